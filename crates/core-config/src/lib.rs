//! Weighted-length configuration profiles.
//!
//! A [`Configuration`] says how much each code point weighs, the maximum
//! weighted length of a tweet and the flat length charged for a URL. All
//! weights are fixed-point integers multiplied by `scale`.
//!
//! Sources, in order of preference for callers:
//! - the built-in profiles ([`Configuration::v2`], [`Configuration::v3`]);
//! - a JSON document ([`Configuration::from_json`]) or an already parsed
//!   key-value map ([`Configuration::from_map`]);
//! - a TOML file resolved by [`load_from`], which falls back to the v2
//!   profile when the file is missing or unreadable.
//!
//! Missing fields in JSON/TOML inherit the v2 defaults, so a document that
//! only overrides `maxWeightedTweetLength` is accepted. Unknown fields are
//! ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs, io, path::PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("weight range end {end} is before start {start}")]
    InvalidRange { start: u32, end: u32 },
    #[error("{field} must be greater than zero")]
    InvalidScale { field: &'static str },
}

/// Inclusive code point range sharing one weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRange {
    pub start: u32,
    pub end: u32,
    pub weight: u32,
}

impl WeightRange {
    pub const fn new(start: u32, end: u32, weight: u32) -> Self {
        Self { start, end, weight }
    }

    #[inline]
    pub fn contains(&self, cp: u32) -> bool {
        self.start <= cp && cp <= self.end
    }
}

const DEFAULT_RANGES: [WeightRange; 4] = [
    WeightRange::new(0, 4351, 100),
    WeightRange::new(8192, 8205, 100),
    WeightRange::new(8208, 8223, 100),
    WeightRange::new(8242, 8247, 100),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    pub version: u32,
    pub max_weighted_tweet_length: u32,
    pub scale: u32,
    pub default_weight: u32,
    #[serde(rename = "transformedURLLength")]
    pub transformed_url_length: u32,
    pub emoji_parsing_enabled: bool,
    pub ranges: Vec<WeightRange>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::v2()
    }
}

impl Configuration {
    /// Version 2 weighting: CJK and most non-Latin scripts weigh double.
    pub fn v2() -> Self {
        Self {
            version: 2,
            max_weighted_tweet_length: 280,
            scale: 100,
            default_weight: 200,
            transformed_url_length: 23,
            emoji_parsing_enabled: false,
            ranges: DEFAULT_RANGES.to_vec(),
        }
    }

    /// Version 3: v2 plus emoji clusters counted as one default-weight unit.
    pub fn v3() -> Self {
        Self {
            version: 3,
            emoji_parsing_enabled: true,
            ..Self::v2()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()
    }

    pub fn from_map(map: Map<String, Value>) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_value(Value::Object(map))?;
        cfg.validate()
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(content)?;
        cfg.validate()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.scale == 0 {
            return Err(ConfigError::InvalidScale { field: "scale" });
        }
        if self.max_weighted_tweet_length == 0 {
            return Err(ConfigError::InvalidScale {
                field: "maxWeightedTweetLength",
            });
        }
        if let Some(r) = self.ranges.iter().find(|r| r.end < r.start) {
            return Err(ConfigError::InvalidRange {
                start: r.start,
                end: r.end,
            });
        }
        Ok(self)
    }

    pub fn scaled_max_weighted_length(&self) -> u64 {
        u64::from(self.max_weighted_tweet_length) * u64::from(self.scale)
    }

    /// Flat scaled contribution of one URL: `transformedURLLength` characters
    /// of default weight each.
    pub fn scaled_transformed_url_weight(&self) -> u64 {
        u64::from(self.transformed_url_length) * u64::from(self.default_weight)
    }

    /// Weight of `c`: the first range containing it, else `defaultWeight`.
    pub fn weight_of(&self, c: char) -> u32 {
        let cp = c as u32;
        self.ranges
            .iter()
            .find(|r| r.contains(cp))
            .map_or(self.default_weight, |r| r.weight)
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("tweet-text.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("tweet-text").join("config.toml");
    }
    local
}

/// Load a TOML profile. A missing file yields the v2 profile; a file that
/// fails to parse or validate also yields v2 and logs a warning.
pub fn load_from(path: Option<PathBuf>) -> Result<Configuration, ConfigError> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_missing_using_defaults");
            return Ok(Configuration::default());
        }
        Err(e) => return Err(e.into()),
    };
    match Configuration::from_toml(&content) {
        Ok(cfg) => {
            info!(
                target: "config",
                path = %path.display(),
                version = cfg.version,
                max_weighted_tweet_length = cfg.max_weighted_tweet_length,
                scale = cfg.scale,
                ranges = cfg.ranges.len(),
                "config_loaded"
            );
            Ok(cfg)
        }
        Err(error) => {
            warn!(target: "config", path = %path.display(), %error, "config_invalid_using_defaults");
            Ok(Configuration::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn v2_defaults() {
        let cfg = Configuration::default();
        assert_eq!(cfg.version, 2);
        assert_eq!(cfg.max_weighted_tweet_length, 280);
        assert_eq!(cfg.scale, 100);
        assert_eq!(cfg.default_weight, 200);
        assert_eq!(cfg.transformed_url_length, 23);
        assert_eq!(cfg.ranges.len(), 4);
        assert!(!cfg.emoji_parsing_enabled);
        assert_eq!(cfg.scaled_max_weighted_length(), 28_000);
        assert_eq!(cfg.scaled_transformed_url_weight(), 4_600);
    }

    #[test]
    fn v3_enables_emoji_parsing() {
        let cfg = Configuration::v3();
        assert_eq!(cfg.version, 3);
        assert!(cfg.emoji_parsing_enabled);
        assert_eq!(cfg.ranges, Configuration::v2().ranges);
    }

    #[test]
    fn weight_lookup_uses_first_matching_range() {
        let cfg = Configuration::v2();
        assert_eq!(cfg.weight_of('a'), 100);
        assert_eq!(cfg.weight_of('\u{2010}'), 100);
        assert_eq!(cfg.weight_of('漢'), 200);
        assert_eq!(cfg.weight_of('😀'), 200);
    }

    #[test]
    fn parses_json_document() {
        let json = r#"{
            "version": 2,
            "maxWeightedTweetLength": 140,
            "scale": 10,
            "defaultWeight": 20,
            "transformedURLLength": 22,
            "ranges": [{"start": 0, "end": 127, "weight": 10}]
        }"#;
        let cfg = Configuration::from_json(json).unwrap();
        assert_eq!(cfg.max_weighted_tweet_length, 140);
        assert_eq!(cfg.transformed_url_length, 22);
        assert_eq!(cfg.ranges, vec![WeightRange::new(0, 127, 10)]);
    }

    #[test]
    fn json_round_trips_key_names() {
        let json = Configuration::v3().to_json().unwrap();
        assert!(json.contains("\"transformedURLLength\":23"));
        assert!(json.contains("\"emojiParsingEnabled\":true"));
        assert_eq!(Configuration::from_json(&json).unwrap(), Configuration::v3());
    }

    #[test]
    fn map_constructor_inherits_missing_fields() {
        let mut map = Map::new();
        map.insert("maxWeightedTweetLength".into(), Value::from(500));
        let cfg = Configuration::from_map(map).unwrap();
        assert_eq!(cfg.max_weighted_tweet_length, 500);
        assert_eq!(cfg.default_weight, 200);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = Configuration::from_json(r#"{"ranges":[{"start":10,"end":5,"weight":1}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { start: 10, end: 5 }));
    }

    #[test]
    fn rejects_zero_scale() {
        let err = Configuration::from_json(r#"{"scale":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScale { field: "scale" }));
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg, Configuration::v2());
    }

    #[test]
    fn parses_toml_profile() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "version = 3\nemojiParsingEnabled = true\nmaxWeightedTweetLength = 140\n\n[[ranges]]\nstart = 0\nend = 255\nweight = 100\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.version, 3);
        assert!(cfg.emoji_parsing_enabled);
        assert_eq!(cfg.max_weighted_tweet_length, 140);
        assert_eq!(cfg.ranges, vec![WeightRange::new(0, 255, 100)]);
        assert_eq!(cfg.scale, 100);
    }

    #[test]
    fn invalid_toml_falls_back_and_logs() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "scale = \"lots\"\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf()))).unwrap();

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_invalid_using_defaults"));
        assert_eq!(cfg, Configuration::v2());
    }
}
