use std::collections::HashMap;

use core_config::Configuration;
use core_extract::Extractor;
use core_text::{TextError, chars::has_invalid_chars, decode, normalize, utf16_len};
use tracing::debug;

use crate::results::{ParseResults, TextRange};

/// Weighs tweets against one [`Configuration`].
#[derive(Debug, Clone)]
pub struct Parser {
    config: Configuration,
    extractor: Extractor,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl Parser {
    pub fn new(config: Configuration) -> Self {
        Self::with_extractor(config, Extractor::new())
    }

    /// Use a specific extractor for URL and emoji spans, e.g. one built on
    /// the legacy grammar.
    pub fn with_extractor(config: Configuration, extractor: Extractor) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Weighted length, validity and the display/valid ranges of `text`.
    ///
    /// The text is NFC-normalized first. Each URL counts as a flat
    /// `transformedURLLength` default-weight characters; with emoji parsing
    /// on, each emoji cluster counts as one default-weight character. Every
    /// other code point weighs whatever the first containing range says.
    /// Range ends are mapped back onto the caller's (unnormalized) text.
    pub fn parse_tweet(&self, text: &str) -> ParseResults {
        if text.is_empty() {
            return ParseResults::empty();
        }
        let normalized = normalize(text);
        let max = self.config.scaled_max_weighted_length();

        // start unit -> (end unit, scaled weight)
        let mut spans: HashMap<usize, (usize, u64)> = HashMap::new();
        let urls = self.extractor.extract_urls_with_indices(&normalized);
        for url in &urls {
            spans.insert(
                url.start(),
                (url.end(), self.config.scaled_transformed_url_weight()),
            );
        }
        let emoji_count = if self.config.emoji_parsing_enabled {
            let emoji = self.extractor.extract_emoji_with_indices(&normalized);
            for e in &emoji {
                spans
                    .entry(e.start())
                    .or_insert((e.end(), u64::from(self.config.default_weight)));
            }
            emoji.len()
        } else {
            0
        };

        let mut weighted = 0u64;
        let mut offset = 0usize;
        let mut valid_offset = 0usize;
        let mut unit = 0usize;
        for c in normalized.chars() {
            let here = unit;
            unit += c.len_utf16();
            if here < offset {
                continue;
            }
            let (len, weight) = match spans.get(&here) {
                Some(&(end, weight)) => (end - here, weight),
                None => (c.len_utf16(), u64::from(self.config.weight_of(c))),
            };
            weighted += weight;
            offset = here + len;
            if weighted <= max {
                valid_offset = offset;
            }
        }

        let original_units = utf16_len(text);
        let normalized_units = utf16_len(&normalized);
        let shift = |end: usize| (end + original_units).saturating_sub(normalized_units + 1);

        let valid = weighted <= max && !has_invalid_chars(&normalized);
        let permillage = (weighted as f64 * 1000.0 / max as f64).round() as usize;
        let weighted_length = (weighted / u64::from(self.config.scale)) as usize;

        debug!(
            target: "parse",
            units = original_units,
            urls = urls.len(),
            emoji = emoji_count,
            weighted_length,
            valid,
            "tweet_parsed"
        );

        ParseResults {
            weighted_length,
            permillage,
            valid,
            display_range: TextRange::from_zero(shift(offset)),
            valid_range: TextRange::from_zero(shift(valid_offset)),
        }
    }

    /// [`Parser::parse_tweet`] over raw bytes. Malformed UTF-8 is an error.
    pub fn parse_tweet_bytes(&self, bytes: &[u8]) -> Result<ParseResults, TextError> {
        Ok(self.parse_tweet(decode(bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_weighs_one_each() {
        let r = Parser::default().parse_tweet("Hello");
        assert_eq!(r.weighted_length, 5);
        assert_eq!(r.permillage, 18);
        assert!(r.valid);
        assert_eq!(r.display_range, TextRange::from_zero(4));
        assert_eq!(r.valid_range, TextRange::from_zero(4));
    }

    #[test]
    fn cjk_weighs_double() {
        let r = Parser::default().parse_tweet("日本語");
        assert_eq!(r.weighted_length, 6);
        assert_eq!(r.display_range.end(), 2);
    }

    #[test]
    fn decomposed_input_maps_back_to_original_units() {
        let r = Parser::default().parse_tweet("e\u{0301}");
        assert_eq!(r.weighted_length, 1);
        assert_eq!(r.display_range.end(), 1);
        assert_eq!(r.valid_range.end(), 1);
    }

    #[test]
    fn invalid_chars_invalidate() {
        let r = Parser::default().parse_tweet("abc\u{FEFF}");
        assert!(!r.valid);
        assert!(!Parser::default().parse_tweet("abc\u{202E}").valid);
    }

    #[test]
    fn bytes_must_be_utf8() {
        let parser = Parser::default();
        assert_eq!(parser.parse_tweet_bytes(b"hi").unwrap().weighted_length, 2);
        assert!(parser.parse_tweet_bytes(b"hi \xC0").is_err());
    }
}
