//! Command-line driver: argument parsing and command execution.
//!
//! `main.rs` only installs logging and prints; everything else lives here so
//! commands can be exercised without spawning a process.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use core_autolink::{Autolink, HitHighlighter};
use core_config::{Configuration, load_from};
use core_extract::Extractor;
use core_grammar::{Grammar, GrammarProfile};
use core_text::{decode, strings};
use core_validate::{Parser as TweetParser, Validator};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tweet-text", version, about = "Tweet entity extraction and weighted length")]
pub struct Cli {
    /// Weighting profile (TOML). Without it `tweet-text.toml` is looked up.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Use the built-in v3 profile (emoji count as one character) when no
    /// `--config` is given.
    #[arg(long, global = true)]
    pub v3: bool,
    /// Use the legacy grammar.
    #[arg(long, global = true)]
    pub legacy: bool,
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract entities as JSON records.
    Extract {
        #[arg(long, value_enum, default_value_t = ExtractKind::Entities)]
        kind: ExtractKind,
        /// Only extract URLs written with a protocol.
        #[arg(long)]
        protocol_only: bool,
        /// Text to scan; read from stdin when omitted.
        text: Option<String>,
    },
    /// Weighted length and validity as JSON.
    Parse {
        /// Flat record form with spread range fields.
        #[arg(long)]
        record: bool,
        text: Option<String>,
    },
    /// Check the input and print `{"valid": ...}`.
    Validate {
        #[arg(long, value_enum, default_value_t = ValidateKind::Tweet)]
        kind: ValidateKind,
        /// URLs: reject internationalized domains.
        #[arg(long)]
        ascii_domains: bool,
        /// URLs: accept a missing `http://`.
        #[arg(long)]
        allow_missing_protocol: bool,
        text: Option<String>,
    },
    /// Print the input as HTML with entities linked.
    Autolink {
        #[arg(long, value_enum, default_value_t = LinkKind::All)]
        kind: LinkKind,
        /// Tweet API `entities` JSON to link instead of scanning the text.
        #[arg(long)]
        entities: Option<PathBuf>,
        text: Option<String>,
    },
    /// Wrap `--hit START:END` ranges (UTF-16 units) in a tag.
    Highlight {
        #[arg(long = "hit", value_parser = parse_hit)]
        hits: Vec<[usize; 2]>,
        #[arg(long, default_value = "em")]
        tag: String,
        text: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtractKind {
    /// Merged, non-overlapping list of every category.
    Entities,
    /// Everything, grouped by category.
    All,
    Mentions,
    Lists,
    Hashtags,
    Cashtags,
    Urls,
    Emoji,
    Reply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateKind {
    Tweet,
    Username,
    List,
    Hashtag,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkKind {
    All,
    Usernames,
    Hashtags,
    Cashtags,
    Urls,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Extract { .. } => "extract",
            Command::Parse { .. } => "parse",
            Command::Validate { .. } => "validate",
            Command::Autolink { .. } => "autolink",
            Command::Highlight { .. } => "highlight",
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            Command::Extract { text, .. }
            | Command::Parse { text, .. }
            | Command::Validate { text, .. }
            | Command::Autolink { text, .. }
            | Command::Highlight { text, .. } => text.as_deref(),
        }
    }
}

fn parse_hit(s: &str) -> Result<[usize; 2], String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got `{s}`"))?;
    let start: usize = start.trim().parse().map_err(|e| format!("bad start: {e}"))?;
    let end: usize = end.trim().parse().map_err(|e| format!("bad end: {e}"))?;
    if end < start {
        return Err(format!("end {end} is before start {start}"));
    }
    Ok([start, end])
}

/// Run `cli`, reading the text from `stdin` when no argument was given.
/// Returns what should be printed.
pub fn run(cli: &Cli, stdin: &mut dyn Read) -> Result<String> {
    let text = match cli.command.text() {
        Some(text) => text.to_string(),
        None => read_input(stdin)?,
    };
    debug!(
        target: "cli",
        command = cli.command.name(),
        bytes = text.len(),
        code_points = strings::code_point_len(&text),
        "input_read"
    );

    let profile = if cli.legacy {
        GrammarProfile::Legacy
    } else {
        GrammarProfile::Current
    };
    let extractor = Extractor::with_grammar(Grammar::shared_for(profile));

    match &cli.command {
        Command::Extract {
            kind,
            protocol_only,
            ..
        } => {
            let extractor = extractor.extract_url_without_protocol(!protocol_only);
            extract(&extractor, *kind, &text, cli.pretty)
        }
        Command::Parse { record, .. } => {
            let parser = TweetParser::with_extractor(configuration(cli)?, extractor);
            let results = parser.parse_tweet(&text);
            if *record {
                to_json(&results.to_record(), cli.pretty)
            } else {
                to_json(&results, cli.pretty)
            }
        }
        Command::Validate {
            kind,
            ascii_domains,
            allow_missing_protocol,
            ..
        } => {
            let validator =
                Validator::from_parser(TweetParser::with_extractor(configuration(cli)?, extractor));
            let valid = match kind {
                ValidateKind::Tweet => validator.is_valid_tweet_text(&text),
                ValidateKind::Username => validator.is_valid_username(&text),
                ValidateKind::List => validator.is_valid_list(&text),
                ValidateKind::Hashtag => validator.is_valid_hashtag(&text),
                ValidateKind::Url => {
                    validator.is_valid_url(&text, !ascii_domains, !allow_missing_protocol)
                }
            };
            to_json(&json!({ "valid": valid }), cli.pretty)
        }
        Command::Autolink { kind, entities, .. } => {
            let linker = Autolink::new().extractor(extractor.extract_url_without_protocol(false));
            if let Some(path) = entities {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading entities from {}", path.display()))?;
                return linker
                    .auto_link_with_json(&text, &json)
                    .context("linking entities JSON");
            }
            Ok(match kind {
                LinkKind::All => linker.auto_link(&text),
                LinkKind::Usernames => linker.auto_link_usernames_and_lists(&text),
                LinkKind::Hashtags => linker.auto_link_hashtags(&text),
                LinkKind::Cashtags => linker.auto_link_cashtags(&text),
                LinkKind::Urls => linker.auto_link_urls(&text),
            })
        }
        Command::Highlight { hits, tag, .. } => {
            Ok(HitHighlighter::new().tag(tag.as_str()).highlight(&text, hits))
        }
    }
}

fn extract(extractor: &Extractor, kind: ExtractKind, text: &str, pretty: bool) -> Result<String> {
    match kind {
        ExtractKind::Entities => to_json(&extractor.extract_entities_with_indices(text), pretty),
        ExtractKind::All => to_json(&extractor.extract(text), pretty),
        ExtractKind::Mentions => {
            to_json(&extractor.extract_mentioned_screennames_with_indices(text), pretty)
        }
        ExtractKind::Lists => to_json(&extractor.extract_mentions_or_lists_with_indices(text), pretty),
        ExtractKind::Hashtags => to_json(&extractor.extract_hashtags_with_indices(text), pretty),
        ExtractKind::Cashtags => to_json(&extractor.extract_cashtags_with_indices(text), pretty),
        ExtractKind::Urls => to_json(&extractor.extract_urls_with_indices(text), pretty),
        ExtractKind::Emoji => to_json(&extractor.extract_emoji_with_indices(text), pretty),
        ExtractKind::Reply => to_json(&extractor.extract_reply_with_indices(text), pretty),
    }
}

fn configuration(cli: &Cli) -> Result<Configuration> {
    if cli.config.is_none() && cli.v3 {
        return Ok(Configuration::v3());
    }
    load_from(cli.config.clone()).context("loading weighting profile")
}

/// Stdin as text: must be UTF-8; CRLF becomes LF and one trailing newline
/// is dropped.
fn read_input(stdin: &mut dyn Read) -> Result<String> {
    let mut bytes = Vec::new();
    stdin.read_to_end(&mut bytes).context("reading stdin")?;
    let text = decode(&bytes).context("stdin is not valid UTF-8")?;
    let text = strings::normalize_line_feeds(text);
    let text: &str = &text;
    Ok(text.strip_suffix('\n').unwrap_or(text).to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.context("serializing output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_arguments() {
        assert_eq!(parse_hit("3:7"), Ok([3, 7]));
        assert_eq!(parse_hit(" 0 : 4 "), Ok([0, 4]));
        assert!(parse_hit("7:3").is_err());
        assert!(parse_hit("7").is_err());
        assert!(parse_hit("a:b").is_err());
    }

    #[test]
    fn stdin_is_normalized() {
        let mut input = "line one\r\nline two\r\n".as_bytes();
        assert_eq!(read_input(&mut input).unwrap(), "line one\nline two");
        let mut bad: &[u8] = b"\xff\xfe";
        let err = read_input(&mut bad).unwrap_err();
        assert!(format!("{err:#}").contains("not valid UTF-8"));
    }

    #[test]
    fn command_names() {
        let cli = Cli::try_parse_from(["tweet-text", "parse", "hi"]).unwrap();
        assert_eq!(cli.command.name(), "parse");
        assert_eq!(cli.command.text(), Some("hi"));
    }
}
