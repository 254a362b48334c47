//! URL candidate scanning: preceding char, optional protocol, domain,
//! then port, path and query.

use crate::domain::DomainMatcher;
use crate::patterns::{compile, next_char};
use core_text::chars::{self, Class, class_body};
use regex::Regex;
use std::ops::Range;

/// A URL-shaped span. All offsets are bytes into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    pub start: usize,
    pub end: usize,
    pub domain: Range<usize>,
    pub has_protocol: bool,
    pub has_path: bool,
    /// The character the scanner consumed as the preceding boundary.
    pub preceding: Option<char>,
}

#[derive(Debug)]
pub(crate) struct UrlScanner {
    domains: DomainMatcher,
    protocol: Regex,
    suffix: Regex,
    tco: Regex,
}

impl UrlScanner {
    pub(crate) fn new(domains: DomainMatcher, accents: Class) -> Self {
        let latin = class_body(accents);
        let chars = format!(r"[a-zA-Z0-9!*;:=+,.$/%#\[\]\-_~&|@{latin}]");
        let parens = format!(r"\((?:{chars}+|(?:{chars}*\({chars}+\){chars}*))\)");
        let ending = format!(r"(?:[a-zA-Z0-9=_#/+\-{latin}]|{parens})");
        let path = format!(r"(?:{chars}*(?:{parens}{chars}*)*{ending})|(?:{chars}+/)");
        let query = r"\?[a-zA-Z0-9!?*'();:&=+$/%#\[\]\-_.,~|@]*[a-zA-Z0-9_&=#/]";
        Self {
            domains,
            protocol: compile("url protocol", r"(?i)^https?://"),
            suffix: compile(
                "url suffix",
                &format!(r"^(?::([0-9]+))?(/(?:{path})*)?({query})?"),
            ),
            tco: compile("t.co url", r"(?i:^https?://t\.co/)[a-zA-Z0-9]+"),
        }
    }

    pub(crate) fn domains(&self) -> &DomainMatcher {
        &self.domains
    }

    /// Every URL candidate, left to right, non-overlapping.
    pub(crate) fn scan(&self, text: &str) -> Vec<UrlMatch> {
        let mut out = Vec::new();
        let mut m = 0usize;
        while m < text.len() {
            let preceding = text[m..].chars().next().filter(|&c| allowed_before_url(c));
            let found = preceding
                .and_then(|c| self.url_at(text, m + c.len_utf8(), Some(c)))
                .or_else(|| (m == 0).then(|| self.url_at(text, 0, None)).flatten());
            match found {
                Some(url) => {
                    m = url.end.max(next_char(text, m));
                    out.push(url);
                }
                None => m = next_char(text, m),
            }
        }
        out
    }

    fn url_at(&self, text: &str, start: usize, preceding: Option<char>) -> Option<UrlMatch> {
        let with_protocol = self
            .protocol
            .find(&text[start..])
            .and_then(|p| {
                let d_start = start + p.end();
                self.domains
                    .match_at(text, d_start)
                    .map(|d_end| (d_start..d_end, true))
            });
        let (domain, has_protocol) = with_protocol.or_else(|| {
            self.domains
                .match_at(text, start)
                .map(|d_end| (start..d_end, false))
        })?;

        let (end, has_path) = match self.suffix.captures(&text[domain.end..]) {
            Some(caps) => (
                domain.end + caps.get(0).map_or(0, |m| m.end()),
                caps.get(2).is_some(),
            ),
            None => (domain.end, false),
        };
        Some(UrlMatch {
            start,
            end,
            domain,
            has_protocol,
            has_path,
            preceding,
        })
    }

    /// Byte length of the `https://t.co/<id>` prefix of `url`.
    pub(crate) fn tco_prefix(&self, url: &str) -> Option<usize> {
        self.tco.find(url).map(|m| m.end())
    }
}

/// Bidi controls are allowed before a URL even though they are invalid
/// tweet characters.
fn is_directional(c: char) -> bool {
    matches!(c, '\u{061C}' | '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

fn allowed_before_url(c: char) -> bool {
    is_directional(c)
        || !(c.is_ascii_alphanumeric()
            || matches!(c, '@' | '＠' | '$' | '#' | '＃')
            || chars::is_invalid_char(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tld::TldTables;

    fn scanner() -> UrlScanner {
        UrlScanner::new(
            DomainMatcher::new(TldTables::current(), chars::LATIN_ACCENTS),
            chars::LATIN_ACCENTS,
        )
    }

    fn spans(text: &str) -> Vec<&str> {
        scanner()
            .scan(text)
            .into_iter()
            .map(|u| &text[u.start..u.end])
            .collect()
    }

    #[test]
    fn protocol_and_path() {
        assert_eq!(
            spans("visit https://example.com/a/b?x=1. now"),
            ["https://example.com/a/b?x=1"]
        );
        assert_eq!(spans("HTTP://EXAMPLE.COM"), ["HTTP://EXAMPLE.COM"]);
    }

    #[test]
    fn path_ending_drops_trailing_punctuation() {
        assert_eq!(spans("example.com/foo!"), ["example.com/foo"]);
        assert_eq!(
            spans("en.wikipedia.org/wiki/Rust_(language)."),
            ["en.wikipedia.org/wiki/Rust_(language)"]
        );
    }

    #[test]
    fn preceding_character_rules() {
        assert!(spans("@example.com").is_empty());
        assert!(spans("$example.com").is_empty());
        assert!(spans("foo#example.com").is_empty());
        assert_eq!(spans("…example.com"), ["example.com"]);
    }

    #[test]
    fn records_flags() {
        let found = scanner().scan("http://t.co/abc/def ok");
        assert_eq!(found.len(), 1);
        assert!(found[0].has_protocol);
        assert!(found[0].has_path);
        assert_eq!(found[0].preceding, None);
        assert_eq!(scanner().tco_prefix("http://t.co/abc/def"), Some(15));
    }
}
