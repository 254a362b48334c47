//! Bounded domain matcher.
//!
//! Domains are matched by hand rather than with one large alternation: the
//! text is split into dot-terminated labels of at most [`MAX_LABEL_CHARS`]
//! characters, then the alternatives are tried in order against the TLD
//! tables. A label longer than the bound stops the parse, so an overlong
//! single-label domain can never become a URL.

use crate::tld::{TldKind, TldTables};
use core_text::chars::{self, Class};

pub const MAX_LABEL_CHARS: usize = 63;

const ANY_TLD: [TldKind; 3] = [TldKind::Generic, TldKind::Country, TldKind::Punycode];
const BARE_TLD: [TldKind; 3] = [TldKind::Generic, TldKind::Punycode, TldKind::SpecialCountry];

/// One dot-terminated label. `end` is the byte offset of its `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Label {
    end: usize,
    /// No `_`, so it may serve as the registrable domain name.
    domain_ok: bool,
}

#[derive(Debug, Clone)]
pub struct DomainMatcher {
    tlds: TldTables,
    accents: Class,
}

impl DomainMatcher {
    pub fn new(tlds: TldTables, accents: Class) -> Self {
        Self { tlds, accents }
    }

    pub fn tlds(&self) -> &TldTables {
        &self.tlds
    }

    fn is_label_char(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || chars::in_ranges(c, self.accents)
    }

    /// Consecutive labels starting at `start`; stops at the first run that is
    /// not a valid label followed by `.`.
    fn labels(&self, text: &str, start: usize) -> Vec<Label> {
        let mut out = Vec::new();
        let mut pos = start;
        loop {
            let rest = &text[pos..];
            let mut count = 0usize;
            let mut last = None;
            let mut first = None;
            let mut underscore = false;
            let mut run_end = pos;
            for (i, c) in rest.char_indices() {
                if !(self.is_label_char(c) || c == '_' || c == '-') {
                    break;
                }
                first.get_or_insert(c);
                last = Some(c);
                underscore |= c == '_';
                count += 1;
                run_end = pos + i + c.len_utf8();
            }
            let bounded = count > 0 && count <= MAX_LABEL_CHARS;
            let edges_ok = first.is_some_and(|c| self.is_label_char(c))
                && last.is_some_and(|c| self.is_label_char(c));
            if !(bounded && edges_ok && text[run_end..].starts_with('.')) {
                return out;
            }
            out.push(Label {
                end: run_end,
                domain_ok: !underscore,
            });
            pos = run_end + 1;
        }
    }

    /// End byte of the domain starting at `start`, if any alternative matches.
    pub fn match_at(&self, text: &str, start: usize) -> Option<usize> {
        let labels = self.labels(text, start);

        // subdomains, then a domain name, then any TLD
        for k in (1..labels.len()).rev() {
            if labels[k].domain_ok {
                if let Some(end) = self.tlds.match_at(text, labels[k].end + 1, &ANY_TLD) {
                    return Some(end);
                }
            }
        }

        let first = labels.first().filter(|l| l.domain_ok);
        if let Some(l0) = first {
            if let Some(end) = self.tlds.match_at(text, l0.end + 1, &BARE_TLD) {
                return Some(end);
            }
        }

        if follows_protocol(&text[..start]) {
            if let Some(l0) = first {
                if let Some(end) = self.tlds.match_at(text, l0.end + 1, &[TldKind::Country]) {
                    return Some(end);
                }
            }
            if let Some(end) = self.unicode_domain_at(text, start) {
                return Some(end);
            }
        }

        let l0 = first?;
        self.tlds
            .match_at(text, l0.end + 1, &[TldKind::Country])
            .filter(|&end| text[end..].starts_with('/'))
    }

    /// A single label of unicode letters, `.`, then a gTLD or ccTLD.
    fn unicode_domain_at(&self, text: &str, start: usize) -> Option<usize> {
        let mut count = 0usize;
        let mut end = start;
        for (i, c) in text[start..].char_indices() {
            if !is_unicode_domain_char(c) {
                break;
            }
            count += 1;
            end = start + i + c.len_utf8();
        }
        if count == 0 || count > MAX_LABEL_CHARS || !text[end..].starts_with('.') {
            return None;
        }
        self.tlds
            .match_at(text, end + 1, &[TldKind::Generic, TldKind::Country])
    }

    /// Every `subdomain* domain tld` span in `domain`, left to right.
    pub fn ascii_domains(&self, domain: &str) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut pos = 0usize;
        while pos < domain.len() {
            match self.ascii_domain_at(domain, pos) {
                Some(end) => {
                    out.push((pos, end));
                    pos = end.max(pos + 1);
                }
                None => {
                    pos += domain[pos..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        out
    }

    fn ascii_domain_at(&self, text: &str, start: usize) -> Option<usize> {
        let labels = self.labels(text, start);
        labels
            .iter()
            .rev()
            .filter(|l| l.domain_ok)
            .find_map(|l| self.tlds.match_at(text, l.end + 1, &ANY_TLD))
    }

    /// `domain.ccTLD` and nothing else.
    pub fn is_invalid_short_domain(&self, s: &str) -> bool {
        self.is_single_label_with(s, TldKind::Country)
    }

    /// `domain.co` or `domain.tv` and nothing else.
    pub fn is_special_short_domain(&self, s: &str) -> bool {
        self.is_single_label_with(s, TldKind::SpecialCountry)
    }

    fn is_single_label_with(&self, s: &str, kind: TldKind) -> bool {
        let labels = self.labels(s, 0);
        labels.first().is_some_and(|l0| {
            l0.domain_ok && self.tlds.match_at(s, l0.end + 1, &[kind]) == Some(s.len())
        })
    }
}

fn follows_protocol(before: &str) -> bool {
    let tail = |n: usize| {
        before
            .len()
            .checked_sub(n)
            .and_then(|i| before.get(i..))
            .is_some_and(|t| t.eq_ignore_ascii_case(if n == 7 { "http://" } else { "https://" }))
    };
    tail(7) || tail(8)
}

fn is_unicode_domain_char(c: char) -> bool {
    !(c.is_ascii_punctuation()
        || c.is_ascii_whitespace()
        || c.is_control()
        || chars::is_invalid_char(c)
        || chars::is_unicode_space(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> DomainMatcher {
        DomainMatcher::new(TldTables::current(), chars::LATIN_ACCENTS)
    }

    #[test]
    fn bare_gtld_and_special_cctld() {
        let m = current();
        assert_eq!(m.match_at("example.com is", 0), Some(11));
        assert_eq!(m.match_at("MLB.tv", 0), Some(6));
        assert_eq!(m.match_at("example.jp", 0), None);
        assert_eq!(m.match_at("t.co/abc", 0), Some(4));
    }

    #[test]
    fn subdomains_allow_cctld() {
        let m = current();
        assert_eq!(m.match_at("www.example.jp", 0), Some(14));
        assert_eq!(m.match_at("foo_bar.example.com", 0), Some(19));
        assert_eq!(m.match_at("example.x_y.com", 0), None);
    }

    #[test]
    fn protocol_unlocks_cctld_and_unicode_labels() {
        let m = current();
        let text = "http://example.jp";
        assert_eq!(m.match_at(text, 7), Some(text.len()));
        let text = "https://твиттер.рф";
        assert_eq!(m.match_at(text, 8), Some(text.len()));
        assert_eq!(m.match_at("твиттер.рф", 0), None);
    }

    #[test]
    fn overlong_label_never_matches() {
        let m = current();
        let long = format!("{}.com", "a".repeat(64));
        assert_eq!(m.match_at(&long, 0), None);
        let ok = format!("{}.com", "a".repeat(63));
        assert_eq!(m.match_at(&ok, 0), Some(ok.len()));
    }

    #[test]
    fn ascii_domains_scan() {
        let m = current();
        assert_eq!(m.ascii_domains("www.twitter.com"), vec![(0, 15)]);
        assert!(m.ascii_domains("localhost").is_empty());
    }

    #[test]
    fn short_domain_rules() {
        let m = current();
        assert!(m.is_invalid_short_domain("example.jp"));
        assert!(!m.is_invalid_short_domain("www.example.jp"));
        assert!(m.is_special_short_domain("vine.co"));
        assert!(!m.is_special_short_domain("vine.com"));
    }
}
