//! TLD tables and the TLD-at-position matcher.
//!
//! A TLD must be followed by end of text or by a character outside
//! `[0-9a-zA-Z@]`. For ASCII entries that rule means the TLD is the whole
//! alphanumeric run, so those live in hash sets; internationalized entries
//! are checked in declaration order.

use crate::tld_data;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TldKind {
    Generic,
    Country,
    /// `co` and `tv`, allowed in bare short domains.
    SpecialCountry,
    /// `xn--` encoded label; no follow check.
    Punycode,
}

const SPECIAL_COUNTRY: [&str; 2] = ["co", "tv"];

#[derive(Debug, Clone)]
pub struct TldTables {
    generic_ascii: HashSet<&'static str>,
    generic_idn: Vec<&'static str>,
    country_ascii: HashSet<&'static str>,
    country_idn: Vec<&'static str>,
}

impl TldTables {
    pub fn current() -> Self {
        Self::from_lists(tld_data::CURRENT_GENERIC, tld_data::CURRENT_COUNTRY)
    }

    pub fn legacy() -> Self {
        Self::from_lists(tld_data::LEGACY_GENERIC, tld_data::LEGACY_COUNTRY)
    }

    fn from_lists(generic: &'static str, country: &'static str) -> Self {
        let (generic_ascii, generic_idn) = split_table(generic);
        let (country_ascii, country_idn) = split_table(country);
        Self {
            generic_ascii,
            generic_idn,
            country_ascii,
            country_idn,
        }
    }

    pub fn len(&self) -> usize {
        self.generic_ascii.len()
            + self.generic_idn.len()
            + self.country_ascii.len()
            + self.country_idn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_generic(&self, tld: &str) -> bool {
        let lower = tld.to_lowercase();
        self.generic_ascii.contains(lower.as_str()) || self.generic_idn.contains(&lower.as_str())
    }

    pub fn is_country(&self, tld: &str) -> bool {
        let lower = tld.to_lowercase();
        self.country_ascii.contains(lower.as_str()) || self.country_idn.contains(&lower.as_str())
    }

    /// End byte of the first TLD of `kinds` (tried in order) starting at `pos`.
    pub fn match_at(&self, text: &str, pos: usize, kinds: &[TldKind]) -> Option<usize> {
        let rest = text.get(pos..)?;
        kinds.iter().find_map(|kind| match kind {
            TldKind::Generic => self.match_table(rest, &self.generic_ascii, &self.generic_idn),
            TldKind::Country => self.match_table(rest, &self.country_ascii, &self.country_idn),
            TldKind::SpecialCountry => {
                let run = ascii_alnum_run(rest);
                let hit = SPECIAL_COUNTRY
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(&rest[..run]));
                (hit && follow_ok(rest, run)).then_some(run)
            }
            TldKind::Punycode => {
                let head = rest.get(..4)?;
                if !head.eq_ignore_ascii_case("xn--") {
                    return None;
                }
                let run = ascii_alnum_run(&rest[4..]);
                (run > 0).then_some(4 + run)
            }
        })
        .map(|len| pos + len)
    }

    fn match_table(
        &self,
        rest: &str,
        ascii: &HashSet<&'static str>,
        idn: &[&'static str],
    ) -> Option<usize> {
        let run = ascii_alnum_run(rest);
        if run > 0 {
            let candidate = rest[..run].to_ascii_lowercase();
            return (ascii.contains(candidate.as_str()) && follow_ok(rest, run)).then_some(run);
        }
        idn.iter().find_map(|tld| {
            let len = prefix_len_ignore_case(rest, tld)?;
            follow_ok(rest, len).then_some(len)
        })
    }
}

fn split_table(table: &'static str) -> (HashSet<&'static str>, Vec<&'static str>) {
    let mut ascii = HashSet::new();
    let mut idn = Vec::new();
    for tld in table.split('|').filter(|t| !t.is_empty()) {
        if tld.is_ascii() {
            ascii.insert(tld);
        } else {
            idn.push(tld);
        }
    }
    (ascii, idn)
}

fn ascii_alnum_run(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_alphanumeric).count()
}

/// The character at `at` (if any) may follow a TLD.
fn follow_ok(s: &str, at: usize) -> bool {
    match s[at..].chars().next() {
        None => true,
        Some(c) => !(c.is_ascii_alphanumeric() || c == '@'),
    }
}

/// Byte length consumed from `hay` when it starts with `needle`, ignoring case.
fn prefix_len_ignore_case(hay: &str, needle: &str) -> Option<usize> {
    let mut consumed = 0usize;
    let mut hay_chars = hay.chars();
    for n in needle.chars() {
        let h = hay_chars.next()?;
        if h != n && !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
        consumed += h.len_utf8();
    }
    Some(consumed)
}
