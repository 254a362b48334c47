//! Compiled matchers for tweet entities.
//!
//! A [`Grammar`] bundles every pattern for one [`GrammarProfile`]: mention,
//! reply, hashtag and cashtag matchers, the URL scanner with its bounded
//! domain matcher and TLD tables, and the RFC 3986 validator. Building one
//! compiles a few large regexes, so callers normally share
//! [`Grammar::shared`] (or [`Grammar::shared_for`]) instead of building
//! their own.

pub mod domain;
mod patterns;
pub mod rfc3986;
pub mod tld;
mod tld_data;
mod url;

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tracing::info;

pub use domain::DomainMatcher;
pub use patterns::{MentionMatch, TagMatch};
pub use rfc3986::{UrlParts, UrlValidator};
pub use tld::{TldKind, TldTables};
pub use url::UrlMatch;

use core_text::chars::{self, Class};
use patterns::Patterns;
use url::UrlScanner;

/// Which snapshot of the entity grammar to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GrammarProfile {
    #[default]
    Current,
    /// Older accent set, mention and hashtag boundaries, and TLD lists.
    Legacy,
}

impl GrammarProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            GrammarProfile::Current => "current",
            GrammarProfile::Legacy => "legacy",
        }
    }
}

#[derive(Debug)]
pub struct Grammar {
    profile: GrammarProfile,
    patterns: Patterns,
    urls: UrlScanner,
    validator: UrlValidator,
}

pub struct GrammarBuilder {
    profile: GrammarProfile,
    tlds: Option<TldTables>,
}

impl GrammarBuilder {
    pub fn new(profile: GrammarProfile) -> Self {
        Self {
            profile,
            tlds: None,
        }
    }

    /// Replace the profile's TLD tables.
    pub fn tlds(mut self, tlds: TldTables) -> Self {
        self.tlds = Some(tlds);
        self
    }

    /// Compiles every pattern. Panics if a pattern fails to compile; they
    /// are all built from static tables.
    pub fn build(self) -> Grammar {
        let started = Instant::now();
        let profile = self.profile;
        let tlds = self.tlds.unwrap_or_else(|| match profile {
            GrammarProfile::Current => TldTables::current(),
            GrammarProfile::Legacy => TldTables::legacy(),
        });
        let tld_count = tlds.len();
        let patterns = Patterns::new(profile);
        let accents: Class = patterns.accents();
        let urls = UrlScanner::new(DomainMatcher::new(tlds, accents), accents);
        let grammar = Grammar {
            profile,
            patterns,
            urls,
            validator: UrlValidator::new(),
        };
        info!(
            target: "grammar.build",
            profile = profile.as_str(),
            tlds = tld_count,
            elapsed_us = started.elapsed().as_micros() as u64,
            "grammar_built"
        );
        grammar
    }
}

static CURRENT: OnceLock<Arc<Grammar>> = OnceLock::new();
static LEGACY: OnceLock<Arc<Grammar>> = OnceLock::new();

impl Grammar {
    /// The process-wide current grammar, built on first use.
    pub fn shared() -> Arc<Grammar> {
        Self::shared_for(GrammarProfile::Current)
    }

    pub fn shared_for(profile: GrammarProfile) -> Arc<Grammar> {
        let cell = match profile {
            GrammarProfile::Current => &CURRENT,
            GrammarProfile::Legacy => &LEGACY,
        };
        Arc::clone(cell.get_or_init(|| Arc::new(GrammarBuilder::new(profile).build())))
    }

    pub fn profile(&self) -> GrammarProfile {
        self.profile
    }

    pub fn is_latin_accent(&self, c: char) -> bool {
        chars::in_ranges(c, self.patterns.accents())
    }

    pub fn mentions(&self, text: &str) -> Vec<MentionMatch> {
        self.patterns.mentions(text)
    }

    pub fn reply(&self, text: &str) -> Option<MentionMatch> {
        self.patterns.reply(text)
    }

    pub fn hashtags(&self, text: &str) -> Vec<TagMatch> {
        self.patterns.hashtags(text)
    }

    pub fn cashtags(&self, text: &str) -> Vec<TagMatch> {
        self.patterns.cashtags(text)
    }

    /// URL-shaped spans before any extraction policy is applied.
    pub fn url_candidates(&self, text: &str) -> Vec<UrlMatch> {
        self.urls.scan(text)
    }

    pub fn domains(&self) -> &DomainMatcher {
        self.urls.domains()
    }

    /// `subdomain* domain tld` spans inside a matched domain.
    pub fn ascii_domains(&self, domain: &str) -> Vec<(usize, usize)> {
        self.domains().ascii_domains(domain)
    }

    pub fn tco_prefix(&self, url: &str) -> Option<usize> {
        self.urls.tco_prefix(url)
    }

    pub fn validator(&self) -> &UrlValidator {
        &self.validator
    }

    pub fn is_valid_url(&self, url: &str, unicode_domains: bool, require_protocol: bool) -> bool {
        self.validator.is_valid_url(url, unicode_domains, require_protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_is_built_once() {
        let a = Grammar::shared();
        let b = Grammar::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.profile(), GrammarProfile::Current);
        let legacy = Grammar::shared_for(GrammarProfile::Legacy);
        assert!(!Arc::ptr_eq(&a, &legacy));
        assert_eq!(legacy.profile(), GrammarProfile::Legacy);
    }

    #[test]
    fn grammar_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
        assert_send_sync::<Arc<Grammar>>();
    }

    #[test]
    fn profiles_differ_in_accents() {
        let current = Grammar::shared();
        let legacy = Grammar::shared_for(GrammarProfile::Legacy);
        assert!(current.is_latin_accent('ř'));
        assert!(!legacy.is_latin_accent('ř'));
        assert!(legacy.is_latin_accent('ş'));
    }
}
