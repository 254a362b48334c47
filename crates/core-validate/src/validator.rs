use core_config::Configuration;
use core_extract::{EntityKind, Extractor};
use core_text::utf16_len;

use crate::parser::Parser;
use crate::results::ParseResults;

/// Yes/no checks for tweets, screen names, lists, hashtags and URLs.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    parser: Parser,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Configuration) -> Self {
        Self::from_parser(Parser::new(config))
    }

    pub fn from_parser(parser: Parser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    fn extractor(&self) -> &Extractor {
        self.parser.extractor()
    }

    pub fn parse_tweet(&self, text: &str) -> ParseResults {
        self.parser.parse_tweet(text)
    }

    pub fn is_valid_tweet_text(&self, text: &str) -> bool {
        self.parser.parse_tweet(text).valid
    }

    pub fn tweet_length(&self, text: &str) -> usize {
        self.parser.parse_tweet(text).weighted_length
    }

    /// `@name` and nothing else.
    pub fn is_valid_username(&self, username: &str) -> bool {
        let Some(name) = strip_marker(username) else {
            return false;
        };
        let found = self.extractor().extract_mentioned_screennames(username);
        found.len() == 1 && found[0] == name
    }

    /// `@name/slug` covering the whole input.
    pub fn is_valid_list(&self, list: &str) -> bool {
        let found = self.extractor().extract_mentions_or_lists_with_indices(list);
        match found.first() {
            Some(entity) => {
                matches!(entity.kind, EntityKind::ListMention { .. })
                    && entity.indices == [0, utf16_len(list)]
            }
            None => false,
        }
    }

    /// `#tag` and nothing else.
    pub fn is_valid_hashtag(&self, hashtag: &str) -> bool {
        let Some(tag) = strip_marker(hashtag) else {
            return false;
        };
        let found = self.extractor().extract_hashtags(hashtag);
        found.len() == 1 && found[0] == tag
    }

    /// RFC 3986 check. `unicode_domains` allows IDN hosts;
    /// `require_protocol` rejects URLs without a scheme.
    pub fn is_valid_url(&self, url: &str, unicode_domains: bool, require_protocol: bool) -> bool {
        self.extractor()
            .grammar()
            .is_valid_url(url, unicode_domains, require_protocol)
    }
}

/// Input minus its leading marker character, if there is anything after it.
fn strip_marker(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    chars.next()?;
    Some(chars.as_str()).filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        let v = Validator::new();
        assert!(v.is_valid_username("@username"));
        assert!(v.is_valid_username("＠username"));
        assert!(!v.is_valid_username("username"));
        assert!(!v.is_valid_username("@"));
        assert!(!v.is_valid_username(""));
        assert!(!v.is_valid_username("@user name"));
        assert!(!v.is_valid_username("@username/list"));
    }

    #[test]
    fn lists() {
        let v = Validator::new();
        assert!(v.is_valid_list("@username/list-name"));
        assert!(!v.is_valid_list("@username"));
        assert!(!v.is_valid_list(" @username/list"));
        assert!(!v.is_valid_list("@username /list"));
        assert!(!v.is_valid_list("@username/list garbage"));
    }

    #[test]
    fn hashtags() {
        let v = Validator::new();
        assert!(v.is_valid_hashtag("#rust"));
        assert!(v.is_valid_hashtag("#日本語"));
        assert!(!v.is_valid_hashtag("#123"));
        assert!(!v.is_valid_hashtag("rust"));
        assert!(!v.is_valid_hashtag("#rust lang"));
    }

    #[test]
    fn urls() {
        let v = Validator::new();
        assert!(v.is_valid_url("http://example.com", true, true));
        assert!(!v.is_valid_url("example.com", true, true));
        assert!(v.is_valid_url("example.com", true, false));
        assert!(v.is_valid_url("http://例え.テスト", true, true));
        assert!(!v.is_valid_url("http://例え.テスト", false, true));
    }
}
