//! Standalone URL validation after RFC 3986 appendix B.
//!
//! Unlike the extraction grammar these patterns judge a whole string: a
//! component is valid only when the leftmost match of its pattern spans it
//! entirely.

use crate::patterns::compile;
use regex::Regex;

/// The five pieces of an unencoded URL. Missing pieces are empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub scheme: &'a str,
    pub authority: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

#[derive(Debug)]
pub struct UrlValidator {
    unencoded: Regex,
    scheme: Regex,
    http_scheme: Regex,
    path: Regex,
    query: Regex,
    fragment: Regex,
    authority: Regex,
    unicode_authority: Regex,
}

impl UrlValidator {
    pub fn new() -> Self {
        let unreserved = r"[a-z0-9\-._~]";
        let pct = r"%[0-9a-f]{2}";
        let sub_delims = r"[!$&'()*+,;=]";
        let pchar = format!(r"(?:{unreserved}|{pct}|{sub_delims}|[:|@])");
        let userinfo = format!(r"(?:{unreserved}|{pct}|{sub_delims}|:)*");

        let dec_octet = r"(?:[0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])";
        let ipv4 = format!(r"(?:{dec_octet}(?:\.{dec_octet}){{3}})");
        let ipv6 = r"(?:\[[a-f0-9:.]+\])";
        let ip = format!("(?:{ipv4}|{ipv6})");

        let domain = {
            let sub = r"(?:[a-z0-9](?:[a-z0-9_\-]*[a-z0-9])?)";
            let seg = r"(?:[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?)";
            let tld = r"(?:[a-z](?:[a-z0-9\-]*[a-z0-9])?)";
            format!(r"(?:(?:{sub}\.)*(?:{seg}\.){tld})")
        };
        let unicode_domain = {
            let c = r"(?:[a-z0-9]|[^\x00-\x7F])";
            let sub = format!(r"(?:{c}(?:(?:[a-z0-9_\-]|[^\x00-\x7F])*{c})?)");
            let seg = format!(r"(?:{c}(?:(?:[a-z0-9\-]|[^\x00-\x7F])*{c})?)");
            let tld = format!(r"(?:(?:[a-z]|[^\x00-\x7F])(?:(?:[a-z0-9\-]|[^\x00-\x7F])*{c})?)");
            format!(r"(?:(?:{sub}\.)*(?:{seg}\.){tld})")
        };
        let authority = |host: &str| {
            format!(r"(?i)(?:({userinfo})@)?((?:{ip}|{host}))(?::([0-9]{{1,5}}))?")
        };

        Self {
            unencoded: compile(
                "unencoded url",
                r"(?s)^(?:([^:/?#]+)://)?([^/?#]*)([^?#]*)(?:\?([^#]*))?(?:#(.*))?$",
            ),
            scheme: compile("url scheme", r"(?i)[a-z][a-z0-9+\-.]*"),
            http_scheme: compile("http scheme", r"(?i)^https?$"),
            path: compile("url path", &format!(r"(?i)(?:/{pchar}*)*")),
            query: compile("url query", &format!(r"(?i)(?:{pchar}|/|\?)*")),
            fragment: compile("url fragment", &format!(r"(?i)(?:{pchar}|/|\?)*")),
            authority: compile("url authority", &authority(&domain)),
            unicode_authority: compile("unicode url authority", &authority(&unicode_domain)),
        }
    }

    pub fn split<'a>(&self, url: &'a str) -> Option<UrlParts<'a>> {
        let caps = self.unencoded.captures(url)?;
        let part = |i| caps.get(i).map_or("", |m| m.as_str());
        Some(UrlParts {
            scheme: part(1),
            authority: part(2),
            path: part(3),
            query: part(4),
            fragment: part(5),
        })
    }

    pub fn is_valid_url(&self, url: &str, unicode_domains: bool, require_protocol: bool) -> bool {
        let Some(parts) = self.split(url) else {
            return false;
        };
        if require_protocol
            && !(spans_all(&self.scheme, parts.scheme) && self.http_scheme.is_match(parts.scheme))
        {
            return false;
        }
        if !spans_all(&self.path, parts.path)
            || !spans_all(&self.query, parts.query)
            || !spans_all(&self.fragment, parts.fragment)
        {
            return false;
        }
        let authority = if unicode_domains {
            &self.unicode_authority
        } else {
            &self.authority
        };
        spans_all(authority, parts.authority)
    }
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn spans_all(re: &Regex, s: &str) -> bool {
    re.find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_components() {
        let v = UrlValidator::new();
        let parts = v.split("https://user@example.com:8080/a/b?q=1#frag");
        assert_eq!(
            parts,
            Some(UrlParts {
                scheme: "https",
                authority: "user@example.com:8080",
                path: "/a/b",
                query: "q=1",
                fragment: "frag",
            })
        );
    }

    #[test]
    fn protocol_rules() {
        let v = UrlValidator::new();
        assert!(v.is_valid_url("http://example.com", true, true));
        assert!(v.is_valid_url("HTTPS://example.com/", true, true));
        assert!(!v.is_valid_url("ftp://example.com", true, true));
        assert!(!v.is_valid_url("example.com", true, true));
        assert!(v.is_valid_url("example.com", true, false));
    }

    #[test]
    fn authority_variants() {
        let v = UrlValidator::new();
        assert!(v.is_valid_url("http://127.0.0.1:80/", true, true));
        assert!(v.is_valid_url("http://[::1]/", true, true));
        assert!(v.is_valid_url("http://例え.テスト", true, true));
        assert!(!v.is_valid_url("http://例え.テスト", false, true));
        assert!(!v.is_valid_url("http://-bad.com", true, true));
        assert!(!v.is_valid_url("http://", true, true));
    }

    #[test]
    fn rejects_bad_path_chars() {
        let v = UrlValidator::new();
        assert!(!v.is_valid_url("http://example.com/sp ace", true, true));
        assert!(v.is_valid_url("http://example.com/%20", true, true));
        assert!(!v.is_valid_url("http://example.com/%zz", true, true));
    }
}
