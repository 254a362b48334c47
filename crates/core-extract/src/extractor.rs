use std::sync::Arc;

use core_grammar::{Grammar, UrlMatch};
use core_text::{TextError, Utf16Cursor, segment};
use serde::Serialize;
use tracing::debug;

use crate::entity::{Entity, EntityKind, remove_overlapping_entities};

/// Longest URL, in characters, that still counts as a link.
pub const MAX_URL_LENGTH: usize = 4096;
/// Longest DNS label after IDNA conversion.
pub const MAX_ASCII_LABEL_LENGTH: usize = 63;
/// Length of `https://`, charged to URLs written without a protocol.
const PROTOCOL_LENGTH: usize = 8;

/// Everything [`Extractor::extract`] finds in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extracted {
    pub hashtags: Vec<String>,
    pub cashtags: Vec<String>,
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    pub replyto: Option<String>,
    pub hashtags_with_indices: Vec<Entity>,
    pub urls_with_indices: Vec<Entity>,
    pub mentions_with_indices: Vec<Entity>,
}

/// Entity extraction over a shared [`Grammar`].
#[derive(Debug, Clone)]
pub struct Extractor {
    grammar: Arc<Grammar>,
    extract_url_without_protocol: bool,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_grammar(Grammar::shared())
    }

    pub fn with_grammar(grammar: Arc<Grammar>) -> Self {
        Self {
            grammar,
            extract_url_without_protocol: true,
        }
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Whether `example.com` style URLs (no `http://`) are extracted.
    pub fn extract_url_without_protocol(mut self, enabled: bool) -> Self {
        self.extract_url_without_protocol = enabled;
        self
    }

    pub fn set_extract_url_without_protocol(&mut self, enabled: bool) {
        self.extract_url_without_protocol = enabled;
    }

    pub fn extracts_url_without_protocol(&self) -> bool {
        self.extract_url_without_protocol
    }

    pub fn extract(&self, text: &str) -> Extracted {
        let hashtags_with_indices = self.extract_hashtags_with_indices(text);
        let urls_with_indices = self.extract_urls_with_indices(text);
        let mentions_with_indices = self.extract_mentioned_screennames_with_indices(text);
        Extracted {
            hashtags: values(&hashtags_with_indices),
            cashtags: self.extract_cashtags(text),
            urls: values(&urls_with_indices),
            mentions: values(&mentions_with_indices),
            replyto: self.extract_reply_screenname(text),
            hashtags_with_indices,
            urls_with_indices,
            mentions_with_indices,
        }
    }

    /// Mentions, lists, hashtags, URLs and cashtags merged in text order.
    /// Overlapping entities are dropped, the earlier start winning.
    pub fn extract_entities_with_indices(&self, text: &str) -> Vec<Entity> {
        let mut entities = self.extract_mentions_or_lists_with_indices(text);
        entities.extend(self.hashtags_with_indices(text, false));
        entities.extend(self.extract_urls_with_indices(text));
        entities.extend(self.extract_cashtags_with_indices(text));
        remove_overlapping_entities(&mut entities);
        debug!(
            target: "extract",
            bytes = text.len(),
            entities = entities.len(),
            "entities_extracted"
        );
        entities
    }

    /// [`extract_entities_with_indices`](Self::extract_entities_with_indices)
    /// for raw bytes, which must be UTF-8.
    pub fn extract_entities_from_bytes(&self, bytes: &[u8]) -> Result<Vec<Entity>, TextError> {
        let text = core_text::decode(bytes)?;
        Ok(self.extract_entities_with_indices(text))
    }

    pub fn extract_mentioned_screennames(&self, text: &str) -> Vec<String> {
        values(&self.extract_mentioned_screennames_with_indices(text))
    }

    /// Mentions with list mentions folded in. A list contributes its screen
    /// name; its indices still cover the slug.
    pub fn extract_mentioned_screennames_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract_mentions_or_lists_with_indices(text)
            .into_iter()
            .map(|e| match e.kind {
                EntityKind::ListMention { screen_name, .. } => Entity::new(
                    EntityKind::Mention { screen_name },
                    e.indices[0],
                    e.indices[1],
                ),
                _ => e,
            })
            .collect()
    }

    pub fn extract_mentions_or_lists_with_indices(&self, text: &str) -> Vec<Entity> {
        if !text.contains(['@', '＠']) {
            return Vec::new();
        }
        let mut cursor = Utf16Cursor::new(text);
        self.grammar
            .mentions(text)
            .into_iter()
            .map(|m| {
                let (start, end) = cursor.span(m.start, m.end);
                let screen_name = text[m.screen_name].to_string();
                let kind = match m.list_slug {
                    Some(slug) => EntityKind::ListMention {
                        screen_name,
                        list_slug: text[slug].to_string(),
                    },
                    None => EntityKind::Mention { screen_name },
                };
                Entity::new(kind, start, end)
            })
            .collect()
    }

    pub fn extract_reply_screenname(&self, text: &str) -> Option<String> {
        self.extract_reply_with_indices(text)
            .map(|e| e.value().to_string())
    }

    pub fn extract_reply_with_indices(&self, text: &str) -> Option<Entity> {
        let m = self.grammar.reply(text)?;
        let mut cursor = Utf16Cursor::new(text);
        let (start, end) = cursor.span(m.start, m.end);
        Some(Entity::new(
            EntityKind::Reply {
                screen_name: text[m.screen_name].to_string(),
            },
            start,
            end,
        ))
    }

    pub fn extract_hashtags(&self, text: &str) -> Vec<String> {
        values(&self.extract_hashtags_with_indices(text))
    }

    /// Hashtags that do not overlap a URL.
    pub fn extract_hashtags_with_indices(&self, text: &str) -> Vec<Entity> {
        self.hashtags_with_indices(text, true)
    }

    /// Hashtags without URL-overlap filtering.
    pub fn extract_hashtags_with_indices_unchecked(&self, text: &str) -> Vec<Entity> {
        self.hashtags_with_indices(text, false)
    }

    fn hashtags_with_indices(&self, text: &str, check_url_overlap: bool) -> Vec<Entity> {
        if !text.contains(['#', '＃']) {
            return Vec::new();
        }
        let mut cursor = Utf16Cursor::new(text);
        let tags: Vec<Entity> = self
            .grammar
            .hashtags(text)
            .into_iter()
            .map(|t| {
                let (start, end) = cursor.span(t.start, t.end);
                Entity::hashtag(&text[t.body], start, end)
            })
            .collect();
        if !check_url_overlap || tags.is_empty() {
            return tags;
        }
        let urls = self.extract_urls_with_indices(text);
        if urls.is_empty() {
            return tags;
        }
        let mut merged = tags;
        merged.extend(urls);
        remove_overlapping_entities(&mut merged);
        merged.retain(|e| matches!(e.kind, EntityKind::Hashtag { .. }));
        merged
    }

    pub fn extract_cashtags(&self, text: &str) -> Vec<String> {
        values(&self.extract_cashtags_with_indices(text))
    }

    pub fn extract_cashtags_with_indices(&self, text: &str) -> Vec<Entity> {
        if !text.contains('$') {
            return Vec::new();
        }
        let mut cursor = Utf16Cursor::new(text);
        self.grammar
            .cashtags(text)
            .into_iter()
            .map(|t| {
                let (start, end) = cursor.span(t.start, t.end);
                Entity::cashtag(&text[t.body], start, end)
            })
            .collect()
    }

    pub fn extract_urls(&self, text: &str) -> Vec<String> {
        values(&self.extract_urls_with_indices(text))
    }

    pub fn extract_urls_with_indices(&self, text: &str) -> Vec<Entity> {
        if !text.contains('.') {
            return Vec::new();
        }
        let mut cursor = Utf16Cursor::new(text);
        let mut urls = Vec::new();
        for candidate in self.grammar.url_candidates(text) {
            if candidate.has_protocol {
                if let Some((start, end)) = self.protocol_url(text, &candidate) {
                    let (u_start, u_end) = cursor.span(start, end);
                    urls.push(Entity::url(&text[start..end], u_start, u_end));
                }
            } else {
                for (start, end) in self.protocol_less_urls(text, &candidate) {
                    let (u_start, u_end) = cursor.span(start, end);
                    urls.push(Entity::url(&text[start..end], u_start, u_end));
                }
            }
        }
        debug!(target: "extract", bytes = text.len(), urls = urls.len(), "urls_extracted");
        urls
    }

    /// Byte span of a URL written with `http://` or `https://`.
    fn protocol_url(&self, text: &str, candidate: &UrlMatch) -> Option<(usize, usize)> {
        let url = &text[candidate.start..candidate.end];
        let end = match self.grammar.tco_prefix(url) {
            Some(len) => candidate.start + len,
            None => candidate.end,
        };
        is_valid_host_and_length(
            text[candidate.start..end].chars().count(),
            true,
            &text[candidate.domain.clone()],
        )
        .then_some((candidate.start, end))
    }

    /// Byte spans of the ASCII domains inside a protocol-less candidate. The
    /// last one absorbs the candidate's path, if any.
    fn protocol_less_urls(&self, text: &str, candidate: &UrlMatch) -> Vec<(usize, usize)> {
        if !self.extract_url_without_protocol
            || candidate
                .preceding
                .is_some_and(|c| matches!(c, '-' | '_' | '.' | '/'))
        {
            return Vec::new();
        }
        let domain = &text[candidate.domain.clone()];
        let url_chars = text[candidate.start..candidate.end].chars().count();
        let domains = self.grammar.domains();
        let mut spans = Vec::new();
        let mut last_pushed = false;
        let mut found_any = false;
        for (s, e) in self.grammar.ascii_domains(domain) {
            let ascii = &domain[s..e];
            if !is_valid_host_and_length(url_chars, false, ascii) {
                continue;
            }
            found_any = true;
            last_pushed = candidate.has_path
                || domains.is_special_short_domain(ascii)
                || !domains.is_invalid_short_domain(ascii);
            if last_pushed {
                let start = candidate.domain.start + s;
                spans.push((start, start + ascii.len()));
            }
        }
        if found_any && last_pushed && candidate.has_path {
            if let Some(last) = spans.last_mut() {
                last.1 = candidate.end;
            }
        }
        spans
    }

    pub fn extract_emoji(&self, text: &str) -> Vec<String> {
        values(&self.extract_emoji_with_indices(text))
    }

    /// One entity per emoji grapheme cluster, modifiers and joiners included.
    pub fn extract_emoji_with_indices(&self, text: &str) -> Vec<Entity> {
        segment::segment(text)
            .into_iter()
            .filter(|seg| seg.is_emoji())
            .map(|seg| Entity::emoji(seg.cluster, seg.utf16_start, seg.utf16_end))
            .collect()
    }
}

fn values(entities: &[Entity]) -> Vec<String> {
    entities.iter().map(|e| e.value().to_string()).collect()
}

/// Host must survive IDNA conversion with every label within DNS limits, and
/// the URL (counted as if it had a protocol) must fit [`MAX_URL_LENGTH`].
pub fn is_valid_host_and_length(url_chars: usize, has_protocol: bool, host: &str) -> bool {
    let ascii = match url::Host::parse(host) {
        Ok(url::Host::Domain(domain)) => domain,
        Ok(other) => other.to_string(),
        Err(_) => return false,
    };
    if ascii
        .split('.')
        .any(|label| label.len() > MAX_ASCII_LABEL_LENGTH)
    {
        return false;
    }
    let idn_growth = ascii.len().saturating_sub(host.chars().count());
    let protocol = if has_protocol { 0 } else { PROTOCOL_LENGTH };
    url_chars + idn_growth + protocol <= MAX_URL_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_check_limits_labels_and_length() {
        assert!(is_valid_host_and_length(18, true, "example.com"));
        assert!(is_valid_host_and_length(20, true, "twitter.みんな"));
        assert!(!is_valid_host_and_length(4090, false, "example.com"));
        assert!(is_valid_host_and_length(4088, false, "example.com"));
        let long = format!("{}.com", "a".repeat(64));
        assert!(!is_valid_host_and_length(70, true, &long));
    }

    #[test]
    fn protocol_less_path_extends_last_domain() {
        let ex = Extractor::new();
        let text = "go to www.example.com/path?x=1 now";
        assert_eq!(ex.extract_urls(text), ["www.example.com/path?x=1"]);
        assert_eq!(ex.extract_urls("example.jp"), Vec::<String>::new());
        assert_eq!(ex.extract_urls("example.jp/path"), ["example.jp/path"]);
    }

    #[test]
    fn protocol_less_skipped_after_punctuation() {
        let ex = Extractor::new();
        assert!(ex.extract_urls("a -example.com").is_empty());
        assert_eq!(ex.extract_urls("foo-example.com"), ["foo-example.com"]);
        assert!(ex.extract_urls("/example.com").is_empty());
        assert_eq!(ex.extract_urls("(example.com)"), ["example.com"]);
    }

    #[test]
    fn tco_truncated() {
        let ex = Extractor::new();
        assert_eq!(
            ex.extract_urls("http://t.co/abc123/extra"),
            ["http://t.co/abc123"]
        );
    }

    #[test]
    fn url_hashtag_overlap() {
        let ex = Extractor::new();
        let text = "http://example.com/#anchor #real";
        assert_eq!(ex.extract_hashtags(text), ["real"]);
        assert_eq!(ex.extract_hashtags_with_indices_unchecked(text).len(), 2);
    }
}
