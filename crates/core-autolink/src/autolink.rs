use std::borrow::Cow;

use core_extract::{Entity, EntityKind, Extractor, remove_overlapping_entities};
use core_text::{byte_offset, chars::is_rtl_char};
use tracing::debug;

use crate::AutolinkError;
use crate::escape::escape_html;
use crate::json::TweetEntities;

pub const DEFAULT_USERNAME_CLASS: &str = "tweet-url username";
pub const DEFAULT_LIST_CLASS: &str = "tweet-url list-slug";
pub const DEFAULT_HASHTAG_CLASS: &str = "tweet-url hashtag";
pub const DEFAULT_CASHTAG_CLASS: &str = "tweet-url cashtag";
pub const DEFAULT_USERNAME_URL_BASE: &str = "https://twitter.com/";
pub const DEFAULT_LIST_URL_BASE: &str = "https://twitter.com/";
pub const DEFAULT_HASHTAG_URL_BASE: &str = "https://twitter.com/search?q=%23";
pub const DEFAULT_CASHTAG_URL_BASE: &str = "https://twitter.com/search?q=%24";

type Attributes = Vec<(&'static str, String)>;

/// Turns extracted entities into HTML anchors.
///
/// Options are set builder-style:
///
/// ```
/// use core_autolink::Autolink;
///
/// let html = Autolink::new()
///     .no_follow(false)
///     .external(false)
///     .target("")
///     .auto_link_hashtags("#rust");
/// assert_eq!(
///     html,
///     r##"<a href="https://twitter.com/search?q=%23rust" title="#rust" class="tweet-url hashtag">#rust</a>"##
/// );
/// ```
///
/// Text outside entities is copied through untouched; entity text and
/// attribute values are escaped once.
#[derive(Debug, Clone)]
pub struct Autolink {
    url_class: String,
    username_class: String,
    list_class: String,
    hashtag_class: String,
    cashtag_class: String,
    username_url_base: String,
    list_url_base: String,
    hashtag_url_base: String,
    cashtag_url_base: String,
    no_follow: bool,
    external: bool,
    target: String,
    username_include_symbol: bool,
    symbol_tag: String,
    text_with_symbol_tag: String,
    extractor: Extractor,
}

impl Default for Autolink {
    fn default() -> Self {
        Self::new()
    }
}

impl Autolink {
    /// Default options. URLs are only linked when written with a protocol.
    pub fn new() -> Self {
        Self {
            url_class: String::new(),
            username_class: DEFAULT_USERNAME_CLASS.into(),
            list_class: DEFAULT_LIST_CLASS.into(),
            hashtag_class: DEFAULT_HASHTAG_CLASS.into(),
            cashtag_class: DEFAULT_CASHTAG_CLASS.into(),
            username_url_base: DEFAULT_USERNAME_URL_BASE.into(),
            list_url_base: DEFAULT_LIST_URL_BASE.into(),
            hashtag_url_base: DEFAULT_HASHTAG_URL_BASE.into(),
            cashtag_url_base: DEFAULT_CASHTAG_URL_BASE.into(),
            no_follow: true,
            external: true,
            target: "_blank".into(),
            username_include_symbol: false,
            symbol_tag: String::new(),
            text_with_symbol_tag: String::new(),
            extractor: Extractor::new().extract_url_without_protocol(false),
        }
    }

    pub fn url_class(mut self, class: impl Into<String>) -> Self {
        self.url_class = class.into();
        self
    }

    pub fn username_class(mut self, class: impl Into<String>) -> Self {
        self.username_class = class.into();
        self
    }

    pub fn list_class(mut self, class: impl Into<String>) -> Self {
        self.list_class = class.into();
        self
    }

    pub fn hashtag_class(mut self, class: impl Into<String>) -> Self {
        self.hashtag_class = class.into();
        self
    }

    pub fn cashtag_class(mut self, class: impl Into<String>) -> Self {
        self.cashtag_class = class.into();
        self
    }

    pub fn username_url_base(mut self, base: impl Into<String>) -> Self {
        self.username_url_base = base.into();
        self
    }

    pub fn list_url_base(mut self, base: impl Into<String>) -> Self {
        self.list_url_base = base.into();
        self
    }

    pub fn hashtag_url_base(mut self, base: impl Into<String>) -> Self {
        self.hashtag_url_base = base.into();
        self
    }

    pub fn cashtag_url_base(mut self, base: impl Into<String>) -> Self {
        self.cashtag_url_base = base.into();
        self
    }

    /// Adds `nofollow` to `rel`.
    pub fn no_follow(mut self, enabled: bool) -> Self {
        self.no_follow = enabled;
        self
    }

    /// Adds `external` to `rel`.
    pub fn external(mut self, enabled: bool) -> Self {
        self.external = enabled;
        self
    }

    /// Link target. Empty leaves the attribute out.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Put the `@` inside the username anchor instead of before it.
    pub fn username_include_symbol(mut self, enabled: bool) -> Self {
        self.username_include_symbol = enabled;
        self
    }

    /// Wrap the `@`, `#` or `$` in this tag. Empty disables.
    pub fn symbol_tag(mut self, tag: impl Into<String>) -> Self {
        self.symbol_tag = tag.into();
        self
    }

    /// Wrap the text after the symbol in this tag. Empty disables.
    pub fn text_with_symbol_tag(mut self, tag: impl Into<String>) -> Self {
        self.text_with_symbol_tag = tag.into();
        self
    }

    /// Extractor used by the `auto_link*` operations that scan text.
    pub fn extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Link every mention, list, hashtag, cashtag and URL.
    pub fn auto_link(&self, text: &str) -> String {
        let entities = self.extractor.extract_entities_with_indices(text);
        self.auto_link_entities(text, &entities)
    }

    pub fn auto_link_usernames_and_lists(&self, text: &str) -> String {
        let entities = self.extractor.extract_mentions_or_lists_with_indices(text);
        self.auto_link_entities(text, &entities)
    }

    pub fn auto_link_hashtags(&self, text: &str) -> String {
        let entities = self.extractor.extract_hashtags_with_indices(text);
        self.auto_link_entities(text, &entities)
    }

    pub fn auto_link_cashtags(&self, text: &str) -> String {
        let entities = self.extractor.extract_cashtags_with_indices(text);
        self.auto_link_entities(text, &entities)
    }

    pub fn auto_link_urls(&self, text: &str) -> String {
        let entities = self.extractor.extract_urls_with_indices(text);
        self.auto_link_entities(text, &entities)
    }

    /// Link entities from a tweet API `entities` JSON document.
    pub fn auto_link_with_json(&self, text: &str, json: &str) -> Result<String, AutolinkError> {
        let entities: TweetEntities = serde_json::from_str(json)?;
        Ok(self.auto_link_with_entities(text, entities))
    }

    /// [`Autolink::auto_link_with_json`] for an already parsed document.
    pub fn auto_link_with_json_value(
        &self,
        text: &str,
        json: serde_json::Value,
    ) -> Result<String, AutolinkError> {
        let entities: TweetEntities = serde_json::from_value(json)?;
        Ok(self.auto_link_with_entities(text, entities))
    }

    pub fn auto_link_with_entities(&self, text: &str, entities: TweetEntities) -> String {
        let mut entities = entities.into_entities();
        remove_overlapping_entities(&mut entities);
        self.auto_link_entities(text, &entities)
    }

    /// Splice anchors for `entities` into `text`, last entity first.
    ///
    /// Entities whose indices do not land on characters of `text`, or that
    /// overlap an entity already linked, are skipped. Emoji and reply
    /// entities are left as text.
    pub fn auto_link_entities(&self, text: &str, entities: &[Entity]) -> String {
        let mut ordered: Vec<&Entity> = entities.iter().collect();
        ordered.sort_by_key(|e| e.start());

        let mut out = text.to_string();
        let mut limit = text.len();
        let mut linked = 0usize;
        for entity in ordered.into_iter().rev() {
            let (Some(start), Some(end)) = (
                byte_offset(text, entity.start()),
                byte_offset(text, entity.end()),
            ) else {
                debug!(
                    target: "autolink",
                    start = entity.start(),
                    end = entity.end(),
                    "entity_out_of_range"
                );
                continue;
            };
            if start >= end || end > limit {
                continue;
            }
            if let Some(html) = self.link_entity(entity, &text[start..end]) {
                out.replace_range(start..end, &html);
                limit = start;
                linked += 1;
            }
        }
        debug!(target: "autolink", entities = entities.len(), linked, "entities_linked");
        out
    }

    fn link_entity(&self, entity: &Entity, matched: &str) -> Option<String> {
        let symbol = matched
            .chars()
            .next()
            .map_or("", |c| &matched[..c.len_utf8()]);
        let html = match &entity.kind {
            EntityKind::Mention { screen_name } => {
                let mut attrs = Attributes::new();
                push_class(&mut attrs, self.username_class.clone());
                attrs.push(("href", format!("{}{screen_name}", self.username_url_base)));
                self.link_with_symbol(symbol, &escape_html(screen_name), attrs)
            }
            EntityKind::ListMention {
                screen_name,
                list_slug,
            } => {
                let list = format!("{screen_name}{list_slug}");
                let mut attrs = Attributes::new();
                push_class(&mut attrs, self.list_class.clone());
                attrs.push(("href", format!("{}{list}", self.list_url_base)));
                self.link_with_symbol(symbol, &escape_html(&list), attrs)
            }
            EntityKind::Hashtag { hashtag } => {
                let mut class = self.hashtag_class.clone();
                if hashtag.chars().any(is_rtl_char) {
                    if !class.is_empty() {
                        class.push(' ');
                    }
                    class.push_str("rtl");
                }
                let mut attrs: Attributes = vec![
                    ("href", format!("{}{hashtag}", self.hashtag_url_base)),
                    ("title", format!("#{hashtag}")),
                ];
                push_class(&mut attrs, class);
                self.link_with_symbol(symbol, &escape_html(hashtag), attrs)
            }
            EntityKind::Cashtag { cashtag } => {
                let mut attrs: Attributes = vec![
                    ("href", format!("{}{cashtag}", self.cashtag_url_base)),
                    ("title", format!("${cashtag}")),
                ];
                push_class(&mut attrs, self.cashtag_class.clone());
                self.link_with_symbol(symbol, &escape_html(cashtag), attrs)
            }
            EntityKind::Url {
                url,
                display_url,
                expanded_url,
            } => {
                let href = if has_http_scheme(url) {
                    url.clone()
                } else {
                    format!("http://{url}")
                };
                let mut attrs: Attributes = vec![("href", href)];
                push_class(&mut attrs, self.url_class.clone());
                let shown = match (display_url, expanded_url) {
                    (Some(display), Some(expanded)) => {
                        attrs.push(("title", expanded.clone()));
                        display
                    }
                    _ => url,
                };
                self.link_to_text(&escape_html(shown), attrs)
            }
            EntityKind::Emoji { .. } | EntityKind::Reply { .. } => return None,
        };
        Some(html)
    }

    /// `symbol` goes inside the anchor except for `@` without
    /// `username_include_symbol`.
    fn link_with_symbol(&self, symbol: &str, text: &str, attrs: Attributes) -> String {
        let include = self.username_include_symbol || !matches!(symbol, "@" | "＠");
        let symbol = wrap(&self.symbol_tag, symbol);
        let text = wrap(&self.text_with_symbol_tag, text);
        if include {
            self.link_to_text(&format!("{symbol}{text}"), attrs)
        } else {
            format!("{symbol}{}", self.link_to_text(&text, attrs))
        }
    }

    fn link_to_text(&self, text: &str, mut attrs: Attributes) -> String {
        let rel: Vec<&str> = [(self.external, "external"), (self.no_follow, "nofollow")]
            .into_iter()
            .filter_map(|(on, value)| on.then_some(value))
            .collect();
        if !rel.is_empty() {
            attrs.push(("rel", rel.join(" ")));
        }
        if !self.target.is_empty() {
            attrs.push(("target", self.target.clone()));
        }
        let mut link = String::from("<a");
        for (key, value) in &attrs {
            link.push(' ');
            link.push_str(key);
            link.push_str("=\"");
            link.push_str(&escape_html(value));
            link.push('"');
        }
        link.push('>');
        link.push_str(text);
        link.push_str("</a>");
        link
    }
}

fn push_class(attrs: &mut Attributes, class: String) {
    if !class.is_empty() {
        attrs.push(("class", class));
    }
}

fn wrap<'a>(tag: &str, inner: &'a str) -> Cow<'a, str> {
    if tag.is_empty() {
        Cow::Borrowed(inner)
    } else {
        Cow::Owned(format!("<{tag}>{inner}</{tag}>"))
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
