//! Entities in the shape of the tweet API's `entities` object.

use core_extract::{Entity, EntityKind};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagEntity {
    pub text: String,
    pub indices: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionEntity {
    pub screen_name: String,
    pub indices: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UrlEntity {
    pub url: String,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub expanded_url: Option<String>,
    pub indices: [usize; 2],
}

/// `{"hashtags": [...], "symbols": [...], "user_mentions": [...], "urls": [...], "media": [...]}`.
/// Every key is optional; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TweetEntities {
    pub hashtags: Vec<TagEntity>,
    pub symbols: Vec<TagEntity>,
    pub user_mentions: Vec<MentionEntity>,
    pub urls: Vec<UrlEntity>,
    pub media: Vec<UrlEntity>,
}

impl TweetEntities {
    /// All entities as extractor records, in no particular order.
    pub fn into_entities(self) -> Vec<Entity> {
        let mut out = Vec::with_capacity(
            self.hashtags.len()
                + self.symbols.len()
                + self.user_mentions.len()
                + self.urls.len()
                + self.media.len(),
        );
        out.extend(
            self.hashtags
                .into_iter()
                .map(|t| Entity::hashtag(t.text, t.indices[0], t.indices[1])),
        );
        out.extend(
            self.symbols
                .into_iter()
                .map(|t| Entity::cashtag(t.text, t.indices[0], t.indices[1])),
        );
        out.extend(
            self.user_mentions
                .into_iter()
                .map(|m| Entity::mention(m.screen_name, m.indices[0], m.indices[1])),
        );
        out.extend(self.urls.into_iter().chain(self.media).map(|u| {
            Entity::new(
                EntityKind::Url {
                    url: u.url,
                    display_url: u.display_url,
                    expanded_url: u.expanded_url,
                },
                u.indices[0],
                u.indices[1],
            )
        }));
        out
    }
}
