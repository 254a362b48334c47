//! Extracted entity records.

use serde::{Deserialize, Serialize};

/// What an entity is, with its category-specific fields.
///
/// Serialized untagged so a record reads `{"hashtag": "rust", "indices": [0, 5]}`.
/// `ListMention` precedes `Mention` so a record with a `list_slug` reads
/// back as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKind {
    ListMention {
        screen_name: String,
        /// Includes the leading `/`.
        list_slug: String,
    },
    Mention {
        screen_name: String,
    },
    Hashtag {
        hashtag: String,
    },
    Cashtag {
        cashtag: String,
    },
    Url {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expanded_url: Option<String>,
    },
    Emoji {
        emoji: String,
    },
    /// Reads back as `Mention`; the two share a shape.
    Reply {
        screen_name: String,
    },
}

/// Coarse entity category; list mentions fold into `Mention`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Mention,
    Hashtag,
    Url,
    Cashtag,
    Emoji,
    Reply,
}

/// An entity and its half-open UTF-16 code unit span in the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(flatten)]
    pub kind: EntityKind,
    pub indices: [usize; 2],
}

impl Entity {
    pub fn new(kind: EntityKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            indices: [start, end],
        }
    }

    pub fn mention(screen_name: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(
            EntityKind::Mention {
                screen_name: screen_name.into(),
            },
            start,
            end,
        )
    }

    pub fn hashtag(hashtag: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(
            EntityKind::Hashtag {
                hashtag: hashtag.into(),
            },
            start,
            end,
        )
    }

    pub fn cashtag(cashtag: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(
            EntityKind::Cashtag {
                cashtag: cashtag.into(),
            },
            start,
            end,
        )
    }

    pub fn url(url: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(
            EntityKind::Url {
                url: url.into(),
                display_url: None,
                expanded_url: None,
            },
            start,
            end,
        )
    }

    pub fn emoji(emoji: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(
            EntityKind::Emoji {
                emoji: emoji.into(),
            },
            start,
            end,
        )
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.indices[0]
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.indices[1]
    }

    pub fn category(&self) -> Category {
        match self.kind {
            EntityKind::Mention { .. } | EntityKind::ListMention { .. } => Category::Mention,
            EntityKind::Hashtag { .. } => Category::Hashtag,
            EntityKind::Cashtag { .. } => Category::Cashtag,
            EntityKind::Url { .. } => Category::Url,
            EntityKind::Emoji { .. } => Category::Emoji,
            EntityKind::Reply { .. } => Category::Reply,
        }
    }

    /// The entity's main text: screen name, tag without marker, URL or emoji.
    pub fn value(&self) -> &str {
        match &self.kind {
            EntityKind::Mention { screen_name }
            | EntityKind::ListMention { screen_name, .. }
            | EntityKind::Reply { screen_name } => screen_name,
            EntityKind::Hashtag { hashtag } => hashtag,
            EntityKind::Cashtag { cashtag } => cashtag,
            EntityKind::Url { url, .. } => url,
            EntityKind::Emoji { emoji } => emoji,
        }
    }

    pub fn list_slug(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::ListMention { list_slug, .. } => Some(list_slug),
            _ => None,
        }
    }
}

/// Sorts by start and drops every entity that begins before the previous
/// kept entity ends. The sort is stable, so ties keep input order.
pub fn remove_overlapping_entities(entities: &mut Vec<Entity>) {
    entities.sort_by_key(Entity::start);
    let mut last_end: Option<usize> = None;
    entities.retain(|e| {
        if last_end.is_some_and(|end| e.start() < end) {
            return false;
        }
        last_end = Some(e.end());
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_flat_records() {
        let e = Entity::hashtag("rust", 0, 5);
        assert_eq!(
            serde_json::to_value(&e).unwrap(),
            json!({"hashtag": "rust", "indices": [0, 5]})
        );
        let list = Entity::new(
            EntityKind::ListMention {
                screen_name: "team".into(),
                list_slug: "/core".into(),
            },
            3,
            14,
        );
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"screen_name": "team", "list_slug": "/core", "indices": [3, 14]})
        );
        assert_eq!(
            serde_json::to_value(Entity::url("http://a.co", 0, 11)).unwrap(),
            json!({"url": "http://a.co", "indices": [0, 11]})
        );
    }

    #[test]
    fn reads_back_lists_before_mentions() {
        let list: Entity = serde_json::from_value(
            json!({"screen_name": "team", "list_slug": "/core", "indices": [0, 10]}),
        )
        .unwrap();
        assert_eq!(list.list_slug(), Some("/core"));
        let mention: Entity =
            serde_json::from_value(json!({"screen_name": "bob", "indices": [0, 4]})).unwrap();
        assert_eq!(mention.category(), Category::Mention);
        assert_eq!(mention.value(), "bob");
    }

    #[test]
    fn overlap_removal_keeps_earliest() {
        let mut all = vec![
            Entity::url("http://example.com/#tag", 10, 33),
            Entity::mention("a", 0, 2),
            Entity::hashtag("tag", 29, 33),
            Entity::cashtag("X", 34, 36),
        ];
        remove_overlapping_entities(&mut all);
        let kept: Vec<&str> = all.iter().map(Entity::value).collect();
        assert_eq!(kept, ["a", "http://example.com/#tag", "X"]);
    }
}
