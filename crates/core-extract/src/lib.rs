//! Entity extraction: mentions, lists, replies, hashtags, cashtags, URLs and
//! emoji, with half-open UTF-16 indices into the original text.

pub mod entity;
mod extractor;

pub use entity::{Category, Entity, EntityKind, remove_overlapping_entities};
pub use extractor::{
    Extracted, Extractor, MAX_ASCII_LABEL_LENGTH, MAX_URL_LENGTH, is_valid_host_and_length,
};
