//! Centralized normalization + segmentation adapter.
//!
//! Contract:
//! - Input: &str raw tweet text.
//! - Output: (normalized NFC String, Vec<Segment>) where each segment is a grapheme cluster
//!   carrying both byte offsets and UTF-16 offsets into the normalized string.
//! - Guarantees: clusters are in order, non-overlapping, and concatenate to the normalized text.
//! - Does not log content.

use crate::emoji;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub cluster: String,
    pub start: usize,       // byte offset (inclusive)
    pub end: usize,         // byte offset (exclusive)
    pub utf16_start: usize, // code-unit offset (inclusive)
    pub utf16_end: usize,   // code-unit offset (exclusive)
    pub emoji: Option<emoji::EmojiKind>,
}

impl Segment {
    pub fn is_emoji(&self) -> bool {
        self.emoji.is_some()
    }
}

/// NFC-normalize `input`.
pub fn normalize(input: &str) -> String {
    input.nfc().collect()
}

/// Segment `text` as-is (no normalization) into grapheme clusters.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut unit = 0usize;
    for (start, g) in text.grapheme_indices(true) {
        let units = crate::offsets::utf16_len(g);
        out.push(Segment {
            cluster: g.to_string(),
            start,
            end: start + g.len(),
            utf16_start: unit,
            utf16_end: unit + units,
            emoji: emoji::classify(g),
        });
        unit += units;
    }
    out
}

/// Normalize to NFC and segment into grapheme clusters.
pub fn normalize_and_segment(input: &str) -> (String, Vec<Segment>) {
    let normalized = normalize(input);
    let segments = segment(&normalized);
    (normalized, segments)
}
