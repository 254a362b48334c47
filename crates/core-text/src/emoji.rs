//! Emoji recognition over grapheme clusters.
//!
//! Segmentation happens once (extended grapheme clusters via
//! `unicode-segmentation`); this module only decides whether a given cluster
//! is an emoji and of which shape. A cluster is never split: a base emoji,
//! its skin tone, ZWJ partners, tag characters and variation selectors all
//! belong to the same entity.

use std::ops::RangeInclusive;

pub const ZWJ: char = '\u{200D}';
pub const VS15: char = '\u{FE0E}';
pub const VS16: char = '\u{FE0F}';
pub const KEYCAP_COMBINING: char = '\u{20E3}';

/// Extended_Pictographic, folded into contiguous spans.
const EXTENDED_PICTOGRAPHIC: &[RangeInclusive<char>] = &[
    '\u{00A9}'..='\u{00A9}',
    '\u{00AE}'..='\u{00AE}',
    '\u{203C}'..='\u{203C}',
    '\u{2049}'..='\u{2049}',
    '\u{2122}'..='\u{2122}',
    '\u{2139}'..='\u{2139}',
    '\u{2194}'..='\u{2199}',
    '\u{21A9}'..='\u{21AA}',
    '\u{231A}'..='\u{231B}',
    '\u{2328}'..='\u{2328}',
    '\u{2388}'..='\u{2388}',
    '\u{23CF}'..='\u{23CF}',
    '\u{23E9}'..='\u{23F3}',
    '\u{23F8}'..='\u{23FA}',
    '\u{24C2}'..='\u{24C2}',
    '\u{25AA}'..='\u{25AB}',
    '\u{25B6}'..='\u{25B6}',
    '\u{25C0}'..='\u{25C0}',
    '\u{25FB}'..='\u{25FE}',
    '\u{2600}'..='\u{2605}',
    '\u{2607}'..='\u{2612}',
    '\u{2614}'..='\u{2685}',
    '\u{2690}'..='\u{2705}',
    '\u{2708}'..='\u{2712}',
    '\u{2714}'..='\u{2714}',
    '\u{2716}'..='\u{2716}',
    '\u{271D}'..='\u{271D}',
    '\u{2721}'..='\u{2721}',
    '\u{2728}'..='\u{2728}',
    '\u{2733}'..='\u{2734}',
    '\u{2744}'..='\u{2744}',
    '\u{2747}'..='\u{2747}',
    '\u{274C}'..='\u{274C}',
    '\u{274E}'..='\u{274E}',
    '\u{2753}'..='\u{2755}',
    '\u{2757}'..='\u{2757}',
    '\u{2763}'..='\u{2767}',
    '\u{2795}'..='\u{2797}',
    '\u{27A1}'..='\u{27A1}',
    '\u{27B0}'..='\u{27B0}',
    '\u{27BF}'..='\u{27BF}',
    '\u{2934}'..='\u{2935}',
    '\u{2B05}'..='\u{2B07}',
    '\u{2B1B}'..='\u{2B1C}',
    '\u{2B50}'..='\u{2B50}',
    '\u{2B55}'..='\u{2B55}',
    '\u{3030}'..='\u{3030}',
    '\u{303D}'..='\u{303D}',
    '\u{3297}'..='\u{3297}',
    '\u{3299}'..='\u{3299}',
    '\u{1F000}'..='\u{1F0FF}',
    '\u{1F10D}'..='\u{1F10F}',
    '\u{1F12F}'..='\u{1F12F}',
    '\u{1F16C}'..='\u{1F171}',
    '\u{1F17E}'..='\u{1F17F}',
    '\u{1F18E}'..='\u{1F18E}',
    '\u{1F191}'..='\u{1F19A}',
    '\u{1F1AD}'..='\u{1F1E5}',
    '\u{1F201}'..='\u{1F20F}',
    '\u{1F21A}'..='\u{1F21A}',
    '\u{1F22F}'..='\u{1F22F}',
    '\u{1F232}'..='\u{1F23A}',
    '\u{1F23C}'..='\u{1F23F}',
    '\u{1F249}'..='\u{1F3FA}',
    '\u{1F400}'..='\u{1F53D}',
    '\u{1F546}'..='\u{1F64F}',
    '\u{1F680}'..='\u{1F6FF}',
    '\u{1F774}'..='\u{1F77F}',
    '\u{1F7D5}'..='\u{1F7FF}',
    '\u{1F80C}'..='\u{1F80F}',
    '\u{1F848}'..='\u{1F84F}',
    '\u{1F85A}'..='\u{1F85F}',
    '\u{1F888}'..='\u{1F88F}',
    '\u{1F8AE}'..='\u{1F8FF}',
    '\u{1F90C}'..='\u{1F93A}',
    '\u{1F93C}'..='\u{1F945}',
    '\u{1F947}'..='\u{1FAFF}',
    '\u{1FC00}'..='\u{1FFFD}',
];

/// Shape of an emoji cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmojiKind {
    /// Single pictograph, optionally with a variation selector.
    Simple,
    /// Pictograph (or bare modifier) carrying a skin tone.
    Modifier,
    /// `[0-9#*]` + optional VS16 + U+20E3.
    Keycap,
    /// Regional indicator pair.
    Flag,
    /// Two or more pictographs joined by ZWJ.
    Zwj,
    /// Black flag followed by tag characters (subdivision flags).
    TagSequence,
}

pub fn is_extended_pictographic(c: char) -> bool {
    let cp = c as u32;
    // Fast reject for the bulk of Latin text.
    if cp < 0xA9 {
        return false;
    }
    EXTENDED_PICTOGRAPHIC
        .binary_search_by(|r| {
            if *r.end() < c {
                std::cmp::Ordering::Less
            } else if *r.start() > c {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

pub fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

pub fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

pub fn is_tag_char(c: char) -> bool {
    ('\u{E0020}'..='\u{E007F}').contains(&c)
}

fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

/// Classify one grapheme cluster. `None` means the cluster is not an emoji.
pub fn classify(cluster: &str) -> Option<EmojiKind> {
    let mut chars = cluster.chars();
    let first = chars.next()?;

    if is_keycap_base(first) {
        return (cluster.ends_with(KEYCAP_COMBINING)).then_some(EmojiKind::Keycap);
    }
    if is_regional_indicator(first) {
        let pair = cluster.chars().filter(|c| is_regional_indicator(*c)).count() == 2;
        return pair.then_some(EmojiKind::Flag);
    }
    if is_skin_tone_modifier(first) {
        return Some(EmojiKind::Modifier);
    }
    if !is_extended_pictographic(first) {
        return None;
    }

    let mut pictographs = 1usize;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_tag = false;
    for c in chars {
        if c == ZWJ {
            has_zwj = true;
        } else if is_extended_pictographic(c) {
            pictographs += 1;
        } else if is_skin_tone_modifier(c) {
            has_skin = true;
        } else if is_tag_char(c) {
            has_tag = true;
        }
    }

    Some(if has_zwj && pictographs >= 2 {
        EmojiKind::Zwj
    } else if has_tag {
        EmojiKind::TagSequence
    } else if has_skin {
        EmojiKind::Modifier
    } else {
        EmojiKind::Simple
    })
}

#[inline]
pub fn is_emoji_cluster(cluster: &str) -> bool {
    classify(cluster).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        for pair in EXTENDED_PICTOGRAPHIC.windows(2) {
            assert!(pair[0].end() < pair[1].start());
        }
    }

    #[test]
    fn classifies_common_shapes() {
        assert_eq!(classify("😀"), Some(EmojiKind::Simple));
        assert_eq!(classify("☺"), Some(EmojiKind::Simple));
        assert_eq!(classify("🧕🏾"), Some(EmojiKind::Modifier));
        assert_eq!(classify("1️⃣"), Some(EmojiKind::Keycap));
        assert_eq!(classify("#️⃣"), Some(EmojiKind::Keycap));
        assert_eq!(classify("🇯🇵"), Some(EmojiKind::Flag));
        assert_eq!(classify("👨‍👩‍👧‍👦"), Some(EmojiKind::Zwj));
        assert_eq!(classify("🏴󠁧󠁢󠁥󠁮󠁧󠁿"), Some(EmojiKind::TagSequence));
    }

    #[test]
    fn rejects_plain_text() {
        assert_eq!(classify("a"), None);
        assert_eq!(classify("1"), None);
        assert_eq!(classify("#"), None);
        assert_eq!(classify("é"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn skin_tone_is_not_pictographic_base() {
        assert!(!is_extended_pictographic('\u{1F3FD}'));
        assert!(is_skin_tone_modifier('\u{1F3FD}'));
    }
}
