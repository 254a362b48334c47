//! Named Unicode character classes used by the entity grammars.
//!
//! Every class is a closed list of scalar ranges. The same table feeds both
//! the regex fragment (via [`class_body`]) and the `char` predicate (via
//! [`in_ranges`]) so the two views can never drift apart.
//!
//! Boundaries are deliberate: `LATIN_ACCENTS` skips U+00D7 (multiplication
//! sign) and U+00F7 (division sign) so `x`-like operators never read as
//! letters.

use std::fmt::Write as _;
use std::ops::RangeInclusive;

pub type Class = &'static [RangeInclusive<char>];

/// Space separators plus the ASCII/Latin-1 whitespace controls.
pub const UNICODE_SPACES: Class = &[
    '\u{0009}'..='\u{000D}',
    '\u{0020}'..='\u{0020}',
    '\u{0085}'..='\u{0085}',
    '\u{00A0}'..='\u{00A0}',
    '\u{1680}'..='\u{1680}',
    '\u{180E}'..='\u{180E}',
    '\u{2000}'..='\u{200A}',
    '\u{2028}'..='\u{2029}',
    '\u{202F}'..='\u{202F}',
    '\u{205F}'..='\u{205F}',
    '\u{3000}'..='\u{3000}',
];

/// Directional overrides, BOM and the non-characters that make a tweet invalid.
pub const INVALID_CHARS: Class = &[
    '\u{202A}'..='\u{202E}',
    '\u{FEFF}'..='\u{FEFF}',
    '\u{FFFE}'..='\u{FFFF}',
];

pub const LATIN_ACCENTS: Class = &[
    '\u{00C0}'..='\u{00D6}',
    '\u{00D8}'..='\u{00F6}',
    '\u{00F8}'..='\u{00FF}',
    '\u{0100}'..='\u{024F}',
    '\u{0253}'..='\u{0254}',
    '\u{0256}'..='\u{0257}',
    '\u{0259}'..='\u{0259}',
    '\u{025B}'..='\u{025B}',
    '\u{0263}'..='\u{0263}',
    '\u{0268}'..='\u{0268}',
    '\u{026F}'..='\u{026F}',
    '\u{0272}'..='\u{0272}',
    '\u{0289}'..='\u{0289}',
    '\u{028B}'..='\u{028B}',
    '\u{02BB}'..='\u{02BB}',
    '\u{0300}'..='\u{036F}',
    '\u{1E00}'..='\u{1EFF}',
];

/// Older accent table kept for the legacy grammar profile.
pub const LATIN_ACCENTS_LEGACY: Class = &[
    '\u{00C0}'..='\u{00D6}',
    '\u{00D8}'..='\u{00F6}',
    '\u{00F8}'..='\u{00FF}',
    '\u{015F}'..='\u{015F}',
];

/// Arabic, Hebrew and their presentation forms.
pub const RTL_CHARS: Class = &[
    '\u{0600}'..='\u{06FF}',
    '\u{0750}'..='\u{077F}',
    '\u{08A0}'..='\u{08FF}',
    '\u{0590}'..='\u{05FF}',
    '\u{FB50}'..='\u{FDFF}',
    '\u{FE70}'..='\u{FEFF}',
];

/// Joiners and script punctuation allowed inside a hashtag body.
pub const HASHTAG_SPECIAL_CHARS: Class = &[
    '_'..='_',
    '\u{200C}'..='\u{200C}',
    '\u{200D}'..='\u{200D}',
    '\u{A67E}'..='\u{A67E}',
    '\u{05BE}'..='\u{05BE}',
    '\u{05F3}'..='\u{05F3}',
    '\u{05F4}'..='\u{05F4}',
    '\u{309B}'..='\u{309B}',
    '\u{309C}'..='\u{309C}',
    '\u{30A0}'..='\u{30A0}',
    '\u{30FB}'..='\u{30FB}',
    '\u{3003}'..='\u{3003}',
    '\u{0F0B}'..='\u{0F0B}',
    '\u{0F0C}'..='\u{0F0C}',
    '\u{00B7}'..='\u{00B7}',
];

/// Cyrillic and Hangul blocks accepted by legacy hashtags.
pub const LEGACY_NON_LATIN_HASHTAG_CHARS: Class = &[
    '\u{0400}'..='\u{04FF}',
    '\u{0500}'..='\u{0527}',
    '\u{2DE0}'..='\u{2DFF}',
    '\u{A640}'..='\u{A69F}',
    '\u{1100}'..='\u{11FF}',
    '\u{3130}'..='\u{3185}',
    '\u{A960}'..='\u{A97F}',
    '\u{AC00}'..='\u{D7AF}',
    '\u{D7B0}'..='\u{D7FF}',
    '\u{FFA1}'..='\u{FFDC}',
];

/// Japanese kana, fullwidth alphanumerics and CJK ideographs (legacy hashtags).
pub const LEGACY_CJ_HASHTAG_CHARS: Class = &[
    '\u{30A1}'..='\u{30FA}',
    '\u{30FC}'..='\u{30FE}',
    '\u{FF10}'..='\u{FF19}',
    '\u{FF21}'..='\u{FF3A}',
    '\u{FF41}'..='\u{FF5A}',
    '\u{3041}'..='\u{3096}',
    '\u{3099}'..='\u{309E}',
    '\u{3400}'..='\u{4DBF}',
    '\u{4E00}'..='\u{9FFF}',
    '\u{20000}'..='\u{2A6DF}',
    '\u{2A700}'..='\u{2B73F}',
    '\u{2B740}'..='\u{2B81F}',
    '\u{2F800}'..='\u{2FA1F}',
    '\u{3005}'..='\u{3005}',
    '\u{303B}'..='\u{303B}',
];

/// Render a class as the body of a regex bracket expression (no brackets).
pub fn class_body(ranges: &[RangeInclusive<char>]) -> String {
    let mut out = String::with_capacity(ranges.len() * 18);
    for r in ranges {
        let (lo, hi) = (*r.start(), *r.end());
        // Infallible: writing into a String.
        let _ = write!(out, "\\x{{{:04X}}}", lo as u32);
        if hi != lo {
            let _ = write!(out, "-\\x{{{:04X}}}", hi as u32);
        }
    }
    out
}

#[inline]
pub fn in_ranges(c: char, ranges: &[RangeInclusive<char>]) -> bool {
    ranges.iter().any(|r| r.contains(&c))
}

#[inline]
pub fn is_unicode_space(c: char) -> bool {
    in_ranges(c, UNICODE_SPACES)
}

#[inline]
pub fn is_invalid_char(c: char) -> bool {
    in_ranges(c, INVALID_CHARS)
}

#[inline]
pub fn is_latin_accent(c: char) -> bool {
    in_ranges(c, LATIN_ACCENTS)
}

#[inline]
pub fn is_rtl_char(c: char) -> bool {
    in_ranges(c, RTL_CHARS)
}

#[inline]
pub fn is_hashtag_special(c: char) -> bool {
    in_ranges(c, HASHTAG_SPECIAL_CHARS)
}

/// True when `text` carries any character that disqualifies a tweet.
pub fn has_invalid_chars(text: &str) -> bool {
    text.chars().any(is_invalid_char)
}
