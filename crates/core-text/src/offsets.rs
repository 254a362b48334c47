//! UTF-8 byte offset <-> UTF-16 code-unit offset conversion.
//!
//! Matchers work on `&str` byte offsets; every public index is expressed in
//! UTF-16 code units of the original input. Characters outside the BMP count
//! as two units.

/// Number of UTF-16 code units in `s`.
#[inline]
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Forward-moving cursor converting byte offsets to UTF-16 offsets.
///
/// Conversions are amortized O(1) while requested offsets increase; asking
/// for an earlier offset restarts from the beginning of the text.
#[derive(Debug, Clone)]
pub struct Utf16Cursor<'a> {
    text: &'a str,
    byte: usize,
    unit: usize,
}

impl<'a> Utf16Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            unit: 0,
        }
    }

    /// UTF-16 offset of byte offset `byte`. `byte` must be a char boundary
    /// (it is clamped to the text length).
    pub fn to_utf16(&mut self, byte: usize) -> usize {
        let byte = byte.min(self.text.len());
        if byte < self.byte {
            self.byte = 0;
            self.unit = 0;
        }
        self.unit += utf16_len(&self.text[self.byte..byte]);
        self.byte = byte;
        self.unit
    }

    pub fn span(&mut self, start: usize, end: usize) -> (usize, usize) {
        let s = self.to_utf16(start);
        (s, self.to_utf16(end))
    }
}

/// Byte offset for UTF-16 offset `unit`, or `None` when `unit` lies past the
/// end or inside a surrogate pair.
pub fn byte_offset(text: &str, unit: usize) -> Option<usize> {
    let mut seen = 0usize;
    for (byte, c) in text.char_indices() {
        if seen == unit {
            return Some(byte);
        }
        if seen > unit {
            return None;
        }
        seen += c.len_utf16();
    }
    (seen == unit).then_some(text.len())
}

/// Slice `text` by a half-open UTF-16 range.
pub fn slice_utf16(text: &str, start: usize, end: usize) -> Option<&str> {
    if end < start {
        return None;
    }
    let s = byte_offset(text, start)?;
    let e = byte_offset(text, end)?;
    text.get(s..e)
}
