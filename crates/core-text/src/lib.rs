//! Unicode foundations for tweet parsing: character classes, emoji
//! clusters, UTF-16 offsets and normalization.

use thiserror::Error;

pub mod chars;
pub mod emoji;
pub mod offsets;
pub mod segment;
pub mod strings;

pub use offsets::{Utf16Cursor, byte_offset, slice_utf16, utf16_len};
pub use segment::{Segment, normalize, normalize_and_segment};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextError {
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Decode raw bytes for the text APIs.
///
/// Every byte-oriented entry point goes through here: malformed UTF-8 is
/// rejected, never repaired lossily.
pub fn decode(bytes: &[u8]) -> Result<&str, TextError> {
    std::str::from_utf8(bytes).map_err(|e| TextError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}
