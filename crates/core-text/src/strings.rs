//! Small string helpers for input handling.

use std::borrow::Cow;

/// Number of Unicode scalar values.
#[inline]
pub fn code_point_len(s: &str) -> usize {
    s.chars().count()
}

/// Collapse CRLF pairs into LF. Lone CR is left untouched.
pub fn normalize_line_feeds(s: &str) -> Cow<'_, str> {
    if s.contains("\r\n") {
        Cow::Owned(s.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(s)
    }
}
