use core_text::utf16_len;

/// Wraps hit ranges in a tag, skipping over any markup already present.
#[derive(Debug, Clone)]
pub struct HitHighlighter {
    tag: String,
}

impl Default for HitHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl HitHighlighter {
    pub fn new() -> Self {
        Self { tag: "em".into() }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Insert `<tag>`/`</tag>` around each `[start, end)` hit.
    ///
    /// Hits count UTF-16 units of the visible text: anything between `<`
    /// and `>` is markup and is neither counted nor split. A hit that runs
    /// past the end is closed at the end. Overlapping hits are merged.
    pub fn highlight(&self, text: &str, hits: &[[usize; 2]]) -> String {
        if hits.is_empty() {
            return text.to_string();
        }
        let hits = merge_hits(hits);
        let open = format!("<{}>", self.tag);
        let close = format!("</{}>", self.tag);
        let boundaries = hits.iter().flat_map(|&[start, end]| [start, end.max(start)]);

        if !text.contains('<') {
            let mut out = String::with_capacity(text.len() + hits.len() * (open.len() + close.len()));
            let mut cursor = 0usize;
            for (i, unit) in boundaries.enumerate() {
                let at = byte_at(text, unit).max(cursor);
                out.push_str(&text[cursor..at]);
                out.push_str(if i % 2 == 0 { &open } else { &close });
                cursor = at;
            }
            out.push_str(&text[cursor..]);
            return out;
        }

        // Even chunks are text, odd chunks are the inside of a tag.
        let chunks: Vec<&str> = text.split(['<', '>']).collect();
        let mut out = String::with_capacity(text.len() + hits.len() * (open.len() + close.len()));
        let mut chunk_index = 0usize;
        let mut chunk = chunks.first().copied();
        let mut cursor = 0usize;
        let mut offset = 0usize;
        let mut open_in_chunk = false;

        for (i, hit) in boundaries.enumerate() {
            let tag = if i % 2 == 0 { &open } else { &close };
            let mut placed = false;
            while let Some(current) = chunk {
                let chunk_end = offset + utf16_len(current);
                if hit < chunk_end {
                    break;
                }
                out.push_str(&current[byte_at(current, cursor)..]);
                if open_in_chunk && hit == chunk_end {
                    out.push_str(tag);
                    placed = true;
                }
                if let Some(markup) = chunks.get(chunk_index + 1) {
                    out.push('<');
                    out.push_str(markup);
                    out.push('>');
                }
                offset = chunk_end;
                cursor = 0;
                chunk_index += 2;
                chunk = chunks.get(chunk_index).copied();
                open_in_chunk = false;
            }
            if !placed && let Some(current) = chunk {
                let spot = hit.saturating_sub(offset).max(cursor);
                out.push_str(&current[byte_at(current, cursor)..byte_at(current, spot)]);
                out.push_str(tag);
                cursor = spot;
                open_in_chunk = i % 2 == 0;
                placed = true;
            }
            if !placed {
                out.push_str(tag);
            }
        }

        if let Some(current) = chunk {
            out.push_str(&current[byte_at(current, cursor)..]);
            for (i, piece) in chunks.iter().enumerate().skip(chunk_index + 1) {
                if i % 2 == 0 {
                    out.push_str(piece);
                } else {
                    out.push('<');
                    out.push_str(piece);
                    out.push('>');
                }
            }
        }
        out
    }
}

/// Sorted hits with overlapping ranges folded together. Touching hits stay
/// separate.
fn merge_hits(hits: &[[usize; 2]]) -> Vec<[usize; 2]> {
    let mut sorted: Vec<[usize; 2]> = hits.iter().map(|&[s, e]| [s, e.max(s)]).collect();
    sorted.sort_unstable();
    let mut merged: Vec<[usize; 2]> = Vec::with_capacity(sorted.len());
    for [start, end] in sorted {
        match merged.last_mut() {
            Some(last) if start < last[1] => last[1] = last[1].max(end),
            _ => merged.push([start, end]),
        }
    }
    merged
}

/// Byte index of UTF-16 unit `unit`, rounded up to a char boundary and
/// clamped to the end of `s`.
fn byte_at(s: &str, unit: usize) -> usize {
    let mut seen = 0usize;
    for (byte, c) in s.char_indices() {
        if seen >= unit {
            return byte;
        }
        seen += c.len_utf16();
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn highlight(text: &str, hits: &[[usize; 2]]) -> String {
        HitHighlighter::new().highlight(text, hits)
    }

    #[test]
    fn plain_text() {
        assert_eq!(highlight("this is a test", &[[0, 4]]), "<em>this</em> is a test");
        assert_eq!(highlight("this is a test", &[[10, 14]]), "this is a <em>test</em>");
        assert_eq!(
            highlight("this is a test", &[[10, 14], [0, 4]]),
            "<em>this</em> is a <em>test</em>"
        );
        assert_eq!(highlight("this is a test", &[]), "this is a test");
    }

    #[test]
    fn astral_chars_count_two_units() {
        assert_eq!(highlight("😀 hi", &[[3, 5]]), "😀 <em>hi</em>");
    }

    #[test]
    fn hits_inside_links() {
        assert_eq!(
            highlight(r#"<a href="http://example.com">this</a> is a test"#, &[[0, 4]]),
            r#"<a href="http://example.com"><em>this</em></a> is a test"#
        );
        assert_eq!(
            highlight(r#"this is a <a href="http://example.com">test</a>"#, &[[5, 7]]),
            r#"this <em>is</em> a <a href="http://example.com">test</a>"#
        );
    }

    #[test]
    fn hit_spanning_markup_closes_after_it() {
        assert_eq!(
            highlight("<b>ab</b>cd", &[[1, 3]]),
            "<b>a<em>b</b>c</em>d"
        );
    }

    #[test]
    fn overlapping_hits_are_merged() {
        assert_eq!(highlight("abcdefgh", &[[0, 5], [1, 2]]), "<em>abcde</em>fgh");
        assert_eq!(
            highlight("<b>abc</b>defgh", &[[0, 5], [1, 2]]),
            "<b><em>abc</b>de</em>fgh"
        );
        assert_eq!(
            highlight("<b>abc</b>defgh", &[[4, 6], [0, 2], [1, 5]]),
            "<b><em>abc</b>def</em>gh"
        );
        assert_eq!(highlight("abcd", &[[0, 2], [2, 4]]), "<em>ab</em><em>cd</em>");
    }

    #[test]
    fn custom_tag_and_overrun() {
        let h = HitHighlighter::new().tag("strong");
        assert_eq!(h.highlight("abc", &[[1, 10]]), "a<strong>bc</strong>");
    }
}
