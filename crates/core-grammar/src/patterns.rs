//! Mention, reply, hashtag and cashtag matchers.
//!
//! The `regex` crate has no lookaround, so each pattern consumes its
//! boundary character and the trailing assertions run on the match in
//! [`scan`]. A rejected match either resumes after itself, like a
//! post-filter, or one character after its start, like a failed assertion.

use core_text::chars::{self, Class, class_body};
use regex::{Captures, Regex};
use std::ops::Range;

use crate::GrammarProfile;

/// Verdict for one regex match inside [`scan`].
pub(crate) enum Step<T> {
    /// Keep the item, continue at the given byte offset.
    Accept(T, usize),
    /// Drop the match, continue at its end.
    Skip,
    /// Treat the match as a failed attempt; continue one char after its start.
    Retry,
}

pub(crate) fn scan<'t, T>(
    re: &Regex,
    text: &'t str,
    mut judge: impl FnMut(&Captures<'t>) -> Step<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let whole = caps.get(0).map_or(pos..pos, |m| m.range());
        let next = match judge(&caps) {
            Step::Accept(item, end) => {
                out.push(item);
                end
            }
            Step::Skip => whole.end,
            Step::Retry => whole.start,
        };
        pos = if next > whole.start {
            next
        } else {
            next_char(text, whole.start)
        };
    }
    out
}

pub(crate) fn next_char(text: &str, at: usize) -> usize {
    at + text[at..].chars().next().map_or(1, char::len_utf8)
}

/// `@name` or `@name/slug`. Offsets are bytes; `start` is the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionMatch {
    pub start: usize,
    pub end: usize,
    pub screen_name: Range<usize>,
    /// Includes the leading `/`.
    pub list_slug: Option<Range<usize>>,
}

/// `#tag` or `$TAG`. `body` excludes the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    pub start: usize,
    pub end: usize,
    pub body: Range<usize>,
}

#[derive(Debug)]
pub(crate) struct Patterns {
    profile: GrammarProfile,
    accents: Class,
    mention: Regex,
    reply: Regex,
    hashtag: Regex,
    cashtag: Regex,
}

pub(crate) fn compile(name: &str, pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("{name} pattern failed to compile: {err}"),
    }
}

impl Patterns {
    pub(crate) fn new(profile: GrammarProfile) -> Self {
        let accents = match profile {
            GrammarProfile::Current => chars::LATIN_ACCENTS,
            GrammarProfile::Legacy => chars::LATIN_ACCENTS_LEGACY,
        };
        let spaces = class_body(chars::UNICODE_SPACES);
        let screen_name = r"([@＠])([a-zA-Z0-9_]{1,20})";

        let (mention, hashtag) = match profile {
            GrammarProfile::Current => {
                let special = class_body(chars::HASHTAG_SPECIAL_CHARS);
                let alnum = format!(r"[\p{{L}}\p{{M}}\p{{Nd}}{special}]");
                (
                    format!(
                        r"(?:^|[^a-zA-Z0-9_!#$%&*@＠/]|(?:^|[^a-zA-Z0-9_+~.\-])(?:[Rr][Tt]):?){screen_name}(/[a-zA-Z][a-zA-Z0-9_\-\x{{80}}-\x{{FF}}]{{0,24}})?"
                    ),
                    format!(
                        r"(?:^|[\x{{FE0E}}\x{{FE0F}}]|[^&\p{{L}}\p{{M}}\p{{Nd}}{special}])([#＃])({alnum}*[\p{{L}}\p{{M}}]{alnum}*)"
                    ),
                )
            }
            GrammarProfile::Legacy => {
                let alpha = format!(
                    "[a-zA-Z_{}{}{}]",
                    class_body(chars::LATIN_ACCENTS_LEGACY),
                    class_body(chars::LEGACY_NON_LATIN_HASHTAG_CHARS),
                    class_body(chars::LEGACY_CJ_HASHTAG_CHARS),
                );
                let alnum = format!(
                    "[0-9a-zA-Z_{}{}{}]",
                    class_body(chars::LATIN_ACCENTS_LEGACY),
                    class_body(chars::LEGACY_NON_LATIN_HASHTAG_CHARS),
                    class_body(chars::LEGACY_CJ_HASHTAG_CHARS),
                );
                (
                    format!(r"(?:^|[^a-zA-Z0-9_]){screen_name}(/[a-zA-Z][a-zA-Z0-9_\-]{{0,24}})?"),
                    format!(
                        r"(?:^|[{spaces}「」。、.!?！？,])([#＃])({alnum}*{alpha}{alnum}*)"
                    ),
                )
            }
        };

        Self {
            profile,
            accents,
            mention: compile("mention", &mention),
            reply: compile("reply", &format!(r"^[{spaces}]*{screen_name}")),
            hashtag: compile("hashtag", &hashtag),
            cashtag: compile(
                "cashtag",
                &format!(r"(?:^|[{spaces}])(\$)([a-zA-Z]{{1,6}}(?:[._][a-zA-Z]{{1,2}})?)"),
            ),
        }
    }

    pub(crate) fn accents(&self) -> Class {
        self.accents
    }

    fn mention_ends_badly(&self, rest: &str) -> bool {
        rest.starts_with("://")
            || rest
                .chars()
                .next()
                .is_some_and(|c| c == '@' || c == '＠' || chars::in_ranges(c, self.accents))
    }

    pub(crate) fn mentions(&self, text: &str) -> Vec<MentionMatch> {
        scan(&self.mention, text, |caps| {
            let (Some(marker), Some(name)) = (caps.get(1), caps.get(2)) else {
                return Step::Skip;
            };
            let slug = caps.get(3).map(|m| m.range());
            let end = slug.as_ref().map_or(name.end(), |s| s.end);
            if self.mention_ends_badly(&text[end..]) {
                return Step::Skip;
            }
            Step::Accept(
                MentionMatch {
                    start: marker.start(),
                    end,
                    screen_name: name.range(),
                    list_slug: slug,
                },
                end,
            )
        })
    }

    pub(crate) fn reply(&self, text: &str) -> Option<MentionMatch> {
        let caps = self.reply.captures(text)?;
        let (marker, name) = (caps.get(1)?, caps.get(2)?);
        if self.mention_ends_badly(&text[name.end()..]) {
            return None;
        }
        Some(MentionMatch {
            start: marker.start(),
            end: name.end(),
            screen_name: name.range(),
            list_slug: None,
        })
    }

    pub(crate) fn hashtags(&self, text: &str) -> Vec<TagMatch> {
        scan(&self.hashtag, text, |caps| {
            let (Some(marker), Some(body)) = (caps.get(1), caps.get(2)) else {
                return Step::Skip;
            };
            let rest = &text[body.end()..];
            match self.profile {
                GrammarProfile::Current => {
                    if body
                        .as_str()
                        .starts_with(['\u{FE0F}', '\u{20E3}'])
                    {
                        return Step::Retry;
                    }
                    if rest.starts_with(['#', '＃']) || rest.starts_with("://") {
                        return Step::Skip;
                    }
                }
                GrammarProfile::Legacy => {
                    if !rest.chars().next().is_none_or(is_legacy_hashtag_boundary) {
                        return Step::Retry;
                    }
                }
            }
            Step::Accept(
                TagMatch {
                    start: marker.start(),
                    end: body.end(),
                    body: body.range(),
                },
                body.end(),
            )
        })
    }

    pub(crate) fn cashtags(&self, text: &str) -> Vec<TagMatch> {
        scan(&self.cashtag, text, |caps| {
            let (Some(marker), Some(body)) = (caps.get(1), caps.get(2)) else {
                return Step::Skip;
            };
            let Some(end) = cashtag_end(text, body.range()) else {
                return Step::Retry;
            };
            if text[end..].starts_with('$') || text[end..].starts_with("://") {
                return Step::Skip;
            }
            Step::Accept(
                TagMatch {
                    start: marker.start(),
                    end,
                    body: body.start()..end,
                },
                end,
            )
        })
    }
}

/// Longest prefix of the matched cashtag body that is followed by end of
/// text, whitespace or ASCII punctuation.
fn cashtag_end(text: &str, body: Range<usize>) -> Option<usize> {
    let follows_ok = |at: usize| {
        text[at..]
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c.is_ascii_punctuation())
    };
    let letters = text[body.clone()]
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let base = body.start + letters;
    let mut candidates = vec![body.end];
    if body.end - base == 3 {
        candidates.push(body.end - 1);
    }
    candidates.push(base);
    candidates.into_iter().find(|&end| follows_ok(end))
}

fn is_legacy_hashtag_boundary(c: char) -> bool {
    chars::is_unicode_space(c) || "「」。、.!?！？,".contains(c)
}
