use core_grammar::{Grammar, GrammarBuilder, GrammarProfile, TldTables};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

fn url_texts(grammar: &Grammar, text: &str) -> Vec<String> {
    grammar
        .url_candidates(text)
        .into_iter()
        .map(|u| text[u.start..u.end].to_string())
        .collect()
}

#[test]
fn domain_length_guard() {
    let g = Grammar::shared();
    let long = format!("{}.com", "a".repeat(64));
    assert!(g.url_candidates(&long).is_empty());
    let with_protocol = format!("https://{long}");
    assert!(g.url_candidates(&with_protocol).is_empty());
}

#[test]
fn short_domains_and_protocols() {
    let g = Grammar::shared();
    assert_eq!(url_texts(&g, "MLB.tv vine.co"), ["MLB.tv", "vine.co"]);
    assert_eq!(url_texts(&g, "see http://example.jp."), ["http://example.jp"]);
    assert_eq!(url_texts(&g, "t.co/abc123 and x.jp/path"), ["t.co/abc123", "x.jp/path"]);
}

#[test]
fn canonical_text_candidates() {
    let g = Grammar::shared();
    let text = "@someone RT @otheruser: check $TEST $Stock and $symbol with @username #hashtag1 https://example.com/path";
    assert_eq!(url_texts(&g, text), ["https://example.com/path"]);
    let tags: Vec<&str> = g.hashtags(text).into_iter().map(|t| &text[t.body]).collect();
    assert_eq!(tags, ["hashtag1"]);
    let names: Vec<&str> = g
        .mentions(text)
        .into_iter()
        .map(|m| &text[m.screen_name])
        .collect();
    assert_eq!(names, ["someone", "otheruser", "username"]);
}

#[test]
fn legacy_profile_uses_its_own_tlds() {
    let legacy = Grammar::shared_for(GrammarProfile::Legacy);
    assert!(url_texts(&legacy, "example.tech").is_empty());
    assert_eq!(url_texts(&Grammar::shared(), "example.tech"), ["example.tech"]);
}

#[test]
fn custom_tld_tables() {
    let g = GrammarBuilder::new(GrammarProfile::Current)
        .tlds(TldTables::legacy())
        .build();
    assert!(g.url_candidates("example.tech").is_empty());
}

proptest! {
    // Candidate spans are ordered, disjoint and land on char boundaries.
    #[test]
    fn candidates_are_ordered_and_disjoint(s in "[a-z.:/#@$ ]{0,12}(\\.com|\\.co|é|😀){0,3}[a-z/ ]{0,8}") {
        let g = Grammar::shared();
        let mut last_end = 0usize;
        for url in g.url_candidates(&s) {
            prop_assert!(url.start >= last_end);
            prop_assert!(url.start < url.end);
            prop_assert!(s.is_char_boundary(url.start) && s.is_char_boundary(url.end));
            last_end = url.end;
        }
        let mut last_end = 0usize;
        for tag in g.hashtags(&s) {
            prop_assert!(tag.start >= last_end);
            last_end = tag.end;
        }
    }
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

#[test]
fn build_logs_profile() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: buffer.clone(),
        })
        .finish();

    with_default(subscriber, || GrammarBuilder::new(GrammarProfile::Legacy).build());

    let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(out.contains("grammar.build"), "missing target: {out}");
    assert!(out.contains("grammar_built"));
    assert!(out.contains("profile=\"legacy\""));
}
