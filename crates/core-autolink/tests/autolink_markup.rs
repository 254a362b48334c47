use core_autolink::{Autolink, HitHighlighter};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn plain() -> Autolink {
    Autolink::new().no_follow(false).external(false).target("")
}

#[test]
fn default_options_link_mentions_and_urls() {
    let html = Autolink::new().auto_link("@ummjackson 🤡 https://i.imgur.com/I32CQ81.jpg");
    assert_eq!(
        html,
        r#"@<a class="tweet-url username" href="https://twitter.com/ummjackson" rel="external nofollow" target="_blank">ummjackson</a> 🤡 <a href="https://i.imgur.com/I32CQ81.jpg" rel="external nofollow" target="_blank">https://i.imgur.com/I32CQ81.jpg</a>"#
    );
}

#[test]
fn username_include_symbol() {
    let html = Autolink::new()
        .username_include_symbol(true)
        .auto_link("Testing @mention and @mention/list");
    assert_eq!(
        html,
        r#"Testing <a class="tweet-url username" href="https://twitter.com/mention" rel="external nofollow" target="_blank">@mention</a> and <a class="tweet-url list-slug" href="https://twitter.com/mention/list" rel="external nofollow" target="_blank">@mention/list</a>"#
    );
}

#[test]
fn symbol_and_text_tags() {
    let linker = plain().symbol_tag("s").text_with_symbol_tag("b");
    assert_eq!(
        linker.auto_link("#hash"),
        r##"<a href="https://twitter.com/search?q=%23hash" title="#hash" class="tweet-url hashtag"><s>#</s><b>hash</b></a>"##
    );
    assert_eq!(
        linker.auto_link("@mention"),
        r#"<s>@</s><a class="tweet-url username" href="https://twitter.com/mention"><b>mention</b></a>"#
    );
    assert_eq!(
        linker.username_include_symbol(true).auto_link("@mention"),
        r#"<a class="tweet-url username" href="https://twitter.com/mention"><s>@</s><b>mention</b></a>"#
    );
}

#[test]
fn category_operations_only_link_their_category() {
    let text = "@jack #rust $TWTR http://example.com";
    let linker = plain();
    assert_eq!(
        linker.auto_link_usernames_and_lists(text),
        r#"@<a class="tweet-url username" href="https://twitter.com/jack">jack</a> #rust $TWTR http://example.com"#
    );
    assert_eq!(
        linker.auto_link_hashtags(text),
        r##"@jack <a href="https://twitter.com/search?q=%23rust" title="#rust" class="tweet-url hashtag">#rust</a> $TWTR http://example.com"##
    );
    assert_eq!(
        linker.auto_link_cashtags(text),
        r#"@jack #rust <a href="https://twitter.com/search?q=%24TWTR" title="$TWTR" class="tweet-url cashtag">$TWTR</a> http://example.com"#
    );
    assert_eq!(
        linker.auto_link_urls(text),
        r#"@jack #rust $TWTR <a href="http://example.com">http://example.com</a>"#
    );
}

#[test]
fn custom_bases_and_classes() {
    let linker = plain()
        .username_class("u")
        .list_class("l")
        .username_url_base("https://example.com/u/")
        .list_url_base("https://example.com/l/");
    assert_eq!(
        linker.auto_link_usernames_and_lists("@a and @b/c"),
        r#"@<a class="u" href="https://example.com/u/a">a</a> and @<a class="l" href="https://example.com/l/b/c">b/c</a>"#
    );
    assert_eq!(
        plain()
            .hashtag_url_base("/tags/")
            .hashtag_class("")
            .auto_link_hashtags("#x"),
        r##"<a href="/tags/x" title="#x">#x</a>"##
    );
}

#[test]
fn entities_from_json() {
    let text = "Hi @jack #rust $TWTR https://t.co/abc";
    let json = r#"{
        "hashtags": [{"text": "rust", "indices": [9, 14]}],
        "symbols": [{"text": "TWTR", "indices": [15, 20]}],
        "user_mentions": [{"screen_name": "jack", "indices": [3, 8]}],
        "urls": [{"url": "https://t.co/abc", "display_url": "example.com/x", "expanded_url": "https://example.com/x", "indices": [21, 37]}]
    }"#;
    let expected = r##"Hi @<a class="tweet-url username" href="https://twitter.com/jack">jack</a> <a href="https://twitter.com/search?q=%23rust" title="#rust" class="tweet-url hashtag">#rust</a> <a href="https://twitter.com/search?q=%24TWTR" title="$TWTR" class="tweet-url cashtag">$TWTR</a> <a href="https://t.co/abc" title="https://example.com/x">example.com/x</a>"##;
    let linker = plain();
    assert_eq!(linker.auto_link_with_json(text, json).unwrap(), expected);

    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(linker.auto_link_with_json_value(text, value).unwrap(), expected);
}

#[test]
fn overlapping_json_entities_keep_the_first() {
    let value = json!({
        "hashtags": [{"text": "ab", "indices": [0, 3]}],
        "urls": [{"url": "#ab", "indices": [1, 3]}],
    });
    assert_eq!(
        plain().hashtag_class("").auto_link_with_json_value("#ab", value).unwrap(),
        r##"<a href="https://twitter.com/search?q=%23ab" title="#ab">#ab</a>"##
    );
}

#[test]
fn malformed_json_is_an_error() {
    let err = plain().auto_link_with_json("hi", "{").unwrap_err();
    assert!(err.to_string().starts_with("invalid entities JSON"));
}

#[test]
fn highlight_after_autolink_skips_markup() {
    let linked = plain().auto_link_urls("open http://example.com now");
    let highlighted = HitHighlighter::new().highlight(&linked, &[[5, 23]]);
    assert_eq!(
        highlighted,
        r#"open <a href="http://example.com"><em>http://example.com</em></a> now"#
    );
}

fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn tweetish() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-z]{1,6}",
            "@[a-zA-Z0-9_]{1,10}",
            "@[a-z]{1,6}/[a-z]{1,6}",
            "#[a-z]{1,8}",
            "＃[a-z]{1,4}",
            "\\$[A-Z]{1,5}",
            Just("http://example.com/a?b=c".to_string()),
            Just("https://t.co/xyz'q".to_string()),
            Just("日本語".to_string()),
            Just("🐱".to_string()),
        ],
        0..10,
    )
    .prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn stripping_markup_restores_the_text(text in tweetish()) {
        let linked = Autolink::new().auto_link(&text);
        prop_assert_eq!(strip_markup(&linked), text.clone());
        let with_symbol = Autolink::new()
            .username_include_symbol(true)
            .symbol_tag("s")
            .auto_link(&text);
        prop_assert_eq!(strip_markup(&with_symbol), text);
    }
}
