use mrkdwn_html::{ConfigError, Document, Emoji, Error, Mrkdwn, MrkdwnConfig, Pipeline};
use pretty_assertions::assert_eq;

fn filter(input: &str) -> String {
    Pipeline::default().render(input).unwrap()
}

// === Plain text ===

#[test]
fn wraps_non_mrkdwn_content() {
    assert_eq!(filter("hello world"), "<div>hello world</div>");
}

#[test]
fn keeps_escaped_text_escaped() {
    assert_eq!(filter("1 < 2 & 3 > 2"), "<div>1 &lt; 2 &amp; 3 &gt; 2</div>");
}

// === Code ===

#[test]
fn converts_multiline_code_blocks() {
    assert_eq!(
        filter("```\n  puts \"hello world!\"\n```"),
        "<div><pre>\n  puts \"hello world!\"</pre></div>"
    );
}

#[test]
fn leaves_markup_inside_code_blocks_alone() {
    assert_eq!(
        filter("```*not bold* <@U1>```"),
        "<div><pre>*not bold* &lt;@U1&gt;</pre></div>"
    );
}

#[test]
fn converts_inline_code() {
    assert_eq!(
        filter("`puts \"hello world!\"`"),
        "<div><code>puts \"hello world!\"</code></div>"
    );
}

// === Blockquotes ===

#[test]
fn converts_blockquotes() {
    assert_eq!(
        filter(">first line\n>second line\nthird line"),
        "<div><blockquote>first line<br>second line</blockquote>third line</div>"
    );
}

#[test]
fn converts_mentions_inside_blockquotes() {
    let pipeline = Pipeline::from_config(MrkdwnConfig {
        slack_users: im::hashmap! { "U1".to_string() => "alice".to_string() },
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        pipeline.render("> hi <@U1>").unwrap(),
        "<div><blockquote>hi <span class=\"user\">@alice</span></blockquote></div>"
    );
}

// === Line breaks ===

#[test]
fn converts_line_breaks() {
    assert_eq!(
        filter("the first line\nthe second line"),
        "<div>the first line<br>the second line</div>"
    );
}

// === Emoji ===

#[test]
fn converts_emoji() {
    assert!(filter(":rat:").contains("\u{1f400}"));
}

#[test]
fn leaves_unknown_emoji_and_their_underscores() {
    assert_eq!(
        filter("see :a_b: and :c_d: _x_"),
        "<div>see :a_b: and :c_d: <em>x</em></div>"
    );
}

#[test]
fn leaves_times_alone() {
    assert_eq!(filter("at 10:30:45"), "<div>at 10:30:45</div>");
}

#[test]
fn renders_custom_emoji_with_default_image_tag() {
    let pipeline = Pipeline::from_config(
        MrkdwnConfig::from_json_str(r#"{ "custom_emoji": { "parrot": "https://e.test/parrot.gif" } }"#)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        pipeline.render("hi :parrot:").unwrap(),
        "<div>hi <img src=\"https://e.test/parrot.gif\" alt=\"parrot\" class=\"emoji\"></div>"
    );
}

// === Large emoji ===

fn parrot_pipeline() -> Pipeline {
    let mrkdwn = Mrkdwn::builder()
        .config(MrkdwnConfig {
            custom_emoji: im::hashmap! { "parrot".to_string() => "parrot.gif".to_string() },
            ..Default::default()
        })
        .emoji_image_tag(|emoji: &Emoji| {
            format!("<img src=\"{}\" class=\"small\">", emoji.image_filename().unwrap_or_default())
        })
        .large_emoji_image_tag(|emoji: &Emoji| {
            format!("<img src=\"{}\" class=\"large\">", emoji.image_filename().unwrap_or_default())
        })
        .build()
        .unwrap();
    Pipeline::new(mrkdwn)
}

#[test]
fn enlarges_emoji_only_messages() {
    let html = parrot_pipeline().render(":parrot: :rat:\n:parrot:").unwrap();
    assert!(html.starts_with("<div class=\"emoji-lg\">"), "{html}");
    assert!(html.contains("class=\"large\""), "{html}");
    assert!(!html.contains("class=\"small\""), "{html}");
}

#[test]
fn enlarges_up_to_twenty_three_emoji() {
    let html = parrot_pipeline().render(&":parrot:".repeat(23)).unwrap();
    assert!(html.starts_with("<div class=\"emoji-lg\">"), "{html}");
}

#[test]
fn does_not_enlarge_twenty_four_emoji() {
    let html = parrot_pipeline().render(&":parrot: ".repeat(24)).unwrap();
    assert!(html.starts_with("<div>"), "{html}");
    assert!(html.contains("class=\"small\""), "{html}");
    assert!(!html.contains("class=\"large\""), "{html}");
}

#[test]
fn does_not_enlarge_emoji_with_text() {
    let html = parrot_pipeline().render(":parrot: nice").unwrap();
    assert!(html.starts_with("<div>"), "{html}");
    assert!(html.contains("class=\"small\""), "{html}");
}

#[test]
fn uses_configured_large_emoji_class() {
    let pipeline = Pipeline::from_config(
        MrkdwnConfig::from_json_str(r#"{ "large_emoji_class": "jumbo" }"#).unwrap(),
    )
    .unwrap();
    assert_eq!(
        pipeline.render(":rat:").unwrap(),
        "<div class=\"jumbo\">\u{1f400}</div>"
    );
}

// === Mentions ===

#[test]
fn converts_channel_mentions() {
    assert_eq!(
        filter("<#Channel>"),
        "<div><span class=\"channel\">#Channel</span></div>"
    );
}

#[test]
fn looks_up_channel_names() {
    let config = MrkdwnConfig::from_json_str(r#"{ "slack_channels": { "C123": "general" } }"#).unwrap();
    let html = Pipeline::from_config(config).unwrap().render("<#C123>").unwrap();
    assert!(html.contains("<span class=\"channel\">#general</span>"), "{html}");
}

#[test]
fn converts_user_mentions() {
    assert_eq!(filter("<@User>"), "<div><span class=\"user\">@User</span></div>");
}

#[test]
fn converts_special_mentions() {
    assert_eq!(
        filter("<!everyone>"),
        "<div><span class=\"mention\">@everyone</span></div>"
    );
}

#[test]
fn leaves_unknown_mentions() {
    assert_eq!(filter("<!someone>"), "<div>&lt;!someone&gt;</div>");
}

#[test]
fn leaves_labelled_mentions() {
    assert_eq!(
        filter("<@U1|alice> <!here|here>"),
        "<div>&lt;@U1|alice&gt; &lt;!here|here&gt;</div>"
    );
}

// === Links ===

#[test]
fn converts_bare_links() {
    assert_eq!(
        filter("<https://example.org>"),
        "<div><a class=\"link\" href=\"https://example.org\">https://example.org</a></div>"
    );
}

#[test]
fn converts_mailto_links() {
    assert_eq!(
        filter("<mailto:bob@example.com>"),
        "<div><a class=\"link\" href=\"mailto:bob@example.com\">mailto:bob@example.com</a></div>"
    );
}

#[test]
fn converts_links_with_link_text() {
    assert_eq!(
        filter("<https://example.org/foo|Example Foo>"),
        "<div><a class=\"link\" href=\"https://example.org/foo\">Example Foo</a></div>"
    );
}

#[test]
fn does_not_style_link_text() {
    assert_eq!(
        filter("<https://example.org/a_b_c|*x*>"),
        "<div><a class=\"link\" href=\"https://example.org/a_b_c\">*x*</a></div>"
    );
}

// === Text styles ===

#[test]
fn converts_bold_text() {
    assert_eq!(filter("*bold*"), "<div><strong>bold</strong></div>");
}

#[test]
fn converts_italic_text() {
    assert_eq!(filter("_italic_"), "<div><em>italic</em></div>");
}

#[test]
fn converts_strikethrough_text() {
    assert_eq!(filter("~strike~"), "<div><del>strike</del></div>");
}

#[test]
fn converts_nested_styles() {
    assert_eq!(
        filter("*bold ~and struck~*"),
        "<div><strong>bold <del>and struck</del></strong></div>"
    );
}

#[test]
fn leaves_delimiter_runs() {
    assert_eq!(filter("**"), "<div>**</div>");
}

// === Protected elements ===

#[test]
fn never_touches_pre_code_or_links() {
    let input = "<div><pre>*a* :rat:</pre><code>_b_</code><a href=\"/x\">~c~\nd</a></div>";
    let doc = Document::parse_fragment(input);
    Mrkdwn::default().call(&doc);
    assert_eq!(doc.to_html().unwrap(), input);
}

// === Configuration ===

#[test]
fn rejects_malformed_configuration() {
    let err = MrkdwnConfig::from_json_str(r#"{ "slack_users": "U1" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = Mrkdwn::new(MrkdwnConfig {
        large_emoji_class: String::new(),
        ..Default::default()
    })
    .err()
    .unwrap();
    assert!(matches!(err, ConfigError::InvalidLargeEmojiClass(_)));

    let err = Pipeline::from_config(MrkdwnConfig {
        emoji_image_template: Some("<img>".to_string()),
        ..Default::default()
    })
    .err()
    .unwrap();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidTemplate { .. })
    ));
}

#[test]
fn filter_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Mrkdwn>();
}
