//! Filter for converting Slack's `mrkdwn` markup inside an HTML fragment.
//! <https://api.slack.com/reference/surfaces/formatting#basics>

use std::sync::{Arc, LazyLock};

use im::HashMap;
use regex::{Captures, Regex};
use tracing::{debug, trace, warn};

use crate::config::MrkdwnConfig;
use crate::document::{self, Document};
use crate::emoji::{EmojiImageTag, EmojiTable, TemplateImageTag};
use crate::error::ConfigError;

/// Text under these elements is never rewritten.
const IGNORE_PARENTS: [&str; 3] = ["pre", "code", "a"];

/// Upper bound on emoji tokens for large-emoji mode.
const MAX_LARGE_EMOJI: usize = 23;

/// Recursion limit for nested blockquotes and styles.
const MAX_NESTING: usize = 16;

const LOWBAR_PLACEHOLDER: &str = "&amp;lowbar;";

struct Patterns {
    emoji_and_whitespace: Regex,
    emoji_token: Regex,
    multiline_code: Regex,
    code: Regex,
    blockquote: Regex,
    blockquote_marker: Regex,
    mention: Regex,
    link: Regex,
    line_break: Regex,
    emoji: Regex,
    style: Regex,
}

static RE: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    emoji_and_whitespace: Regex::new(r"^(?::[\w+-]+:|\s)+$").unwrap(),
    emoji_token: Regex::new(r":[\w+-]+:").unwrap(),
    multiline_code: Regex::new(r"(?s)```(.+?)```").unwrap(),
    code: Regex::new(r"`(\S(?:.*?\S)??)`").unwrap(),
    blockquote: Regex::new(r"(?m)(?:^&gt;[^\n]*\n?)+").unwrap(),
    blockquote_marker: Regex::new(r"(?m)^&gt; ?").unwrap(),
    mention: Regex::new(r"(?i)&lt;([@#!])([a-z0-9][a-z0-9-]*)&gt;").unwrap(),
    link: Regex::new(r"&lt;((?:http|mailto)[^|]+?)(?:\|([^|]+?))?&gt;").unwrap(),
    line_break: Regex::new(r"\r?\n").unwrap(),
    emoji: Regex::new(r":([\w+-]+):").unwrap(),
    style: Regex::new(r"\*(\S(?:.*?\S)??)\*|_(\S(?:.*?\S)??)_|~(\S(?:.*?\S)??)~").unwrap(),
});

/// The substitution categories, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    MultilineCode,
    Code,
    Blockquote,
    Mention,
    Link,
    LineBreak,
    Emoji,
    Style,
    Unescape,
}

impl FilterKind {
    pub const ORDER: [FilterKind; 9] = [
        FilterKind::MultilineCode,
        FilterKind::Code,
        FilterKind::Blockquote,
        FilterKind::Mention,
        FilterKind::Link,
        FilterKind::LineBreak,
        FilterKind::Emoji,
        FilterKind::Style,
        FilterKind::Unescape,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::MultilineCode => "multiline_code",
            FilterKind::Code => "code",
            FilterKind::Blockquote => "blockquote",
            FilterKind::Mention => "mention",
            FilterKind::Link => "link",
            FilterKind::LineBreak => "line_break",
            FilterKind::Emoji => "emoji",
            FilterKind::Style => "style",
            FilterKind::Unescape => "unescape",
        }
    }

    /// Substrings a text node must contain for the category to be worth running.
    pub fn triggers(self) -> &'static [&'static str] {
        match self {
            FilterKind::MultilineCode => &["```"],
            FilterKind::Code => &["`"],
            FilterKind::Blockquote => &["&gt;"],
            FilterKind::Mention => &["@", "#", "!"],
            FilterKind::Link => &["&lt;"],
            FilterKind::LineBreak => &["\n"],
            FilterKind::Emoji => &[":"],
            FilterKind::Style => &["*", "_", "~"],
            FilterKind::Unescape => &[LOWBAR_PLACEHOLDER],
        }
    }
}

/// Immutable mrkdwn settings, shareable across threads and documents.
pub struct Mrkdwn {
    emoji_image_tag: Arc<dyn EmojiImageTag>,
    large_emoji_image_tag: Arc<dyn EmojiImageTag>,
    large_emoji_class: String,
    slack_channels: HashMap<String, String>,
    slack_users: HashMap<String, String>,
    emoji: EmojiTable,
}

impl Mrkdwn {
    pub fn new(config: MrkdwnConfig) -> Result<Self, ConfigError> {
        MrkdwnBuilder::default().config(config).build()
    }

    pub fn builder() -> MrkdwnBuilder {
        MrkdwnBuilder::default()
    }

    pub fn large_emoji_class(&self) -> &str {
        &self.large_emoji_class
    }

    /// Rewrites every eligible text node of `doc` in place.
    pub fn call(&self, doc: &Document) {
        MrkdwnFilter::new(doc, self).call();
    }
}

impl Default for Mrkdwn {
    fn default() -> Self {
        let emoji_image_tag: Arc<dyn EmojiImageTag> = Arc::new(TemplateImageTag::default());
        Self {
            large_emoji_image_tag: emoji_image_tag.clone(),
            emoji_image_tag,
            large_emoji_class: MrkdwnConfig::default().large_emoji_class,
            slack_channels: HashMap::new(),
            slack_users: HashMap::new(),
            emoji: EmojiTable::default(),
        }
    }
}

/// Builds a validated [`Mrkdwn`].
///
/// Image-tag callbacks set here take precedence over the config's templates.
#[derive(Default)]
pub struct MrkdwnBuilder {
    config: MrkdwnConfig,
    emoji_image_tag: Option<Arc<dyn EmojiImageTag>>,
    large_emoji_image_tag: Option<Arc<dyn EmojiImageTag>>,
}

impl MrkdwnBuilder {
    pub fn config(mut self, config: MrkdwnConfig) -> Self {
        self.config = config;
        self
    }

    pub fn emoji_image_tag(mut self, tag: impl EmojiImageTag + 'static) -> Self {
        self.emoji_image_tag = Some(Arc::new(tag));
        self
    }

    pub fn large_emoji_image_tag(mut self, tag: impl EmojiImageTag + 'static) -> Self {
        self.large_emoji_image_tag = Some(Arc::new(tag));
        self
    }

    pub fn build(self) -> Result<Mrkdwn, ConfigError> {
        let config = self.config;
        config.validate()?;

        let emoji_image_tag = self
            .emoji_image_tag
            .or_else(|| template_tag(&config.emoji_image_template))
            .unwrap_or_else(|| Arc::new(TemplateImageTag::default()));
        let large_emoji_image_tag = self
            .large_emoji_image_tag
            .or_else(|| template_tag(&config.large_emoji_image_template))
            .unwrap_or_else(|| emoji_image_tag.clone());

        Ok(Mrkdwn {
            emoji_image_tag,
            large_emoji_image_tag,
            large_emoji_class: config.large_emoji_class,
            slack_channels: config.slack_channels,
            slack_users: config.slack_users,
            emoji: EmojiTable::new(config.custom_emoji),
        })
    }
}

fn template_tag(template: &Option<String>) -> Option<Arc<dyn EmojiImageTag>> {
    template
        .as_ref()
        .map(|template| Arc::new(TemplateImageTag::new(template.clone())) as Arc<dyn EmojiImageTag>)
}

/// One pass of the filter over one document.
pub struct MrkdwnFilter<'a> {
    doc: &'a Document,
    context: &'a Mrkdwn,
    large_emoji: bool,
}

impl<'a> MrkdwnFilter<'a> {
    pub fn new(doc: &'a Document, context: &'a Mrkdwn) -> Self {
        Self {
            doc,
            context,
            large_emoji: false,
        }
    }

    /// Whether this document was found to be emoji-only.
    pub fn large_emoji(&self) -> bool {
        self.large_emoji
    }

    pub fn call(&mut self) {
        match self.doc.root() {
            Some(root) => {
                let text = document::text_content(&root);
                if let Some(count) = large_emoji_count(&text) {
                    debug!(count, "large emoji mode");
                    self.large_emoji = true;
                    document::add_class(&root, &self.context.large_emoji_class);
                }
            }
            None => debug!("no root container, skipping large emoji detection"),
        }

        for kind in FilterKind::ORDER {
            self.process_text_nodes(kind);
        }
    }

    fn process_text_nodes(&self, kind: FilterKind) {
        for node in self.doc.text_nodes() {
            let content = document::text_html(&node);
            if !kind.triggers().iter().any(|s| content.contains(s)) {
                continue;
            }
            if document::has_ancestor(&node, &IGNORE_PARENTS) {
                continue;
            }

            let html = self.apply(kind, &content);
            if html == content {
                continue;
            }
            trace!(filter = kind.name(), "replacing text node");
            self.doc.replace_with_html(&node, &html);
        }
    }

    /// Runs a single category over serialized text.
    pub fn apply(&self, kind: FilterKind, content: &str) -> String {
        match kind {
            FilterKind::MultilineCode => multiline_code_filter(content),
            FilterKind::Code => code_filter(content),
            FilterKind::Blockquote => blockquote_filter(content, 0),
            FilterKind::Mention => self.mention_filter(content),
            FilterKind::Link => link_filter(content),
            FilterKind::LineBreak => line_break_filter(content),
            FilterKind::Emoji => self.emoji_filter(content),
            FilterKind::Style => style_filter(content, 0),
            FilterKind::Unescape => unescape_filter(content),
        }
    }

    fn mention_filter(&self, content: &str) -> String {
        RE.mention
            .replace_all(content, |caps: &Captures| {
                let id = &caps[2];

                let (text, klass, prefix) = match &caps[1] {
                    "#" if is_slack_id(id, &['C']) => (
                        lookup(&self.context.slack_channels, id),
                        "channel",
                        "#",
                    ),
                    "@" if is_slack_id(id, &['U', 'B']) => {
                        (lookup(&self.context.slack_users, id), "user", "@")
                    }
                    "!" if matches!(id, "here" | "channel" | "everyone") => {
                        (id.to_string(), "mention", "@")
                    }
                    _ => return caps[0].to_string(),
                };

                format!("<span class=\"{}\">{}{}</span>", klass, prefix, text)
            })
            .into_owned()
    }

    fn emoji_filter(&self, content: &str) -> String {
        RE.emoji
            .replace_all(content, |caps: &Captures| {
                match self.context.emoji.find_by_alias(&caps[1]) {
                    Some(emoji) if emoji.is_custom() => {
                        if self.large_emoji {
                            self.context.large_emoji_image_tag.render(&emoji)
                        } else {
                            self.context.emoji_image_tag.render(&emoji)
                        }
                    }
                    Some(emoji) => emoji.raw().unwrap_or_default().to_string(),
                    // keep underscores away from the style filter
                    None => caps[0].replace('_', LOWBAR_PLACEHOLDER),
                }
            })
            .into_owned()
    }
}

fn is_slack_id(id: &str, prefixes: &[char]) -> bool {
    id.len() > 1 && id.starts_with(prefixes)
}

fn lookup(names: &HashMap<String, String>, id: &str) -> String {
    match names.get(id) {
        Some(name) => html_escape::encode_text(name).into_owned(),
        None => id.to_string(),
    }
}

/// Number of emoji when `text` holds only emoji and whitespace, within bounds.
fn large_emoji_count(text: &str) -> Option<usize> {
    if !RE.emoji_and_whitespace.is_match(text) {
        return None;
    }
    let count = RE.emoji_token.find_iter(text).count();
    (1..=MAX_LARGE_EMOJI).contains(&count).then_some(count)
}

fn chomp(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}

fn multiline_code_filter(content: &str) -> String {
    RE.multiline_code
        .replace_all(content, |caps: &Captures| {
            let text = chomp(&caps[1]);
            // the parser eats one newline after <pre>, so give it a spare
            if text.starts_with('\n') {
                format!("<pre>\n{}</pre>", text)
            } else {
                format!("<pre>{}</pre>", text)
            }
        })
        .into_owned()
}

fn code_filter(content: &str) -> String {
    RE.code
        .replace_all(content, |caps: &Captures| {
            let text = &caps[1];
            // runs of backquotes are literal
            if text.chars().all(|c| c == '`') {
                caps[0].to_string()
            } else {
                format!("<code>{}</code>", text)
            }
        })
        .into_owned()
}

fn blockquote_filter(content: &str, depth: usize) -> String {
    if depth >= MAX_NESTING {
        warn!(depth, "blockquote nesting limit reached");
        return content.to_string();
    }
    RE.blockquote
        .replace_all(content, |caps: &Captures| {
            let text = RE.blockquote_marker.replace_all(chomp(&caps[0]), "");
            format!("<blockquote>{}</blockquote>", blockquote_filter(&text, depth + 1))
        })
        .into_owned()
}

fn link_filter(content: &str) -> String {
    RE.link
        .replace_all(content, |caps: &Captures| {
            let link = &caps[1];
            let text = caps.get(2).map_or(link, |m| m.as_str());
            format!(
                "<a class=\"link\" href=\"{}\">{}</a>",
                link.replace('"', "&quot;"),
                text
            )
        })
        .into_owned()
}

fn line_break_filter(content: &str) -> String {
    RE.line_break.replace_all(content, "<br>").into_owned()
}

fn style_filter(content: &str, depth: usize) -> String {
    if depth >= MAX_NESTING {
        warn!(depth, "style nesting limit reached");
        return content.to_string();
    }
    RE.style
        .replace_all(content, |caps: &Captures| {
            let (delimiter, tag, text) = if let Some(m) = caps.get(1) {
                ('*', "strong", m.as_str())
            } else if let Some(m) = caps.get(2) {
                ('_', "em", m.as_str())
            } else if let Some(m) = caps.get(3) {
                ('~', "del", m.as_str())
            } else {
                return caps[0].to_string();
            };

            // runs of style delimiters are literal
            if text.chars().all(|c| c == delimiter) {
                return caps[0].to_string();
            }
            format!("<{tag}>{}</{tag}>", style_filter(text, depth + 1))
        })
        .into_owned()
}

fn unescape_filter(content: &str) -> String {
    content.replace(LOWBAR_PLACEHOLDER, "_")
}
