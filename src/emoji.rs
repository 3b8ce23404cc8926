//! Emoji lookup by alias and image-tag rendering for custom emoji.

use im::HashMap;

/// How an emoji is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiKind {
    /// A Unicode emoji, rendered as its character(s).
    Standard(&'static str),
    /// A custom emoji, rendered as an image.
    Custom { image_filename: String },
}

/// An emoji resolved from a `:alias:` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
    name: String,
    kind: EmojiKind,
}

impl Emoji {
    pub fn standard(name: impl Into<String>, raw: &'static str) -> Self {
        Self {
            name: name.into(),
            kind: EmojiKind::Standard(raw),
        }
    }

    pub fn custom(name: impl Into<String>, image_filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EmojiKind::Custom {
                image_filename: image_filename.into(),
            },
        }
    }

    /// The alias this emoji was looked up by.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EmojiKind {
        &self.kind
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, EmojiKind::Custom { .. })
    }

    /// The Unicode form, for standard emoji.
    pub fn raw(&self) -> Option<&'static str> {
        match self.kind {
            EmojiKind::Standard(raw) => Some(raw),
            EmojiKind::Custom { .. } => None,
        }
    }

    /// The image source, for custom emoji.
    pub fn image_filename(&self) -> Option<&str> {
        match &self.kind {
            EmojiKind::Standard(_) => None,
            EmojiKind::Custom { image_filename } => Some(image_filename.as_str()),
        }
    }
}

/// Resolves aliases against the workspace's custom emoji, then the gemoji set.
#[derive(Debug, Clone, Default)]
pub struct EmojiTable {
    custom: HashMap<String, String>,
}

impl EmojiTable {
    pub fn new(custom: HashMap<String, String>) -> Self {
        Self { custom }
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<Emoji> {
        if let Some(image_filename) = self.custom.get(alias) {
            return Some(Emoji::custom(alias, image_filename.clone()));
        }
        emojis::get_by_shortcode(alias).map(|emoji| Emoji::standard(alias, emoji.as_str()))
    }
}

/// Renders the markup for a custom emoji.
pub trait EmojiImageTag: Send + Sync {
    fn render(&self, emoji: &Emoji) -> String;
}

impl<F> EmojiImageTag for F
where
    F: Fn(&Emoji) -> String + Send + Sync,
{
    fn render(&self, emoji: &Emoji) -> String {
        self(emoji)
    }
}

pub(crate) const DEFAULT_IMAGE_TEMPLATE: &str = r#"<img src="{src}" alt="{name}" class="emoji">"#;

/// Image tag built from a string template with `{src}` and `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateImageTag {
    template: String,
}

impl TemplateImageTag {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplateImageTag {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_TEMPLATE)
    }
}

impl EmojiImageTag for TemplateImageTag {
    fn render(&self, emoji: &Emoji) -> String {
        let src = emoji.image_filename().or(emoji.raw()).unwrap_or_default();
        self.template
            .replace(
                "{src}",
                &html_escape::encode_double_quoted_attribute(src),
            )
            .replace(
                "{name}",
                &html_escape::encode_double_quoted_attribute(emoji.name()),
            )
    }
}
