use thiserror::Error;

/// Errors raised while building a [`crate::Mrkdwn`] filter.
///
/// The filter never runs with a configuration that produced one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON configuration had the wrong shape (e.g. `slack_users` not an object).
    #[error("invalid mrkdwn configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// `large_emoji_class` must be a single, non-empty CSS class name.
    #[error("large_emoji_class should be a single CSS class name, got {0:?}")]
    InvalidLargeEmojiClass(String),
    /// An image template that cannot reference the emoji image.
    #[error("{option} should contain a {{src}} placeholder, got {template:?}")]
    InvalidTemplate {
        /// Name of the offending option
        option: &'static str,
        /// The template as supplied
        template: String,
    },
}

/// Errors surfaced while rendering a document.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),
    #[error("serialized document is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
