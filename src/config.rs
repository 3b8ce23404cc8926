use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_LARGE_EMOJI_CLASS: &str = "emoji-lg";

fn default_large_emoji_class() -> String {
    DEFAULT_LARGE_EMOJI_CLASS.to_string()
}

/// Serializable settings for the mrkdwn filter.
///
/// Image-tag callbacks cannot be expressed in JSON, so the JSON form uses
/// `emoji_image_template`/`large_emoji_image_template` instead; closures are
/// supplied through [`crate::MrkdwnBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MrkdwnConfig {
    /// CSS class added to the root container in large-emoji mode.
    pub large_emoji_class: String,
    /// Slack channel ids and channel names.
    pub slack_channels: HashMap<String, String>,
    /// Slack user or bot ids and display names.
    pub slack_users: HashMap<String, String>,
    /// Custom emoji aliases and their image sources.
    pub custom_emoji: HashMap<String, String>,
    /// Template for custom emoji, with `{src}` and `{name}` placeholders.
    pub emoji_image_template: Option<String>,
    /// Template for custom emoji in large-emoji mode.
    pub large_emoji_image_template: Option<String>,
}

impl Default for MrkdwnConfig {
    fn default() -> Self {
        Self {
            large_emoji_class: default_large_emoji_class(),
            slack_channels: HashMap::new(),
            slack_users: HashMap::new(),
            custom_emoji: HashMap::new(),
            emoji_image_template: None,
            large_emoji_image_template: None,
        }
    }
}

impl MrkdwnConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let class = &self.large_emoji_class;
        if class.is_empty() || class.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidLargeEmojiClass(class.clone()));
        }
        validate_template("emoji_image_template", &self.emoji_image_template)?;
        validate_template(
            "large_emoji_image_template",
            &self.large_emoji_image_template,
        )?;
        Ok(())
    }
}

fn validate_template(option: &'static str, template: &Option<String>) -> Result<(), ConfigError> {
    match template {
        Some(template) if !template.contains("{src}") => Err(ConfigError::InvalidTemplate {
            option,
            template: template.clone(),
        }),
        _ => Ok(()),
    }
}
