//! Slack `mrkdwn` to HTML.
//!
//! The filter works on an already-escaped HTML fragment and rewrites its text
//! nodes in place; [`Pipeline`] bundles it with the plain-text input stage.
//!
//! ```no_run
//! let html = mrkdwn_html::Pipeline::default().render("*hi* <!here>").unwrap();
//! assert_eq!(
//!     html,
//!     "<div><strong>hi</strong> <span class=\"mention\">@here</span></div>"
//! );
//! ```

pub mod config;
pub mod document;
pub mod emoji;
pub mod error;
pub mod mrkdwn;
pub mod pipeline;

pub use config::MrkdwnConfig;
pub use document::Document;
pub use emoji::{Emoji, EmojiImageTag, EmojiKind, EmojiTable, TemplateImageTag};
pub use error::{ConfigError, Error};
pub use mrkdwn::{FilterKind, Mrkdwn, MrkdwnBuilder, MrkdwnFilter};
pub use pipeline::{Pipeline, plain_text_input};
