use crate::config::MrkdwnConfig;
use crate::document::Document;
use crate::error::Error;
use crate::mrkdwn::Mrkdwn;

/// Escapes plain text and wraps it in a root `<div>`, ready for [`Mrkdwn`].
pub fn plain_text_input(text: &str) -> Document {
    Document::parse_fragment(&format!("<div>{}</div>", html_escape::encode_text(text)))
}

/// Plain-text input followed by the mrkdwn filter.
#[derive(Default)]
pub struct Pipeline {
    mrkdwn: Mrkdwn,
}

impl Pipeline {
    pub fn new(mrkdwn: Mrkdwn) -> Self {
        Self { mrkdwn }
    }

    pub fn from_config(config: MrkdwnConfig) -> Result<Self, Error> {
        Ok(Self::new(Mrkdwn::new(config)?))
    }

    pub fn to_document(&self, text: &str) -> Document {
        let doc = plain_text_input(text);
        self.mrkdwn.call(&doc);
        doc
    }

    /// Renders a Slack message to HTML.
    pub fn render(&self, text: &str) -> Result<String, Error> {
        self.to_document(text).to_html()
    }
}
