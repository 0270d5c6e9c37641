pub mod message;

use reqwest::StatusCode;
use serde::Serialize;
use url::Url;
use workflow_notify_core::outcome::Color;

/// Incoming webhook body. Uses legacy attachments rather than blocks: blocks
/// have no color indicator and are limited to 10 fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub mrkdwn_in: Vec<&'static str>,
    pub color: Color,
    pub text: String,
    pub footer: String,
    pub footer_icon: String,
    pub fields: Vec<Field>,
    pub pretext: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub title: String,
    pub short: bool,
    pub value: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Failed to send Slack webhook request")]
    Request(#[source] reqwest::Error),
    #[error("Slack webhook responded with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct Webhook {
    client: reqwest::Client,
    url: Url,
}

impl Webhook {
    pub fn new(url: Url) -> Self { Self { client: reqwest::Client::new(), url } }

    /// Post the payload once. Any non-2xx response is an error.
    pub async fn send(&self, payload: &Payload) -> Result<(), SendError> {
        // The webhook URL is a secret; keep it out of error messages.
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| SendError::Request(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected { status, body });
        }
        tracing::debug!("Slack webhook responded with {}", status);
        Ok(())
    }
}
