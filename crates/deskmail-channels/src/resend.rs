//! Resend (HTTP API) channel adapter.
//!
//! Issues one authenticated `POST /emails` call per delivery. The whole
//! recipient set travels in a single request, so provider acceptance is
//! all-or-nothing.

use crate::error::ChannelError;
use crate::traits::{ChannelAdapter, Delivery};
use crate::Result;
use async_trait::async_trait;
use deskmail_core::config::ResendConfig;
use deskmail_core::{ChannelKind, FormattedMessage, RoutingProfile, SecretString};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Adapter for the Resend email API.
#[derive(Debug, Clone)]
pub struct ResendAdapter {
    api_key: SecretString,
    api_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

/// Request body for `POST /emails`.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

/// Successful response body.
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendAdapter {
    /// Create an adapter from validated channel configuration.
    pub fn new(config: &ResendConfig, timeout: Duration) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChannelAdapter for ResendAdapter {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Resend
    }

    async fn deliver(
        &self,
        message: &FormattedMessage,
        routing: &RoutingProfile,
    ) -> Result<Delivery> {
        let request = SendRequest {
            from: routing.sender.as_str(),
            to: routing.recipients.iter().map(|a| a.as_str()).collect(),
            cc: routing.cc.iter().map(|a| a.as_str()).collect(),
            subject: &message.subject,
            text: &message.text_body,
            html: &message.html_body,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let status = response.status();
        if status.is_success() {
            let body: SendResponse = response
                .json()
                .await
                .map_err(|e| ChannelError::network(format!("malformed API response: {e}")))?;
            debug!(message_id = %body.id, "resend accepted message");
            return Ok(Delivery::new(body.id));
        }

        let detail = response.text().await.unwrap_or_default();
        Err(classify_status(status, &detail))
    }
}

fn request_error(error: reqwest::Error, timeout: Duration) -> ChannelError {
    if error.is_timeout() {
        ChannelError::Timeout(timeout)
    } else {
        ChannelError::Http(error)
    }
}

/// Map a non-2xx API response onto the failure taxonomy.
///
/// Invalid or revoked keys must never be retried; rate limits and server
/// errors may resolve on their own; everything else (rejected recipient,
/// invalid payload) will fail identically on this channel.
fn classify_status(status: StatusCode, detail: &str) -> ChannelError {
    let detail = truncate(detail);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChannelError::auth(detail),
        StatusCode::TOO_MANY_REQUESTS => ChannelError::RateLimit(detail),
        s if s.is_server_error() => {
            ChannelError::network(format!("provider returned {s}: {detail}"))
        }
        s => ChannelError::Rejected(format!("{s}: {detail}")),
    }
}

fn truncate(detail: &str) -> String {
    const MAX: usize = 200;
    if detail.len() <= MAX {
        detail.to_string()
    } else {
        let cut = detail
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &detail[..cut])
    }
}
