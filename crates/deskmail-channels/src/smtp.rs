//! SMTP channel adapter.
//!
//! Connects to a STARTTLS submission relay with stored credentials,
//! verifies the connection before sending, then submits one message
//! carrying the full recipient and CC set in a single transaction.

use crate::error::ChannelError;
use crate::traits::{ChannelAdapter, Delivery};
use crate::Result;
use async_trait::async_trait;
use deskmail_core::config::SmtpConfig;
use deskmail_core::{id, ChannelKind, FormattedMessage, RoutingProfile};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::debug;

/// Adapter for direct SMTP submission.
pub struct SmtpAdapter {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    timeout: Duration,
}

impl std::fmt::Debug for SmtpAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The transport holds credentials; keep them out of debug output.
        f.debug_struct("SmtpAdapter")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SmtpAdapter {
    /// Create an adapter from validated channel configuration.
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| ChannelError::Setup(format!("relay '{}': {e}", config.host)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport, timeout })
    }

    /// Probe the relay before attempting the send.
    ///
    /// Connection and login failures surface here, separately from send
    /// failures, so a dead relay or bad credential never consumes a
    /// message submission.
    async fn verify_connection(&self) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.transport.test_connection()).await {
            Err(_) => Err(ChannelError::Timeout(self.timeout)),
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(ChannelError::network("relay rejected the connection probe")),
            Ok(Err(e)) => Err(classify_smtp_error(&format!(
                "connection verification failed: {e}"
            ))),
        }
    }
}

#[async_trait]
impl ChannelAdapter for SmtpAdapter {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Smtp
    }

    async fn deliver(
        &self,
        message: &FormattedMessage,
        routing: &RoutingProfile,
    ) -> Result<Delivery> {
        self.verify_connection().await?;

        let (email, message_id) = build_message(message, routing)?;

        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Err(_) => Err(ChannelError::Timeout(self.timeout)),
            Ok(Ok(_)) => {
                debug!(message_id = %message_id, "smtp relay accepted message");
                Ok(Delivery::new(message_id))
            }
            Ok(Err(e)) => Err(classify_smtp_error(&e.to_string())),
        }
    }
}

/// Build the outgoing message with all recipients in one transaction.
///
/// Returns the message together with its generated Message-ID, which
/// doubles as the provider message ID for SMTP deliveries.
fn build_message(
    message: &FormattedMessage,
    routing: &RoutingProfile,
) -> Result<(Message, String)> {
    let message_id = format!("<{}@deskmail>", id::uuid());

    let mut builder = Message::builder()
        .from(parse_mailbox(routing.sender.as_str())?)
        .subject(message.subject.clone())
        .message_id(Some(message_id.clone()));

    for recipient in &routing.recipients {
        builder = builder.to(parse_mailbox(recipient.as_str())?);
    }
    for cc in &routing.cc {
        builder = builder.cc(parse_mailbox(cc.as_str())?);
    }

    let email = builder
        .multipart(MultiPart::alternative_plain_html(
            message.text_body.clone(),
            message.html_body.clone(),
        ))
        .map_err(|e| ChannelError::InvalidMessage(e.to_string()))?;

    Ok((email, message_id))
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| ChannelError::InvalidMessage(format!("address '{address}': {e}")))
}

/// Map an SMTP error string onto the failure taxonomy.
///
/// Matches reply codes on digit boundaries so a code inside an email
/// address or free text does not misclassify the error.
fn classify_smtp_error(error: &str) -> ChannelError {
    let lower = error.to_lowercase();
    let has_code = |code: &str| {
        error
            .split(|c: char| !c.is_ascii_digit())
            .any(|segment| segment == code)
    };

    if lower.contains("authentication") || lower.contains("invalid credentials") || has_code("535")
    {
        return ChannelError::auth(error);
    }
    if ["550", "551", "553"].iter().any(|code| has_code(code)) {
        return ChannelError::RecipientRejected(error.to_string());
    }
    if has_code("552") || has_code("554") || lower.contains("permanent error") {
        return ChannelError::Rejected(error.to_string());
    }

    // Everything else (connect refused, resets, 4xx greylisting) can
    // resolve on its own.
    ChannelError::network(error)
}
