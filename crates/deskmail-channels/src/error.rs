//! Channel error types and failure classification.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification of a delivery failure.
///
/// Drives the router's retry/failover policy: authentication failures
/// disable the channel for the process, transient failures get one retry
/// on the same channel, permanent failures fail over without retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Credential rejected by the provider.
    Authentication,

    /// Network, timeout, or rate-limit condition; may succeed on retry.
    Transient,

    /// Provider permanently refused the message.
    Permanent,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during a delivery attempt.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential rejected by the provider.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Provider rate limit hit.
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// An external call exceeded its timeout budget.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Provider refused a recipient.
    #[error("recipient rejected: {0}")]
    RecipientRejected(String),

    /// Provider permanently refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),

    /// The message could not be built for this transport.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The transport could not be constructed from its configuration.
    #[error("transport setup failed: {0}")]
    Setup(String),
}

impl ChannelError {
    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Classify this error for the router's failover policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Authentication,
            Self::Http(_) | Self::RateLimit(_) | Self::Network(_) | Self::Timeout(_) => {
                ErrorKind::Transient
            }
            Self::RecipientRejected(_)
            | Self::Rejected(_)
            | Self::InvalidMessage(_)
            | Self::Setup(_) => ErrorKind::Permanent,
        }
    }

    /// Check if this error is worth one retry on the same channel.
    pub fn is_retriable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
