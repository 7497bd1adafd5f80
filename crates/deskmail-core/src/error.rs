//! Error types for deskmail core.

use crate::types::{Category, ChannelKind};
use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for deskmail core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ticket error: {0}")]
    Ticket(#[from] TicketError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No channel for the ticket's category survived validation.
    #[error("no delivery channel available for {0} tickets")]
    NoChannelAvailable(Category),

    #[error("invalid address '{value}': {reason}")]
    InvalidAddress { value: String, reason: String },
}

/// Ticket validation errors.
///
/// A ticket failing validation is rejected before any channel is attempted
/// and is never retried.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid contact email: {0}")]
    InvalidEmail(String),

    #[error("unknown issue type: {0}")]
    UnknownIssueType(String),
}

/// A single configuration problem found during startup validation.
///
/// Problems are collected, not thrown: `Config::validate` walks every
/// channel and returns the full list so the operator sees the whole
/// picture at once.
#[derive(Debug, Clone)]
pub struct ConfigProblem {
    /// Ticket category the problem belongs to.
    pub category: Category,

    /// Affected channel, or `None` for routing-profile problems.
    pub channel: Option<ChannelKind>,

    /// Human-readable description. Credentials appear only as safe previews.
    pub message: String,
}

impl std::fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.channel {
            Some(channel) => write!(f, "{}/{}: {}", self.category, channel, self.message),
            None => write!(f, "{}/routing: {}", self.category, self.message),
        }
    }
}
