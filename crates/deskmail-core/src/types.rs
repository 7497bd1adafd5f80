//! Ticket, routing, and message types.

use crate::error::{ConfigError, TicketError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Urgency of a ticket, as chosen by the submitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Ticket category, resolved from the issue type.
///
/// Each category has its own routing profile and its own channel
/// credentials; nothing is shared between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Support,
    Sales,
}

impl Category {
    /// Resolve the category for an issue type.
    ///
    /// Returns `None` for issue types with no routing profile; such
    /// tickets are rejected before any delivery attempt.
    pub fn from_issue_type(issue_type: &str) -> Option<Self> {
        match issue_type.trim().to_lowercase().as_str() {
            "repair" | "warranty" | "support" | "technical" | "complaint" => Some(Self::Support),
            "sales" | "quote" | "purchase" | "order" => Some(Self::Sales),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Sales => "sales",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete transport for delivering a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// HTTP email API (Resend).
    Resend,

    /// Direct SMTP submission.
    Smtp,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resend => "resend",
            Self::Smtp => "smtp",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operational ticket handed over by the surrounding application.
///
/// Immutable once constructed; this subsystem never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Submitter name.
    pub name: String,

    /// Submitter contact email.
    pub contact_email: String,

    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Optional postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Optional device identifier (serial number or similar).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_identifier: Option<String>,

    /// Issue type; determines the routing category.
    pub issue_type: String,

    /// Urgency marker.
    #[serde(default)]
    pub urgency: Urgency,

    /// Free-text description of the issue.
    pub description: String,
}

impl Ticket {
    /// Validate the ticket and resolve its routing category.
    ///
    /// Runs before any channel work; a ticket that fails here is never
    /// attempted on any channel.
    pub fn validate(&self) -> Result<Category, TicketError> {
        if self.name.trim().is_empty() {
            return Err(TicketError::MissingField("name"));
        }
        if self.contact_email.trim().is_empty() {
            return Err(TicketError::MissingField("contact_email"));
        }
        if !self.contact_email.contains('@') {
            return Err(TicketError::InvalidEmail(self.contact_email.clone()));
        }
        if self.issue_type.trim().is_empty() {
            return Err(TicketError::MissingField("issue_type"));
        }
        if self.description.trim().is_empty() {
            return Err(TicketError::MissingField("description"));
        }

        Category::from_issue_type(&self.issue_type)
            .ok_or_else(|| TicketError::UnknownIssueType(self.issue_type.clone()))
    }
}

/// A validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |reason: &str| ConfigError::InvalidAddress {
            value: trimmed.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }
        let (local, domain) = trimmed.split_once('@').ok_or_else(|| invalid("missing '@'"))?;
        if local.is_empty() {
            return Err(invalid("empty local part"));
        }
        if domain.is_empty() || !domain.contains('.') || domain.contains('@') {
            return Err(invalid("invalid domain"));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sender, recipients, and CC list for one ticket category.
///
/// Selected by category, never by urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingProfile {
    /// Sender address used for outgoing mail.
    pub sender: Address,

    /// Primary recipients. Always non-empty after validation.
    pub recipients: Vec<Address>,

    /// CC recipients.
    #[serde(default)]
    pub cc: Vec<Address>,
}

/// Channel-agnostic message content derived from a ticket.
///
/// Owned by the dispatch call that produced it; not retained afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}
