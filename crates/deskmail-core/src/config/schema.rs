//! Configuration schema definitions.

use crate::error::ConfigError;
use crate::secret::SecretString;
use crate::types::{Category, ChannelKind, RoutingProfile};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main deskmail configuration.
///
/// Built once at process start (normally from the environment via
/// [`Config::from_env`](crate::config::Config::from_env)), validated once,
/// and shared read-only for the rest of the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Channels and routing for support tickets.
    #[serde(default)]
    pub support: CategoryConfig,

    /// Channels and routing for sales tickets.
    #[serde(default)]
    pub sales: CategoryConfig,

    /// Timeout applied to each external call, in seconds.
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,

    /// Fixed backoff before the single transient retry, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_delivery_timeout_secs() -> u64 {
    10
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            support: CategoryConfig::default(),
            sales: CategoryConfig::default(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Config {
    /// Get the configuration for a ticket category.
    pub fn category(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::Support => &self.support,
            Category::Sales => &self.sales,
        }
    }

    /// Per-call delivery timeout.
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    /// Backoff before the single transient retry.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Channel credentials and routing for one ticket category.
///
/// Categories never share adapters or credentials, so a compromised or
/// misconfigured sales channel cannot leak support mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Resend (HTTP API) channel, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resend: Option<ResendConfig>,

    /// SMTP channel, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp: Option<SmtpConfig>,

    /// Sender/recipients/CC for this category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingConfig>,

    /// Channel preference order; the head is the primary channel.
    #[serde(default = "default_preference")]
    pub preference: Vec<ChannelKind>,
}

fn default_preference() -> Vec<ChannelKind> {
    vec![ChannelKind::Resend, ChannelKind::Smtp]
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            resend: None,
            smtp: None,
            routing: None,
            preference: default_preference(),
        }
    }
}

/// Resend channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendConfig {
    /// API key. Resend keys start with `re_`.
    pub api_key: SecretString,

    /// API base URL; overridable for tests.
    #[serde(default = "default_resend_api_url")]
    pub api_url: String,
}

fn default_resend_api_url() -> String {
    "https://api.resend.com".to_string()
}

/// SMTP channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Relay hostname.
    pub host: String,

    /// Submission port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Login username.
    pub username: String,

    /// Login password.
    pub password: SecretString,
}

fn default_smtp_port() -> u16 {
    587
}

/// Raw routing data for one category, as loaded from the environment.
///
/// Addresses are kept as strings here; [`RoutingConfig::to_profile`]
/// produces the validated form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Sender address.
    pub sender: String,

    /// Primary recipients.
    #[serde(default)]
    pub recipients: Vec<String>,

    /// CC recipients.
    #[serde(default)]
    pub cc: Vec<String>,
}

impl RoutingConfig {
    /// Parse into a validated routing profile.
    pub fn to_profile(&self) -> Result<RoutingProfile, ConfigError> {
        let sender = self.sender.parse()?;
        let recipients = self
            .recipients
            .iter()
            .map(|r| r.parse())
            .collect::<Result<Vec<_>, _>>()?;
        let cc = self
            .cc
            .iter()
            .map(|c| c.parse())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoutingProfile {
            sender,
            recipients,
            cc,
        })
    }
}
