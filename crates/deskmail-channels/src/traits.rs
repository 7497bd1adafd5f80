//! The channel adapter capability.

use crate::Result;
use async_trait::async_trait;
use deskmail_core::{ChannelKind, FormattedMessage, RoutingProfile};

/// One delivery transport.
///
/// An adapter instance belongs to exactly one ticket category's routing
/// profile; categories never share adapters or credentials. Implementations
/// must bound every network call with an explicit timeout and report
/// timeouts as transient failures.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// The transport this adapter speaks.
    fn kind(&self) -> ChannelKind;

    /// Attempt to deliver a formatted message to every address in the
    /// routing profile in one provider transaction.
    ///
    /// Either the provider accepts the message for all stated recipients
    /// and the CC list, or the attempt counts as a failure; partial
    /// acceptance is never reported as success.
    async fn deliver(
        &self,
        message: &FormattedMessage,
        routing: &RoutingProfile,
    ) -> Result<Delivery>;
}

/// A successful delivery.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Message ID assigned by the provider.
    pub provider_message_id: String,
}

impl Delivery {
    /// Create a new delivery result.
    pub fn new(provider_message_id: impl Into<String>) -> Self {
        Self {
            provider_message_id: provider_message_id.into(),
        }
    }
}
