//! Outcome reporting.
//!
//! Converts the router's terminal state into the caller-facing response
//! and emits the diagnostic trail: one structured line per attempt plus a
//! summary, enough to reconstruct the failover path from logs alone.

use crate::router::{Attempt, AttemptOutcome, RouterOutcome};
use chrono::{DateTime, Utc};
use deskmail_core::error::ConfigError;
use deskmail_core::{Category, ChannelKind};
use serde::Serialize;
use tracing::{info, warn};

/// The structured result of one dispatch call.
///
/// Delivery failures are data, never panics or errors: the surrounding
/// request handler decides how to present them.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse {
    /// Whether a channel accepted the message.
    pub success: bool,

    /// Provider message ID when delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Description of the failure when not delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Channel that accepted the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelKind>,

    /// Correlation ID shared with the diagnostic trail.
    pub dispatch_id: String,

    /// When the dispatch call reached its terminal state.
    pub completed_at: DateTime<Utc>,

    /// Every delivery attempt, in order.
    pub attempts: Vec<Attempt>,
}

impl DispatchResponse {
    fn failure(dispatch_id: String, error: String, attempts: Vec<Attempt>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error),
            channel: None,
            dispatch_id,
            completed_at: Utc::now(),
            attempts,
        }
    }

    /// Response for a ticket rejected before any channel work.
    pub(crate) fn rejected(dispatch_id: String, error: String) -> Self {
        Self::failure(dispatch_id, error, Vec::new())
    }

    /// Response for a category with no usable routing or channels.
    pub(crate) fn unroutable(dispatch_id: String, category: Category) -> Self {
        Self::failure(
            dispatch_id,
            ConfigError::NoChannelAvailable(category).to_string(),
            Vec::new(),
        )
    }
}

/// Convert a router outcome into the caller-facing response, emitting the
/// diagnostic trail along the way.
pub(crate) fn report(
    dispatch_id: String,
    category: Category,
    outcome: RouterOutcome,
) -> DispatchResponse {
    match outcome {
        RouterOutcome::Delivered {
            channel,
            provider_message_id,
            attempts,
        } => {
            log_attempts(&dispatch_id, category, &attempts);
            info!(
                dispatch_id = %dispatch_id,
                category = %category,
                channel = %channel,
                message_id = %provider_message_id,
                attempts = attempts.len(),
                "ticket delivered"
            );
            DispatchResponse {
                success: true,
                message_id: Some(provider_message_id),
                error: None,
                channel: Some(channel),
                dispatch_id,
                completed_at: Utc::now(),
                attempts,
            }
        }
        RouterOutcome::Exhausted {
            last_kind,
            last_detail,
            attempts,
        } => {
            log_attempts(&dispatch_id, category, &attempts);
            warn!(
                dispatch_id = %dispatch_id,
                category = %category,
                attempts = attempts.len(),
                last_kind = %last_kind,
                "all channels exhausted"
            );
            DispatchResponse::failure(
                dispatch_id,
                format!("delivery failed ({last_kind}): {last_detail}"),
                attempts,
            )
        }
        RouterOutcome::NoChannel => DispatchResponse::unroutable(dispatch_id, category),
    }
}

fn log_attempts(dispatch_id: &str, category: Category, attempts: &[Attempt]) {
    for attempt in attempts {
        match &attempt.outcome {
            AttemptOutcome::Delivered => info!(
                dispatch_id = %dispatch_id,
                category = %category,
                channel = %attempt.channel,
                elapsed_ms = attempt.elapsed_ms,
                outcome = "delivered",
                "delivery attempt"
            ),
            AttemptOutcome::Failed { kind, detail } => warn!(
                dispatch_id = %dispatch_id,
                category = %category,
                channel = %attempt.channel,
                elapsed_ms = attempt.elapsed_ms,
                outcome = %kind,
                detail = %detail,
                "delivery attempt"
            ),
        }
    }
}
