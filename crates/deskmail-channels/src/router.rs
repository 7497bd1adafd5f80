//! The delivery router.
//!
//! Walks a category's channel preference list and applies the failover
//! policy: at most one success per dispatch, one retry per channel for
//! transient failures, immediate failover for everything else, and
//! process-lifetime disabling of channels whose credentials are rejected.

use crate::error::ErrorKind;
use crate::traits::ChannelAdapter;
use deskmail_core::{ChannelKind, FormattedMessage, RoutingProfile};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// One delivery attempt in a dispatch call's trail.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    /// Channel that was tried.
    pub channel: ChannelKind,

    /// What happened.
    #[serde(flatten)]
    pub outcome: AttemptOutcome,

    /// Wall-clock time the attempt took.
    pub elapsed_ms: u64,
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum AttemptOutcome {
    Delivered,
    Failed { kind: ErrorKind, detail: String },
}

/// Terminal state of one routed dispatch.
#[derive(Debug)]
pub enum RouterOutcome {
    /// A channel accepted the message; no further channels were tried.
    Delivered {
        channel: ChannelKind,
        provider_message_id: String,
        attempts: Vec<Attempt>,
    },

    /// Every available channel was exhausted without success.
    Exhausted {
        /// Classification of the last attempt's failure.
        last_kind: ErrorKind,
        /// Detail of the last attempt's failure.
        last_detail: String,
        attempts: Vec<Attempt>,
    },

    /// No channel was available to attempt.
    NoChannel,
}

struct RegisteredChannel {
    adapter: Arc<dyn ChannelAdapter>,
    /// Cleared for the rest of the process when the provider rejects the
    /// channel's credentials; the same mechanism configuration validation
    /// uses, applied late.
    available: AtomicBool,
}

/// Router for one ticket category's channels, in preference order.
pub struct DeliveryRouter {
    channels: Vec<RegisteredChannel>,
    retry_backoff: Duration,
}

impl DeliveryRouter {
    /// Create a router over adapters in preference order (primary first).
    pub fn new(adapters: Vec<Arc<dyn ChannelAdapter>>, retry_backoff: Duration) -> Self {
        Self {
            channels: adapters
                .into_iter()
                .map(|adapter| RegisteredChannel {
                    adapter,
                    available: AtomicBool::new(true),
                })
                .collect(),
            retry_backoff,
        }
    }

    /// Channels that are still available, in preference order.
    pub fn available_channels(&self) -> Vec<ChannelKind> {
        self.channels
            .iter()
            .filter(|c| c.available.load(Ordering::Acquire))
            .map(|c| c.adapter.kind())
            .collect()
    }

    /// Run one dispatch through the failover state machine.
    pub async fn deliver(
        &self,
        message: &FormattedMessage,
        routing: &RoutingProfile,
    ) -> RouterOutcome {
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut last: Option<(ErrorKind, String)> = None;

        for channel in &self.channels {
            if !channel.available.load(Ordering::Acquire) {
                continue;
            }

            let kind = channel.adapter.kind();
            let mut retried = false;

            loop {
                let started = Instant::now();
                let result = channel.adapter.deliver(message, routing).await;
                let elapsed_ms = started.elapsed().as_millis() as u64;

                match result {
                    Ok(delivery) => {
                        attempts.push(Attempt {
                            channel: kind,
                            outcome: AttemptOutcome::Delivered,
                            elapsed_ms,
                        });
                        return RouterOutcome::Delivered {
                            channel: kind,
                            provider_message_id: delivery.provider_message_id,
                            attempts,
                        };
                    }
                    Err(error) => {
                        let error_kind = error.kind();
                        let detail = error.to_string();
                        attempts.push(Attempt {
                            channel: kind,
                            outcome: AttemptOutcome::Failed {
                                kind: error_kind,
                                detail: detail.clone(),
                            },
                            elapsed_ms,
                        });
                        last = Some((error_kind, detail));

                        match error_kind {
                            ErrorKind::Authentication => {
                                // A rejected credential will not start
                                // working mid-process; stop offering the
                                // channel and move on without retry.
                                if channel.available.swap(false, Ordering::AcqRel) {
                                    warn!(
                                        channel = %kind,
                                        "credential rejected; channel disabled for process lifetime"
                                    );
                                }
                                break;
                            }
                            ErrorKind::Transient if !retried => {
                                retried = true;
                                tokio::time::sleep(self.retry_backoff).await;
                            }
                            _ => break,
                        }
                    }
                }
            }
        }

        match last {
            Some((last_kind, last_detail)) => RouterOutcome::Exhausted {
                last_kind,
                last_detail,
                attempts,
            },
            None => RouterOutcome::NoChannel,
        }
    }
}
