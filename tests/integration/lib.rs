//! Shared helpers for deskmail integration tests.

use async_trait::async_trait;
use deskmail_channels::{ChannelAdapter, ChannelError, Delivery};
use deskmail_core::{ChannelKind, FormattedMessage, RoutingProfile};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a scripted adapter should do on its next call.
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Deliver,
    AuthFailure,
    TransientFailure,
    PermanentFailure,
}

/// A delivery a scripted adapter accepted.
#[derive(Debug, Clone)]
pub struct AcceptedDelivery {
    pub subject: String,
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
}

/// Channel adapter with a scripted outcome sequence.
///
/// Once the script runs out every further call succeeds. Accepted
/// deliveries are recorded for assertions.
pub struct ScriptedAdapter {
    kind: ChannelKind,
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    accepted: Mutex<Vec<AcceptedDelivery>>,
}

impl ScriptedAdapter {
    pub fn new(kind: ChannelKind, script: &[Scripted]) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script: Mutex::new(script.iter().copied().collect()),
            calls: AtomicUsize::new(0),
            accepted: Mutex::new(Vec::new()),
        })
    }

    /// An adapter that accepts everything.
    pub fn succeeding(kind: ChannelKind) -> Arc<Self> {
        Self::new(kind, &[])
    }

    /// Total calls seen, including failed attempts.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Deliveries this adapter accepted, in order.
    pub fn accepted(&self) -> Vec<AcceptedDelivery> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelAdapter for ScriptedAdapter {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn deliver(
        &self,
        message: &FormattedMessage,
        routing: &RoutingProfile,
    ) -> Result<Delivery, ChannelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Deliver);

        match next {
            Scripted::Deliver => {
                self.accepted.lock().unwrap().push(AcceptedDelivery {
                    subject: message.subject.clone(),
                    recipients: routing
                        .recipients
                        .iter()
                        .map(|a| a.as_str().to_string())
                        .collect(),
                    cc: routing.cc.iter().map(|a| a.as_str().to_string()).collect(),
                });
                Ok(Delivery::new(format!("{}-msg-{call}", self.kind)))
            }
            Scripted::AuthFailure => Err(ChannelError::auth("API key is invalid")),
            Scripted::TransientFailure => Err(ChannelError::network("connection reset")),
            Scripted::PermanentFailure => Err(ChannelError::RecipientRejected(
                "550 mailbox unavailable".to_string(),
            )),
        }
    }
}

/// A routing profile pointing at the given recipients.
pub fn routing_to(sender: &str, recipients: &[&str], cc: &[&str]) -> RoutingProfile {
    RoutingProfile {
        sender: sender.parse().unwrap(),
        recipients: recipients.iter().map(|r| r.parse().unwrap()).collect(),
        cc: cc.iter().map(|c| c.parse().unwrap()).collect(),
    }
}

/// A valid ticket for the given issue type and submitter.
pub fn ticket(issue_type: &str, name: &str) -> deskmail_core::Ticket {
    deskmail_core::Ticket {
        name: name.to_string(),
        contact_email: "submitter@example.com".to_string(),
        phone: None,
        address: None,
        device_identifier: None,
        issue_type: issue_type.to_string(),
        urgency: deskmail_core::Urgency::Medium,
        description: format!("Ticket from {name}"),
    }
}
