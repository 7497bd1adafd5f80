//! Scripted adapters for unit tests.

use crate::error::ChannelError;
use crate::traits::{ChannelAdapter, Delivery};
use crate::Result;
use async_trait::async_trait;
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

/// Adapter with a scripted outcome sequence; succeeds once the script
/// runs out. Records every delivery it accepted for assertions.
pub struct ScriptedAdapter {
    kind: ChannelKind,
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    delivered: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedAdapter {
    pub fn new(kind: ChannelKind, script: &[Scripted]) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script: Mutex::new(script.iter().copied().collect()),
            calls: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        })
    }

    /// Total calls seen, including failures.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Subjects and recipient lists of accepted deliveries.
    pub fn delivered(&self) -> Vec<(String, Vec<String>)> {
        self.delivered.lock().unwrap().clone()
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
    ) -> Result<Delivery> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Deliver);

        match next {
            Scripted::Deliver => {
                self.delivered.lock().unwrap().push((
                    message.subject.clone(),
                    routing
                        .recipients
                        .iter()
                        .map(|a| a.as_str().to_string())
                        .collect(),
                ));
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
