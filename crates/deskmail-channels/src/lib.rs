//! Delivery channels for deskmail.
//!
//! This crate provides the channel adapter trait, the two concrete email
//! transports (Resend HTTP API and SMTP), the failover router, and the
//! [`Dispatcher`] entry point the surrounding application calls.

pub mod dispatch;
pub mod error;
pub mod report;
pub mod resend;
pub mod router;
pub mod smtp;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use error::{ChannelError, ErrorKind};
pub use report::DispatchResponse;
pub use resend::ResendAdapter;
pub use router::{Attempt, AttemptOutcome, DeliveryRouter, RouterOutcome};
pub use smtp::SmtpAdapter;
pub use traits::{ChannelAdapter, Delivery};

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
