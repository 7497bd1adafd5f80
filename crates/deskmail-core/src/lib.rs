//! # deskmail-core
//!
//! Core types, configuration, and utilities for deskmail.
//!
//! This crate provides the pieces shared by every deskmail crate:
//!
//! - **Configuration**: environment-loaded channel credentials and routing
//!   profiles, validated once at startup
//! - **Types**: tickets, routing profiles, and formatted messages
//! - **Formatting**: the pure ticket-to-email formatter

pub mod config;
pub mod env;
pub mod error;
pub mod format;
pub mod id;
pub mod logging;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use secret::SecretString;
pub use types::*;
