//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a u64.
pub fn get_u64(name: &str) -> Option<u64> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Split a comma-separated environment variable into trimmed entries.
pub fn get_list(name: &str) -> Vec<String> {
    get_var(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Names of the environment variables deskmail reads at startup.
///
/// Channel credentials and routing data are grouped per ticket category;
/// the per-category names are built from the category prefix.
pub mod vars {
    use crate::types::Category;

    /// Delivery timeout applied to each external call, in seconds.
    pub const DELIVERY_TIMEOUT_SECS: &str = "DESKMAIL_DELIVERY_TIMEOUT_SECS";

    /// Fixed backoff before the single transient retry, in milliseconds.
    pub const RETRY_BACKOFF_MS: &str = "DESKMAIL_RETRY_BACKOFF_MS";

    fn prefix(category: Category) -> &'static str {
        match category {
            Category::Support => "SUPPORT",
            Category::Sales => "SALES",
        }
    }

    /// Resend API key for a category.
    pub fn resend_api_key(category: Category) -> String {
        format!("DESKMAIL_{}_RESEND_API_KEY", prefix(category))
    }

    /// Resend API base URL override for a category.
    pub fn resend_api_url(category: Category) -> String {
        format!("DESKMAIL_{}_RESEND_API_URL", prefix(category))
    }

    pub fn smtp_host(category: Category) -> String {
        format!("DESKMAIL_{}_SMTP_HOST", prefix(category))
    }

    pub fn smtp_port(category: Category) -> String {
        format!("DESKMAIL_{}_SMTP_PORT", prefix(category))
    }

    pub fn smtp_username(category: Category) -> String {
        format!("DESKMAIL_{}_SMTP_USERNAME", prefix(category))
    }

    pub fn smtp_password(category: Category) -> String {
        format!("DESKMAIL_{}_SMTP_PASSWORD", prefix(category))
    }

    /// Sender address for a category's routing profile.
    pub fn sender(category: Category) -> String {
        format!("DESKMAIL_{}_SENDER", prefix(category))
    }

    /// Comma-separated primary recipients for a category.
    pub fn recipients(category: Category) -> String {
        format!("DESKMAIL_{}_RECIPIENTS", prefix(category))
    }

    /// Comma-separated CC recipients for a category.
    pub fn cc(category: Category) -> String {
        format!("DESKMAIL_{}_CC", prefix(category))
    }
}
