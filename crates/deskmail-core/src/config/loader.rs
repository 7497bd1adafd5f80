//! Configuration loading and startup validation.

use super::{CategoryConfig, Config, ResendConfig, RoutingConfig, SmtpConfig};
use crate::env;
use crate::error::ConfigProblem;
use crate::types::{Category, ChannelKind};
use tracing::{info, warn};

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// Never fails: a missing or malformed group leaves the channel in a
    /// state that [`Config::validate`] reports and disables. Startup
    /// degrades to fewer channels instead of refusing to start.
    pub fn from_env() -> Self {
        Self {
            support: category_from_env(Category::Support),
            sales: category_from_env(Category::Sales),
            delivery_timeout_secs: env::get_u64(env::vars::DELIVERY_TIMEOUT_SECS).unwrap_or(10),
            retry_backoff_ms: env::get_u64(env::vars::RETRY_BACKOFF_MS).unwrap_or(500),
        }
    }

    /// Validate every configured channel and routing profile.
    ///
    /// Collects all problems before returning so the operator sees the
    /// full picture at once; a channel with any problem is unavailable for
    /// the remainder of the process lifetime.
    pub fn validate(&self) -> ValidationReport {
        let mut problems = Vec::new();
        let support = validate_category(Category::Support, &self.support, &mut problems);
        let sales = validate_category(Category::Sales, &self.sales, &mut problems);

        ValidationReport {
            problems,
            support,
            sales,
        }
    }
}

fn category_from_env(category: Category) -> CategoryConfig {
    let resend = env::get_var(&env::vars::resend_api_key(category)).map(|key| ResendConfig {
        api_key: key.into(),
        api_url: env::get_var_or(
            &env::vars::resend_api_url(category),
            "https://api.resend.com",
        ),
    });

    let host = env::get_var(&env::vars::smtp_host(category));
    let port_raw = env::get_var(&env::vars::smtp_port(category));
    let username = env::get_var(&env::vars::smtp_username(category));
    let password = env::get_var(&env::vars::smtp_password(category));

    // Any SMTP variable present means the operator intended to configure
    // the channel; missing companions become validation problems rather
    // than silence.
    let smtp = if host.is_some() || port_raw.is_some() || username.is_some() || password.is_some() {
        Some(SmtpConfig {
            host: host.unwrap_or_default(),
            // A malformed port is kept as 0 so validation can report it.
            port: port_raw.map_or(587, |raw| raw.parse().unwrap_or(0)),
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default().into(),
        })
    } else {
        None
    };

    let sender = env::get_var(&env::vars::sender(category));
    let recipients = env::get_list(&env::vars::recipients(category));
    let cc = env::get_list(&env::vars::cc(category));

    let routing = if sender.is_some() || !recipients.is_empty() {
        Some(RoutingConfig {
            sender: sender.unwrap_or_default(),
            recipients,
            cc,
        })
    } else {
        None
    };

    CategoryConfig {
        resend,
        smtp,
        routing,
        preference: vec![ChannelKind::Resend, ChannelKind::Smtp],
    }
}

fn validate_category(
    category: Category,
    config: &CategoryConfig,
    problems: &mut Vec<ConfigProblem>,
) -> CategoryStatus {
    let mut status = CategoryStatus::default();
    let before = problems.len();

    if let Some(routing) = &config.routing {
        if routing.sender.is_empty() {
            push(problems, category, None, "sender address is not set");
        } else if let Err(e) = routing.sender.parse::<crate::types::Address>() {
            push(problems, category, None, &format!("sender: {e}"));
        }
        if routing.recipients.is_empty() {
            push(problems, category, None, "no recipients configured");
        }
        for recipient in &routing.recipients {
            if let Err(e) = recipient.parse::<crate::types::Address>() {
                push(problems, category, None, &format!("recipient: {e}"));
            }
        }
        for cc in &routing.cc {
            if let Err(e) = cc.parse::<crate::types::Address>() {
                push(problems, category, None, &format!("cc: {e}"));
            }
        }
        status.routing_ok = problems.len() == before;
    }

    if let Some(resend) = &config.resend {
        let before = problems.len();
        if resend.api_key.is_empty() {
            push(
                problems,
                category,
                Some(ChannelKind::Resend),
                "api key is not set",
            );
        } else if !resend.api_key.expose_secret().starts_with("re_") {
            push(
                problems,
                category,
                Some(ChannelKind::Resend),
                &format!(
                    "api key '{}' does not start with 're_'",
                    resend.api_key.safe_preview()
                ),
            );
        }
        if resend.api_url.is_empty() {
            push(
                problems,
                category,
                Some(ChannelKind::Resend),
                "api url is empty",
            );
        }
        status.resend_ok = problems.len() == before;
    }

    if let Some(smtp) = &config.smtp {
        let before = problems.len();
        if smtp.host.is_empty() {
            push(problems, category, Some(ChannelKind::Smtp), "host is not set");
        }
        if smtp.port == 0 {
            push(problems, category, Some(ChannelKind::Smtp), "invalid port");
        }
        if smtp.username.is_empty() {
            push(
                problems,
                category,
                Some(ChannelKind::Smtp),
                "username is not set",
            );
        }
        if smtp.password.is_empty() {
            push(
                problems,
                category,
                Some(ChannelKind::Smtp),
                "password is not set",
            );
        }
        status.smtp_ok = problems.len() == before;
    }

    status
}

fn push(
    problems: &mut Vec<ConfigProblem>,
    category: Category,
    channel: Option<ChannelKind>,
    message: &str,
) {
    problems.push(ConfigProblem {
        category,
        channel,
        message: message.to_string(),
    });
}

/// Result of startup validation.
///
/// Read-only snapshot: which problems were found and which channels and
/// routing profiles survived them.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Every problem found, across all categories.
    pub problems: Vec<ConfigProblem>,

    support: CategoryStatus,
    sales: CategoryStatus,
}

#[derive(Debug, Clone, Copy, Default)]
struct CategoryStatus {
    routing_ok: bool,
    resend_ok: bool,
    smtp_ok: bool,
}

impl ValidationReport {
    fn status(&self, category: Category) -> CategoryStatus {
        match category {
            Category::Support => self.support,
            Category::Sales => self.sales,
        }
    }

    /// Whether a channel is configured and passed validation.
    pub fn channel_usable(&self, category: Category, kind: ChannelKind) -> bool {
        let status = self.status(category);
        match kind {
            ChannelKind::Resend => status.resend_ok,
            ChannelKind::Smtp => status.smtp_ok,
        }
    }

    /// Whether a category has a usable routing profile.
    pub fn routing_usable(&self, category: Category) -> bool {
        self.status(category).routing_ok
    }

    /// The preference list filtered down to usable channels.
    pub fn usable_channels(
        &self,
        category: Category,
        preference: &[ChannelKind],
    ) -> Vec<ChannelKind> {
        preference
            .iter()
            .copied()
            .filter(|kind| self.channel_usable(category, *kind))
            .collect()
    }

    /// Emit the startup diagnostics: one record per invalid channel or
    /// routing profile, then a per-category availability summary.
    pub fn log_startup(&self) {
        for problem in &self.problems {
            warn!(
                category = %problem.category,
                channel = problem.channel.map(|c| c.as_str()).unwrap_or("routing"),
                "configuration problem: {problem}"
            );
        }

        for category in [Category::Support, Category::Sales] {
            let status = self.status(category);
            let mut available = Vec::new();
            if status.resend_ok {
                available.push(ChannelKind::Resend.as_str());
            }
            if status.smtp_ok {
                available.push(ChannelKind::Smtp.as_str());
            }

            if available.is_empty() {
                info!(category = %category, "no delivery channels available");
            } else {
                info!(
                    category = %category,
                    channels = available.join(","),
                    routing = status.routing_ok,
                    "delivery channels available"
                );
            }
        }
    }
}
