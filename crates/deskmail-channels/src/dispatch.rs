//! The dispatch entry point.
//!
//! [`Dispatcher`] owns one router per ticket category, wired from the
//! validated configuration at process start. It is cheap to share behind
//! an `Arc` and safe to call from any number of concurrent tasks.

use crate::report::{self, DispatchResponse};
use crate::resend::ResendAdapter;
use crate::router::{DeliveryRouter, RouterOutcome};
use crate::smtp::SmtpAdapter;
use crate::traits::ChannelAdapter;
use deskmail_core::config::{Config, ValidationReport};
use deskmail_core::format::format_ticket;
use deskmail_core::{id, Category, ChannelKind, RoutingProfile, Ticket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Per-category wiring: the channels to walk and where mail goes.
struct CategoryDispatcher {
    router: DeliveryRouter,
    routing: Option<RoutingProfile>,
    /// Guards the once-per-profile "nothing usable" log line.
    unroutable_logged: AtomicBool,
}

impl CategoryDispatcher {
    fn from_config(
        category: Category,
        config: &Config,
        validation: &ValidationReport,
        timeout: Duration,
        backoff: Duration,
    ) -> Self {
        let category_config = config.category(category);
        let mut adapters: Vec<Arc<dyn ChannelAdapter>> = Vec::new();

        for kind in validation.usable_channels(category, &category_config.preference) {
            match kind {
                ChannelKind::Resend => {
                    if let Some(resend) = &category_config.resend {
                        adapters.push(Arc::new(ResendAdapter::new(resend, timeout)));
                    }
                }
                ChannelKind::Smtp => {
                    if let Some(smtp) = &category_config.smtp {
                        match SmtpAdapter::new(smtp, timeout) {
                            Ok(adapter) => adapters.push(Arc::new(adapter)),
                            Err(e) => warn!(
                                category = %category,
                                "smtp transport setup failed, channel disabled: {e}"
                            ),
                        }
                    }
                }
            }
        }

        let routing = if validation.routing_usable(category) {
            category_config
                .routing
                .as_ref()
                .and_then(|r| r.to_profile().ok())
        } else {
            None
        };

        Self {
            router: DeliveryRouter::new(adapters, backoff),
            routing,
            unroutable_logged: AtomicBool::new(false),
        }
    }

    fn log_unroutable_once(&self, category: Category) {
        if !self.unroutable_logged.swap(true, Ordering::Relaxed) {
            error!(
                category = %category,
                "no usable delivery channel for this category; dispatches will fail until restart"
            );
        }
    }
}

/// The notification dispatcher.
pub struct Dispatcher {
    support: CategoryDispatcher,
    sales: CategoryDispatcher,
}

impl Dispatcher {
    /// Build a dispatcher from configuration.
    ///
    /// Runs startup validation, emits its diagnostics, and constructs real
    /// adapters only for the channels that survived. Never fails: with
    /// nothing usable, every dispatch returns a configuration failure.
    pub fn from_config(config: &Config) -> Self {
        let validation = config.validate();
        validation.log_startup();

        let timeout = config.delivery_timeout();
        let backoff = config.retry_backoff();

        Self {
            support: CategoryDispatcher::from_config(
                Category::Support,
                config,
                &validation,
                timeout,
                backoff,
            ),
            sales: CategoryDispatcher::from_config(
                Category::Sales,
                config,
                &validation,
                timeout,
                backoff,
            ),
        }
    }

    /// Build a dispatcher with explicit adapters and routing, bypassing
    /// configuration. Used by tests and embedders with custom transports.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    fn category(&self, category: Category) -> &CategoryDispatcher {
        match category {
            Category::Support => &self.support,
            Category::Sales => &self.sales,
        }
    }

    /// Channels currently available for a category, in preference order.
    pub fn available_channels(&self, category: Category) -> Vec<ChannelKind> {
        self.category(category).router.available_channels()
    }

    /// Deliver one ticket to its category's recipients.
    ///
    /// Always returns a structured response; delivery failures never
    /// surface as errors or panics. Exactly one response is produced per
    /// call no matter how many channels were attempted.
    pub async fn dispatch_ticket(&self, ticket: &Ticket) -> DispatchResponse {
        let dispatch_id = id::dispatch_id();

        let category = match ticket.validate() {
            Ok(category) => category,
            Err(e) => {
                debug!(dispatch_id = %dispatch_id, error = %e, "ticket rejected before dispatch");
                return DispatchResponse::rejected(dispatch_id, e.to_string());
            }
        };

        let dispatcher = self.category(category);
        let Some(routing) = &dispatcher.routing else {
            dispatcher.log_unroutable_once(category);
            return DispatchResponse::unroutable(dispatch_id, category);
        };

        let message = format_ticket(ticket);
        let outcome = dispatcher.router.deliver(&message, routing).await;

        if matches!(outcome, RouterOutcome::NoChannel) {
            dispatcher.log_unroutable_once(category);
        }

        report::report(dispatch_id, category, outcome)
    }
}

/// Builder for dispatchers with injected adapters.
pub struct DispatcherBuilder {
    support_adapters: Vec<Arc<dyn ChannelAdapter>>,
    sales_adapters: Vec<Arc<dyn ChannelAdapter>>,
    support_routing: Option<RoutingProfile>,
    sales_routing: Option<RoutingProfile>,
    retry_backoff: Duration,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            support_adapters: Vec::new(),
            sales_adapters: Vec::new(),
            support_routing: None,
            sales_routing: None,
            retry_backoff: Duration::from_millis(500),
        }
    }

    /// Append a channel to a category's preference list.
    pub fn channel(mut self, category: Category, adapter: Arc<dyn ChannelAdapter>) -> Self {
        match category {
            Category::Support => self.support_adapters.push(adapter),
            Category::Sales => self.sales_adapters.push(adapter),
        }
        self
    }

    /// Set a category's routing profile.
    pub fn routing(mut self, category: Category, profile: RoutingProfile) -> Self {
        match category {
            Category::Support => self.support_routing = Some(profile),
            Category::Sales => self.sales_routing = Some(profile),
        }
        self
    }

    /// Override the backoff before the single transient retry.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            support: CategoryDispatcher {
                router: DeliveryRouter::new(self.support_adapters, self.retry_backoff),
                routing: self.support_routing,
                unroutable_logged: AtomicBool::new(false),
            },
            sales: CategoryDispatcher {
                router: DeliveryRouter::new(self.sales_adapters, self.retry_backoff),
                routing: self.sales_routing,
                unroutable_logged: AtomicBool::new(false),
            },
        }
    }
}
