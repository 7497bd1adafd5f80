//! Concurrent dispatch isolation.

use deskmail_channels::Dispatcher;
use deskmail_core::{Category, ChannelKind};
use deskmail_integration_tests::{routing_to, ticket, ScriptedAdapter};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_keep_per_ticket_outcomes_isolated() {
    const PER_CATEGORY: usize = 30;

    let support = ScriptedAdapter::succeeding(ChannelKind::Resend);
    let sales = ScriptedAdapter::succeeding(ChannelKind::Smtp);

    let dispatcher = Arc::new(
        Dispatcher::builder()
            .channel(Category::Support, support.clone())
            .routing(
                Category::Support,
                routing_to("noreply@example.com", &["desk@example.com"], &[]),
            )
            .channel(Category::Sales, sales.clone())
            .routing(
                Category::Sales,
                routing_to("noreply@example.com", &["sales@example.com"], &["crm@example.com"]),
            )
            .build(),
    );

    let mut tasks = JoinSet::new();
    for i in 0..PER_CATEGORY {
        let d = dispatcher.clone();
        tasks.spawn(async move {
            let response = d.dispatch_ticket(&ticket("repair", &format!("Support User {i}"))).await;
            (Category::Support, i, response)
        });

        let d = dispatcher.clone();
        tasks.spawn(async move {
            let response = d.dispatch_ticket(&ticket("quote", &format!("Sales User {i}"))).await;
            (Category::Sales, i, response)
        });
    }

    let mut message_ids = HashSet::new();
    let mut completed = 0;
    while let Some(result) = tasks.join_next().await {
        let (category, i, response) = result.unwrap();
        completed += 1;

        assert!(response.success, "{category} ticket {i} failed: {:?}", response.error);
        assert_eq!(response.attempts.len(), 1);
        let message_id = response.message_id.unwrap();
        assert!(
            message_ids.insert(message_id.clone()),
            "duplicate message id {message_id}"
        );
    }
    assert_eq!(completed, PER_CATEGORY * 2);

    // Every delivery went to its own category's recipients.
    let support_accepted = support.accepted();
    let sales_accepted = sales.accepted();
    assert_eq!(support_accepted.len(), PER_CATEGORY);
    assert_eq!(sales_accepted.len(), PER_CATEGORY);

    for delivery in &support_accepted {
        assert_eq!(delivery.recipients, vec!["desk@example.com"]);
        assert!(delivery.cc.is_empty());
        assert!(delivery.subject.contains("Support User"));
    }
    for delivery in &sales_accepted {
        assert_eq!(delivery.recipients, vec!["sales@example.com"]);
        assert_eq!(delivery.cc, vec!["crm@example.com"]);
        assert!(delivery.subject.contains("Sales User"));
    }

    // Each submitter appears exactly once per category.
    let support_subjects: HashSet<_> = support_accepted.iter().map(|d| d.subject.clone()).collect();
    assert_eq!(support_subjects.len(), PER_CATEGORY);
}
