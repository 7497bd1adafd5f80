//! End-to-end dispatch flows against scripted adapters.

use deskmail_channels::{Dispatcher, ErrorKind};
use deskmail_core::{Category, ChannelKind, Urgency};
use deskmail_integration_tests::{routing_to, ticket, Scripted, ScriptedAdapter};
use std::time::Duration;

fn support_routing() -> deskmail_core::RoutingProfile {
    routing_to(
        "noreply@example.com",
        &["desk@example.com", "oncall@example.com"],
        &["lead@example.com"],
    )
}

#[tokio::test]
async fn dispatch_succeeds_on_fully_configured_channel() {
    let adapter = ScriptedAdapter::succeeding(ChannelKind::Resend);
    let dispatcher = Dispatcher::builder()
        .channel(Category::Support, adapter.clone())
        .routing(Category::Support, support_routing())
        .build();

    let response = dispatcher.dispatch_ticket(&ticket("repair", "Ada Lovelace")).await;

    assert!(response.success);
    let message_id = response.message_id.expect("message id on success");
    assert!(!message_id.is_empty());
    assert_eq!(response.channel, Some(ChannelKind::Resend));
    assert!(response.error.is_none());

    let accepted = adapter.accepted();
    assert_eq!(accepted.len(), 1);
    assert_eq!(
        accepted[0].recipients,
        vec!["desk@example.com", "oncall@example.com"]
    );
    assert_eq!(accepted[0].cc, vec!["lead@example.com"]);
}

#[tokio::test(start_paused = true)]
async fn transient_primary_fails_over_after_one_retry() {
    let primary = ScriptedAdapter::new(
        ChannelKind::Resend,
        &[Scripted::TransientFailure, Scripted::TransientFailure],
    );
    let secondary = ScriptedAdapter::succeeding(ChannelKind::Smtp);
    let dispatcher = Dispatcher::builder()
        .channel(Category::Support, primary.clone())
        .channel(Category::Support, secondary.clone())
        .routing(Category::Support, support_routing())
        .build();

    let response = dispatcher.dispatch_ticket(&ticket("repair", "Ada Lovelace")).await;

    assert!(response.success);
    assert_eq!(response.channel, Some(ChannelKind::Smtp));

    // The trail shows exactly two primary attempts (initial + one retry)
    // before the failover.
    assert_eq!(response.attempts.len(), 3);
    assert_eq!(response.attempts[0].channel, ChannelKind::Resend);
    assert_eq!(response.attempts[1].channel, ChannelKind::Resend);
    assert_eq!(response.attempts[2].channel, ChannelKind::Smtp);
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn auth_failure_fails_over_immediately_and_sticks() {
    let primary = ScriptedAdapter::new(ChannelKind::Resend, &[Scripted::AuthFailure]);
    let secondary = ScriptedAdapter::succeeding(ChannelKind::Smtp);
    let dispatcher = Dispatcher::builder()
        .channel(Category::Support, primary.clone())
        .channel(Category::Support, secondary.clone())
        .routing(Category::Support, support_routing())
        .build();

    let first = dispatcher.dispatch_ticket(&ticket("repair", "Ada Lovelace")).await;
    assert!(first.success);
    // Exactly one primary attempt, no retry on a rejected credential.
    assert_eq!(first.attempts.len(), 2);
    assert_eq!(primary.calls(), 1);

    // The channel stays disabled for the rest of the process.
    assert_eq!(
        dispatcher.available_channels(Category::Support),
        vec![ChannelKind::Smtp]
    );
    let second = dispatcher.dispatch_ticket(&ticket("warranty", "Grace Hopper")).await;
    assert!(second.success);
    assert_eq!(primary.calls(), 1);
    assert_eq!(second.attempts.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_channels_report_the_last_failure() {
    let primary = ScriptedAdapter::new(
        ChannelKind::Resend,
        &[Scripted::TransientFailure, Scripted::TransientFailure],
    );
    let secondary = ScriptedAdapter::new(ChannelKind::Smtp, &[Scripted::PermanentFailure]);
    let dispatcher = Dispatcher::builder()
        .channel(Category::Support, primary)
        .channel(Category::Support, secondary)
        .routing(Category::Support, support_routing())
        .build();

    let response = dispatcher.dispatch_ticket(&ticket("repair", "Ada Lovelace")).await;

    assert!(!response.success);
    assert!(response.message_id.is_none());
    let error = response.error.expect("error on failure");
    assert!(error.contains(ErrorKind::Permanent.as_str()));
    assert!(error.contains("550"));
    assert_eq!(response.attempts.len(), 3);
}

#[tokio::test]
async fn critical_urgency_reaches_the_provider_in_the_subject() {
    let adapter = ScriptedAdapter::succeeding(ChannelKind::Resend);
    let dispatcher = Dispatcher::builder()
        .channel(Category::Support, adapter.clone())
        .routing(Category::Support, support_routing())
        .build();

    let mut urgent = ticket("repair", "Ada Lovelace");
    urgent.urgency = Urgency::Critical;
    dispatcher.dispatch_ticket(&urgent).await;

    assert!(adapter.accepted()[0].subject.contains("[CRITICAL]"));
}

#[tokio::test]
async fn response_serializes_with_attempt_trail() {
    let primary = ScriptedAdapter::new(ChannelKind::Resend, &[Scripted::PermanentFailure]);
    let secondary = ScriptedAdapter::succeeding(ChannelKind::Smtp);
    let dispatcher = Dispatcher::builder()
        .channel(Category::Support, primary)
        .channel(Category::Support, secondary)
        .routing(Category::Support, support_routing())
        .build();

    let response = dispatcher.dispatch_ticket(&ticket("repair", "Ada Lovelace")).await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["channel"], "smtp");
    assert_eq!(json["attempts"][0]["channel"], "resend");
    assert_eq!(json["attempts"][0]["result"], "failed");
    assert_eq!(json["attempts"][0]["kind"], "permanent");
    assert_eq!(json["attempts"][1]["result"], "delivered");
}
