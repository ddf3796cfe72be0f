//! Integration tests for the stub client's call interception
//!
//! Tests cover:
//! - Queue order across mixed methods
//! - Synchronous defaults
//! - Promise-returning calls handing back distinct pending results
//! - Void calls staying silent when loading fails

use super::test_utils::{first_args, registry_with, ScriptedAcquirer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use usertour::{Attributes, CallArg, CallOutcome, ClientState, Method};

#[tokio::test]
async fn test_track_calls_queue_in_order() {
    let (acquirer, _gate) = ScriptedAcquirer::gated();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();

    let _a = client.track("a", None);
    let _b = client.track("b", None);

    assert_eq!(registry.queue().methods(), vec![Method::Track, Method::Track]);
    assert_eq!(first_args(registry.queue()), vec![json!("a"), json!("b")]);
}

#[tokio::test]
async fn test_is_identified_before_load() {
    let acquirer = ScriptedAcquirer::succeeding();
    let registry = registry_with(acquirer.clone());
    let client = registry.get_or_create_client();

    assert!(!client.is_identified());
    assert!(registry.queue().is_empty());
    assert_eq!(client.loader().attempts(), 0);
    tokio::task::yield_now().await;
    assert_eq!(acquirer.calls(), 0);
}

#[tokio::test]
async fn test_mixed_calls_keep_issuance_order() {
    let (acquirer, _gate) = ScriptedAcquirer::gated();
    let registry = registry_with(acquirer.clone());
    let client = registry.get_or_create_client();

    client.init("env-1", None);
    let _identify = client.identify("user-1", None);
    client.set_base_z_index(2000);
    assert!(!client.is_identified());
    let _group = client.group("acme", None);
    let listener: usertour::Callback = Arc::new(|_: &[serde_json::Value]| serde_json::Value::Null);
    client.on("checklist_completed", listener);
    let _track = client.track("signed_up", None);
    client.reset();

    assert_eq!(
        registry.queue().methods(),
        vec![
            Method::Init,
            Method::Identify,
            Method::SetBaseZIndex,
            Method::Group,
            Method::On,
            Method::Track,
            Method::Reset,
        ]
    );
    registry.queue().with_entries(|entries| {
        let ids: Vec<_> = entries.iter().map(|e| e.id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(entries[4].args()[1].as_callback().is_some());
    });

    tokio::task::yield_now().await;
    assert_eq!(acquirer.calls(), 1);
}

#[tokio::test]
async fn test_generic_call_follows_table() {
    let (acquirer, _gate) = ScriptedAcquirer::gated();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();

    assert!(matches!(
        client.call(Method::Remount, vec![]),
        CallOutcome::Void
    ));
    assert!(matches!(
        client.call(Method::EndAll, vec![]),
        CallOutcome::Pending(_)
    ));
    match client.call(Method::IsIdentified, vec![]) {
        CallOutcome::Immediate(value) => assert_eq!(value, json!(false)),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(registry.queue().len(), 2);
}

#[tokio::test]
async fn test_promise_result_returned_before_any_work() {
    let (acquirer, gate) = ScriptedAcquirer::gated();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();

    let mut first = client.identify("user-1", None);
    let mut second = client.identify("user-1", None);

    assert_ne!(first.id(), second.id());
    assert!(first.try_result().is_none());
    assert!(second.try_result().is_none());

    gate.notify_one();
    client.load().await.unwrap();
    // Loaded but nobody drained the queue: the results stay pending.
    assert!(tokio::time::timeout(Duration::from_millis(20), &mut first)
        .await
        .is_err());
    assert_eq!(registry.queue().len(), 2);
}

#[tokio::test]
async fn test_void_calls_do_not_surface_load_failure() {
    let acquirer = ScriptedAcquirer::always_failing();
    let registry = registry_with(acquirer.clone());
    let client = registry.get_or_create_client();

    client.init("env-1", None);
    client.set_server_endpoint("https://api.example.com");
    assert_eq!(registry.queue().len(), 2);

    // Wait for the failed attempt to settle.
    let _ = client.load().await;
    assert_eq!(client.state(), ClientState::Stub);
    assert_eq!(registry.queue().len(), 2);
}

#[tokio::test]
async fn test_typed_arguments_are_forwarded_verbatim() {
    let (acquirer, _gate) = ScriptedAcquirer::gated();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();

    let mut attrs = Attributes::new();
    attrs.insert("plan".to_string(), json!("pro"));
    attrs.insert("seats".to_string(), json!(12));
    let _ = client.update_user(attrs.clone());
    let _ = client.start("content-1", Some(usertour::StartOptions { once: true, step_index: None }));

    registry.queue().with_entries(|entries| {
        assert_eq!(entries[0].args(), &[CallArg::from(attrs.clone())]);
        assert_eq!(
            entries[1].args(),
            &[CallArg::from("content-1"), CallArg::Value(json!({"once": true}))]
        );
    });
}
