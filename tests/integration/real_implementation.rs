//! Integration tests for the hand-over to the real implementation
//!
//! The recording backend drains the queue on activation the way the real
//! implementation does: in order, calling each method and settling deferreds.

use super::test_utils::{registry_with, RecordingBackend, ScriptedAcquirer};
use serde_json::json;
use std::time::Duration;
use usertour::{AttachError, CallArg, CallError, CallOutcome, ClientState, Method};

#[tokio::test]
async fn test_drain_settles_deferred_results_in_order() {
    let acquirer = ScriptedAcquirer::succeeding();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();

    client.init("env-1", None);
    let identify = client.identify("user-1", None);
    let failing = client.track("fail", None);
    let tracked = client.track("signed_up", None);

    client.load().await.unwrap();
    assert_eq!(client.state(), ClientState::Loading);

    let backend = RecordingBackend::new();
    client.attach(backend.clone()).unwrap();

    assert_eq!(client.state(), ClientState::Active);
    assert!(!client.is_stubbed());
    assert!(registry.queue().is_empty());
    assert_eq!(identify.await, Ok(json!({"method": "identify"})));
    assert_eq!(failing.await, Err(CallError::Rejected("track failed".to_string())));
    assert_eq!(tracked.await, Ok(json!({"method": "track"})));

    let methods: Vec<Method> = backend.calls().iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec![Method::Init, Method::Identify, Method::Track, Method::Track]
    );
    assert!(backend.calls().iter().all(|c| c.from_queue));
    assert_eq!(backend.calls()[0].args, vec![CallArg::Value(json!("env-1"))]);
}

#[tokio::test]
async fn test_calls_after_activation_bypass_the_queue() {
    let acquirer = ScriptedAcquirer::succeeding();
    let registry = registry_with(acquirer.clone());
    let client = registry.get_or_create_client();

    let backend = RecordingBackend::new();
    client.attach(backend.clone()).unwrap();

    client.reset();
    let result = client.group("acme", None);
    assert!(client.is_identified());

    assert_eq!(result.await, Ok(json!({"method": "group"})));
    assert!(registry.queue().is_empty());
    assert_eq!(client.loader().attempts(), 0);
    assert_eq!(acquirer.calls(), 0);

    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| !c.from_queue));
    let methods: Vec<Method> = calls.iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec![Method::Reset, Method::Group, Method::IsIdentified]
    );
    assert!(calls[0].args.is_empty());
    assert_eq!(calls[1].args, vec![CallArg::Value(json!("acme"))]);
}

#[tokio::test]
async fn test_forwarded_calls_execute_in_issue_order() {
    let acquirer = ScriptedAcquirer::succeeding();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();

    let backend = RecordingBackend::new();
    client.attach(backend.clone()).unwrap();

    let mut attrs = usertour::Attributes::new();
    attrs.insert("plan".to_string(), json!("pro"));
    let tracked = client.track("first", Some(attrs));
    client.reset();

    let calls = backend.calls();
    let methods: Vec<Method> = calls.iter().map(|c| c.method).collect();
    assert_eq!(methods, vec![Method::Track, Method::Reset]);
    assert_eq!(
        calls[0].args,
        vec![
            CallArg::Value(json!("first")),
            CallArg::Value(json!({"plan": "pro"}))
        ]
    );
    assert_eq!(tracked.await, Ok(json!({"method": "track"})));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_calls_during_activation_run_after_the_drain() {
    let acquirer = ScriptedAcquirer::succeeding();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();
    client.init("env-1", None);

    let backend = RecordingBackend::with_activation_delay(Duration::from_millis(200));
    let attaching = {
        let client = client.clone();
        let backend = backend.clone();
        std::thread::spawn(move || client.attach(backend))
    };
    let caller = {
        let client = client.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            client.reset();
            let tracked = client.track("late", None);
            let identified = client.is_identified();
            (tracked, identified)
        })
    };

    let (tracked, identified) = caller.join().unwrap();
    attaching.join().unwrap().unwrap();

    assert!(identified);
    assert_eq!(tracked.await, Ok(json!({"method": "track"})));
    let order: Vec<(Method, bool)> = backend
        .calls()
        .iter()
        .map(|c| (c.method, c.from_queue))
        .collect();
    assert_eq!(order[0], (Method::Init, true));
    let methods: Vec<Method> = order.iter().map(|(m, _)| *m).collect();
    assert_eq!(
        methods,
        vec![Method::Init, Method::Reset, Method::Track, Method::IsIdentified]
    );
    assert_eq!(client.state(), ClientState::Active);
}

#[tokio::test]
async fn test_calling_convention_survives_activation() {
    let acquirer = ScriptedAcquirer::succeeding();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();
    client.attach(RecordingBackend::new()).unwrap();

    assert!(matches!(client.call(Method::Init, vec![]), CallOutcome::Void));
    assert!(matches!(
        client.call(Method::Start, vec![]),
        CallOutcome::Pending(_)
    ));
    assert!(matches!(
        client.call(Method::IsIdentified, vec![]),
        CallOutcome::Immediate(_)
    ));
}

#[tokio::test]
async fn test_activation_happens_once() {
    let acquirer = ScriptedAcquirer::succeeding();
    let registry = registry_with(acquirer);
    let client = registry.get_or_create_client();

    client.attach(RecordingBackend::new()).unwrap();
    assert_eq!(
        client.attach(RecordingBackend::new()),
        Err(AttachError::AlreadyActive)
    );
    assert!(registry.queue().is_sealed());
}
