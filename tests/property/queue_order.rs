//! Property-based tests for queue ordering guarantees

use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::Arc;
use usertour::config::SnippetConfig;
use usertour::loader::{LoadedScript, ResourceAcquirer};
use usertour::target::ScriptSource;
use usertour::{CallArg, CallingConvention, LoadError, Method, Registry};

struct StalledAcquirer;

#[async_trait]
impl ResourceAcquirer for StalledAcquirer {
    async fn acquire(&self, _source: &ScriptSource) -> Result<LoadedScript, LoadError> {
        futures::future::pending().await
    }
}

fn method_strategy() -> impl Strategy<Value = Method> {
    let methods: Vec<Method> = Method::all().collect();
    proptest::sample::select(methods)
}

/// For any call sequence issued before load completes, the queue holds exactly
/// the queued calls, in issuance order, and only one load attempt was started.
#[test]
fn test_queue_matches_issuance_order_property() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &proptest::collection::vec(method_strategy(), 0..64),
            |calls| {
                let registry = Registry::new(
                    &SnippetConfig::default(),
                    Arc::new(StalledAcquirer),
                    runtime.handle().clone(),
                );
                let client = registry.get_or_create_client();

                let mut expected = Vec::new();
                for (i, method) in calls.iter().enumerate() {
                    let _ = client.call(*method, vec![CallArg::Value(i.into())]);
                    if !matches!(method.convention(), CallingConvention::SyncDefault(_)) {
                        expected.push((*method, i));
                    }
                }

                let queued: Vec<(Method, usize)> = registry.queue().with_entries(|entries| {
                    entries
                        .iter()
                        .map(|e| {
                            let index = e.args()[0]
                                .as_value()
                                .and_then(|v| v.as_u64())
                                .unwrap_or(u64::MAX) as usize;
                            (e.method(), index)
                        })
                        .collect()
                });
                prop_assert_eq!(queued, expected.clone());

                let attempts = client.loader().attempts();
                prop_assert_eq!(attempts, if expected.is_empty() { 0 } else { 1 });
                Ok(())
            },
        )
        .unwrap();
}
