//! Integration test for the process-wide registry slot.
//!
//! This is the only test in the binary that touches the global slot.

use super::test_utils::{registry_with, ScriptedAcquirer};
use usertour::registry;

#[tokio::test]
async fn test_second_install_reuses_the_first_registry() {
    let first = registry::install_global(registry_with(ScriptedAcquirer::succeeding()));
    let client = first.get_or_create_client();
    client.set_target_missing_seconds(6);

    let second = registry::install_global(registry_with(ScriptedAcquirer::succeeding()));
    assert!(std::ptr::eq(first, second));
    assert!(second.get_or_create_client().ptr_eq(&client));
    assert_eq!(second.queue().len(), 1);

    let looked_up = registry::global().expect("installed above");
    assert!(std::ptr::eq(looked_up, first));
}
