//! Integration tests for the plugin state machine.

mod helpers;

use std::collections::HashMap;
use std::sync::Arc;

use plughub_core::error::ErrorKind;
use plughub_runtime::lifecycle::LifecycleStage;
use plughub_runtime::validator::{self, CIRCULAR_DEPENDENCY};
use plughub_runtime::{Plugin, PluginManager, PluginState};

use helpers::{FlakyStore, Recorder};

#[tokio::test]
async fn test_register_twice_fails() {
    let manager = PluginManager::in_memory();
    manager.install(Plugin::new("seo", "1.0.0"), None).await.unwrap();

    let err = manager
        .install(Plugin::new("seo", "2.0.0"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyInstalled);

    let err = manager
        .plugin_registry()
        .register(Arc::new(Plugin::new("seo", "3.0.0")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyInstalled);
    assert_eq!(manager.plugin_registry().get("seo").await.unwrap().version, "1.0.0");
}

#[test]
fn test_cycle_reported_for_both_members() {
    let a = Arc::new(Plugin::new("plugin-a", "1.0.0").depends_on("plugin-b"));
    let b = Arc::new(Plugin::new("plugin-b", "1.0.0").depends_on("plugin-a"));
    let known: HashMap<String, Arc<Plugin>> = [a.clone(), b.clone()]
        .into_iter()
        .map(|p| (p.name.clone(), p))
        .collect();

    for plugin in [&a, &b] {
        let result = validator::validate(plugin, &known);
        assert!(!result.valid);
        assert_eq!(result.errors, vec![CIRCULAR_DEPENDENCY.to_string()]);
    }
}

#[tokio::test]
async fn test_activate_recursively_activates_dependencies() {
    let manager = PluginManager::in_memory();
    manager.install(Plugin::new("plugin-a", "1.0.0"), None).await.unwrap();
    manager
        .install(Plugin::new("plugin-b", "1.0.0").depends_on("plugin-a"), None)
        .await
        .unwrap();

    manager.activate("plugin-b").await.unwrap();

    assert!(manager.is_active("plugin-a").await);
    assert!(manager.is_active("plugin-b").await);
}

#[tokio::test]
async fn test_activate_twice_is_noop() {
    let manager = PluginManager::in_memory();
    let recorder = Recorder::new();
    manager
        .install(Plugin::new("seo", "1.0.0").with_lifecycle(recorder.clone()), None)
        .await
        .unwrap();

    manager.activate("seo").await.unwrap();
    manager.activate("seo").await.unwrap();
    manager.deactivate("seo").await.unwrap();
    manager.deactivate("seo").await.unwrap();

    assert_eq!(
        recorder.calls(),
        vec![
            LifecycleStage::Install,
            LifecycleStage::Activate,
            LifecycleStage::Deactivate,
        ]
    );
}

#[tokio::test]
async fn test_activate_unknown_plugin() {
    let manager = PluginManager::in_memory();
    let err = manager.activate("ghost").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_deactivate_blocked_by_active_dependent() {
    let manager = PluginManager::in_memory();
    manager.install(Plugin::new("core", "1.0.0"), None).await.unwrap();
    manager
        .install(Plugin::new("seo", "1.0.0").depends_on("core"), None)
        .await
        .unwrap();
    manager.activate("seo").await.unwrap();

    let err = manager.deactivate("core").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Dependency);
    assert_eq!(err.violations, vec!["seo".to_string()]);
    assert_eq!(manager.plugin_state("core").await, PluginState::Active);

    manager.deactivate("seo").await.unwrap();
    manager.deactivate("core").await.unwrap();
    assert_eq!(manager.plugin_state("core").await, PluginState::Installed);
}

#[tokio::test]
async fn test_uninstall_removes_hooks() {
    let manager = PluginManager::in_memory();
    manager
        .install(
            Plugin::new("seo", "1.0.0")
                .with_hook("page:render", 5, helpers::observer())
                .with_hook("page:save", 0, helpers::observer()),
            None,
        )
        .await
        .unwrap();
    manager
        .install(
            Plugin::new("blog", "1.0.0").with_hook("page:render", 1, helpers::observer()),
            None,
        )
        .await
        .unwrap();
    manager.activate("seo").await.unwrap();
    manager.activate("blog").await.unwrap();

    manager.uninstall("seo").await.unwrap();

    let hooks = manager.hook_registry();
    assert_eq!(hooks.registered_hook_names().await, vec!["page:render".to_string()]);
    let owners: Vec<String> = hooks
        .handlers("page:render")
        .await
        .into_iter()
        .map(|r| r.plugin_name)
        .collect();
    assert_eq!(owners, vec!["blog".to_string()]);
}

#[tokio::test]
async fn test_round_trip() {
    let manager = PluginManager::in_memory();
    let recorder = Recorder::new();
    let plugin = Plugin::new("seo", "1.0.0")
        .with_hook("page:render", 0, helpers::observer())
        .with_lifecycle(recorder.clone());

    manager.install(plugin, None).await.unwrap();
    assert_eq!(manager.plugin_state("seo").await, PluginState::Installed);
    manager.activate("seo").await.unwrap();
    assert_eq!(manager.plugin_state("seo").await, PluginState::Active);
    assert!(manager.hook_registry().has("page:render").await);
    manager.deactivate("seo").await.unwrap();
    assert!(!manager.hook_registry().has("page:render").await);
    manager.uninstall("seo").await.unwrap();

    assert_eq!(manager.plugin_state("seo").await, PluginState::Uninstalled);
    assert!(manager.plugin_registry().manifest("seo").await.is_none());
    assert!(manager.hook_registry().registered_hook_names().await.is_empty());
    assert!(manager.store().find_by_name("seo").await.unwrap().is_none());
    assert_eq!(recorder.calls().len(), 4);
}

#[tokio::test]
async fn test_install_store_failure_rolls_back() {
    let store = FlakyStore::new();
    FlakyStore::set(&store.fail_insert, true);
    let manager = helpers::manager_with(store.clone());
    let recorder = Recorder::new();

    let err = manager
        .install(Plugin::new("seo", "1.0.0").with_lifecycle(recorder.clone()), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert!(!manager.is_installed("seo").await);
    assert_eq!(
        recorder.calls(),
        vec![LifecycleStage::Install, LifecycleStage::Uninstall]
    );
}

#[tokio::test]
async fn test_activate_store_failure_rolls_back() {
    let store = FlakyStore::new();
    let manager = helpers::manager_with(store.clone());
    let recorder = Recorder::new();
    manager
        .install(
            Plugin::new("seo", "1.0.0")
                .with_hook("page:render", 0, helpers::observer())
                .with_lifecycle(recorder.clone()),
            None,
        )
        .await
        .unwrap();

    FlakyStore::set(&store.fail_update, true);
    let err = manager.activate("seo").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(manager.plugin_state("seo").await, PluginState::Installed);
    assert!(!manager.hook_registry().has("page:render").await);
    assert_eq!(
        recorder.calls(),
        vec![
            LifecycleStage::Install,
            LifecycleStage::Activate,
            LifecycleStage::Deactivate,
        ]
    );
}

#[tokio::test]
async fn test_deactivate_store_failure_keeps_active() {
    let store = FlakyStore::new();
    let manager = helpers::manager_with(store.clone());
    manager
        .install(
            Plugin::new("seo", "1.0.0").with_hook("page:render", 0, helpers::observer()),
            None,
        )
        .await
        .unwrap();
    manager.activate("seo").await.unwrap();

    FlakyStore::set(&store.fail_update, true);
    let err = manager.deactivate("seo").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(manager.plugin_state("seo").await, PluginState::Active);
    assert_eq!(manager.hook_registry().handler_count("page:render").await, 1);
}

#[tokio::test]
async fn test_uninstall_delete_failure_keeps_plugin() {
    let store = FlakyStore::new();
    let manager = helpers::manager_with(store.clone());
    manager.install(Plugin::new("seo", "1.0.0"), None).await.unwrap();

    FlakyStore::set(&store.fail_delete, true);
    let err = manager.uninstall("seo").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(manager.plugin_state("seo").await, PluginState::Installed);

    FlakyStore::set(&store.fail_delete, false);
    manager.uninstall("seo").await.unwrap();
    assert_eq!(manager.plugin_state("seo").await, PluginState::Uninstalled);
}

#[tokio::test]
async fn test_list_reports_states() {
    let manager = PluginManager::in_memory();
    manager.install(Plugin::new("core", "1.0.0"), None).await.unwrap();
    manager
        .install(Plugin::new("seo", "1.2.0").depends_on("core"), None)
        .await
        .unwrap();
    manager.activate("core").await.unwrap();

    let list = manager.list().await;
    let summary: Vec<(String, PluginState)> =
        list.iter().map(|s| (s.name.clone(), s.state)).collect();
    assert_eq!(
        summary,
        vec![
            ("core".to_string(), PluginState::Active),
            ("seo".to_string(), PluginState::Installed),
        ]
    );
    assert_eq!(list[1].dependencies, vec!["core".to_string()]);
    assert!(list[1].installed_at.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activations_run_once() {
    let manager = Arc::new(PluginManager::in_memory());
    let recorder = Recorder::new();
    manager
        .install(
            Plugin::new("a", "1.0.0")
                .with_hook("page:render", 0, helpers::observer())
                .with_lifecycle(recorder.clone()),
            None,
        )
        .await
        .unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.activate("a").await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let activations = recorder
        .calls()
        .into_iter()
        .filter(|stage| *stage == LifecycleStage::Activate)
        .count();
    assert_eq!(activations, 1);
    assert_eq!(manager.hook_registry().handler_count("page:render").await, 1);
    assert_eq!(manager.plugin_state("a").await, PluginState::Active);
}
