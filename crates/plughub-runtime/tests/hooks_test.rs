//! Integration tests for hook execution through active plugins.

mod helpers;

use serde::{Deserialize, Serialize};
use serde_json::json;

use plughub_core::error::ErrorKind;
use plughub_runtime::hooks::TypedHook;
use plughub_runtime::{Plugin, PluginManager};

#[tokio::test]
async fn test_priority_order_and_passthrough() {
    let manager = PluginManager::in_memory();
    manager
        .install(
            Plugin::new("seo", "1.0.0")
                .with_hook("page:render", 1, helpers::tagging("one"))
                .with_hook("page:render", 10, helpers::tagging("ten"))
                .with_hook("page:render", 7, helpers::observer())
                .with_hook("page:render", 5, helpers::tagging("five")),
            None,
        )
        .await
        .unwrap();
    manager.activate("seo").await.unwrap();

    let result = manager
        .dispatcher()
        .execute("page:render", json!({"trail": []}), None)
        .await
        .unwrap();

    assert_eq!(result, json!({"trail": ["ten", "five", "one"]}));
}

#[tokio::test]
async fn test_hook_without_handlers_passes_through() {
    let manager = PluginManager::in_memory();
    let data = json!({"title": "unchanged"});
    let result = manager
        .dispatcher()
        .execute("page:render", data.clone(), None)
        .await
        .unwrap();
    assert_eq!(result, data);
}

#[tokio::test]
async fn test_failing_handler_names_its_plugin() {
    let manager = PluginManager::in_memory();
    manager
        .install(
            Plugin::new("seo", "1.0.0").with_hook("page:render", 10, helpers::tagging("seo")),
            None,
        )
        .await
        .unwrap();
    manager
        .install(
            Plugin::new("broken", "1.0.0").with_hook("page:render", 5, helpers::failing("boom")),
            None,
        )
        .await
        .unwrap();
    manager
        .install(
            Plugin::new("blog", "1.0.0").with_hook("page:render", 1, helpers::tagging("blog")),
            None,
        )
        .await
        .unwrap();
    for name in ["seo", "broken", "blog"] {
        manager.activate(name).await.unwrap();
    }

    let err = manager
        .dispatcher()
        .execute("page:render", json!({"trail": []}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::HookExecution);
    let failure = err.hook_failure().unwrap();
    assert_eq!(failure.hook, "page:render");
    assert_eq!(failure.plugin, "broken");
    assert_eq!(failure.source.message, "boom");
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Page {
    title: String,
    trail: Vec<String>,
}

const PAGE_RENDER: TypedHook<Page> = TypedHook::new("page:render");

#[tokio::test]
async fn test_typed_hook_round_trips_payload() {
    let manager = PluginManager::in_memory();
    manager
        .install(
            Plugin::new("seo", "1.0.0").with_hook("page:render", 0, helpers::tagging("seo")),
            None,
        )
        .await
        .unwrap();
    manager.activate("seo").await.unwrap();

    let page = manager
        .dispatcher()
        .execute_typed(
            &PAGE_RENDER,
            Page {
                title: "Home".to_string(),
                trail: Vec::new(),
            },
        )
        .await
        .unwrap();

    assert_eq!(page.title, "Home");
    assert_eq!(page.trail, vec!["seo".to_string()]);
}

#[tokio::test]
async fn test_deactivated_plugin_stops_handling() {
    let manager = PluginManager::in_memory();
    manager
        .install(
            Plugin::new("seo", "1.0.0").with_hook("page:render", 0, helpers::tagging("seo")),
            None,
        )
        .await
        .unwrap();
    manager.activate("seo").await.unwrap();
    manager.deactivate("seo").await.unwrap();

    let result = manager
        .dispatcher()
        .execute("page:render", json!({"trail": []}), None)
        .await
        .unwrap();
    assert_eq!(result, json!({"trail": []}));
}
