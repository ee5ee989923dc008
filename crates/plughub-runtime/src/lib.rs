//! # plughub-runtime
//!
//! Plugin runtime for PlugHub. Provides:
//!
//! - Validation of plugin definitions, manifests, and plugin config
//! - Hook system with priority-ordered handlers and fail-fast execution
//! - Plugin registry with manifests and dependency queries
//! - Plugin loader over pluggable sources (embedded, JSON descriptors,
//!   and shared libraries behind the `dynamic` feature)
//! - Plugin manager driving the install / activate / deactivate /
//!   uninstall state machine against a durable store

mod macros;

pub mod capabilities;
pub mod hooks;
pub mod lifecycle;
pub mod loader;
pub mod manager;
pub mod plugin;
pub mod prelude;
pub mod registry;
pub mod schema;
pub mod store;
pub mod validator;

pub use capabilities::Capability;
pub use hooks::{HookDispatcher, HookRegistry};
pub use lifecycle::{LifecycleContext, PluginLifecycle};
pub use loader::{LoadedPlugin, PluginLoader, PluginSource};
pub use manager::{PluginManager, ReconcileReport};
pub use plugin::Plugin;
pub use registry::{PluginManifest, PluginRegistry, PluginState};
pub use store::MemoryPluginStore;
pub use validator::ValidationResult;
