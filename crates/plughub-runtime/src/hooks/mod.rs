//! Hook system — registry, dispatcher, handlers, and typed hook definitions.

pub mod definitions;
pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use definitions::{
    HookContext, LifecycleHook, PLUGIN_ACTIVATE, PLUGIN_DEACTIVATE, PLUGIN_INSTALL,
    PLUGIN_UNINSTALL, PluginEvent, TypedHook,
};
pub use dispatcher::HookDispatcher;
pub use handler::FnHandler;
pub use registry::{HookHandler, HookRegistration, HookRegistry};
