//! Prelude for plugin authors.

pub use async_trait::async_trait;
pub use serde_json::{Map, Value, json};

pub use plughub_core::error::{AppError, ErrorKind};
pub use plughub_core::result::AppResult;

pub use crate::capabilities::{
    AdminPageDefinition, HttpMethod, MiddlewareDefinition, ModelDefinition, RouteDefinition,
    ServiceDefinition,
};
pub use crate::hooks::{FnHandler, HookContext, HookHandler, PluginEvent, TypedHook};
pub use crate::lifecycle::{LifecycleContext, PluginLifecycle};
pub use crate::loader::PluginModule;
pub use crate::plugin::Plugin;
pub use crate::schema::{ConfigField, ConfigFieldType, PluginConfigSchema};

pub use crate::{export_plugin, plugin_config};
