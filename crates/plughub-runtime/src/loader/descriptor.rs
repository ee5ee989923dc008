//! Declarative plugins described by JSON files.
//!
//! A descriptor carries metadata, dependencies, and data-only capabilities
//! (routes, middleware, models, services, admin pages, config schema).
//! Hook handlers and lifecycle callbacks are code, so descriptor plugins
//! have none.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use plughub_core::error::{AppError, ErrorKind};
use plughub_core::result::AppResult;

use crate::capabilities::{
    AdminPageDefinition, MiddlewareDefinition, ModelDefinition, RouteDefinition, ServiceDefinition,
};
use crate::plugin::Plugin;
use crate::schema::PluginConfigSchema;
use crate::validator;

use super::source::{PluginModule, PluginSource};

/// File looked up inside a directory candidate.
pub const DESCRIPTOR_FILE: &str = "plugin.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PluginDescriptor {
    name: String,
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    routes: Vec<RouteDefinition>,
    #[serde(default)]
    middleware: Vec<MiddlewareDefinition>,
    #[serde(default)]
    models: Vec<ModelDefinition>,
    #[serde(default)]
    services: Vec<ServiceDefinition>,
    #[serde(default)]
    admin_pages: Vec<AdminPageDefinition>,
    #[serde(default)]
    hooks: Vec<Value>,
    #[serde(default)]
    config_schema: Option<PluginConfigSchema>,
}

impl From<PluginDescriptor> for Plugin {
    fn from(d: PluginDescriptor) -> Self {
        let mut plugin = Plugin::new(d.name, d.version);
        plugin.description = d.description;
        plugin.author = d.author;
        plugin.license = d.license;
        plugin.homepage = d.homepage;
        plugin.dependencies = d.dependencies;
        plugin.routes = d.routes;
        plugin.middleware = d.middleware;
        plugin.models = d.models;
        plugin.services = d.services;
        plugin.admin_pages = d.admin_pages;
        plugin.config_schema = d.config_schema;
        plugin
    }
}

/// Reads plugin descriptors (`*.json` files or `<dir>/plugin.json`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorPluginSource;

impl DescriptorPluginSource {
    /// Creates a descriptor source.
    pub fn new() -> Self {
        Self
    }

    fn descriptor_path(location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_dir() {
            path.join(DESCRIPTOR_FILE)
        } else {
            path.to_path_buf()
        }
    }

    /// Parses a descriptor document into a module.
    ///
    /// A top-level `default` or `plugin` object takes precedence over the
    /// document itself.
    pub fn parse(raw: &str) -> AppResult<PluginModule> {
        let document: Value = serde_json::from_str(raw)?;

        let mut module = PluginModule::default();
        if let Some(def) = document.get("default") {
            module.default_export = Some(Self::plugin_from(def)?);
        } else if let Some(def) = document.get("plugin") {
            module.plugin_export = Some(Self::plugin_from(def)?);
        } else {
            module.shape = Some(Self::plugin_from(&document)?);
        }
        Ok(module)
    }

    fn plugin_from(def: &Value) -> AppResult<Plugin> {
        validator::validate_definition(def).into_result()?;

        let descriptor: PluginDescriptor = serde_json::from_value(def.clone()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("Invalid plugin descriptor: {e}"),
                e,
            )
        })?;

        if !descriptor.hooks.is_empty() {
            return Err(AppError::validation(format!(
                "Declarative plugin '{}' cannot declare hook handlers",
                descriptor.name
            )));
        }

        Ok(descriptor.into())
    }
}

#[async_trait]
impl PluginSource for DescriptorPluginSource {
    async fn resolve(&self, location: &str) -> AppResult<PluginModule> {
        let path = Self::descriptor_path(location);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Load,
                format!("Failed to read descriptor '{}'", path.display()),
                e,
            )
        })?;
        Self::parse(&raw)
    }

    fn extension(&self) -> &str {
        "json"
    }
}
