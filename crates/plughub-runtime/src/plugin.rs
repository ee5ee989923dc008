//! The plugin definition supplied by a plugin author.

use std::fmt;
use std::sync::Arc;

use crate::capabilities::{
    AdminPageDefinition, Capability, HookDeclaration, MiddlewareDefinition, ModelDefinition,
    RouteDefinition, ServiceDefinition,
};
use crate::hooks::registry::HookHandler;
use crate::lifecycle::{NoopLifecycle, PluginLifecycle};
use crate::schema::PluginConfigSchema;

/// An immutable plugin definition.
///
/// Built once by its author (or a plugin source) and shared as
/// `Arc<Plugin>` afterwards.
#[derive(Clone)]
pub struct Plugin {
    /// Unique name, `[a-z][a-z0-9]*(-[a-z0-9]+)*`.
    pub name: String,
    /// Semantic version.
    pub version: String,
    /// Short description.
    pub description: Option<String>,
    /// Author or maintainer.
    pub author: Option<String>,
    /// License identifier.
    pub license: Option<String>,
    /// Project homepage.
    pub homepage: Option<String>,
    /// Names of plugins this one requires.
    pub dependencies: Vec<String>,
    /// Routes for the HTTP layer.
    pub routes: Vec<RouteDefinition>,
    /// Request middleware.
    pub middleware: Vec<MiddlewareDefinition>,
    /// Data models.
    pub models: Vec<ModelDefinition>,
    /// Named services.
    pub services: Vec<ServiceDefinition>,
    /// Admin navigation pages.
    pub admin_pages: Vec<AdminPageDefinition>,
    /// Hook handlers registered while active.
    pub hooks: Vec<HookDeclaration>,
    /// Declared shape of the runtime config.
    pub config_schema: Option<PluginConfigSchema>,
    /// Lifecycle callbacks.
    pub lifecycle: Arc<dyn PluginLifecycle>,
}

impl Plugin {
    /// Creates a plugin with no dependencies, capabilities, or callbacks.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            author: None,
            license: None,
            homepage: None,
            dependencies: Vec::new(),
            routes: Vec::new(),
            middleware: Vec::new(),
            models: Vec::new(),
            services: Vec::new(),
            admin_pages: Vec::new(),
            hooks: Vec::new(),
            config_schema: None,
            lifecycle: Arc::new(NoopLifecycle),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Adds a dependency.
    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// Adds a route.
    pub fn with_route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    /// Adds a middleware.
    pub fn with_middleware(mut self, middleware: MiddlewareDefinition) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Adds a model.
    pub fn with_model(mut self, model: ModelDefinition) -> Self {
        self.models.push(model);
        self
    }

    /// Adds a service.
    pub fn with_service(mut self, service: ServiceDefinition) -> Self {
        self.services.push(service);
        self
    }

    /// Adds an admin page.
    pub fn with_admin_page(mut self, page: AdminPageDefinition) -> Self {
        self.admin_pages.push(page);
        self
    }

    /// Adds a hook handler with the given priority.
    pub fn with_hook(
        mut self,
        hook: impl Into<String>,
        priority: i32,
        handler: Arc<dyn HookHandler>,
    ) -> Self {
        self.hooks.push(HookDeclaration {
            hook: hook.into(),
            priority,
            handler,
        });
        self
    }

    /// Sets the config schema.
    pub fn with_config_schema(mut self, schema: PluginConfigSchema) -> Self {
        self.config_schema = Some(schema);
        self
    }

    /// Sets the lifecycle callbacks.
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn PluginLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Returns whether the plugin declares a non-empty list for `capability`.
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Routes => !self.routes.is_empty(),
            Capability::Middleware => !self.middleware.is_empty(),
            Capability::Models => !self.models.is_empty(),
            Capability::Services => !self.services.is_empty(),
            Capability::AdminPages => !self.admin_pages.is_empty(),
            Capability::Hooks => !self.hooks.is_empty(),
        }
    }

    /// Returns whether `name` is among the declared dependencies.
    pub fn depends_on_plugin(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("dependencies", &self.dependencies)
            .field("routes", &self.routes.len())
            .field("hooks", &self.hooks)
            .finish()
    }
}
