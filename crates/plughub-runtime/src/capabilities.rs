//! Capability definitions a plugin can declare.
//!
//! Routes and admin pages are consumed by the HTTP layer and the admin
//! navigation once the owning plugin is active; the runtime only stores and
//! exposes them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use plughub_core::error::AppError;

use crate::hooks::registry::HookHandler;

/// HTTP method of a plugin route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

/// A route contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Request path, starting with `/`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Symbolic handler reference resolved by the HTTP layer.
    pub handler: String,
    /// Whether the route requires an authenticated caller.
    #[serde(default)]
    pub auth: bool,
    /// Permissions required to call the route.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RouteDefinition {
    /// Creates an unauthenticated route.
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            handler: handler.into(),
            auth: false,
            permissions: Vec::new(),
        }
    }

    /// Requires authentication and the given permissions.
    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        self.auth = true;
        self.permissions = permissions.iter().map(|p| p.to_string()).collect();
        self
    }
}

/// Request middleware contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlewareDefinition {
    /// Middleware name.
    pub name: String,
    /// Path prefix the middleware applies to (all paths when unset).
    #[serde(default)]
    pub path: Option<String>,
    /// Ordering among middleware (lower runs first).
    #[serde(default)]
    pub order: i32,
}

/// Data model contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model name.
    pub name: String,
    /// Field name → field type.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Named service contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service name.
    pub name: String,
    /// What the service provides.
    #[serde(default)]
    pub description: Option<String>,
}

/// Admin navigation page contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminPageDefinition {
    /// Page path, starting with `/`.
    pub path: String,
    /// Navigation title.
    pub title: String,
    /// Optional icon identifier.
    #[serde(default)]
    pub icon: Option<String>,
    /// Permissions required to see the page.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Position in the navigation.
    #[serde(default)]
    pub order: Option<i32>,
}

/// A hook handler a plugin registers while it is active.
#[derive(Clone)]
pub struct HookDeclaration {
    /// Target hook name.
    pub hook: String,
    /// Priority (higher runs first).
    pub priority: i32,
    /// The handler.
    pub handler: Arc<dyn HookHandler>,
}

impl fmt::Debug for HookDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDeclaration")
            .field("hook", &self.hook)
            .field("priority", &self.priority)
            .finish()
    }
}

/// The optional capability lists of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `routes`
    Routes,
    /// `middleware`
    Middleware,
    /// `models`
    Models,
    /// `services`
    Services,
    /// `adminPages`
    AdminPages,
    /// `hooks`
    Hooks,
}

impl Capability {
    /// All capability kinds.
    pub const ALL: [Capability; 6] = [
        Self::Routes,
        Self::Middleware,
        Self::Models,
        Self::Services,
        Self::AdminPages,
        Self::Hooks,
    ];

    /// Returns the definition key of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routes => "routes",
            Self::Middleware => "middleware",
            Self::Models => "models",
            Self::Services => "services",
            Self::AdminPages => "adminPages",
            Self::Hooks => "hooks",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "routes" => Ok(Self::Routes),
            "middleware" => Ok(Self::Middleware),
            "models" => Ok(Self::Models),
            "services" => Ok(Self::Services),
            "adminPages" | "admin_pages" => Ok(Self::AdminPages),
            "hooks" => Ok(Self::Hooks),
            other => Err(AppError::validation(format!("Unknown capability '{other}'"))),
        }
    }
}
