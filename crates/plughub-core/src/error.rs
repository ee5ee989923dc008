//! Unified error types for PlugHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the plugin runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A plugin definition, manifest, or config failed validation.
    Validation,
    /// A plugin with the same name is already installed.
    AlreadyInstalled,
    /// The requested plugin or resource was not found.
    NotFound,
    /// A dependency is missing, circular, or blocks the transition.
    Dependency,
    /// A hook handler failed while a hook chain was executing.
    HookExecution,
    /// A plugin lifecycle callback failed.
    Lifecycle,
    /// A lifecycle callback or hook handler exceeded its time budget.
    Timeout,
    /// A plugin could not be loaded from its source.
    Load,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::AlreadyInstalled => write!(f, "ALREADY_INSTALLED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Dependency => write!(f, "DEPENDENCY"),
            Self::HookExecution => write!(f, "HOOK_EXECUTION"),
            Self::Lifecycle => write!(f, "LIFECYCLE"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Load => write!(f, "LOAD"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout PlugHub.
///
/// `violations` carries the individual problems behind an aggregated error
/// (validation messages, missing dependency names, blocking dependents).
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Individual violations or offending names, if any.
    pub violations: Vec<String>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Structured cause of a [`ErrorKind::HookExecution`] error.
#[derive(Debug, Error)]
#[error("hook '{hook}' failed in handler owned by '{plugin}': {source}")]
pub struct HookExecutionError {
    /// Name of the hook whose chain was aborted.
    pub hook: String,
    /// Plugin owning the failing handler.
    pub plugin: String,
    /// The handler's own error.
    #[source]
    pub source: Box<AppError>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            violations: Vec::new(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            violations: Vec::new(),
            source: Some(Box::new(source)),
        }
    }

    /// Attach the list of individual violations.
    pub fn with_violations(mut self, violations: Vec<String>) -> Self {
        self.violations = violations;
        self
    }

    /// Create a validation error from a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorKind::Validation, message.clone()).with_violations(vec![message])
    }

    /// Create an aggregated validation error, joining all messages with `"; "`.
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::new(ErrorKind::Validation, errors.join("; ")).with_violations(errors)
    }

    /// Create an already-installed error.
    pub fn already_installed(name: &str) -> Self {
        Self::new(
            ErrorKind::AlreadyInstalled,
            format!("Plugin '{name}' is already installed"),
        )
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a dependency error enumerating the offending plugin names.
    pub fn dependency(message: impl Into<String>, names: Vec<String>) -> Self {
        Self::new(ErrorKind::Dependency, message).with_violations(names)
    }

    /// Wrap a handler failure into a hook execution error.
    pub fn hook_execution(hook: &str, plugin: &str, cause: AppError) -> Self {
        let failure = HookExecutionError {
            hook: hook.to_string(),
            plugin: plugin.to_string(),
            source: Box::new(cause),
        };
        Self::with_source(
            ErrorKind::HookExecution,
            format!("Hook '{hook}' execution failed in plugin '{plugin}'"),
            failure,
        )
    }

    /// Create a lifecycle callback error wrapping the callback's failure.
    pub fn lifecycle(
        plugin: &str,
        stage: impl std::fmt::Display,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorKind::Lifecycle,
            format!("Plugin '{plugin}' {stage} callback failed"),
            cause,
        )
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a load error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns the structured hook failure if this is a hook execution error.
    pub fn hook_failure(&self) -> Option<&HookExecutionError> {
        self.source
            .as_ref()
            .and_then(|s| s.downcast_ref::<HookExecutionError>())
    }

    /// Returns whether this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            violations: self.violations.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Load, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failed_joins_messages() {
        let err = AppError::validation_failed(vec![
            "Plugin name is required".to_string(),
            "Plugin version is required".to_string(),
        ]);
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.message,
            "Plugin name is required; Plugin version is required"
        );
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn test_hook_failure_is_reachable() {
        let cause = AppError::internal("boom");
        let err = AppError::hook_execution("content:save", "audit", cause);
        assert!(err.is(ErrorKind::HookExecution));
        let failure = err.hook_failure().unwrap();
        assert_eq!(failure.hook, "content:save");
        assert_eq!(failure.plugin, "audit");
        assert_eq!(failure.source.message, "boom");
    }

    #[test]
    fn test_lifecycle_error_keeps_cause() {
        let err = AppError::lifecycle("seo", "activate", AppError::internal("boom"));
        assert_eq!(err.kind, ErrorKind::Lifecycle);
        assert_eq!(err.message, "Plugin 'seo' activate callback failed");
        assert!(err.source.is_some());
    }

    #[test]
    fn test_clone_drops_source_keeps_violations() {
        let err = AppError::dependency("Missing dependencies", vec!["core".to_string()]);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Dependency);
        assert_eq!(cloned.violations, vec!["core".to_string()]);
        assert!(cloned.source.is_none());
    }
}
