//! Structural and semantic checks for plugin definitions.
//!
//! Checks accumulate: a caller always sees every violation, not only the
//! first one. Dependency resolution is closed-world, a plugin may only
//! depend on plugins present in `known`.

pub mod config;
pub mod definition;
pub mod manifest;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::warn;

use plughub_core::error::AppError;
use plughub_core::result::AppResult;

use crate::plugin::Plugin;

pub use config::validate_config;
pub use definition::validate_definition;
pub use manifest::validate_manifest;

/// Message reported once for any dependency cycle.
pub const CIRCULAR_DEPENDENCY: &str = "Circular dependency detected";

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("valid name pattern"));

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    /// Whether no violations were found.
    pub valid: bool,
    /// Every violation found, in check order.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Builds a result from the collected errors.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Converts into an aggregated validation error if invalid.
    pub fn into_result(self) -> AppResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(AppError::validation_failed(self.errors))
        }
    }
}

/// Returns whether `name` is a well-formed plugin name.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Returns whether `version` is a well-formed semantic version.
pub fn is_valid_version(version: &str) -> bool {
    semver::Version::parse(version).is_ok()
}

pub(crate) fn check_name(name: &str, errors: &mut Vec<String>) {
    if name.is_empty() {
        errors.push("Plugin name is required".to_string());
    } else if !is_valid_name(name) {
        errors.push(format!(
            "Plugin name '{name}' must start with a lowercase letter and contain only lowercase letters, digits, and single hyphens"
        ));
    }
}

pub(crate) fn check_version(version: &str, errors: &mut Vec<String>) {
    if version.is_empty() {
        errors.push("Plugin version is required".to_string());
    } else if !is_valid_version(version) {
        errors.push(format!(
            "Plugin version '{version}' must be a valid semantic version (e.g. 1.0.0)"
        ));
    }
}

/// Validates a plugin against the set of plugins already known.
///
/// Check order: name, version, dependency resolution, dependency cycles,
/// capability shapes.
pub fn validate(plugin: &Plugin, known: &HashMap<String, Arc<Plugin>>) -> ValidationResult {
    let mut errors = Vec::new();

    check_name(&plugin.name, &mut errors);
    check_version(&plugin.version, &mut errors);

    for dep in &plugin.dependencies {
        if !known.contains_key(dep) {
            errors.push(format!("Dependency '{dep}' not found"));
        }
    }

    if has_cycle(plugin, known) {
        errors.push(CIRCULAR_DEPENDENCY.to_string());
    }

    check_capabilities(plugin, &mut errors);

    ValidationResult::from_errors(errors)
}

/// Runs [`validate`] and raises a single aggregated error on failure.
pub fn validate_or_throw(plugin: &Plugin, known: &HashMap<String, Arc<Plugin>>) -> AppResult<()> {
    let result = validate(plugin, known);
    if !result.valid {
        warn!(
            plugin = %plugin.name,
            errors = %result.errors.join("; "),
            "Plugin validation failed"
        );
    }
    result.into_result()
}

/// Validates only what a plugin can be checked for in isolation: name,
/// version, and capability shapes. Used by loaders before any registry
/// is involved.
pub fn validate_structure(plugin: &Plugin) -> ValidationResult {
    let mut errors = Vec::new();
    check_name(&plugin.name, &mut errors);
    check_version(&plugin.version, &mut errors);
    check_capabilities(plugin, &mut errors);
    ValidationResult::from_errors(errors)
}

/// Depth-first search from `plugin` over dependency edges, reporting a
/// back-edge on the recursion stack. `plugin`'s own edges come from the
/// candidate itself, everyone else's from `known`.
fn has_cycle(plugin: &Plugin, known: &HashMap<String, Arc<Plugin>>) -> bool {
    fn visit<'a>(
        name: &'a str,
        plugin: &'a Plugin,
        known: &'a HashMap<String, Arc<Plugin>>,
        visited: &mut HashSet<&'a str>,
        stack: &mut HashSet<&'a str>,
    ) -> bool {
        if stack.contains(name) {
            return true;
        }
        if !visited.insert(name) {
            return false;
        }
        stack.insert(name);

        let deps: &'a [String] = if name == plugin.name {
            &plugin.dependencies
        } else {
            match known.get(name) {
                Some(p) => &p.dependencies,
                None => &[],
            }
        };

        for dep in deps {
            if visit(dep, plugin, known, visited, stack) {
                return true;
            }
        }

        stack.remove(name);
        false
    }

    let mut visited = HashSet::new();
    let mut stack = HashSet::new();
    visit(&plugin.name, plugin, known, &mut visited, &mut stack)
}

fn check_capabilities(plugin: &Plugin, errors: &mut Vec<String>) {
    for route in &plugin.routes {
        if !route.path.starts_with('/') {
            errors.push(format!("Route path '{}' must start with '/'", route.path));
        }
        if route.handler.trim().is_empty() {
            errors.push(format!("Route '{}' must name a handler", route.path));
        }
    }
    for middleware in &plugin.middleware {
        if middleware.name.trim().is_empty() {
            errors.push("Middleware name is required".to_string());
        }
    }
    for model in &plugin.models {
        if model.name.trim().is_empty() {
            errors.push("Model name is required".to_string());
        }
    }
    for service in &plugin.services {
        if service.name.trim().is_empty() {
            errors.push("Service name is required".to_string());
        }
    }
    for page in &plugin.admin_pages {
        if !page.path.starts_with('/') {
            errors.push(format!("Admin page path '{}' must start with '/'", page.path));
        }
        if page.title.trim().is_empty() {
            errors.push(format!("Admin page '{}' must have a title", page.path));
        }
    }
    for hook in &plugin.hooks {
        if hook.hook.trim().is_empty() {
            errors.push("Hook declaration must name a hook".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{AdminPageDefinition, HttpMethod, RouteDefinition};

    fn known(plugins: Vec<Plugin>) -> HashMap<String, Arc<Plugin>> {
        plugins
            .into_iter()
            .map(|p| (p.name.clone(), Arc::new(p)))
            .collect()
    }

    #[test]
    fn test_name_pattern() {
        assert!(is_valid_name("seo"));
        assert!(is_valid_name("seo-tools2"));
        assert!(is_valid_name("a1-b2-c3"));
        assert!(!is_valid_name("Seo"));
        assert!(!is_valid_name("1seo"));
        assert!(!is_valid_name("seo--tools"));
        assert!(!is_valid_name("seo-"));
        assert!(!is_valid_name("seo_tools"));
    }

    #[test]
    fn test_version_format() {
        assert!(is_valid_version("1.0.0"));
        assert!(is_valid_version("2.1.3-beta.1"));
        assert!(!is_valid_version("1.0"));
        assert!(!is_valid_version("v1.0.0"));
    }

    #[test]
    fn test_valid_plugin() {
        let core = Plugin::new("core", "1.0.0");
        let seo = Plugin::new("seo", "1.2.0").depends_on("core");
        let result = validate(&seo, &known(vec![core]));
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn test_accumulates_all_errors() {
        let plugin = Plugin::new("", "x").depends_on("ghost");
        let result = validate(&plugin, &HashMap::new());
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "Plugin name is required".to_string(),
                "Plugin version 'x' must be a valid semantic version (e.g. 1.0.0)".to_string(),
                "Dependency 'ghost' not found".to_string(),
            ]
        );
    }

    #[test]
    fn test_cycle_reported_for_both_members() {
        let a = Plugin::new("plugin-a", "1.0.0").depends_on("plugin-b");
        let b = Plugin::new("plugin-b", "1.0.0").depends_on("plugin-a");
        let all = known(vec![a.clone(), b.clone()]);

        for plugin in [&a, &b] {
            let result = validate(plugin, &all);
            assert_eq!(
                result
                    .errors
                    .iter()
                    .filter(|e| e.as_str() == CIRCULAR_DEPENDENCY)
                    .count(),
                1
            );
        }
    }

    #[test]
    fn test_cycle_through_known_subset() {
        let a = Plugin::new("a", "1.0.0").depends_on("b");
        let b = Plugin::new("b", "1.0.0").depends_on("c");
        let c = Plugin::new("c", "1.0.0").depends_on("a");
        let all = known(vec![b, c]);
        let result = validate(&a, &all);
        assert!(result.errors.contains(&CIRCULAR_DEPENDENCY.to_string()));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let a = Plugin::new("a", "1.0.0").depends_on("a");
        let all = known(vec![a.clone()]);
        assert!(validate(&a, &all).errors.contains(&CIRCULAR_DEPENDENCY.to_string()));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let base = Plugin::new("base", "1.0.0");
        let left = Plugin::new("left", "1.0.0").depends_on("base");
        let right = Plugin::new("right", "1.0.0").depends_on("base");
        let top = Plugin::new("top", "1.0.0").depends_on("left").depends_on("right");
        let result = validate(&top, &known(vec![base, left, right]));
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn test_capability_shapes() {
        let plugin = Plugin::new("bad-shapes", "1.0.0")
            .with_route(RouteDefinition::new(HttpMethod::Get, "seo", "seo.index"))
            .with_admin_page(AdminPageDefinition {
                path: "/admin/seo".to_string(),
                title: " ".to_string(),
                icon: None,
                permissions: Vec::new(),
                order: None,
            });
        let result = validate_structure(&plugin);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("must start with '/'"));
        assert!(result.errors[1].contains("must have a title"));
    }

    #[test]
    fn test_validate_or_throw_joins_messages() {
        let plugin = Plugin::new("Bad", "");
        let err = validate_or_throw(&plugin, &HashMap::new()).unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert_eq!(err.message, err.violations.join("; "));
    }
}
