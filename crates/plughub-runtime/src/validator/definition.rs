//! Shape checks for raw (JSON) plugin definitions.
//!
//! Typed [`Plugin`](crate::plugin::Plugin) values cannot have the wrong
//! shape; definitions read from descriptor files can, and are checked here
//! before they are deserialized.

use serde_json::Value;

use super::{ValidationResult, check_name, check_version};

/// Capability keys that must be arrays when present.
pub const CAPABILITY_KEYS: [&str; 6] = [
    "routes",
    "middleware",
    "models",
    "services",
    "adminPages",
    "hooks",
];

/// Validates the shape of a raw plugin definition.
pub fn validate_definition(value: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    let Some(object) = value.as_object() else {
        return ValidationResult::from_errors(vec!["Plugin definition must be an object".to_string()]);
    };

    match object.get("name") {
        Some(Value::String(name)) => check_name(name, &mut errors),
        Some(_) => errors.push("Plugin name must be a string".to_string()),
        None => errors.push("Plugin name is required".to_string()),
    }

    match object.get("version") {
        Some(Value::String(version)) => check_version(version, &mut errors),
        Some(_) => errors.push("Plugin version must be a string".to_string()),
        None => errors.push("Plugin version is required".to_string()),
    }

    if let Some(deps) = object.get("dependencies") {
        match deps.as_array() {
            Some(items) if items.iter().all(Value::is_string) => {}
            Some(_) => errors.push("Dependencies must be plugin names".to_string()),
            None => errors.push("Dependencies must be an array".to_string()),
        }
    }

    if let Some(lifecycle) = object.get("lifecycle") {
        if !lifecycle.is_object() {
            errors.push("Lifecycle must be an object".to_string());
        }
    }

    for key in CAPABILITY_KEYS {
        if let Some(list) = object.get(key) {
            if !list.is_array() {
                errors.push(format!("{key} must be an array"));
            }
        }
    }

    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_definition() {
        let def = json!({
            "name": "seo",
            "version": "1.0.0",
            "dependencies": ["core"],
            "lifecycle": {},
            "routes": [],
            "adminPages": []
        });
        assert!(validate_definition(&def).valid);
    }

    #[test]
    fn test_shape_errors() {
        let def = json!({
            "name": "seo",
            "version": 1,
            "dependencies": "core",
            "lifecycle": [],
            "routes": {},
            "hooks": "none"
        });
        let result = validate_definition(&def);
        assert_eq!(
            result.errors,
            vec![
                "Plugin version must be a string".to_string(),
                "Dependencies must be an array".to_string(),
                "Lifecycle must be an object".to_string(),
                "routes must be an array".to_string(),
                "hooks must be an array".to_string(),
            ]
        );
    }

    #[test]
    fn test_non_object() {
        assert!(!validate_definition(&json!([1, 2])).valid);
    }
}
