//! Runtime config checks against a plugin's declared schema.

use serde_json::{Map, Value};

use crate::schema::PluginConfigSchema;

use super::ValidationResult;

/// Validates `config` against `schema`.
///
/// Reports missing required keys, type mismatches, and values outside a
/// declared option list. Keys the schema does not mention are accepted.
pub fn validate_config(config: &Map<String, Value>, schema: &PluginConfigSchema) -> ValidationResult {
    let mut errors = Vec::new();

    for (key, field) in &schema.fields {
        let Some(value) = config.get(key) else {
            if field.required {
                errors.push(format!("Missing required config key '{key}'"));
            }
            continue;
        };

        if !field.field_type.matches(value) {
            errors.push(format!(
                "Config key '{key}' must be of type {}",
                field.field_type.as_str()
            ));
            continue;
        }

        if let Some(options) = &field.options {
            if !options.contains(value) {
                let allowed: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                errors.push(format!(
                    "Config key '{key}' must be one of [{}]",
                    allowed.join(", ")
                ));
            }
        }
    }

    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ConfigField, ConfigFieldType};
    use serde_json::json;

    fn schema() -> PluginConfigSchema {
        PluginConfigSchema::new()
            .field("api_key", ConfigField::required(ConfigFieldType::String))
            .field("max_items", ConfigField::optional(ConfigFieldType::Number))
            .field(
                "mode",
                ConfigField::optional(ConfigFieldType::String)
                    .with_options(vec![json!("fast"), json!("safe")]),
            )
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = map(json!({"api_key": "k", "max_items": 10, "mode": "safe", "extra": true}));
        assert!(validate_config(&config, &schema()).valid);
    }

    #[test]
    fn test_missing_and_mismatched() {
        let config = map(json!({"max_items": "ten", "mode": "turbo"}));
        let result = validate_config(&config, &schema());
        assert_eq!(
            result.errors,
            vec![
                "Missing required config key 'api_key'".to_string(),
                "Config key 'max_items' must be of type number".to_string(),
                "Config key 'mode' must be one of [\"fast\", \"safe\"]".to_string(),
            ]
        );
    }
}
