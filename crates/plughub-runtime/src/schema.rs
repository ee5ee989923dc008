//! Declared shape of a plugin's runtime config.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of a single config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFieldType {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl ConfigFieldType {
    /// Returns whether `value` has this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    /// Returns the lowercase type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Schema entry for one config key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    /// Expected value type.
    #[serde(rename = "type")]
    pub field_type: ConfigFieldType,
    /// Whether the key must be present.
    #[serde(default)]
    pub required: bool,
    /// Allowed values, if the key is an enumeration.
    #[serde(default)]
    pub options: Option<Vec<Value>>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
}

impl ConfigField {
    /// Optional field of the given type.
    pub fn optional(field_type: ConfigFieldType) -> Self {
        Self {
            field_type,
            required: false,
            options: None,
            description: None,
        }
    }

    /// Required field of the given type.
    pub fn required(field_type: ConfigFieldType) -> Self {
        Self {
            required: true,
            ..Self::optional(field_type)
        }
    }

    /// Restricts the field to the given values.
    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = Some(options);
        self
    }
}

/// Config schema declared by a plugin: key → field spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfigSchema {
    /// Declared fields.
    pub fields: BTreeMap<String, ConfigField>,
}

impl PluginConfigSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    pub fn field(mut self, key: impl Into<String>, field: ConfigField) -> Self {
        self.fields.insert(key.into(), field);
        self
    }
}
