//! Checks for manifests reconstructed from durable storage.

use crate::registry::PluginManifest;

use super::{ValidationResult, check_name, check_version};

/// Validates a manifest: name and version well-formed, timestamps ordered.
pub fn validate_manifest(manifest: &PluginManifest) -> ValidationResult {
    let mut errors = Vec::new();

    check_name(&manifest.name, &mut errors);
    check_version(&manifest.version, &mut errors);

    if manifest.updated_at < manifest.installed_at {
        errors.push(format!(
            "Manifest for '{}' was updated before it was installed",
            manifest.name
        ));
    }

    ValidationResult::from_errors(errors)
}
