//! Loading of built-in and user-defined step definitions

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::schema::StepDefinition;

/// Embedded built-in definitions in display order
const BUILTIN_DEFINITIONS: &[(&str, &str)] = &[
    ("llm_call", include_str!("builtin/llm_call.json")),
    ("save_data", include_str!("builtin/save_data.json")),
    ("send_email", include_str!("builtin/send_email.json")),
];

/// Load all built-in step definitions, in display order
pub fn load_builtins() -> Vec<StepDefinition> {
    let mut definitions = Vec::with_capacity(BUILTIN_DEFINITIONS.len());

    for (name, json) in BUILTIN_DEFINITIONS {
        match StepDefinition::from_json(json) {
            Ok(definition) => {
                debug!("Loaded builtin action type: {}", definition.action_type);
                definitions.push(definition);
            }
            Err(e) => {
                warn!("Failed to parse builtin action type {}: {}", name, e);
            }
        }
    }

    definitions
}

/// Load user-defined step definitions from a directory
///
/// Scans for *.json files and parses each as a StepDefinition. Files are read
/// in name order so the resulting display order is stable. Invalid files are
/// logged as warnings and skipped.
pub fn load_user_definitions(path: &Path) -> Result<Vec<StepDefinition>> {
    if !path.exists() {
        debug!(
            "User action types directory does not exist: {}",
            path.display()
        );
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(path)
        .with_context(|| format!("Failed to read action types directory: {}", path.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let file_path = entry?.path();
        if file_path.is_dir() || file_path.extension().is_none_or(|e| e != "json") {
            continue;
        }
        files.push(file_path);
    }
    files.sort();

    let mut definitions = Vec::new();
    for file_path in files {
        match load_definition_file(&file_path) {
            Ok(definition) => {
                debug!(
                    "Loaded user action type: {} from {}",
                    definition.action_type,
                    file_path.display()
                );
                definitions.push(definition);
            }
            Err(e) => {
                warn!(
                    "Failed to load action type from {}: {:#}",
                    file_path.display(),
                    e
                );
            }
        }
    }

    Ok(definitions)
}

/// Load and validate a single step definition from a JSON file
pub fn load_definition_file(path: &Path) -> Result<StepDefinition> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let definition = StepDefinition::from_json(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;

    if let Err(errors) = definition.validate() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Validation errors: {}", messages.join("; "));
    }

    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WEBHOOK_JSON: &str = r#"{
        "action_type": "call_webhook",
        "label_key": "step_type_call_webhook",
        "fields": [
            {"name": "url", "label_key": "webhook_url_label", "kind": "text"},
            {"name": "payload", "label_key": "webhook_payload_label", "kind": "json"}
        ]
    }"#;

    #[test]
    fn test_load_builtins() {
        let definitions = load_builtins();
        let keys: Vec<&str> = definitions.iter().map(|d| d.action_type.as_str()).collect();
        assert_eq!(keys, vec!["llm_call", "save_data", "send_email"]);
        assert!(definitions.iter().all(|d| d.validate().is_ok()));
    }

    #[test]
    fn test_load_user_definitions_nonexistent_dir() {
        let definitions = load_user_definitions(Path::new("/nonexistent/path")).unwrap();
        assert!(definitions.is_empty());
    }

    #[test]
    fn test_load_user_definitions_with_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("webhook.json"), WEBHOOK_JSON).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a definition").unwrap();

        let definitions = load_user_definitions(temp_dir.path()).unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].action_type, "call_webhook");
        assert_eq!(definitions[0].fields.len(), 2);
    }

    #[test]
    fn test_load_user_definitions_skips_invalid() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a_webhook.json"), WEBHOOK_JSON).unwrap();
        fs::write(temp_dir.path().join("b_broken.json"), "{ not json").unwrap();

        // Parses, but declares no fields
        let empty = r#"{"action_type": "noop", "label_key": "noop", "fields": []}"#;
        fs::write(temp_dir.path().join("c_empty.json"), empty).unwrap();

        let definitions = load_user_definitions(temp_dir.path()).unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].action_type, "call_webhook");
    }

    #[test]
    fn test_load_definition_file_reports_validation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"action_type": "Bad Type", "label_key": "x", "fields": [{"name": "a", "label_key": "a", "kind": "text"}]}"#,
        )
        .unwrap();

        let err = load_definition_file(&path).unwrap_err();
        assert!(err.to_string().contains("lowercase snake_case"));
    }
}
