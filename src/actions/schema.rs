//! Schema definitions for automation action types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definition of one action type a step can take
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Unique action identifier written as the `action` key (e.g., llm_call, send_email)
    pub action_type: String,
    /// Locale key for the action's display name
    pub label_key: String,
    /// Brief description of what the step does
    #[serde(default)]
    pub description: String,
    /// Fields the step requires, in display and serialization order
    pub fields: Vec<FieldSpec>,
}

/// Schema definition for a single step field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field identifier (becomes the key in the serialized record)
    pub name: String,
    /// Locale key for the field label
    pub label_key: String,
    /// Kind of input, which also decides validation
    pub kind: FieldKind,
    /// Placeholder text shown in an empty input
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// Kinds of fields supported in step definitions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Multi-line text input
    Multiline,
    /// Multi-line input holding a JSON object or array
    Json,
}

/// Why a field value was rejected at submission time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFailure {
    /// Nothing but whitespace was entered
    Empty,
    /// The text is not a JSON object or array
    Malformed(String),
}

impl std::fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldFailure::Empty => write!(f, "value is empty"),
            FieldFailure::Malformed(reason) => write!(f, "invalid JSON: {}", reason),
        }
    }
}

impl FieldFailure {
    /// Locale key describing this failure
    pub fn locale_key(&self) -> &'static str {
        match self {
            FieldFailure::Empty => "missing_fields_error",
            FieldFailure::Malformed(_) => "invalid_json_error",
        }
    }
}

impl FieldKind {
    /// Whether the input spans multiple lines
    pub fn is_multiline(self) -> bool {
        matches!(self, FieldKind::Multiline | FieldKind::Json)
    }

    /// Validate raw input and promote it to its typed value.
    ///
    /// Text kinds yield the trimmed string; JSON kinds yield the parsed value.
    pub fn validate(self, raw: &str) -> Result<Value, FieldFailure> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldFailure::Empty);
        }

        match self {
            FieldKind::Text | FieldKind::Multiline => Ok(Value::String(trimmed.to_string())),
            FieldKind::Json => {
                let value: Value = serde_json::from_str(trimmed)
                    .map_err(|e| FieldFailure::Malformed(e.to_string()))?;
                if value.is_object() || value.is_array() {
                    Ok(value)
                } else {
                    Err(FieldFailure::Malformed(
                        "expected a JSON object or array".to_string(),
                    ))
                }
            }
        }
    }
}

/// Problems found while checking a step definition
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionError {
    /// Action type must be non-empty lowercase snake_case
    InvalidActionType(String),
    /// A step type must ask for at least one field
    NoFields(String),
    /// Two fields share a name
    DuplicateField(String),
    /// `action` is the discriminator key and cannot be a field
    ReservedField(String),
    /// Field name must be non-empty
    EmptyFieldName,
}

impl std::fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionError::InvalidActionType(key) => {
                write!(f, "Action type '{}' must be lowercase snake_case", key)
            }
            DefinitionError::NoFields(key) => {
                write!(f, "Action type '{}' must declare at least one field", key)
            }
            DefinitionError::DuplicateField(name) => {
                write!(f, "Field '{}' is declared more than once", name)
            }
            DefinitionError::ReservedField(name) => {
                write!(f, "Field name '{}' is reserved", name)
            }
            DefinitionError::EmptyFieldName => write!(f, "Field name must not be empty"),
        }
    }
}

impl std::error::Error for DefinitionError {}

impl StepDefinition {
    /// Parse a step definition from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check if the definition declares a field
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Validate the definition for consistency
    pub fn validate(&self) -> Result<(), Vec<DefinitionError>> {
        let mut errors = Vec::new();

        let well_formed = !self.action_type.is_empty()
            && self
                .action_type
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && !self.action_type.starts_with('_');
        if !well_formed {
            errors.push(DefinitionError::InvalidActionType(self.action_type.clone()));
        }

        if self.fields.is_empty() {
            errors.push(DefinitionError::NoFields(self.action_type.clone()));
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                errors.push(DefinitionError::EmptyFieldName);
                continue;
            }
            if field.name == "action" {
                errors.push(DefinitionError::ReservedField(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                errors.push(DefinitionError::DuplicateField(field.name.clone()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
