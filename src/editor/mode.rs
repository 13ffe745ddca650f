//! Authoring modes and the pending automation they produce

use serde::{Deserialize, Serialize};

use super::collection::StepCollection;
use super::error::EditorError;
use super::serializer;
use crate::actions::ActionRegistry;

/// Which editor the user is authoring steps in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthoringMode {
    /// Hand-written JSON
    #[default]
    Text,
    /// Guided step-by-step builder
    Builder,
}

impl AuthoringMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            AuthoringMode::Text => AuthoringMode::Builder,
            AuthoringMode::Builder => AuthoringMode::Text,
        }
    }

    /// Locale key for the mode's label
    pub fn label_key(self) -> &'static str {
        match self {
            AuthoringMode::Text => "build_method_code",
            AuthoringMode::Builder => "build_method_no_code",
        }
    }
}

/// Automation input from whichever mode is active
#[derive(Debug, Clone, Copy)]
pub enum PendingAutomation<'a> {
    RawText(&'a str),
    StructuredSteps(&'a StepCollection),
}

impl PendingAutomation<'_> {
    /// Produce the canonical automation text.
    ///
    /// Raw text is trimmed and only checked for JSON syntax; the trimmed text
    /// itself is the artifact. Structured steps are validated field by field.
    pub fn canonical(&self, registry: &ActionRegistry) -> Result<String, EditorError> {
        match self {
            PendingAutomation::RawText(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(EditorError::EmptyInput);
                }
                serializer::parse_raw(trimmed)?;
                Ok(trimmed.to_string())
            }
            PendingAutomation::StructuredSteps(steps) => {
                if steps.is_empty() {
                    return Err(EditorError::NoSteps);
                }
                serializer::serialize(steps, registry)
            }
        }
    }

    pub fn mode(&self) -> AuthoringMode {
        match self {
            PendingAutomation::RawText(_) => AuthoringMode::Text,
            PendingAutomation::StructuredSteps(_) => AuthoringMode::Builder,
        }
    }
}
