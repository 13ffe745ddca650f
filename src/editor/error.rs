//! Errors raised by the step editor

use thiserror::Error;

use crate::actions::FieldFailure;

/// Everything that can stop an edit or a submission.
///
/// None of these are fatal: the session stays usable and the user can correct
/// the input and try again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("step {position} does not exist (collection has {len} steps)")]
    OutOfRange { position: usize, len: usize },

    #[error("unknown action type '{0}'")]
    UnknownActionType(String),

    #[error("step {position} has no field '{field}'")]
    UnknownField { position: usize, field: String },

    #[error("step {position} has no action type selected")]
    IncompleteStep { position: usize },

    #[error("step {position} field '{field}': {reason}")]
    Validation {
        position: usize,
        field: String,
        reason: FieldFailure,
    },

    #[error("automation steps are not valid JSON: {0}")]
    MalformedInput(String),

    #[error("agent name and purpose are required")]
    MissingDetails,

    #[error("automation steps are empty")]
    EmptyInput,

    #[error("at least one step is required")]
    NoSteps,
}

impl EditorError {
    /// Locale key for the message shown to the user
    pub fn locale_key(&self) -> &'static str {
        match self {
            EditorError::OutOfRange { .. }
            | EditorError::UnknownActionType(_)
            | EditorError::UnknownField { .. } => "internal_error",
            EditorError::IncompleteStep { .. } => "incomplete_step_error",
            EditorError::Validation { reason, .. } => reason.locale_key(),
            EditorError::MalformedInput(_) => "invalid_json_error",
            EditorError::MissingDetails | EditorError::EmptyInput => "missing_fields_error",
            EditorError::NoSteps => "no_code_steps_empty_error",
        }
    }

    /// Position of the offending step, when the error concerns one
    pub fn position(&self) -> Option<usize> {
        match self {
            EditorError::OutOfRange { position, .. }
            | EditorError::UnknownField { position, .. }
            | EditorError::IncompleteStep { position }
            | EditorError::Validation { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Contract violations from the rendering layer rather than user mistakes
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            EditorError::OutOfRange { .. }
                | EditorError::UnknownActionType(_)
                | EditorError::UnknownField { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_locale_key_follows_reason() {
        let empty = EditorError::Validation {
            position: 0,
            field: "prompt".to_string(),
            reason: FieldFailure::Empty,
        };
        let malformed = EditorError::Validation {
            position: 1,
            field: "data".to_string(),
            reason: FieldFailure::Malformed("EOF".to_string()),
        };
        assert_eq!(empty.locale_key(), "missing_fields_error");
        assert_eq!(malformed.locale_key(), "invalid_json_error");
        assert_eq!(malformed.position(), Some(1));
    }

    #[test]
    fn test_display_names_position() {
        let err = EditorError::IncompleteStep { position: 2 };
        assert_eq!(err.to_string(), "step 2 has no action type selected");
        assert_eq!(err.position(), Some(2));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_contract_violations_are_internal() {
        assert!(EditorError::UnknownActionType("x".to_string()).is_internal());
        assert!(EditorError::OutOfRange { position: 3, len: 1 }.is_internal());
        assert_eq!(EditorError::NoSteps.position(), None);
    }
}
