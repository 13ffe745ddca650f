//! Builder drafts stored as files
//!
//! A draft is the builder's input written down: a list of steps, each with an
//! optional action type and the raw field text. Replaying a draft drives the
//! same collection operations the terminal UI uses, so a draft fails exactly
//! where an interactive session would.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use super::collection::StepCollection;
use super::error::EditorError;

/// One step of a builder draft
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftStep {
    /// Action type, `null` to leave the step unset
    #[serde(default)]
    pub action: Option<String>,
    /// Field text by name; non-string values are stored as their JSON text
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Ordered list of draft steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuilderDraft {
    pub steps: Vec<DraftStep>,
}

impl BuilderDraft {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a draft from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read draft: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse draft: {}", path.display()))
    }

    /// Append the draft's steps to `steps`
    pub fn apply(&self, steps: &mut StepCollection) -> Result<(), EditorError> {
        for draft in &self.steps {
            steps.add_step();
            let position = steps.len() - 1;

            let Some(action) = draft.action.as_deref() else {
                continue;
            };
            steps.set_step_type(position, action)?;

            for (field, value) in &draft.fields {
                let raw = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                steps.set_field_value(position, field, raw)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionRegistry;
    use crate::editor::serializer;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn collection() -> StepCollection {
        StepCollection::new(Arc::new(ActionRegistry::builtin()))
    }

    #[test]
    fn test_apply_draft_with_object_field() {
        let draft = BuilderDraft::from_json(
            r#"[
                {"action": "llm_call", "fields": {"prompt": "plan the week"}},
                {"action": "save_data", "fields": {"data": {"k": 1}}}
            ]"#,
        )
        .unwrap();

        let mut steps = collection();
        draft.apply(&mut steps).unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps.get(1).unwrap().field_value("data"), Some(r#"{"k":1}"#));
        let text = serializer::serialize(&steps, steps.registry()).unwrap();
        assert_eq!(
            text,
            r#"[{"action":"llm_call","prompt":"plan the week"},{"action":"save_data","data":{"k":1}}]"#
        );
    }

    #[test]
    fn test_apply_draft_with_unset_step() {
        let draft = BuilderDraft::from_json(r#"[{"action": null}, {}]"#).unwrap();
        let mut steps = collection();
        draft.apply(&mut steps).unwrap();
        assert_eq!(steps.positions(), vec![0, 1]);
        assert!(steps.get(0).unwrap().action_type().is_none());
    }

    #[test]
    fn test_apply_draft_unknown_field() {
        let draft = BuilderDraft::from_json(
            r#"[{"action": "llm_call", "fields": {"subject": "nope"}}]"#,
        )
        .unwrap();
        let mut steps = collection();
        assert!(matches!(
            draft.apply(&mut steps),
            Err(EditorError::UnknownField { position: 0, .. })
        ));
    }

    #[test]
    fn test_load_draft_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("draft.json");
        fs::write(&path, r#"[{"action": "send_email"}]"#).unwrap();

        let draft = BuilderDraft::load(&path).unwrap();
        assert_eq!(draft.steps.len(), 1);
        assert_eq!(draft.steps[0].action.as_deref(), Some("send_email"));
        assert!(draft.steps[0].fields.is_empty());
    }
}
