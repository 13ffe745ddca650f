//! Ordered collection of user-authored steps

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::error::EditorError;
use crate::actions::{ActionRegistry, StepDefinition};

/// One step as the user is authoring it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepEntry {
    /// Zero-based rank in the collection
    position: usize,
    /// Selected action type, unset until the user picks one
    action_type: Option<String>,
    /// Raw text per field name, stored verbatim
    field_values: HashMap<String, String>,
}

impl StepEntry {
    fn new(position: usize) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn action_type(&self) -> Option<&str> {
        self.action_type.as_deref()
    }

    /// Raw text entered for a field, if any
    pub fn field_value(&self, field: &str) -> Option<&str> {
        self.field_values.get(field).map(String::as_str)
    }

    pub fn field_values(&self) -> &HashMap<String, String> {
        &self.field_values
    }
}

/// Owns the ordered step entries for one editing session.
///
/// Positions are renumbered here and nowhere else; after every mutation they
/// form the range `0..len` in order.
#[derive(Debug, Clone)]
pub struct StepCollection {
    entries: Vec<StepEntry>,
    registry: Arc<ActionRegistry>,
}

impl StepCollection {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self {
            entries: Vec::new(),
            registry,
        }
    }

    /// Registry the collection validates against
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Append a fresh step with no action type
    pub fn add_step(&mut self) {
        let position = self.entries.len();
        self.entries.push(StepEntry::new(position));
        debug!(position, "Added step");
    }

    /// Remove the step at `position` and shift later steps down by one
    pub fn remove_step(&mut self, position: usize) -> Result<(), EditorError> {
        self.check_position(position)?;
        self.entries.remove(position);
        for entry in &mut self.entries[position..] {
            entry.position -= 1;
        }
        debug!(position, remaining = self.entries.len(), "Removed step");
        Ok(())
    }

    /// Select the action type of a step, discarding its field values
    pub fn set_step_type(&mut self, position: usize, action_type: &str) -> Result<(), EditorError> {
        self.check_position(position)?;
        if !self.registry.contains(action_type) {
            return Err(EditorError::UnknownActionType(action_type.to_string()));
        }

        let entry = &mut self.entries[position];
        entry.field_values.clear();
        entry.action_type = Some(action_type.to_string());
        debug!(position, action_type, "Set step type");
        Ok(())
    }

    /// Store raw text for a field of the step's current action type.
    ///
    /// Nothing is validated here; validation happens at serialization.
    pub fn set_field_value(
        &mut self,
        position: usize,
        field: &str,
        raw_value: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.check_position(position)?;

        let known = self
            .definition_at(position)
            .is_some_and(|def| def.has_field(field));
        if !known {
            return Err(EditorError::UnknownField {
                position,
                field: field.to_string(),
            });
        }

        self.entries[position]
            .field_values
            .insert(field.to_string(), raw_value.into());
        Ok(())
    }

    /// Definition of the action type selected at `position`
    pub fn definition_at(&self, position: usize) -> Option<&StepDefinition> {
        let action_type = self.entries.get(position)?.action_type.as_deref()?;
        self.registry.lookup(action_type)
    }

    pub fn get(&self, position: usize) -> Option<&StepEntry> {
        self.entries.get(position)
    }

    /// Entries in ascending position order
    pub fn entries(&self) -> &[StepEntry] {
        &self.entries
    }

    /// Positions as currently reported
    pub fn positions(&self) -> Vec<usize> {
        self.entries.iter().map(StepEntry::position).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn check_position(&self, position: usize) -> Result<(), EditorError> {
        if position < self.entries.len() {
            Ok(())
        } else {
            Err(EditorError::OutOfRange {
                position,
                len: self.entries.len(),
            })
        }
    }
}
