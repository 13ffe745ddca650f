//! Dual-mode automation step editor
//!
//! An [`AutomationEditor`] is one editing session: the agent's name and
//! purpose, plus two independent scratch buffers for the automation steps (raw
//! JSON text and the guided [`StepCollection`]). Only the active mode's buffer
//! is read at submission; switching modes never copies or clears either one.

pub mod collection;
pub mod draft;
pub mod error;
pub mod mode;
pub mod serializer;

pub use collection::{StepCollection, StepEntry};
pub use draft::{BuilderDraft, DraftStep};
pub use error::EditorError;
pub use mode::{AuthoringMode, PendingAutomation};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::actions::ActionRegistry;

/// Payload handed to the submission backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSubmission {
    pub name: String,
    pub purpose: String,
    /// Canonical automation text
    pub automation_steps: String,
}

/// One editing session for an agent definition
#[derive(Debug, Clone)]
pub struct AutomationEditor {
    registry: Arc<ActionRegistry>,
    /// Agent name as typed
    pub name: String,
    /// Agent purpose as typed
    pub purpose: String,
    mode: AuthoringMode,
    raw_text: String,
    steps: StepCollection,
}

impl AutomationEditor {
    /// Start a session in text mode with empty buffers
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self {
            steps: StepCollection::new(Arc::clone(&registry)),
            registry,
            name: String::new(),
            purpose: String::new(),
            mode: AuthoringMode::Text,
            raw_text: String::new(),
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn mode(&self) -> AuthoringMode {
        self.mode
    }

    /// Switch authoring mode.
    ///
    /// Entering the builder with no steps seeds one unset step. No content
    /// moves between the two buffers.
    pub fn switch_mode(&mut self, mode: AuthoringMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if mode == AuthoringMode::Builder && self.steps.is_empty() {
            self.steps.add_step();
        }
        debug!(?mode, "Switched authoring mode");
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn set_raw_text(&mut self, text: impl Into<String>) {
        self.raw_text = text.into();
    }

    pub fn steps(&self) -> &StepCollection {
        &self.steps
    }

    pub fn steps_mut(&mut self) -> &mut StepCollection {
        &mut self.steps
    }

    /// The active mode's buffer
    pub fn pending(&self) -> PendingAutomation<'_> {
        match self.mode {
            AuthoringMode::Text => PendingAutomation::RawText(&self.raw_text),
            AuthoringMode::Builder => PendingAutomation::StructuredSteps(&self.steps),
        }
    }

    /// Validate everything and produce the submission payload
    pub fn submit(&self) -> Result<AgentSubmission, EditorError> {
        let name = self.name.trim();
        let purpose = self.purpose.trim();
        if name.is_empty() || purpose.is_empty() {
            return Err(EditorError::MissingDetails);
        }

        let automation_steps = self.pending().canonical(&self.registry)?;
        info!(
            mode = ?self.mode,
            steps = self.steps.len(),
            "Prepared agent submission"
        );

        Ok(AgentSubmission {
            name: name.to_string(),
            purpose: purpose.to_string(),
            automation_steps,
        })
    }

    /// Clear the session after a successful submission.
    ///
    /// The builder is emptied and, when it is the active mode, reseeded with a
    /// single unset step.
    pub fn reset(&mut self) {
        self.name.clear();
        self.purpose.clear();
        self.raw_text.clear();
        self.steps.clear();
        if self.mode == AuthoringMode::Builder {
            self.steps.add_step();
        }
    }
}
