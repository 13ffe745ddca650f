//! Hand-off of finished agent definitions to the agent backend
//!
//! The editor only produces an [`AgentSubmission`]; transport, response
//! interpretation and status lookups live here behind the [`Submitter`] trait.

pub mod client;

pub use crate::editor::AgentSubmission;
pub use client::BackendClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted response from the create endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAgentResponse {
    /// Human-readable acknowledgement
    pub message: String,
    /// Backend identifier of the new agent
    pub agent_id: i64,
    /// Initial build status (e.g., "pending")
    pub status: String,
}

/// Build status of an agent as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: i64,
    pub name: String,
    /// One of pending, building, ready, failed
    pub status: String,
    pub purpose: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
}

impl AgentStatus {
    /// Whether the backend has stopped working on this agent
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "ready" | "failed")
    }
}

/// Errors from talking to the backend
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("could not reach backend: {0}")]
    Network(String),

    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("agent {0} not found")]
    NotFound(i64),

    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),
}

impl SubmitError {
    /// Message from the backend worth showing verbatim, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            SubmitError::Rejected { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Destination for finished agent definitions
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Send a submission and return the backend's acknowledgement
    async fn create_agent(
        &self,
        submission: &AgentSubmission,
    ) -> Result<CreateAgentResponse, SubmitError>;

    /// Look up the build status of a previously created agent
    async fn agent_status(&self, agent_id: i64) -> Result<AgentStatus, SubmitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_wire_shape() {
        let submission = AgentSubmission {
            name: "Planner".to_string(),
            purpose: "Plans".to_string(),
            automation_steps: r#"[{"action":"llm_call","prompt":"x"}]"#.to_string(),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Planner",
                "purpose": "Plans",
                "automation_steps": "[{\"action\":\"llm_call\",\"prompt\":\"x\"}]"
            })
        );
    }

    #[test]
    fn test_status_finished() {
        let mut status = AgentStatus {
            id: 1,
            name: "a".to_string(),
            status: "building".to_string(),
            purpose: "b".to_string(),
            created_at: "2026-01-01T00:00:00".to_string(),
        };
        assert!(!status.is_finished());
        status.status = "failed".to_string();
        assert!(status.is_finished());
    }

    #[test]
    fn test_backend_message() {
        let err = SubmitError::Rejected {
            status: 400,
            message: "Missing required fields".to_string(),
        };
        assert_eq!(err.backend_message(), Some("Missing required fields"));
        assert_eq!(SubmitError::NotFound(3).backend_message(), None);
    }
}
