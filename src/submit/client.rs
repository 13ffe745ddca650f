//! HTTP client for the agent backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{AgentStatus, AgentSubmission, CreateAgentResponse, SubmitError, Submitter};
use crate::config::BackendConfig;

/// Error body returned by the backend on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-based [`Submitter`]
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for `base_url` (e.g., `http://localhost:5000`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("agent-composer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_url(&self) -> String {
        format!("{}/api/create-agent", self.base_url)
    }

    fn status_url(&self, agent_id: i64) -> String {
        format!("{}/api/agents/{}", self.base_url, agent_id)
    }
}

/// Turn a non-success response into a rejection, preferring the backend's message
async fn rejection(response: reqwest::Response) -> SubmitError {
    let status = response.status();
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body),
        Err(e) => e.to_string(),
    };
    SubmitError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Submitter for BackendClient {
    async fn create_agent(
        &self,
        submission: &AgentSubmission,
    ) -> Result<CreateAgentResponse, SubmitError> {
        let url = self.create_url();
        debug!(url = %url, name = %submission.name, "Submitting agent");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(submission)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            warn!(error = %err, "Agent submission rejected");
            return Err(err);
        }

        let accepted: CreateAgentResponse = response
            .json()
            .await
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;
        info!(agent_id = accepted.agent_id, status = %accepted.status, "Agent submitted");
        Ok(accepted)
    }

    async fn agent_status(&self, agent_id: i64) -> Result<AgentStatus, SubmitError> {
        let response = self
            .client
            .get(self.status_url(agent_id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SubmitError::NotFound(agent_id));
        }
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = BackendClient::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.create_url(), "http://localhost:5000/api/create-agent");
        assert_eq!(client.status_url(7), "http://localhost:5000/api/agents/7");
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig {
            url: "http://backend.internal:8080".to_string(),
            timeout_secs: 3,
        };
        let client = BackendClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://backend.internal:8080");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let submission = AgentSubmission {
            name: "a".to_string(),
            purpose: "b".to_string(),
            automation_steps: "[]".to_string(),
        };
        let err = client.create_agent(&submission).await.unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)));
    }
}
