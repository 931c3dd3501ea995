//! Pluggable agent backend abstraction
//!
//! This module provides a backend-agnostic interface for running crew
//! tasks against a hosted model runtime.
//!
//! # Architecture
//!
//! - `AgentBackend` trait: defines the interface for task execution
//! - `AgentClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::from_env()?;
//! let client = AgentClient::from_config(&config.model);
//! let text = client.execute_task(&profile, &description, None).await?;
//! ```

mod gemini;
mod mock;
pub mod parsing;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::config::ModelConfig;
use crate::crew::AgentProfile;
use crate::error::Result;
use crate::tools::FileAccess;

/// Trait defining the interface for all agent backends
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Run one task under a persona and return the model's text response
    ///
    /// `files` grants the persona its read capability; pass `None` to run
    /// without tools even when the persona declares file access.
    async fn execute_task(
        &self,
        profile: &AgentProfile,
        description: &str,
        files: Option<&dyn FileAccess>,
    ) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the default model name (for logging)
    fn model(&self) -> &str;
}

/// Concrete agent client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AgentClient {
    /// Hosted Gemini backend (HTTP API)
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AgentClient {
    /// Create a client for the configured model binding
    pub fn from_config(config: &ModelConfig) -> Self {
        AgentClient::Gemini(GeminiBackend::new(&config.api_key, &config.model))
    }

    /// Create a Gemini backend directly
    pub fn gemini(api_key: &str, model: &str) -> Self {
        AgentClient::Gemini(GeminiBackend::new(api_key, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AgentClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different default model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AgentClient::Gemini(b) => AgentClient::Gemini(b.with_model(model)),
            AgentClient::Mock(b) => AgentClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AgentBackend for AgentClient by delegating to the inner backend
#[async_trait]
impl AgentBackend for AgentClient {
    async fn execute_task(
        &self,
        profile: &AgentProfile,
        description: &str,
        files: Option<&dyn FileAccess>,
    ) -> Result<String> {
        match self {
            AgentClient::Gemini(b) => b.execute_task(profile, description, files).await,
            AgentClient::Mock(b) => b.execute_task(profile, description, files).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AgentClient::Gemini(b) => b.health_check().await,
            AgentClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AgentClient::Gemini(b) => b.model(),
            AgentClient::Mock(b) => b.model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_client_mock() {
        let client = AgentClient::mock();
        assert_eq!(client.model(), "mock");
    }

    #[test]
    fn test_agent_client_model_override() {
        let client = AgentClient::gemini("key", "gemini-1.5-pro");
        assert_eq!(client.model(), "gemini-1.5-pro");

        let flash = client.with_model("gemini-1.5-flash");
        assert_eq!(flash.model(), "gemini-1.5-flash");

        // The mock arm keeps its fixed model name
        let mock = AgentClient::mock().with_model("gemini-1.5-flash");
        assert_eq!(mock.model(), "mock");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AgentClient::mock();
        assert!(client.health_check().await);
    }
}
