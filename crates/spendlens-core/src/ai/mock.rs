//! Mock backend for testing
//!
//! Provides configurable canned responses for task execution. Useful for
//! unit tests and development without network access or an API key.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::crew::AgentProfile;
use crate::error::{Error, Result};
use crate::tools::FileAccess;

use super::AgentBackend;

/// Default reply when nothing is queued: a well-formed insight report
const DEFAULT_REPORT: &str = r#"{
  "keyInsights": [
    {"title": "Dining dominates", "description": "Dining out is the largest spending category this period."}
  ],
  "alerts": [
    {"type": "overspending", "severity": "medium", "description": "Entertainment spending is above usual levels.", "recommendation": "Set a monthly entertainment budget."}
  ],
  "suggestions": [
    {"category": "groceries", "suggestion": "Plan meals weekly to reduce impulse purchases."}
  ]
}"#;

/// Mock agent backend for testing
///
/// Returns queued replies in order, falling back to a canned report when
/// the queue is empty. Executed task descriptions are recorded so tests
/// can assert on what the backend was asked.
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            replies: Arc::default(),
            calls: Arc::default(),
            healthy: true,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    /// Queue a reply for an upcoming task
    pub fn enqueue(&self, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
    }

    /// Queue a failure for an upcoming task
    pub fn enqueue_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Task descriptions executed so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentBackend for MockBackend {
    async fn execute_task(
        &self,
        _profile: &AgentProfile,
        description: &str,
        _files: Option<&dyn FileAccess>,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(description.to_string());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(Error::Agent(message)),
            None => Ok(DEFAULT_REPORT.to_string()),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }
}
