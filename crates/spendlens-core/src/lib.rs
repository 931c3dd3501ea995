//! SpendLens Core Library
//!
//! Shared functionality for the SpendLens spending insight tool:
//! - Document store access for the transaction collection
//! - CSV export with nested-field flattening and canonical column order
//! - Crew plans: agent personas and task templates with overrides
//! - Pluggable agent backends (Gemini, mock)
//! - Insight pipeline producing the uniform success/error envelope

pub mod ai;
pub mod config;
pub mod crew;
pub mod error;
pub mod export;
pub mod insights;
pub mod store;
pub mod tools;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AgentBackend, AgentClient, GeminiBackend, MockBackend};
pub use config::{Config, ModelConfig, StoreConfig};
pub use crew::{AgentProfile, CrewPlan, PlanId, PlanLibrary, TaskTemplate};
pub use error::{Error, Result};
pub use export::{ExportSummary, DEFAULT_EXPORT_PATH, EXIT_NO_DATA, PREFERRED_COLUMNS};
pub use insights::{
    ExporterCommand, InsightEnvelope, InsightPipeline, InsightReport, Severity, EXPORT_TIMEOUT,
};
pub use store::TransactionStore;
pub use tools::{FileAccess, LocalFiles};
