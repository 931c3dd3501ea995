//! Insight pipeline - from exported transactions to structured spending insights
//!
//! One invocation drives a single linear pass: export transactions to CSV
//! through a child process, read the file back, run the crew plan's tasks
//! against the agent backend, and coerce the final response into the
//! uniform success/error envelope.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendlens_core::insights::{ExporterCommand, InsightPipeline};
//!
//! let pipeline = InsightPipeline::new(client, plan, ExporterCommand::current_exe()?);
//! let envelope = pipeline.run(owner.as_deref()).await;
//! println!("{}", envelope.to_json_pretty()?);
//! ```

pub mod envelope;
pub mod pipeline;
pub mod report;

pub use envelope::InsightEnvelope;
pub use pipeline::{ExporterCommand, ExporterOutcome, InsightPipeline, EXPORT_TIMEOUT};
pub use report::{Alert, InsightReport, KeyInsight, Severity, Suggestion};
