//! Insight pipeline orchestration
//!
//! One linear pass per invocation: export, read, task build, model call,
//! parse, envelope. The exporter runs as an isolated child process under
//! a wall-clock timeout; everything after it is sequential. Any failure
//! along the way folds into a failure envelope.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tracing::{error, info};

use crate::ai::parsing::coerce_response;
use crate::ai::AgentBackend;
use crate::crew::CrewPlan;
use crate::error::{Error, Result};
use crate::export::{DEFAULT_EXPORT_PATH, EXIT_NO_DATA};
use crate::tools::{FileAccess, LocalFiles};

use super::envelope::InsightEnvelope;

/// Wall-clock bound on the exporter child process
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the exporter child process is invoked
#[derive(Debug, Clone)]
pub struct ExporterCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExporterCommand {
    /// Exporter invocation; the owner id is appended per run when scoped
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: EXPORT_TIMEOUT,
        }
    }

    /// Re-invoke the current executable's export subcommand
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe()?;
        Ok(Self::new(exe.to_string_lossy(), ["export"]))
    }

    /// Override the wall-clock timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the exporter to completion, bounded by the timeout
    async fn run(&self, owner: Option<&str>) -> Result<ExporterOutcome> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(owner) = owner {
            command.arg(owner);
        }
        command.kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Export(format!(
                    "Exporter timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        match output.status.code() {
            Some(0) => Ok(ExporterOutcome::Exported),
            Some(code) if code == i32::from(EXIT_NO_DATA) => Ok(ExporterOutcome::NoData),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(Error::Export(format!("Exporter failed: {}", stderr.trim())))
            }
        }
    }
}

/// Result of the export stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExporterOutcome {
    /// Transactions were written to the export file
    Exported,
    /// The filtered set was empty; no file was written
    NoData,
}

/// Drives export, crew execution, and response coercion for one run
pub struct InsightPipeline {
    backend: Box<dyn AgentBackend>,
    plan: CrewPlan,
    exporter: ExporterCommand,
    files: Box<dyn FileAccess>,
    export_path: PathBuf,
}

impl InsightPipeline {
    /// Create a pipeline over a backend, a crew plan, and an exporter
    pub fn new(
        backend: impl AgentBackend + 'static,
        plan: CrewPlan,
        exporter: ExporterCommand,
    ) -> Self {
        Self {
            backend: Box::new(backend),
            plan,
            exporter,
            files: Box::new(LocalFiles),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }

    /// Substitute the file capability handed to agents and the READ stage
    pub fn with_file_access(mut self, files: Box<dyn FileAccess>) -> Self {
        self.files = files;
        self
    }

    /// Read the export from a different location
    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    /// Path the pipeline reads the export from
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Produce the insight envelope for an optional owner scope
    ///
    /// Never returns an error: every failure in the run folds into a
    /// failure envelope carrying the message.
    pub async fn run(&self, owner: Option<&str>) -> InsightEnvelope {
        match self.analyze(owner).await {
            Ok(data) => InsightEnvelope::success(data),
            Err(err) => {
                error!("Insight pipeline failed: {}", err);
                InsightEnvelope::failure(err.to_string())
            }
        }
    }

    async fn analyze(&self, owner: Option<&str>) -> Result<Value> {
        if self.plan.tasks.is_empty() {
            return Err(Error::Agent("Crew plan has no tasks".to_string()));
        }

        info!("Exporting transactions...");
        if self.exporter.run(owner).await? == ExporterOutcome::NoData {
            return Err(Error::Export("No transactions found".to_string()));
        }

        let csv_data = self.files.read(&self.export_path)?;
        info!(
            "Transactions exported to {} ({} bytes)",
            self.export_path.display(),
            csv_data.len()
        );

        let mut context = String::new();
        let mut response = String::new();
        for task in &self.plan.tasks {
            let agent = self.plan.agent_for(task)?;

            let mut vars = HashMap::new();
            vars.insert("csv_data", csv_data.as_str());
            if !context.is_empty() {
                vars.insert("context", context.as_str());
            }
            let description = format!(
                "{}\n\nExpected output: {}",
                task.render(&vars),
                task.expected_output
            );

            info!("Running task {} as {}", task.name, agent.role);
            let files: Option<&dyn FileAccess> = if agent.file_access {
                Some(self.files.as_ref())
            } else {
                None
            };
            response = self.backend.execute_task(agent, &description, files).await?;
            context = response.clone();
        }

        // The final task's response is the crew's result
        Ok(coerce_response(&response))
    }
}
