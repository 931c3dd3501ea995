//! Integration tests for spendlens-core
//!
//! These tests exercise the full export → crew → envelope pipeline with a
//! staged CSV export and stub exporter processes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use spendlens_core::ai::MockBackend;
use spendlens_core::crew::PlanLibrary;
use spendlens_core::insights::{
    ExporterCommand, InsightPipeline, InsightReport, Severity,
};
use spendlens_core::tools::FileAccess;
use tempfile::TempDir;

/// CSV in the shape the exporter produces: preferred columns first,
/// RFC 3339 timestamps, hex object ids.
fn transactions_csv() -> &'static str {
    r#"_id,userId,type,amount,currency,category,description,recipient,paymentMethod,status,date,walletAddress,tags
507f1f77bcf86cd799439011,507f191e810c19729de860ea,expense,42.50,USD,groceries,Weekly shop,Fresh Mart,card,completed,2024-03-01T09:30:00Z,,food
507f1f77bcf86cd799439012,507f191e810c19729de860ea,expense,12.00,USD,transport,Metro pass,City Transit,card,completed,2024-03-02T08:05:00Z,,commute
507f1f77bcf86cd799439013,507f191e810c19729de860ea,income,1800.00,USD,salary,March payroll,Acme Corp,transfer,completed,2024-03-05T00:00:00Z,,salary"#
}

fn analysis_reply() -> &'static str {
    r#"{"top_categories": {"groceries": 42.5, "transport": 12.0}, "income_expense_ratio": 33.0}"#
}

fn report_reply() -> &'static str {
    r#"{"keyInsights": [{"title": "Food dominates spending", "description": "Groceries make up most discretionary spend."}], "alerts": [{"type": "budget", "severity": "high", "description": "Grocery spend rose sharply this month.", "recommendation": "Set a weekly grocery cap."}], "suggestions": [{"category": "transport", "suggestion": "A monthly pass would cost less than per-ride fares."}]}"#
}

/// Write the staged export into a scratch directory and return its path
fn stage_export(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("transactions_export.csv");
    std::fs::write(&path, transactions_csv()).expect("Failed to stage export");
    path
}

/// Exporter stub that succeeds without touching the staged file
fn noop_exporter() -> ExporterCommand {
    ExporterCommand::new("true", Vec::<String>::new())
}

/// Exporter stub that exits with the given shell script
fn shell_exporter(script: &str) -> ExporterCommand {
    ExporterCommand::new("sh", ["-c", script])
}

fn pipeline_over(backend: MockBackend, dir: &TempDir) -> InsightPipeline {
    let plan = PlanLibrary::embedded_only()
        .default_plan()
        .expect("Failed to load default plan");
    InsightPipeline::new(backend, plan, noop_exporter()).with_export_path(stage_export(dir))
}

/// In-memory file capability serving fixed content for any path
struct FixtureFiles(String);

impl FileAccess for FixtureFiles {
    fn read(&self, _path: &Path) -> spendlens_core::Result<String> {
        Ok(self.0.clone())
    }
}

// =============================================================================
// Crew Execution Tests
// =============================================================================

#[tokio::test]
async fn test_pipeline_runs_crew_over_export() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::new();
    backend.enqueue(analysis_reply());
    backend.enqueue(report_reply());

    let pipeline = pipeline_over(backend.clone(), &dir);
    let envelope = pipeline.run(None).await;

    assert!(envelope.success, "unexpected failure: {:?}", envelope.error);
    assert!(envelope.error.is_none());

    let data = envelope.data.expect("success envelope carries data");
    assert_eq!(data["keyInsights"][0]["title"], "Food dominates spending");
    assert_eq!(data["alerts"][0]["severity"], "high");

    // Both tasks ran, in plan order, each seeing the export verbatim
    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains("CSV DATA:"));
    assert!(calls[0].contains(transactions_csv()));
    assert!(calls[0].contains("Expected output: JSON formatted financial analysis"));

    // The second task receives the first task's output as prior analysis
    assert!(calls[1].contains(transactions_csv()));
    assert!(calls[1].contains("PRIOR ANALYSIS:"));
    assert!(calls[1].contains("income_expense_ratio"));
}

#[tokio::test]
async fn test_successful_report_satisfies_contract() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::new();
    backend.enqueue(analysis_reply());
    backend.enqueue(report_reply());

    let envelope = pipeline_over(backend, &dir).run(None).await;
    let data = envelope.data.expect("success envelope carries data");

    let report = InsightReport::from_value(&data).expect("report keys should parse");
    assert_eq!(report.key_insights.len(), 1);
    assert_eq!(report.alerts[0].severity, Severity::High);
    assert_eq!(report.suggestions[0].category, "transport");
}

#[tokio::test]
async fn test_pipeline_reads_through_injected_file_access() {
    let backend = MockBackend::new();
    backend.enqueue(analysis_reply());
    backend.enqueue(report_reply());

    let plan = PlanLibrary::embedded_only().default_plan().unwrap();
    let pipeline = InsightPipeline::new(backend.clone(), plan, noop_exporter())
        .with_file_access(Box::new(FixtureFiles(transactions_csv().to_string())));

    // No staged file anywhere: the capability supplies the export text
    let envelope = pipeline.run(None).await;

    assert!(envelope.success, "unexpected failure: {:?}", envelope.error);
    assert!(backend.calls()[0].contains(transactions_csv()));
}

#[tokio::test]
async fn test_default_mock_report_satisfies_contract() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::new();

    let envelope = pipeline_over(backend, &dir).run(None).await;

    assert!(envelope.success);
    let data = envelope.data.expect("success envelope carries data");
    assert!(InsightReport::from_value(&data).is_some());
}

// =============================================================================
// Response Coercion Tests
// =============================================================================

#[tokio::test]
async fn test_pipeline_extracts_wrapped_json() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::new();
    backend.enqueue(analysis_reply());
    backend.enqueue(
        r#"Here is your report: {"keyInsights": [], "alerts": [], "suggestions": []} Hope this helps!"#,
    );

    let envelope = pipeline_over(backend, &dir).run(None).await;

    assert!(envelope.success);
    assert_eq!(
        envelope.data.unwrap(),
        json!({"keyInsights": [], "alerts": [], "suggestions": []})
    );
}

#[tokio::test]
async fn test_pipeline_preserves_unparseable_reply() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::new();
    backend.enqueue(analysis_reply());
    backend.enqueue("I could not produce a report for this dataset.");

    let envelope = pipeline_over(backend, &dir).run(None).await;

    assert!(envelope.success);
    let data = envelope.data.expect("success envelope carries data");
    assert_eq!(
        data["raw_response"],
        "I could not produce a report for this dataset."
    );
    assert!(InsightReport::from_value(&data).is_none());
}

// =============================================================================
// Exporter Boundary Tests
// =============================================================================

#[tokio::test]
async fn test_pipeline_reports_empty_export() {
    let dir = TempDir::new().unwrap();
    let plan = PlanLibrary::embedded_only().default_plan().unwrap();
    let pipeline = InsightPipeline::new(MockBackend::new(), plan, shell_exporter("exit 2"))
        .with_export_path(stage_export(&dir));

    let envelope = pipeline.run(None).await;

    assert!(!envelope.success);
    assert!(envelope.data.is_none());
    assert!(envelope.error.unwrap().contains("No transactions found"));
}

#[tokio::test]
async fn test_pipeline_surfaces_exporter_stderr() {
    let dir = TempDir::new().unwrap();
    let plan = PlanLibrary::embedded_only().default_plan().unwrap();
    let pipeline = InsightPipeline::new(
        MockBackend::new(),
        plan,
        shell_exporter("echo export blew up >&2; exit 1"),
    )
    .with_export_path(stage_export(&dir));

    let envelope = pipeline.run(None).await;

    assert!(!envelope.success);
    assert!(envelope.error.unwrap().contains("export blew up"));
}

#[tokio::test]
async fn test_pipeline_times_out_hung_exporter() {
    let dir = TempDir::new().unwrap();
    let plan = PlanLibrary::embedded_only().default_plan().unwrap();
    let exporter = ExporterCommand::new("sleep", ["5"]).with_timeout(Duration::from_millis(200));
    let pipeline =
        InsightPipeline::new(MockBackend::new(), plan, exporter).with_export_path(stage_export(&dir));

    let envelope = pipeline.run(None).await;

    assert!(!envelope.success);
    assert!(envelope.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_pipeline_requires_export_file() {
    let dir = TempDir::new().unwrap();
    let plan = PlanLibrary::embedded_only().default_plan().unwrap();
    let missing = dir.path().join("never_written.csv");
    let pipeline =
        InsightPipeline::new(MockBackend::new(), plan, noop_exporter()).with_export_path(missing);

    let envelope = pipeline.run(None).await;

    assert!(!envelope.success);
    assert!(envelope.error.unwrap().contains("IO error"));
}

#[tokio::test]
async fn test_owner_argument_reaches_exporter() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("argv.txt");
    let script = format!("echo \"$@\" > {}", marker.display());
    let exporter = ExporterCommand::new("sh", ["-c", script.as_str(), "exporter"]);

    let plan = PlanLibrary::embedded_only().default_plan().unwrap();
    let pipeline = InsightPipeline::new(MockBackend::new(), plan, exporter)
        .with_export_path(stage_export(&dir));

    let envelope = pipeline.run(Some("507f191e810c19729de860ea")).await;

    assert!(envelope.success);
    let argv = std::fs::read_to_string(&marker).expect("exporter stub should record argv");
    assert!(argv.contains("507f191e810c19729de860ea"));
}

// =============================================================================
// Model Boundary Tests
// =============================================================================

#[tokio::test]
async fn test_pipeline_wraps_model_failure() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::new();
    backend.enqueue_failure("model unavailable");

    let envelope = pipeline_over(backend, &dir).run(None).await;

    assert!(!envelope.success);
    assert!(envelope.data.is_none());
    assert!(envelope.error.unwrap().contains("model unavailable"));
}
