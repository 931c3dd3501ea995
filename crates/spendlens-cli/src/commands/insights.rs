//! Insight pipeline command implementation

use std::process::ExitCode;

use anyhow::{Context, Result};
use spendlens_core::ai::AgentClient;
use spendlens_core::config::Config;
use spendlens_core::crew::PlanLibrary;
use spendlens_core::insights::{ExporterCommand, InsightPipeline};

/// Run the full insight pipeline and print the result envelope
///
/// Pipeline failures are reported inside the envelope, so once
/// configuration is loaded the command always exits 0.
pub async fn cmd_insights(owner: Option<&str>) -> Result<ExitCode> {
    let config = Config::from_env().context("Insights need a model API key")?;

    println!("📝 Setting up insight crew with Gemini...");
    let plan = PlanLibrary::new().default_plan()?;
    let backend = AgentClient::from_config(&config.model);
    let exporter = ExporterCommand::current_exe()?;
    let pipeline = InsightPipeline::new(backend, plan, exporter);

    println!("\n🚀 Running insight analysis with Gemini...");
    let envelope = pipeline.run(owner).await;

    if envelope.success {
        println!("\n{}", "=".repeat(60));
        println!("✅ INSIGHTS ANALYSIS COMPLETE");
        println!("{}", "=".repeat(60));
    } else {
        println!("❌ Failed to generate insights");
    }
    println!("{}", envelope.to_json_pretty()?);

    Ok(ExitCode::SUCCESS)
}
