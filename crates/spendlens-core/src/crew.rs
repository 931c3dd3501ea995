//! Crew plans: agent personas and task templates
//!
//! Plans are loaded with a two-layer resolution:
//! 1. Check for an override in the data dir (~/.local/share/spendlens/plans/overrides/)
//! 2. Fall back to embedded defaults (compiled into the binary)
//!
//! This allows tuning personas and task wording without modifying the
//! source, while automatically getting new defaults on upgrade.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default plans (compiled into binary)
mod defaults {
    pub const FINANCIAL_ANALYST: &str = include_str!("../../../plans/financial_analyst.md");
    pub const BUDGET_ADVISOR: &str = include_str!("../../../plans/budget_advisor.md");
    pub const ANALYSIS_TASK: &str = include_str!("../../../plans/analysis_task.md");
    pub const REPORT_TASK: &str = include_str!("../../../plans/report_task.md");
}

/// Known plan files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanId {
    FinancialAnalyst,
    BudgetAdvisor,
    AnalysisTask,
    ReportTask,
}

impl PlanId {
    /// Get the string identifier for this plan
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinancialAnalyst => "financial_analyst",
            Self::BudgetAdvisor => "budget_advisor",
            Self::AnalysisTask => "analysis_task",
            Self::ReportTask => "report_task",
        }
    }

    /// Get all known plan IDs
    pub fn all() -> &'static [PlanId] {
        &[
            Self::FinancialAnalyst,
            Self::BudgetAdvisor,
            Self::AnalysisTask,
            Self::ReportTask,
        ]
    }

    /// Get the default embedded content for this plan
    fn default_content(&self) -> &'static str {
        match self {
            Self::FinancialAnalyst => defaults::FINANCIAL_ANALYST,
            Self::BudgetAdvisor => defaults::BUDGET_ADVISOR,
            Self::AnalysisTask => defaults::ANALYSIS_TASK,
            Self::ReportTask => defaults::REPORT_TASK,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AgentFrontmatter {
    name: String,
    role: String,
    goal: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default)]
    file_access: bool,
}

fn default_temperature() -> f32 {
    0.7
}

/// Persona binding for a model-backed agent
#[derive(Debug, Clone)]
pub struct AgentProfile {
    /// Identifier tasks use to bind to this persona
    pub name: String,
    /// Role description handed to the model runtime
    pub role: String,
    /// What this persona is trying to achieve
    pub goal: String,
    /// Model override; falls back to the configured default when absent
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether the persona may read files through the file capability
    pub file_access: bool,
    /// Persona background, taken from the plan body
    pub backstory: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TaskFrontmatter {
    name: String,
    agent: String,
    expected_output: String,
}

/// A task description template bound to a persona
#[derive(Debug, Clone)]
pub struct TaskTemplate {
    pub name: String,
    /// Name of the persona that runs this task
    pub agent: String,
    /// Hint describing the expected response shape
    pub expected_output: String,
    /// Description body with {{var}} placeholders
    pub template: String,
}

impl TaskTemplate {
    /// Render the task description with template variables replaced
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        let mut result = self.template.clone();

        // Simple mustache-style replacement: {{var}}
        for (key, value) in vars {
            let pattern = format!("{{{{{}}}}}", key);
            result = result.replace(&pattern, value);
        }

        // Conditional blocks ({{#if var}}...{{/if}}) drop out when the
        // variable is absent or empty
        remove_unmatched_conditionals(&result, vars)
    }
}

/// A full crew: personas plus the ordered tasks they run
#[derive(Debug, Clone)]
pub struct CrewPlan {
    pub agents: Vec<AgentProfile>,
    pub tasks: Vec<TaskTemplate>,
}

impl CrewPlan {
    /// Look up the persona a task binds to
    pub fn agent_for(&self, task: &TaskTemplate) -> Result<&AgentProfile> {
        self.agents
            .iter()
            .find(|agent| agent.name == task.agent)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "Task {} names unknown agent {}",
                    task.name, task.agent
                ))
            })
    }
}

/// Plan library resolving overrides before embedded defaults
pub struct PlanLibrary {
    override_dir: Option<PathBuf>,
}

impl PlanLibrary {
    /// Create a plan library with the default override path
    pub fn new() -> Self {
        Self {
            override_dir: default_plans_dir(),
        }
    }

    /// Create a plan library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
        }
    }

    /// Create a plan library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self { override_dir: None }
    }

    /// Load the standard insight crew: analyst and advisor personas, an
    /// analysis pass, and a final report task
    pub fn default_plan(&self) -> Result<CrewPlan> {
        Ok(CrewPlan {
            agents: vec![
                self.load_agent(PlanId::FinancialAnalyst)?,
                self.load_agent(PlanId::BudgetAdvisor)?,
            ],
            tasks: vec![
                self.load_task(PlanId::AnalysisTask)?,
                self.load_task(PlanId::ReportTask)?,
            ],
        })
    }

    /// Load a persona plan
    pub fn load_agent(&self, id: PlanId) -> Result<AgentProfile> {
        let content = self.raw(id)?;
        let (front, backstory): (AgentFrontmatter, String) = parse_plan(&content)?;
        Ok(AgentProfile {
            name: front.name,
            role: front.role,
            goal: front.goal,
            model: front.model,
            temperature: front.temperature,
            file_access: front.file_access,
            backstory,
        })
    }

    /// Load a task plan
    pub fn load_task(&self, id: PlanId) -> Result<TaskTemplate> {
        let content = self.raw(id)?;
        let (front, template): (TaskFrontmatter, String) = parse_plan(&content)?;
        Ok(TaskTemplate {
            name: front.name,
            agent: front.agent,
            expected_output: front.expected_output,
            template,
        })
    }

    /// Check if a plan has an override file
    pub fn has_override(&self, id: PlanId) -> bool {
        match self.override_dir {
            Some(ref dir) => dir.join(format!("{}.md", id.as_str())).exists(),
            None => false,
        }
    }

    /// Plan content, checking the override dir before embedded defaults
    fn raw(&self, id: PlanId) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.md", id.as_str()));
            if path.exists() {
                return fs::read_to_string(&path).map_err(|e| {
                    Error::InvalidData(format!("Failed to read plan override: {}", e))
                });
            }
        }
        Ok(id.default_content().to_string())
    }
}

impl Default for PlanLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default plans override directory
pub fn default_plans_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendlens").join("plans").join("overrides"))
}

/// Parse a plan file into frontmatter and body
fn parse_plan<T: serde::de::DeserializeOwned>(content: &str) -> Result<(T, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Plan must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest
        .find("---")
        .ok_or_else(|| Error::InvalidData("Plan frontmatter not closed (missing second ---)".into()))?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let meta: T = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid plan frontmatter: {}", e)))?;

    Ok((meta, body.to_string()))
}

/// Remove unmatched conditional blocks from a rendered template
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = content.to_string();

    loop {
        let Some(if_start) = result.find("{{#if ") else {
            break;
        };
        let var_start = if_start + 6;
        let Some(var_len) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_len].to_string();
        let block_start = var_start + var_len + 2;
        let Some(endif) = result[block_start..].find("{{/if}}") else {
            break;
        };

        let block = result[block_start..block_start + endif].to_string();
        let after = block_start + endif + "{{/if}}".len();

        let keep = vars.get(var_name.as_str()).is_some_and(|v| !v.is_empty());
        let replacement = if keep { block.as_str() } else { "" };
        result = format!("{}{}{}", &result[..if_start], replacement, &result[after..]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_agent_plan() {
        let content = r#"---
name: test_agent
role: Test Analyst
goal: Check things carefully
temperature: 0.2
file_access: true
---

A careful reviewer of numbers."#;

        let (front, body): (AgentFrontmatter, String) = parse_plan(content).unwrap();
        assert_eq!(front.name, "test_agent");
        assert_eq!(front.role, "Test Analyst");
        assert_eq!(front.temperature, 0.2);
        assert!(front.file_access);
        assert!(front.model.is_none());
        assert_eq!(body, "A careful reviewer of numbers.");
    }

    #[test]
    fn test_parse_rejects_missing_frontmatter() {
        let result: Result<(TaskFrontmatter, String)> = parse_plan("no frontmatter here");
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_task_render() {
        let task = TaskTemplate {
            name: "t".to_string(),
            agent: "a".to_string(),
            expected_output: "JSON".to_string(),
            template: "CSV DATA:\n{{csv_data}}\n\nAnalyze it.".to_string(),
        };

        let mut vars = HashMap::new();
        vars.insert("csv_data", "_id,amount\n1,2.5");

        let rendered = task.render(&vars);
        assert!(rendered.contains("_id,amount\n1,2.5"));
        assert!(rendered.contains("Analyze it."));
    }

    #[test]
    fn test_conditional_context_block() {
        let task = TaskTemplate {
            name: "t".to_string(),
            agent: "a".to_string(),
            expected_output: "JSON".to_string(),
            template: "Start{{#if context}}\nPRIOR: {{context}}{{/if}}\nEnd".to_string(),
        };

        let mut vars = HashMap::new();
        vars.insert("context", "earlier findings");
        let rendered = task.render(&vars);
        assert!(rendered.contains("PRIOR: earlier findings"));

        let empty: HashMap<&str, &str> = HashMap::new();
        let rendered = task.render(&empty);
        assert!(!rendered.contains("PRIOR"));
        assert!(rendered.contains("Start"));
        assert!(rendered.contains("End"));
    }

    #[test]
    fn test_default_plan_loads() {
        let lib = PlanLibrary::embedded_only();
        let plan = lib.default_plan().unwrap();

        assert_eq!(plan.agents.len(), 2);
        assert_eq!(plan.tasks.len(), 2);
        for task in &plan.tasks {
            let agent = plan.agent_for(task).unwrap();
            assert!(agent.file_access);
        }
    }

    #[test]
    fn test_default_plans_parse() {
        let lib = PlanLibrary::embedded_only();
        for id in [PlanId::FinancialAnalyst, PlanId::BudgetAdvisor] {
            let agent = lib.load_agent(id).unwrap();
            assert_eq!(agent.name, id.as_str());
            assert!(!agent.backstory.is_empty());
        }
        for id in [PlanId::AnalysisTask, PlanId::ReportTask] {
            let task = lib.load_task(id).unwrap();
            assert_eq!(task.name, id.as_str());
            assert!(task.template.contains("{{csv_data}}"));
        }
    }

    #[test]
    fn test_plan_id_all() {
        assert_eq!(PlanId::all().len(), 4);
    }

    #[test]
    fn test_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("financial_analyst.md");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "---\nname: financial_analyst\nrole: Custom Analyst\ngoal: Custom goal\n---\n\nCustom backstory."
        )
        .unwrap();

        let lib = PlanLibrary::with_override_dir(dir.path().to_path_buf());
        assert!(lib.has_override(PlanId::FinancialAnalyst));
        assert!(!lib.has_override(PlanId::BudgetAdvisor));

        let agent = lib.load_agent(PlanId::FinancialAnalyst).unwrap();
        assert_eq!(agent.role, "Custom Analyst");
        assert_eq!(agent.backstory, "Custom backstory.");

        let embedded = lib.load_agent(PlanId::BudgetAdvisor).unwrap();
        assert_eq!(embedded.role, "Budget Advisor");
    }
}
