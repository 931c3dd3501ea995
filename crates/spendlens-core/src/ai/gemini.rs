//! Gemini backend implementation
//!
//! HTTP client for the Gemini generateContent API. Personas render into a
//! system instruction, and the file-read capability is exposed to the
//! model as a declared function with a bounded call loop.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::crew::AgentProfile;
use crate::error::{Error, Result};
use crate::tools::FileAccess;

use super::AgentBackend;

/// Hosted Gemini API endpoint
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Name of the file-read function declared to the model
const READ_TOOL_NAME: &str = "read_csv_file";

/// Upper bound on tool round trips within one task
const MAX_TOOL_TURNS: usize = 5;

/// Gemini backend calling the generateContent endpoint
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    default_model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend against the hosted API
    pub fn new(api_key: &str, default_model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            default_model: default_model.to_string(),
        }
    }

    /// Create a new instance with a different default model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            default_model: model.to_string(),
        }
    }

    /// Create a new instance pointed at a different host (for test servers)
    pub fn with_base_url(&self, base_url: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key.clone(),
            default_model: self.default_model.clone(),
        }
    }
}

/// Request to the generateContent API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDecl>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            function_call: None,
            function_response: None,
        }
    }

    fn tool_reply(name: &str, response: serde_json::Value) -> Self {
        Self {
            text: None,
            function_call: None,
            function_response: Some(FunctionResponse {
                name: name.to_string(),
                response,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDecl {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response from the generateContent API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// System prompt assembled from the persona's role, goal, and backstory
fn system_instruction(profile: &AgentProfile) -> String {
    format!(
        "You are {}. {}\n\nYour goal: {}",
        profile.role, profile.backstory, profile.goal
    )
}

fn read_csv_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: READ_TOOL_NAME.to_string(),
        description: "Read and return CSV file content".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the CSV file"
                }
            },
            "required": ["file_path"]
        }),
    }
}

/// Execute a requested tool call, folding failures into tool output text
fn run_tool(call: &FunctionCall, files: Option<&dyn FileAccess>) -> serde_json::Value {
    if call.name != READ_TOOL_NAME {
        return json!({ "content": format!("Unknown tool: {}", call.name) });
    }
    let Some(files) = files else {
        return json!({ "content": "Error reading file: no file access granted" });
    };

    let path = call
        .args
        .get("file_path")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    match files.read(Path::new(path)) {
        Ok(content) => json!({ "content": content }),
        Err(e) => json!({ "content": format!("Error reading file: {}", e) }),
    }
}

#[async_trait]
impl AgentBackend for GeminiBackend {
    async fn execute_task(
        &self,
        profile: &AgentProfile,
        description: &str,
        files: Option<&dyn FileAccess>,
    ) -> Result<String> {
        let model = profile.model.as_deref().unwrap_or(&self.default_model);
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let tools = if profile.file_access && files.is_some() {
            Some(vec![ToolDecl {
                function_declarations: vec![read_csv_declaration()],
            }])
        } else {
            None
        };

        let mut contents = vec![Content::user(description)];

        for _ in 0..MAX_TOOL_TURNS {
            let request = GenerateRequest {
                system_instruction: Some(Content::user(&system_instruction(profile))),
                contents: contents.clone(),
                tools: tools.clone(),
                generation_config: GenerationConfig {
                    temperature: profile.temperature,
                },
            };

            let response = self
                .http_client
                .post(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(Error::Http(response.error_for_status().unwrap_err()));
            }

            let body: GenerateResponse = response.json().await?;
            let Some(candidate) = body.candidates.into_iter().next() else {
                return Err(Error::Agent("Model returned no candidates".to_string()));
            };

            // A function call costs one more round trip carrying the tool result
            if let Some(call) = candidate
                .content
                .parts
                .iter()
                .find_map(|part| part.function_call.clone())
            {
                debug!("Model requested tool {} as {}", call.name, profile.role);
                let reply = run_tool(&call, files);
                contents.push(candidate.content.clone());
                contents.push(Content {
                    role: "user".to_string(),
                    parts: vec![Part::tool_reply(&call.name, reply)],
                });
                continue;
            }

            let text = candidate
                .content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<Vec<_>>()
                .join("");
            debug!("Gemini response as {}: {} chars", profile.role, text.len());
            return Ok(text);
        }

        Err(Error::Agent(format!(
            "Tool-call loop exceeded {} turns",
            MAX_TOOL_TURNS
        )))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1beta/models/{}", self.base_url, self.default_model);
        match self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.default_model
    }
}
