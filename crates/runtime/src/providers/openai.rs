//! OpenAI Chat Completions backend.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolSpec,
    Usage,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// How much hidden reasoning the model spends before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
}

/// How long the model's visible answers should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Low,
    Medium,
    High,
}

/// Model-specific knobs sent with every request. Unset fields are omitted
/// so the provider's defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
    #[serde(flatten)]
    settings: ModelSettings,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ApiMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ApiToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type", default)]
    call_type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    /// JSON-encoded arguments.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ApiFunction<'a>,
}

#[derive(Debug, Serialize)]
struct ApiFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an OpenAI backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    api_key: Secret<String>,
    model: String,
    base_url: String,
    settings: ModelSettings,
}

impl OpenAiBackendBuilder {
    pub fn new(api_key: Secret<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            settings: ModelSettings::default(),
        }
    }

    /// Point the backend at another OpenAI-compatible endpoint.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> OpenAiBackend {
        let base = self.base_url.trim_end_matches('/');
        OpenAiBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            completions_url: format!("{base}/chat/completions"),
            model: self.model,
            settings: self.settings,
        }
    }
}

/// OpenAI Chat Completions backend.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: Secret<String>,
    completions_url: String,
    model: String,
    settings: ModelSettings,
}

impl OpenAiBackend {
    pub fn builder(api_key: Secret<String>, model: impl Into<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages_to_api(system: Option<&str>, messages: &[Message]) -> Vec<ApiMessage> {
        let mut api = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system {
            api.push(ApiMessage::System {
                content: system.to_string(),
            });
        }

        for msg in messages {
            match msg.role {
                Role::System => api.push(ApiMessage::System {
                    content: msg.text(),
                }),
                Role::Assistant => {
                    let text = msg.text();
                    let tool_calls = msg
                        .tool_calls()
                        .into_iter()
                        .map(|call| ApiToolCall {
                            id: call.id,
                            call_type: "function".to_string(),
                            function: ApiFunctionCall {
                                name: call.name,
                                arguments: call.input.to_string(),
                            },
                        })
                        .collect();
                    api.push(ApiMessage::Assistant {
                        content: (!text.is_empty()).then_some(text),
                        tool_calls,
                    });
                }
                Role::User => {
                    // Tool results travel as separate `tool` messages; any
                    // text in the same message follows them as a user turn.
                    for part in &msg.parts {
                        if let Part::ToolResult(result) = part {
                            api.push(ApiMessage::Tool {
                                tool_call_id: result.tool_call_id.clone(),
                                content: result.output.clone(),
                            });
                        }
                    }
                    let text = msg.text();
                    if !text.is_empty() || !msg.is_tool_results() {
                        api.push(ApiMessage::User { content: text });
                    }
                }
            }
        }
        api
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool<'_> {
        ApiTool {
            tool_type: "function",
            function: ApiFunction {
                name: &spec.name,
                description: &spec.description,
                parameters: &spec.schema,
            },
        }
    }

    fn response_to_message(message: ApiResponseMessage) -> Message {
        let mut parts = Vec::new();
        if let Some(text) = message.content.filter(|t| !t.is_empty()) {
            parts.push(Part::Text(text));
        }
        for call in message.tool_calls.unwrap_or_default() {
            // Arguments the model failed to encode as JSON are passed through
            // as a string so the tool host can reject them.
            let input = serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments));
            parts.push(Part::ToolCall(ToolCall {
                id: call.id,
                name: call.function.name,
                input,
            }));
        }

        Message {
            role: Role::Assistant,
            parts,
        }
    }
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({})", self.model)
    }
}

impl Backend for OpenAiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = ApiRequest {
            model: &self.model,
            messages: Self::messages_to_api(request.system, request.messages),
            tools: request.tools.iter().map(Self::tool_to_api).collect(),
            settings: self.settings,
        };

        tracing::debug!(
            model = %self.model,
            messages = api_request.messages.len(),
            tools = api_request.tools.len(),
            "calling chat completions"
        );

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(self.api_key.expose_secret())
            .header("accept", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".into()))?;

        let usage = api_response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ModelResponse {
            message: Self::response_to_message(choice.message),
            usage,
        })
    }
}
