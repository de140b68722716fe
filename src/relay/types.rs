use crate::core::error::InvoiceChatError;
use crate::providers::gemini::types::{
    Content, FunctionCall, GeminiRequest, GeminiResponse, GenerationConfig, Part, Tool,
};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Config keys Gemini takes next to `generationConfig` rather than inside it.
const REQUEST_LEVEL_KEYS: [&str; 4] = ["toolConfig", "safetySettings", "cachedContent", "labels"];

/// Generation request accepted by the relay, forwarded to the provider as-is.
///
/// Only `model` and `contents` are interpreted. Config and tools are carried as
/// raw JSON so fields this crate does not model reach the provider untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RequestConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// Plain text, or a provider-shaped content object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Value>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl RequestConfig {
    pub fn new(
        system_instruction: impl Into<String>,
        generation: &GenerationConfig,
    ) -> Result<Self, InvoiceChatError> {
        let settings = match serde_json::to_value(generation)? {
            Value::Object(settings) => settings,
            _ => Map::new(),
        };
        Ok(Self {
            system_instruction: Some(Value::String(system_instruction.into())),
            settings,
        })
    }

    pub fn instruction_text(&self) -> Option<&str> {
        self.system_instruction.as_ref().and_then(Value::as_str)
    }
}

impl GenerateRequest {
    pub fn new(
        model: impl Into<String>,
        contents: Vec<Content>,
        config: RequestConfig,
        tool: &Tool,
    ) -> Result<Self, InvoiceChatError> {
        Ok(Self {
            model: model.into(),
            contents,
            config: Some(config),
            tools: Some(vec![serde_json::to_value(tool)?]),
        })
    }

    /// Model ids become a URL path segment; only allow what Gemini model ids use.
    pub fn validate(&self) -> Result<(), String> {
        let model = self.model.trim_start_matches("models/");
        if model.is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
        {
            return Err(format!("invalid model id '{}'", self.model));
        }
        if self.contents.is_empty() {
            return Err("contents must not be empty".to_string());
        }
        Ok(())
    }

    pub fn to_provider_request(&self) -> GeminiRequest {
        let config = self.config.clone().unwrap_or_default();
        let mut generation = config.settings;
        let mut extra = Map::new();
        for key in REQUEST_LEVEL_KEYS {
            if let Some(value) = generation.remove(key) {
                extra.insert(key.to_string(), value);
            }
        }

        GeminiRequest {
            contents: self.contents.clone(),
            system_instruction: config.system_instruction.and_then(instruction_content),
            tools: self.tools.clone().filter(|tools| !tools.is_empty()),
            generation_config: Some(generation).filter(|g| !g.is_empty()),
            extra,
        }
    }
}

/// Text becomes role-less content, the shape Gemini expects for
/// `systemInstruction`. Objects are already in that shape.
fn instruction_content(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(json!({"parts": [{"text": text}]})),
        other => Some(other),
    }
}

/// Normalized reply shape returned to relay callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl RelayReply {
    /// Normalize the first candidate of a provider response.
    pub fn from_provider(response: GeminiResponse) -> Result<Self, InvoiceChatError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason);
            return Err(match reason {
                Some(reason) => InvoiceChatError::Api(format!(
                    "the prompt was blocked by the provider ({})",
                    reason
                )),
                None => InvoiceChatError::Api("the provider returned no candidates".to_string()),
            });
        };

        let content = candidate.content.unwrap_or(Content {
            role: None,
            parts: Vec::new(),
        });

        if content.parts.is_empty() {
            if let Some(reason) = candidate.finish_reason.filter(|r| r != "STOP") {
                return Err(InvoiceChatError::Api(format!(
                    "the model stopped without a reply ({})",
                    reason
                )));
            }
        }

        Ok(Self {
            text: content.text(),
            function_calls: content.function_calls(),
            parts: content.parts,
        })
    }

    pub fn has_function_calls(&self) -> bool {
        !self.function_calls.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCode {
    Config,
    Provider,
    Request,
}

/// Error body shared by the relay server and its client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: Option<FailureCode>,
}

/// A relay-level failure rendered as `{error, code}` with a status code.
#[derive(Debug)]
pub struct RelayFailure {
    pub status: StatusCode,
    pub code: FailureCode,
    pub message: String,
}

impl RelayFailure {
    pub fn missing_credential() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: FailureCode::Config,
            message: "the relay has no provider credential configured".to_string(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: FailureCode::Provider,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: FailureCode::Request,
            message: message.into(),
        }
    }
}

impl IntoResponse for RelayFailure {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}
