//! Llama API adapter.
//!
//! Chat completions at `https://api.llama-api.com/chat/completions`. The
//! wire format is OpenAI-flavored with a few vendor quirks: function
//! definitions travel under `functions` with a `function_call: {"name"}`
//! directive, non-stream calls arrive as a single `message.function_call`
//! whose arguments may be a JSON object rather than a string, and the
//! token-limit finish code is spelled `max_token`.

use std::collections::HashMap;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::catalog::ModelSchema;
use crate::error::LlmError;
use crate::provider::{ProviderAdapter, validate_request};
use crate::streaming::FunctionCallsAccumulator;
use crate::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatMessage, FinishReason, FunctionCall,
    MessageContent, MessageRole, PreparedRequest, ProviderCredentials,
};

const API_URL: &str = "https://api.llama-api.com/chat/completions";

/// One completion choice of a full Llama API response.
#[derive(Debug, Deserialize)]
pub struct LlamaApiChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// The vendor sends arguments as a JSON object here, not a string.
    #[serde(default)]
    arguments: Value,
}

/// One partial stream event's choice.
#[derive(Debug, Deserialize)]
pub struct LlamaApiChunk {
    #[serde(default)]
    delta: Option<ChunkDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCallDelta {
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: WireToolCallFunction,
}

#[derive(Debug, Default, Deserialize)]
struct WireToolCallFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// Classifies a Llama API finish code. Total; unrecognized codes map to
/// `Unknown`.
fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" | "max_token" | "max_tokens" => FinishReason::Length,
        "tool_calls" | "function_calls" | "function_call" => FinishReason::FunctionCalls,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}

/// Serializes one unified message into the vendor's message shape.
fn build_message(message: &ChatMessage) -> Value {
    match message.role {
        MessageRole::System => json!({"role": "system", "content": message.content_text()}),
        MessageRole::User => match &message.content {
            Some(MessageContent::Parts(parts)) => json!({"role": "user", "content": parts}),
            content => json!({"role": "user", "content": content}),
        },
        // Function results travel under the vendor's "tool" role.
        MessageRole::Function => json!({
            "role": "tool",
            "content": message.content_text(),
            "tool_call_id": message.id,
        }),
        MessageRole::Assistant => {
            if message.is_assistant_function_calls() {
                let calls: Vec<Value> = message
                    .function_calls
                    .iter()
                    .flatten()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {"name": call.name, "arguments": call.arguments},
                        })
                    })
                    .collect();
                json!({"role": "assistant", "tool_calls": calls, "content": null})
            } else {
                json!({"role": "assistant", "content": message.content_text()})
            }
        }
    }
}

fn build_payload(request: &ChatCompletionRequest) -> Result<Value, LlmError> {
    let messages: Vec<Value> = request.messages.iter().map(build_message).collect();

    let mut payload = Map::new();
    payload.insert("messages".to_string(), Value::Array(messages));
    payload.insert("model".to_string(), json!(request.model_id));
    payload.insert("stream".to_string(), json!(request.stream));
    request.config.apply_to(&mut payload)?;

    if let Some(name) = &request.function_call {
        payload.insert("function_call".to_string(), json!({"name": name}));
    }
    if let Some(functions) = &request.functions {
        payload.insert("functions".to_string(), serde_json::to_value(functions)?);
    }

    debug!(model = %request.model_id, stream = request.stream, "built llama-api payload");
    Ok(Value::Object(payload))
}

/// Stateless Llama API adapter; share one value across streams via `Arc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlamaApiAdapter;

impl LlamaApiAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ProviderAdapter for LlamaApiAdapter {
    type Choice = LlamaApiChoice;
    type ChunkData = LlamaApiChunk;

    fn provider_id(&self) -> &'static str {
        "llama_api"
    }

    fn prepare_request(
        &self,
        request: &ChatCompletionRequest,
        credentials: &ProviderCredentials,
        schema: Option<&ModelSchema>,
    ) -> Result<PreparedRequest, LlmError> {
        validate_request(request, schema)?;

        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", credentials.api_key.expose_secret()),
        );
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Ok(PreparedRequest {
            url: API_URL.to_string(),
            headers,
            payload: build_payload(request)?,
        })
    }

    fn extract_core_data(&self, response: &Value) -> Option<LlamaApiChoice> {
        let choice = response.get("choices")?.as_array()?.first()?;
        serde_json::from_value(choice.clone()).ok()
    }

    fn extract_text_content(&self, choice: &LlamaApiChoice) -> Option<String> {
        choice
            .message
            .as_ref()?
            .content
            .as_ref()
            .filter(|text| !text.is_empty())
            .cloned()
    }

    fn extract_function_calls(&self, choice: &LlamaApiChoice) -> Option<Vec<FunctionCall>> {
        let call = choice.message.as_ref()?.function_call.as_ref()?;
        let arguments = match &call.arguments {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Some(vec![FunctionCall {
            id: FunctionCall::generate_id(),
            name: call.name.clone(),
            arguments,
        }])
    }

    fn extract_finish_reason(&self, choice: &LlamaApiChoice) -> FinishReason {
        choice
            .finish_reason
            .as_deref()
            .map(parse_finish_reason)
            .unwrap_or(FinishReason::Unknown)
    }

    fn stream_check_error(&self, event: &Value) -> Result<(), LlmError> {
        match event.get("error") {
            Some(error) if !error.is_null() => Err(LlmError::provider(error)),
            _ => Ok(()),
        }
    }

    fn stream_extract_chunk_data(&self, event: &Value) -> Option<LlamaApiChunk> {
        let choice = event.get("choices")?.as_array()?.first()?;
        serde_json::from_value(choice.clone()).ok()
    }

    fn stream_extract_chunk(
        &self,
        index: u32,
        chunk: &LlamaApiChunk,
        _accumulated_text: &str,
    ) -> (u32, Option<ChatCompletionChunk>) {
        let content = chunk
            .delta
            .as_ref()
            .and_then(|delta| delta.content.as_deref())
            .filter(|content| !content.is_empty());
        match content {
            Some(content) => (index + 1, Some(ChatCompletionChunk::text(index, content))),
            None => (index, None),
        }
    }

    fn stream_extract_finish_reason(&self, chunk: &LlamaApiChunk) -> Option<FinishReason> {
        chunk
            .finish_reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
            .map(parse_finish_reason)
    }

    fn stream_handle_function_calls(
        &self,
        chunk: &LlamaApiChunk,
        accumulator: FunctionCallsAccumulator,
    ) -> FunctionCallsAccumulator {
        let Some(delta) = chunk
            .delta
            .as_ref()
            .and_then(|delta| delta.tool_calls.as_ref())
            .and_then(|calls| calls.first())
        else {
            return accumulator;
        };
        accumulator.apply_fragment(
            delta.index,
            delta.id.as_deref(),
            delta.function.name.as_deref(),
            delta.function.arguments.as_deref(),
        )
    }
}
