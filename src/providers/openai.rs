//! OpenAI chat-completions adapter.
//!
//! Differs from the Llama API wire format where it matters: function
//! definitions travel as `tools` entries with a `tool_choice` directive,
//! non-stream calls arrive as a `message.tool_calls` array with
//! vendor-supplied ids and string arguments, and a stream event may batch
//! several tool-call deltas in one chunk.

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

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// One completion choice of a full response.
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
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
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// One partial stream event's choice.
#[derive(Debug, Deserialize)]
pub struct OpenAiChunk {
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
    function: WireFunctionDelta,
}

#[derive(Debug, Default, Deserialize)]
struct WireFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "tool_calls" | "function_calls" | "function_call" => FinishReason::FunctionCalls,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}

fn build_message(message: &ChatMessage) -> Value {
    match message.role {
        MessageRole::System => json!({"role": "system", "content": message.content_text()}),
        MessageRole::User => match &message.content {
            Some(MessageContent::Parts(parts)) => json!({"role": "user", "content": parts}),
            content => json!({"role": "user", "content": content}),
        },
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

    if let Some(functions) = &request.functions {
        let tools: Vec<Value> = functions
            .iter()
            .map(|function| {
                Ok(json!({
                    "type": "function",
                    "function": serde_json::to_value(function)?,
                }))
            })
            .collect::<Result<_, LlmError>>()?;
        payload.insert("tools".to_string(), Value::Array(tools));
    }
    if let Some(name) = &request.function_call {
        payload.insert(
            "tool_choice".to_string(),
            json!({"type": "function", "function": {"name": name}}),
        );
    }

    debug!(model = %request.model_id, stream = request.stream, "built openai payload");
    Ok(Value::Object(payload))
}

/// Stateless OpenAI adapter. The base URL is configurable so
/// OpenAI-compatible gateways can reuse the adapter unchanged.
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    base_url: String,
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiAdapter {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl ProviderAdapter for OpenAiAdapter {
    type Choice = OpenAiChoice;
    type ChunkData = OpenAiChunk;

    fn provider_id(&self) -> &'static str {
        "openai"
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
        if let Some(organization) = credentials.extra.get("organization") {
            headers.insert("OpenAI-Organization".to_string(), organization.clone());
        }

        Ok(PreparedRequest {
            url: self.endpoint(),
            headers,
            payload: build_payload(request)?,
        })
    }

    fn extract_core_data(&self, response: &Value) -> Option<OpenAiChoice> {
        let choice = response.get("choices")?.as_array()?.first()?;
        serde_json::from_value(choice.clone()).ok()
    }

    fn extract_text_content(&self, choice: &OpenAiChoice) -> Option<String> {
        choice
            .message
            .as_ref()?
            .content
            .as_ref()
            .filter(|text| !text.is_empty())
            .cloned()
    }

    fn extract_function_calls(&self, choice: &OpenAiChoice) -> Option<Vec<FunctionCall>> {
        let calls = choice.message.as_ref()?.tool_calls.as_ref()?;
        if calls.is_empty() {
            return None;
        }
        Some(
            calls
                .iter()
                .map(|call| FunctionCall {
                    id: call
                        .id
                        .clone()
                        .unwrap_or_else(FunctionCall::generate_id),
                    name: call.function.name.clone(),
                    arguments: call.function.arguments.clone(),
                })
                .collect(),
        )
    }

    fn extract_finish_reason(&self, choice: &OpenAiChoice) -> FinishReason {
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

    fn stream_extract_chunk_data(&self, event: &Value) -> Option<OpenAiChunk> {
        let choice = event.get("choices")?.as_array()?.first()?;
        serde_json::from_value(choice.clone()).ok()
    }

    fn stream_extract_chunk(
        &self,
        index: u32,
        chunk: &OpenAiChunk,
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

    fn stream_extract_finish_reason(&self, chunk: &OpenAiChunk) -> Option<FinishReason> {
        chunk
            .finish_reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
            .map(parse_finish_reason)
    }

    fn stream_handle_function_calls(
        &self,
        chunk: &OpenAiChunk,
        accumulator: FunctionCallsAccumulator,
    ) -> FunctionCallsAccumulator {
        let Some(deltas) = chunk
            .delta
            .as_ref()
            .and_then(|delta| delta.tool_calls.as_ref())
        else {
            return accumulator;
        };
        // One chunk may batch deltas for several calls; fold them in order.
        deltas.iter().fold(accumulator, |acc, delta| {
            acc.apply_fragment(
                delta.index,
                delta.id.as_deref(),
                delta.function.name.as_deref(),
                delta.function.arguments.as_deref(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatFunction;
    use serde_json::json;

    fn credentials() -> ProviderCredentials {
        ProviderCredentials::new("sk-test").with_extra("organization", "org-42")
    }

    #[test]
    fn functions_become_tools_and_the_directive_becomes_tool_choice() {
        let adapter = OpenAiAdapter::new();
        let request = ChatCompletionRequest::new("gpt-4o-mini", vec![ChatMessage::user("weather?")])
            .with_functions(vec![ChatFunction::new(
                "get_weather",
                json!({"type": "object"}),
            )])
            .with_function_call("get_weather");

        let prepared = adapter
            .prepare_request(&request, &credentials(), None)
            .unwrap();

        assert_eq!(
            prepared.url,
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(prepared.headers["OpenAI-Organization"], "org-42");
        assert_eq!(prepared.payload["tools"][0]["type"], "function");
        assert_eq!(
            prepared.payload["tools"][0]["function"]["name"],
            "get_weather"
        );
        assert_eq!(
            prepared.payload["tool_choice"],
            json!({"type": "function", "function": {"name": "get_weather"}})
        );
        assert!(prepared.payload.get("functions").is_none());
    }

    #[test]
    fn custom_base_urls_are_normalized() {
        let adapter = OpenAiAdapter::with_base_url("https://gateway.example.com/v1/");
        assert_eq!(
            adapter.endpoint(),
            "https://gateway.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn multiple_tool_calls_are_extracted_with_vendor_ids() {
        let adapter = OpenAiAdapter::new();
        let choice = adapter
            .extract_core_data(&json!({"choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {"id": "call_a", "function": {"name": "get_weather", "arguments": "{\"city\":\"Tokyo\"}"}},
                        {"id": "call_b", "function": {"name": "get_time", "arguments": "{}"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }]}))
            .unwrap();

        let calls = adapter.extract_function_calls(&choice).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[1].name, "get_time");
        assert_eq!(
            adapter.extract_finish_reason(&choice),
            FinishReason::FunctionCalls
        );
        assert!(adapter.extract_text_content(&choice).is_none());
    }

    #[test]
    fn batched_tool_call_deltas_fold_in_order() {
        let adapter = OpenAiAdapter::new();
        let chunk = adapter
            .stream_extract_chunk_data(&json!({"choices": [{"delta": {"tool_calls": [
                {"index": 0, "id": "call_a", "function": {"name": "first", "arguments": "{\"a\""}},
                {"index": 0, "function": {"arguments": ":1}"}},
                {"index": 1, "id": "call_b", "function": {"name": "second", "arguments": ""}}
            ]}}]}))
            .unwrap();

        let calls = adapter
            .stream_handle_function_calls(&chunk, FunctionCallsAccumulator::new())
            .finalize();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].arguments, "{\"a\":1}");
        assert_eq!(calls[1].name, "second");
        assert_eq!(calls[1].arguments, "");
    }

    #[test]
    fn unknown_finish_codes_classify_to_unknown() {
        assert_eq!(parse_finish_reason("flagged"), FinishReason::Unknown);
        assert_eq!(parse_finish_reason("tool_calls"), FinishReason::FunctionCalls);
    }
}
