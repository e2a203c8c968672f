//! The per-vendor adapter contract.
//!
//! One [`ProviderAdapter`] implementation exists per vendor. Adapters are
//! stateless translators: all stream state (chunk index, accumulated text,
//! the function-calls accumulator) lives with the stream's owner, so one
//! adapter value can serve any number of concurrent streams behind an
//! `Arc`.

use serde_json::Value;

use crate::catalog::{ModelSchema, ensure_chat_model};
use crate::error::LlmError;
use crate::streaming::FunctionCallsAccumulator;
use crate::types::{
    ChatCompletionChunk, ChatCompletionRequest, FinishReason, FunctionCall, PreparedRequest,
    ProviderCredentials,
};

/// Translates between one vendor's wire format and the unified model.
///
/// The associated types keep each vendor's wire shapes internal to its
/// adapter: `Choice` is the vendor-local record for one completion choice of
/// a full response, `ChunkData` the record for one partial stream event.
/// The extraction methods return `None` for anything absent or malformed;
/// absence is never an error (heartbeat and bookkeeping events are common
/// and must not abort a stream). Only explicit vendor error payloads
/// (`stream_check_error`) and request validation (`prepare_request`) produce
/// errors.
pub trait ProviderAdapter: Send + Sync {
    /// Vendor-local record for one completion choice of a full response.
    type Choice;
    /// Vendor-local record for one partial stream event.
    type ChunkData;

    /// Short vendor identifier, used in tracing output.
    fn provider_id(&self) -> &'static str;

    /// Builds the outbound request: endpoint, headers, and payload.
    ///
    /// Pure; performs no I/O. Fails with [`LlmError::InvalidRequest`] on an
    /// empty message list and [`LlmError::UnsupportedConfiguration`] when
    /// the request asks for something this adapter cannot express. Unset
    /// config options are omitted from the payload rather than sent as
    /// nulls.
    fn prepare_request(
        &self,
        request: &ChatCompletionRequest,
        credentials: &ProviderCredentials,
        schema: Option<&ModelSchema>,
    ) -> Result<PreparedRequest, LlmError>;

    /// Pulls the completion choice out of one full response document.
    /// `None` when the response carries no choice (e.g. empty `choices`);
    /// callers treat that as "no content produced", not as an error.
    fn extract_core_data(&self, response: &Value) -> Option<Self::Choice>;

    /// Text content of a choice, if any.
    fn extract_text_content(&self, choice: &Self::Choice) -> Option<String>;

    /// Function calls of a choice, if any.
    fn extract_function_calls(&self, choice: &Self::Choice) -> Option<Vec<FunctionCall>>;

    /// Classifies the choice's completion code. Total: unrecognized vendor
    /// codes map to [`FinishReason::Unknown`].
    fn extract_finish_reason(&self, choice: &Self::Choice) -> FinishReason;

    /// Fails with [`LlmError::Provider`] when the event encodes an upstream
    /// error. Runs before any extraction on every event.
    fn stream_check_error(&self, event: &Value) -> Result<(), LlmError>;

    /// Mirrors [`extract_core_data`](Self::extract_core_data) for one
    /// partial event.
    fn stream_extract_chunk_data(&self, event: &Value) -> Option<Self::ChunkData>;

    /// Extracts a text delta chunk, if the event carries one.
    ///
    /// Returns the next index and the chunk. The index advances only when a
    /// non-empty delta is found, so downstream consumers can read it as
    /// "count of text-bearing chunks emitted", not "count of events seen".
    /// `accumulated_text` is the text emitted so far, for vendors whose
    /// events repeat the full text instead of a delta.
    fn stream_extract_chunk(
        &self,
        index: u32,
        chunk: &Self::ChunkData,
        accumulated_text: &str,
    ) -> (u32, Option<ChatCompletionChunk>);

    /// Finish reason of a partial event, if it carries one.
    fn stream_extract_finish_reason(&self, chunk: &Self::ChunkData) -> Option<FinishReason>;

    /// Folds the event's tool-call delta (if any) into the accumulator.
    ///
    /// Functional update: the accumulator is passed in and returned, so
    /// ownership is explicit and the step is testable without a live
    /// stream. Events without a tool-call delta return it untouched.
    fn stream_handle_function_calls(
        &self,
        chunk: &Self::ChunkData,
        accumulator: FunctionCallsAccumulator,
    ) -> FunctionCallsAccumulator;
}

/// Shared request validation, run by every adapter at the top of
/// `prepare_request`.
pub fn validate_request(
    request: &ChatCompletionRequest,
    schema: Option<&ModelSchema>,
) -> Result<(), LlmError> {
    if request.messages.is_empty() {
        return Err(LlmError::InvalidRequest(
            "messages must not be empty".to_string(),
        ));
    }
    if let Some(schema) = schema {
        ensure_chat_model(schema)?;
    }
    Ok(())
}
