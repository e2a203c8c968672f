//! Stream aggregation engine.
//!
//! Consumes an ordered sequence of already-deserialized vendor events and
//! emits an ordered sequence of unified chunks. One stream is one
//! sequential, single-owner state machine; independent streams share
//! nothing, so no locks are involved. The engine performs no I/O of its
//! own: it is driven by the caller-supplied event source and suspends
//! cooperatively between events. Dropping the returned stream mid-flight
//! discards all accumulator state without emitting a terminal chunk.

mod accumulator;

pub use accumulator::FunctionCallsAccumulator;

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures::Stream;
use futures_util::StreamExt;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::LlmError;
use crate::provider::ProviderAdapter;
use crate::types::{ChatCompletionChunk, FinishReason};

/// An ordered stream of unified chunks, terminated by exactly one chunk
/// carrying a finish reason, or by an error.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, LlmError>> + Send>>;

/// Aggregates a vendor event stream into a unified chunk stream.
///
/// Per event, strictly in arrival order:
///
/// 1. the adapter's error check runs; a vendor error fails the stream
///    immediately, before any chunk for that event is emitted;
/// 2. events without chunk data (heartbeats, bookkeeping) are skipped;
/// 3. a non-empty text delta is emitted as a chunk at the pre-increment
///    index, then the index advances;
/// 4. tool-call deltas are folded into the accumulator but not emitted;
///    partial argument JSON is not independently meaningful to a caller,
///    so function calls surface only fully assembled;
/// 5. a finish reason closes the stream: the accumulator is finalized and
///    one terminal chunk is emitted, carrying the assembled calls when the
///    reason is `FunctionCalls`.
///
/// A source that ends without reporting a finish reason (connection lost,
/// server stopped early) still terminates the stream with a single
/// `Unknown` terminal chunk, so consumers can always detect the end.
pub fn aggregate_stream<A, S>(adapter: Arc<A>, events: S) -> ChatStream
where
    A: ProviderAdapter + 'static,
    A::ChunkData: Send,
    S: Stream<Item = Result<Value, LlmError>> + Send + 'static,
{
    Box::pin(try_stream! {
        let mut events = Box::pin(events);
        let mut index: u32 = 0;
        let mut accumulated_text = String::new();
        let mut accumulator = FunctionCallsAccumulator::new();
        let mut finish_reason = None;

        while let Some(event) = events.next().await {
            let event = event?;
            adapter.stream_check_error(&event)?;

            let Some(chunk_data) = adapter.stream_extract_chunk_data(&event) else {
                trace!(provider = adapter.provider_id(), "skipping event without chunk data");
                continue;
            };

            let (next_index, chunk) =
                adapter.stream_extract_chunk(index, &chunk_data, &accumulated_text);
            if let Some(chunk) = chunk {
                if let Some(delta) = chunk.delta.as_deref() {
                    accumulated_text.push_str(delta);
                }
                index = next_index;
                yield chunk;
            }

            accumulator = adapter.stream_handle_function_calls(&chunk_data, accumulator);

            if let Some(reason) = adapter.stream_extract_finish_reason(&chunk_data) {
                finish_reason = Some(reason);
                break;
            }
        }

        let reason = finish_reason.unwrap_or(FinishReason::Unknown);
        let function_calls = match reason {
            FinishReason::FunctionCalls => {
                let calls = accumulator.finalize();
                (!calls.is_empty()).then_some(calls)
            }
            _ => None,
        };
        debug!(
            provider = adapter.provider_id(),
            %reason,
            chunks = index,
            "stream closed"
        );
        yield ChatCompletionChunk::finish(index, reason, function_calls);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llama_api::LlamaApiAdapter;
    use futures::stream;
    use serde_json::json;

    fn events(values: Vec<Value>) -> impl Stream<Item = Result<Value, LlmError>> {
        stream::iter(values.into_iter().map(Ok))
    }

    async fn collect(stream: ChatStream) -> Vec<Result<ChatCompletionChunk, LlmError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn text_deltas_get_increasing_indices_and_a_terminal_chunk() {
        let adapter = Arc::new(LlamaApiAdapter::new());
        let stream = aggregate_stream(
            adapter,
            events(vec![
                json!({"choices": [{"delta": {"content": "Hel"}}]}),
                json!({"choices": [{"delta": {"content": "lo"}}]}),
                json!({"choices": [{"delta": {}, "finish_reason": "max_token"}]}),
            ]),
        );

        let chunks: Vec<_> = collect(stream).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].delta.as_deref(), Some("Hel"));
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[1].delta.as_deref(), Some("lo"));
        assert_eq!(chunks[2].index, 2);
        assert_eq!(chunks[2].finish_reason, Some(FinishReason::Length));
        assert!(chunks[2].function_calls.is_none());
    }

    #[tokio::test]
    async fn heartbeats_and_empty_deltas_do_not_advance_the_index() {
        let adapter = Arc::new(LlamaApiAdapter::new());
        let stream = aggregate_stream(
            adapter,
            events(vec![
                json!({}),
                json!({"choices": []}),
                json!({"choices": [{"delta": {}}]}),
                json!({"choices": [{"delta": {"content": ""}}]}),
                json!({"choices": [{"delta": {"content": "hi"}}]}),
                json!({"choices": [{"delta": {}, "finish_reason": "stop"}]}),
            ]),
        );

        let chunks: Vec<_> = collect(stream).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].delta.as_deref(), Some("hi"));
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[1].finish_reason, Some(FinishReason::Stop));
    }

    #[tokio::test]
    async fn tool_call_deltas_are_buffered_until_the_terminal_chunk() {
        let adapter = Arc::new(LlamaApiAdapter::new());
        let stream = aggregate_stream(
            adapter,
            events(vec![
                json!({"choices": [{"delta": {"tool_calls": [
                    {"index": 0, "id": "call_a", "function": {"name": "get_weather", "arguments": "{\"city\":"}}
                ]}}]}),
                json!({"choices": [{"delta": {"tool_calls": [
                    {"index": 0, "function": {"arguments": "\"Tokyo\"}"}}
                ]}}]}),
                json!({"choices": [{"delta": {"tool_calls": [
                    {"index": 1, "id": "call_b", "function": {"name": "get_time", "arguments": "{}"}}
                ]}}]}),
                json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]}),
            ]),
        );

        let chunks: Vec<_> = collect(stream).await.into_iter().map(Result::unwrap).collect();
        // No per-fragment chunks; only the terminal one.
        assert_eq!(chunks.len(), 1);
        let terminal = &chunks[0];
        assert_eq!(terminal.index, 0);
        assert_eq!(terminal.finish_reason, Some(FinishReason::FunctionCalls));
        let calls = terminal.function_calls.as_ref().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments, "{\"city\":\"Tokyo\"}");
        assert_eq!(calls[1].name, "get_time");
    }

    #[tokio::test]
    async fn an_error_event_fails_the_stream_before_emitting_its_chunk() {
        let adapter = Arc::new(LlamaApiAdapter::new());
        let stream = aggregate_stream(
            adapter,
            events(vec![
                json!({"choices": [{"delta": {"content": "ok"}}]}),
                json!({"error": {"message": "model overloaded", "code": "overloaded"},
                       "choices": [{"delta": {"content": "never emitted"}}]}),
                json!({"choices": [{"delta": {"content": "unreachable"}}]}),
            ]),
        );

        let results = collect(stream).await;
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].as_ref().unwrap().delta.as_deref(),
            Some("ok")
        );
        let err = results[1].as_ref().unwrap_err();
        assert!(err.is_provider_error());
        assert!(err.to_string().contains("model overloaded"));
    }

    #[tokio::test]
    async fn exhaustion_without_finish_reason_yields_an_unknown_terminal_chunk() {
        let adapter = Arc::new(LlamaApiAdapter::new());
        let stream = aggregate_stream(
            adapter,
            events(vec![json!({"choices": [{"delta": {"content": "partial"}}]})]),
        );

        let chunks: Vec<_> = collect(stream).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[1].finish_reason, Some(FinishReason::Unknown));
        assert!(chunks[1].function_calls.is_none());
    }

    #[tokio::test]
    async fn events_after_the_finish_reason_are_not_processed() {
        let adapter = Arc::new(LlamaApiAdapter::new());
        let stream = aggregate_stream(
            adapter,
            events(vec![
                json!({"choices": [{"delta": {}, "finish_reason": "stop"}]}),
                json!({"choices": [{"delta": {"content": "late"}}]}),
            ]),
        );

        let chunks: Vec<_> = collect(stream).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_terminal());
    }

    #[tokio::test]
    async fn concurrent_streams_do_not_share_accumulator_state() {
        let adapter = Arc::new(LlamaApiAdapter::new());
        let make = |name: &str| {
            aggregate_stream(
                adapter.clone(),
                events(vec![
                    json!({"choices": [{"delta": {"tool_calls": [
                        {"index": 0, "id": "call_0", "function": {"name": name, "arguments": "{}"}}
                    ]}}]}),
                    json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]}),
                ]),
            )
        };

        let (left, right) = tokio::join!(collect(make("alpha")), collect(make("beta")));
        let left_calls = left[0].as_ref().unwrap().function_calls.clone().unwrap();
        let right_calls = right[0].as_ref().unwrap().function_calls.clone().unwrap();
        assert_eq!(left_calls.len(), 1);
        assert_eq!(right_calls.len(), 1);
        assert_eq!(left_calls[0].name, "alpha");
        assert_eq!(right_calls[0].name, "beta");
    }
}
