//! Incremental stream output.

use serde::{Deserialize, Serialize};

use super::common::FinishReason;
use super::tools::FunctionCall;

/// One unit of incremental output from a chat completion stream.
///
/// `index` counts text-bearing chunks: it starts at 0, advances only when a
/// chunk carries a non-empty `delta`, and the terminal chunk reuses the next
/// free index. Heartbeat and bookkeeping events from the vendor never
/// produce a chunk at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Unix timestamp (seconds) at which this chunk was produced.
    pub created: i64,
    /// Position of this chunk within the stream.
    pub index: u32,
    /// Incremental text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    /// Present on the terminal chunk only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Fully assembled function calls; present on the terminal chunk only,
    /// and only when `finish_reason` is `FunctionCalls`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionCall>>,
}

impl ChatCompletionChunk {
    /// Creates a text delta chunk.
    pub fn text(index: u32, delta: impl Into<String>) -> Self {
        Self {
            created: chrono::Utc::now().timestamp(),
            index,
            delta: Some(delta.into()),
            finish_reason: None,
            function_calls: None,
        }
    }

    /// Creates the terminal chunk of a stream.
    pub fn finish(
        index: u32,
        finish_reason: FinishReason,
        function_calls: Option<Vec<FunctionCall>>,
    ) -> Self {
        Self {
            created: chrono::Utc::now().timestamp(),
            index,
            delta: None,
            finish_reason: Some(finish_reason),
            function_calls,
        }
    }

    /// Whether this is the terminal chunk of its stream.
    pub fn is_terminal(&self) -> bool {
        self.finish_reason.is_some()
    }
}
