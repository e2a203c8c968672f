//! Unified non-stream response.

use serde::{Deserialize, Serialize};

use super::common::FinishReason;
use super::tools::FunctionCall;

/// The unified result of one complete (non-streamed) chat completion.
///
/// A response may legitimately carry both text and function calls; the two
/// are extracted independently and neither implies the absence of the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionResponse {
    /// Text content, when the model produced any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Function calls, when the model requested any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionCall>>,
    /// Why generation stopped.
    pub finish_reason: FinishReason,
}

impl ChatCompletionResponse {
    /// The empty result: no text, no calls, reason unknown. Produced when a
    /// vendor response carries no completion choice at all.
    pub fn empty() -> Self {
        Self {
            text: None,
            function_calls: None,
            finish_reason: FinishReason::Unknown,
        }
    }

    pub fn has_function_calls(&self) -> bool {
        self.function_calls.as_ref().is_some_and(|c| !c.is_empty())
    }
}
