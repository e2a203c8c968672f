//! Common enums shared across the unified model.

use serde::{Deserialize, Serialize};

/// Why generation stopped.
///
/// This is a closed set: every vendor-specific completion code classifies
/// into exactly one of these values, and anything unrecognized becomes
/// `Unknown` rather than an error. See the per-provider
/// `parse_finish_reason` functions for the vendor spellings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model completed naturally or hit a stop sequence.
    Stop,
    /// The model reached the token limit.
    Length,
    /// The model requested one or more function calls.
    FunctionCalls,
    /// Content was filtered by the vendor's safety layer.
    ContentFilter,
    /// The vendor did not report a reason, or reported one we do not know.
    Unknown,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::FunctionCalls => "function_calls",
            Self::ContentFilter => "content_filter",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}
