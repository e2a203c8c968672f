//! Error handling for the library.
//!
//! A single library-wide error enum. Extraction-layer absence (missing or
//! malformed fields on a vendor event) is never an error; it is modeled as
//! `Option::None` at the adapter boundary. Only explicit vendor error
//! payloads and request validation failures cross the boundary to the caller.

use serde_json::Value;

/// Library-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The upstream vendor reported an error payload. A stream terminates
    /// immediately when this is raised; no partial chunks are replayed.
    #[error("provider error: {message}")]
    Provider {
        /// Vendor-specific error code, when present.
        code: Option<String>,
        /// Human-readable error message.
        message: String,
        /// The raw error payload as received from the vendor.
        details: Option<Value>,
    },

    /// The request asks for a capability the adapter cannot express.
    /// Surfaced synchronously at `prepare_request` time, before any
    /// network call.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The request failed local validation (e.g. empty message list).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A catalog lookup referenced an unknown object id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Serialization fault while building a payload.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal invariant violation (e.g. poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),
}

impl LlmError {
    /// Builds a `Provider` error from a vendor error payload.
    ///
    /// Vendors disagree on the error envelope shape, so `code` and `message`
    /// are pulled out best-effort and the raw payload is kept in `details`.
    pub fn provider(payload: &Value) -> Self {
        let code = payload
            .get("code")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let message = payload
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| payload.to_string());
        Self::Provider {
            code,
            message,
            details: Some(payload.clone()),
        }
    }

    /// Whether this error originated from the upstream vendor.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }
}
