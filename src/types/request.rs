//! Request types and credentials.

use std::collections::HashMap;

use secrecy::SecretString;
use serde_json::Value;

use super::config::ChatCompletionConfig;
use super::message::ChatMessage;
use super::tools::ChatFunction;

/// A uniform chat completion request, independent of the serving vendor.
#[derive(Debug, Clone)]
pub struct ChatCompletionRequest {
    /// The vendor-side model identifier.
    pub model_id: String,
    /// Conversation so far. Must be non-empty.
    pub messages: Vec<ChatMessage>,
    /// Sparse generation options.
    pub config: ChatCompletionConfig,
    /// Forces the model to call the named function.
    pub function_call: Option<String>,
    /// Functions the model may call.
    pub functions: Option<Vec<ChatFunction>>,
    /// Whether the response should be streamed.
    pub stream: bool,
}

impl ChatCompletionRequest {
    pub fn new(model_id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            config: ChatCompletionConfig::default(),
            function_call: None,
            functions: None,
            stream: false,
        }
    }

    pub fn with_config(mut self, config: ChatCompletionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_functions(mut self, functions: Vec<ChatFunction>) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Forces the model to call the named function.
    pub fn with_function_call(mut self, name: impl Into<String>) -> Self {
        self.function_call = Some(name.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Opaque vendor credentials.
///
/// The API key is held as a [`SecretString`] so it never appears in debug
/// output; adapters expose it only while building auth headers.
#[derive(Clone)]
pub struct ProviderCredentials {
    /// The vendor API key.
    pub api_key: SecretString,
    /// Non-secret vendor settings (organization id, region, ...).
    pub extra: HashMap<String, String>,
}

impl ProviderCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// The outbound request an adapter prepared for its vendor: endpoint,
/// headers, and JSON payload, ready for the transport layer to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub payload: Value,
}
