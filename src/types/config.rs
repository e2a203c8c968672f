//! Sparse generation options.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LlmError;

/// Generation options for a chat completion request.
///
/// Every option is optional. Unset options are omitted from the outbound
/// payload entirely, never serialized as nulls; vendors reject unknown or
/// null fields inconsistently, so omission is the contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
}

impl ChatCompletionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Merges the set options into a payload object. Options left unset do
    /// not appear in the result.
    pub fn apply_to(&self, payload: &mut Map<String, Value>) -> Result<(), LlmError> {
        match serde_json::to_value(self)? {
            Value::Object(options) => {
                payload.extend(options);
                Ok(())
            }
            other => Err(LlmError::Internal(format!(
                "config serialized to non-object value: {other}"
            ))),
        }
    }
}
