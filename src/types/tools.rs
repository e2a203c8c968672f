//! Function/tool definitions and calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function the model may call, described to the vendor alongside the
/// request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatFunction {
    /// Function name.
    pub name: String,
    /// What the function does, for the model's benefit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the function's parameters.
    pub parameters: Value,
}

impl ChatFunction {
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A function call produced by the model.
///
/// `arguments` holds the serialized argument payload exactly as the vendor
/// produced it. The core never parses it, only round-trips it; an empty
/// string is valid (some vendors never send arguments for no-arg calls).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    /// Call id, vendor-supplied or generated when the vendor omits one.
    pub id: String,
    /// Name of the called function.
    pub name: String,
    /// Serialized argument payload.
    pub arguments: String,
}

impl FunctionCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Generates a fresh call id for vendors that do not supply one.
    pub fn generate_id() -> String {
        format!("call_{}", uuid::Uuid::new_v4().simple())
    }
}
