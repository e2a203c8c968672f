//! Chat message types.

use serde::{Deserialize, Serialize};

use super::tools::FunctionCall;

/// Message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// A function result fed back into the conversation.
    Function,
}

/// One typed part of a multi-part user message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Image reference inside a user message part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUrl {
    pub url: String,
}

/// Message content: plain text, or an ordered sequence of typed parts
/// (user messages only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Returns the plain text content, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Parts(_) => None,
        }
    }
}

/// A message in a conversation.
///
/// Immutable once constructed; use the role constructors below rather than
/// building the struct by hand.
///
/// # Examples
///
/// ```rust,ignore
/// use unillm::types::{ChatMessage, FunctionCall};
///
/// let msg = ChatMessage::user("What's the weather in Tokyo?");
/// let call = FunctionCall::new("call_1", "get_weather", r#"{"city":"Tokyo"}"#);
/// let assistant = ChatMessage::assistant_function_calls(vec![call]);
/// let result = ChatMessage::function_result("call_1", r#"{"temp_c":21}"#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role.
    pub role: MessageRole,
    /// Content. `None` on assistant messages that carry only function calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// The id of the function call this message answers (function role only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function calls requested by the assistant (assistant role only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionCall>>,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(MessageContent::Text(content.into())),
            id: None,
            function_calls: None,
        }
    }

    /// Creates a plain-text user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(MessageContent::Text(content.into())),
            id: None,
            function_calls: None,
        }
    }

    /// Creates a multi-part user message.
    pub fn user_with_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(MessageContent::Parts(parts)),
            id: None,
            function_calls: None,
        }
    }

    /// Creates a plain-text assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(MessageContent::Text(content.into())),
            id: None,
            function_calls: None,
        }
    }

    /// Creates an assistant message that carries only function calls.
    pub fn assistant_function_calls(calls: Vec<FunctionCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: None,
            id: None,
            function_calls: Some(calls),
        }
    }

    /// Creates a function-result message answering the call with `call_id`.
    pub fn function_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Function,
            content: Some(MessageContent::Text(content.into())),
            id: Some(call_id.into()),
            function_calls: None,
        }
    }

    /// Returns the plain text content, if any.
    pub fn content_text(&self) -> Option<&str> {
        self.content.as_ref().and_then(MessageContent::as_text)
    }

    /// Whether this is an assistant message carrying function calls.
    pub fn is_assistant_function_calls(&self) -> bool {
        self.role == MessageRole::Assistant
            && self.function_calls.as_ref().is_some_and(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_result_carries_call_id() {
        let msg = ChatMessage::function_result("call_1", "42");
        assert_eq!(msg.role, MessageRole::Function);
        assert_eq!(msg.id.as_deref(), Some("call_1"));
        assert_eq!(msg.content_text(), Some("42"));
    }

    #[test]
    fn assistant_function_calls_message_has_no_content() {
        let msg = ChatMessage::assistant_function_calls(vec![FunctionCall::new(
            "call_1",
            "lookup",
            "{}",
        )]);
        assert!(msg.content.is_none());
        assert!(msg.is_assistant_function_calls());
    }

    #[test]
    fn user_parts_serialize_with_type_tags() {
        let msg = ChatMessage::user_with_parts(vec![
            ContentPart::text("describe this"),
            ContentPart::image_url("https://example.com/cat.png"),
        ]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "https://example.com/cat.png"
        );
    }
}
