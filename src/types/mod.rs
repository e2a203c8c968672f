//! The unified, vendor-neutral data model.
//!
//! Every adapter translates between its vendor's wire shapes and these
//! types; vendor-shaped data never crosses the adapter boundary.

pub mod chunk;
pub mod common;
pub mod config;
pub mod message;
pub mod request;
pub mod response;
pub mod tools;

pub use chunk::ChatCompletionChunk;
pub use common::FinishReason;
pub use config::ChatCompletionConfig;
pub use message::{ChatMessage, ContentPart, ImageUrl, MessageContent, MessageRole};
pub use request::{ChatCompletionRequest, PreparedRequest, ProviderCredentials};
pub use response::ChatCompletionResponse;
pub use tools::{ChatFunction, FunctionCall};
