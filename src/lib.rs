//! unillm
//!
//! A provider-agnostic chat-completion normalization layer: callers issue
//! one uniform request shape and receive one uniform response or stream
//! shape, regardless of which upstream vendor serves the request.
//!
//! The crate has two moving parts:
//!
//! - the [`ProviderAdapter`] contract, implemented once per vendor, which
//!   translates unified requests into vendor wire payloads and vendor
//!   responses/events back into unified shapes;
//! - the [`aggregate_stream`] engine, which consumes an ordered sequence of
//!   vendor stream events and emits unified chunks with strict ordering and
//!   accumulation guarantees, reassembling fragmented multi-call function
//!   invocations along the way.
//!
//! Transport is deliberately external: adapters produce a
//! [`PreparedRequest`](types::PreparedRequest) for some HTTP layer to send,
//! and the stream engine is fed already-deserialized JSON event records.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use unillm::providers::LlamaApiAdapter;
//! use unillm::types::{ChatCompletionRequest, ChatMessage, ProviderCredentials};
//! use unillm::{ProviderAdapter, aggregate_stream};
//!
//! let adapter = Arc::new(LlamaApiAdapter::new());
//! let request = ChatCompletionRequest::new(
//!     "llama3-70b",
//!     vec![ChatMessage::user("Hello!")],
//! )
//! .with_stream(true);
//! let credentials = ProviderCredentials::new(std::env::var("LLAMA_API_KEY")?);
//!
//! let prepared = adapter.prepare_request(&request, &credentials, None)?;
//! // ... send `prepared` with your HTTP client, parse SSE frames to JSON ...
//! let mut chunks = aggregate_stream(adapter, event_stream);
//! ```
#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod extract;
pub mod provider;
pub mod providers;
pub mod streaming;
pub mod types;

pub use error::LlmError;
pub use extract::extract_response;
pub use provider::ProviderAdapter;
pub use streaming::{ChatStream, FunctionCallsAccumulator, aggregate_stream};
pub use types::{
    ChatCompletionChunk, ChatCompletionConfig, ChatCompletionRequest, ChatCompletionResponse,
    ChatFunction, ChatMessage, FinishReason, FunctionCall, MessageContent, MessageRole,
    PreparedRequest, ProviderCredentials,
};
