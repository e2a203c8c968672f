//! Concrete vendor adapters.
//!
//! Each submodule owns one vendor's wire shapes and implements
//! [`ProviderAdapter`](crate::provider::ProviderAdapter) for them. Selecting
//! which adapter serves a request is the routing layer's job, not this
//! crate's.

pub mod llama_api;
pub mod openai;

pub use llama_api::LlamaApiAdapter;
pub use openai::OpenAiAdapter;
