//! OpenAI-compatible chat completions adapter
//!
//! Implements LlmGateway over `POST {base_url}/chat/completions`.

pub mod error;
pub mod gateway;
pub mod protocol;
