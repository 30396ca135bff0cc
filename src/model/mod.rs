//! Language model client abstraction
//!
//! The planner only needs "prompt in, text out". Providers implement
//! [`TextModel`] and are shared behind an `Arc` so handlers never touch
//! global client state.

use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiClient;

/// Errors returned by a language model provider
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by model provider")]
    RateLimited,

    #[error("Model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Response blocked by content filter")]
    ContentFiltered,
}

/// A text-completion oracle.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Send `prompt` and return the raw text of the model's answer.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}
