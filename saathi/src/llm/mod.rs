//! LLM client abstraction for the advisor.
//!
//! The advisor depends on a callable that takes the full transcript, a system
//! instruction, sampling parameters, and a response schema, and returns the complete
//! response text; this module defines the trait and its implementations.
//!
//! # Streaming Support
//!
//! The service streams output chunks; [`LlmClient::generate_stream`] accepts an
//! optional `Sender<MessageChunk>` for forwarding them as they arrive. The method
//! still returns the fully concatenated text at the end; the advisor consumes the
//! blob, streaming is display-only. [`LlmClient::generate`] is the buffered shorthand.

mod gemini;
mod mock;

pub use gemini::ChatGemini;
pub use mock::MockLlm;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::message::Turn;

/// Error from an LLM call.
///
/// The advisor does not distinguish auth failure, rate limiting, and transport
/// failure; they all abort the turn the same way and are not retried.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("model returned no content")]
    NoContent,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Other(String),
}

/// Fixed sampling parameters for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// One request to the model: transcript, instruction, sampling, optional schema.
#[derive(Debug, Clone)]
pub struct LlmRequest<'a> {
    /// Full dialogue so far, oldest first. Must not be empty.
    pub turns: &'a [Turn],
    /// System instruction, sent out of band from the transcript.
    pub system_instruction: &'a str,
    pub generation: &'a GenerationConfig,
    /// When set, the model is constrained to emit JSON conforming to this schema.
    pub response_schema: Option<&'a serde_json::Value>,
}

/// Chunk of streamed response text (may be empty for some chunks).
#[derive(Debug, Clone)]
pub struct MessageChunk {
    pub content: String,
}

/// LLM client: given a request, returns the complete response text.
///
/// Implementations: [`ChatGemini`] (real API), [`MockLlm`] (scripted, for tests).
///
/// `generate_stream` is the required method because the real service streams
/// natively; `generate` is a provided buffered wrapper.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one call, optionally forwarding chunks through `chunk_tx` as they
    /// arrive. Returns the concatenated text after the stream ends.
    async fn generate_stream(
        &self,
        request: &LlmRequest<'_>,
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<String, LlmError>;

    /// Buffered mode: wait for the full response text.
    async fn generate(&self, request: &LlmRequest<'_>) -> Result<String, LlmError> {
        self.generate_stream(request, None).await
    }
}
