//! Gemini implementation of [`LlmClient`] over the generative-language REST API.
//!
//! One call is one POST to `models/{model}:streamGenerateContent?alt=sse`; the
//! `?alt=sse` query parameter selects SSE framing. Each `data:` line carries a
//! `GenerateContentResponse` chunk whose candidate text parts are concatenated in
//! arrival order. There is no retry here: a failed call aborts the turn.

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::{LlmClient, LlmError, LlmRequest, MessageChunk};
use crate::message::wire::Content;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini chat client.
///
/// The request timeout is enforced by the underlying HTTP client and covers the whole
/// call including the streamed body; there is no separate cancellation path.
pub struct ChatGemini {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for ChatGemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGemini")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ChatGemini {
    /// Builds a client for the default model (`gemini-2.0-flash`).
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the endpoint base URL (tests point this at a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_body(&self, request: &LlmRequest<'_>) -> GenerateRequest {
        GenerateRequest {
            contents: request.turns.iter().map(Content::from).collect(),
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: request.system_instruction.to_string(),
                }],
            },
            generation_config: WireGenerationConfig {
                temperature: request.generation.temperature,
                top_p: request.generation.top_p,
                top_k: request.generation.top_k,
                max_output_tokens: request.generation.max_output_tokens,
                response_mime_type: request.response_schema.map(|_| "application/json"),
                response_schema: request.response_schema.cloned(),
            },
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for ChatGemini {
    async fn generate_stream(
        &self,
        request: &LlmRequest<'_>,
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<String, LlmError> {
        if request.turns.is_empty() {
            return Err(LlmError::InvalidRequest(
                "transcript must contain at least one turn".to_string(),
            ));
        }

        let url = self.url();
        debug!(model = %self.model, turns = request.turns.len(), "calling gemini");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_body(request))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: truncate(&message, 500),
            });
        }

        let mut stream = response.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        let mut blob = String::new();

        while let Some(bytes) = stream.next().await {
            buf.extend_from_slice(&bytes?);
            while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                consume_sse_line(&line[..line.len() - 1], &mut blob, chunk_tx.as_ref()).await;
            }
        }
        if !buf.is_empty() {
            consume_sse_line(&buf, &mut blob, chunk_tx.as_ref()).await;
        }

        if blob.is_empty() {
            return Err(LlmError::NoContent);
        }
        Ok(blob)
    }
}

/// Appends the text of one SSE line (if it is a parseable data line) to `blob` and
/// forwards it to `chunk_tx`. Unparseable lines are skipped, not fatal.
async fn consume_sse_line(
    line: &[u8],
    blob: &mut String,
    chunk_tx: Option<&mpsc::Sender<MessageChunk>>,
) {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');
    let Some(payload) = line.strip_prefix("data:") else {
        return;
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return;
    }
    let chunk: GenerateResponseChunk = match serde_json::from_str(payload) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "skipping unparseable sse chunk");
            return;
        }
    };
    for candidate in chunk.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if part.text.is_empty() {
                continue;
            }
            if let Some(tx) = chunk_tx {
                let _ = tx
                    .send(MessageChunk {
                        content: part.text.clone(),
                    })
                    .await;
            }
            blob.push_str(&part.text);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction,
    #[serde(rename = "generationConfig")]
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateResponseChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}
