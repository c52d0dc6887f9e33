//! Scripted LLM for tests: fixed or queued replies, no network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;

use super::{LlmClient, LlmError, LlmRequest, MessageChunk};

/// Mock [`LlmClient`] returning canned responses.
///
/// - [`MockLlm::replying`]: same text on every call.
/// - [`MockLlm::scripted`]: one queued reply per call, in order; an exhausted script
///   fails the call.
/// - [`MockLlm::failing`]: every call errors with the given message.
///
/// Records the transcript length of each call so tests can assert the advisor passed
/// the accumulated history back in.
pub struct MockLlm {
    script: Mutex<Vec<String>>,
    fixed: Option<String>,
    fail: Option<String>,
    calls: AtomicUsize,
    seen_turn_counts: Mutex<Vec<usize>>,
}

impl MockLlm {
    fn base() -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            fixed: None,
            fail: None,
            calls: AtomicUsize::new(0),
            seen_turn_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            fixed: Some(text.into()),
            ..Self::base()
        }
    }

    pub fn scripted(replies: impl IntoIterator<Item = String>) -> Self {
        let mut script: Vec<String> = replies.into_iter().collect();
        script.reverse(); // pop() serves them front-to-back
        Self {
            script: Mutex::new(script),
            ..Self::base()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail: Some(message.into()),
            ..Self::base()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transcript lengths seen per call, in call order.
    pub fn seen_turn_counts(&self) -> Vec<usize> {
        self.seen_turn_counts.lock().expect("mock lock").clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlm {
    async fn generate_stream(
        &self,
        request: &LlmRequest<'_>,
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_turn_counts
            .lock()
            .expect("mock lock")
            .push(request.turns.len());

        if let Some(message) = &self.fail {
            return Err(LlmError::Other(message.clone()));
        }

        let text = match self.script.lock().expect("mock lock").pop() {
            Some(text) => text,
            None => match &self.fixed {
                Some(text) => text.clone(),
                None => return Err(LlmError::Other("mock script exhausted".to_string())),
            },
        };

        if let Some(tx) = chunk_tx {
            if !text.is_empty() {
                let _ = tx
                    .send(MessageChunk {
                        content: text.clone(),
                    })
                    .await;
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationConfig;
    use crate::message::Turn;

    fn request<'a>(turns: &'a [Turn], generation: &'a GenerationConfig) -> LlmRequest<'a> {
        LlmRequest {
            turns,
            system_instruction: "sys",
            generation,
            response_schema: None,
        }
    }

    #[tokio::test]
    async fn scripted_replies_in_order() {
        let llm = MockLlm::scripted(vec!["one".to_string(), "two".to_string()]);
        let turns = vec![Turn::user("q")];
        let generation = GenerationConfig::default();
        assert_eq!(llm.generate(&request(&turns, &generation)).await.unwrap(), "one");
        assert_eq!(llm.generate(&request(&turns, &generation)).await.unwrap(), "two");
        assert!(llm.generate(&request(&turns, &generation)).await.is_err());
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn failing_errors_repeatedly() {
        let llm = MockLlm::failing("quota exceeded");
        let turns = vec![Turn::user("q")];
        let generation = GenerationConfig::default();
        for _ in 0..2 {
            let err = llm.generate(&request(&turns, &generation)).await.unwrap_err();
            assert!(err.to_string().contains("quota exceeded"));
        }
    }

    #[tokio::test]
    async fn records_seen_turn_counts() {
        let llm = MockLlm::replying("ok");
        let generation = GenerationConfig::default();
        let one = vec![Turn::user("a")];
        let three = vec![Turn::user("a"), Turn::assistant("b"), Turn::user("c")];
        llm.generate(&request(&one, &generation)).await.unwrap();
        llm.generate(&request(&three, &generation)).await.unwrap();
        assert_eq!(llm.seen_turn_counts(), vec![1, 3]);
    }

    #[tokio::test]
    async fn streams_full_text_as_one_chunk() {
        let llm = MockLlm::replying("whole reply");
        let turns = vec![Turn::user("q")];
        let generation = GenerationConfig::default();
        let (tx, mut rx) = mpsc::channel(2);
        let text = llm
            .generate_stream(&request(&turns, &generation), Some(tx))
            .await
            .unwrap();
        assert_eq!(text, "whole reply");
        assert_eq!(rx.recv().await.unwrap().content, "whole reply");
    }
}
