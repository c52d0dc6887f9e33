//! Conversational turn processor.
//!
//! One user message in, one [`TurnOutcome`] out. The advisor appends the user turn to
//! the transcript, sends the whole transcript to the model with the report schema
//! attached, and classifies the reply:
//!
//! - parses as a [`StructuredReport`]: the raw text joins the transcript and the
//!   caller gets the typed report;
//! - is text but not schema-conformant JSON: the raw text still joins the transcript
//!   so later turns keep context, and the caller gets the text as-is;
//! - the call itself failed: the transcript keeps only the user turn (there is
//!   nothing from the model worth remembering) and the caller gets an error message.
//!
//! The advisor never panics on model output; whatever comes back maps onto one of
//! the three outcomes.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::{GenerationConfig, LlmClient, LlmRequest};
use crate::message::{Transcript, Turn};
use crate::report::StructuredReport;
use crate::schema;

/// Persona and task framing sent with every call.
pub const SYSTEM_INSTRUCTION: &str = "You are a farming expert. Ask the user necessary questions to gather data about their farming practices and provide recommendations to calculate their carbon emissions and optimize fertilizer use. Maintain context from previous messages.";

/// Result of one conversational turn.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The model's reply conformed to the report schema.
    Report(Box<StructuredReport>),
    /// The model replied but the text did not parse as a report. The raw text is
    /// surfaced unchanged.
    Degraded { raw: String },
    /// The model call itself failed. Nothing was added to the transcript beyond the
    /// user's message.
    Failed { message: String },
}

/// Stateless turn processor: all conversation state lives in the [`Transcript`] the
/// caller passes in and gets back.
pub struct Advisor {
    llm: Arc<dyn LlmClient>,
    generation: GenerationConfig,
}

impl Advisor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Runs one turn. The returned transcript is the input transcript plus the user
    /// turn, plus the assistant turn when the model produced any text at all.
    pub async fn process_turn(
        &self,
        message: &str,
        mut transcript: Transcript,
    ) -> (TurnOutcome, Transcript) {
        transcript.push(Turn::user(message));

        let result = {
            let request = LlmRequest {
                turns: transcript.turns(),
                system_instruction: SYSTEM_INSTRUCTION,
                generation: &self.generation,
                response_schema: Some(schema::report_schema()),
            };
            self.llm.generate(&request).await
        };

        let blob = match result {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "model call failed");
                return (
                    TurnOutcome::Failed {
                        message: format!("failed to get response: {e}"),
                    },
                    transcript,
                );
            }
        };

        match serde_json::from_str::<StructuredReport>(&blob) {
            Ok(report) => {
                transcript.push(Turn::assistant(&blob));
                (TurnOutcome::Report(Box::new(report)), transcript)
            }
            Err(e) => {
                debug!(error = %e, "reply is not a structured report, degrading to raw text");
                transcript.push(Turn::assistant(&blob));
                (TurnOutcome::Degraded { raw: blob }, transcript)
            }
        }
    }
}
