//! Saathi core: a conversational farm-carbon advisor.
//!
//! The advisor runs a multi-turn dialogue that incrementally collects farming-practice
//! data and, on every turn, asks the language model for a schema-constrained
//! [`StructuredReport`] (carbon emission estimate, fertilizer recommendations,
//! suggestions). The dialogue state is an append-only [`Transcript`] owned by the
//! caller; this crate holds no session state of its own.
//!
//! # Main types
//!
//! - [`Advisor`]: the turn processor. [`Advisor::process_turn`] appends the user turn,
//!   calls the LLM with the full transcript plus the report schema, and returns a
//!   [`TurnOutcome`] together with the updated transcript.
//! - [`Transcript`] / [`Turn`]: ordered dialogue state with explicit (de)serialization
//!   to the model wire format at the boundary.
//! - [`StructuredReport`]: the typed, schema-conformant record parsed from one
//!   assistant turn; [`ReportSummary`] is its flat view for display.
//! - [`LlmClient`]: trait over the model service; [`ChatGemini`] (real API) and
//!   [`MockLlm`] (tests) implement it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use saathi::{Advisor, ChatGemini, Transcript, TurnOutcome};
//!
//! # async fn example() -> Result<(), saathi::LlmError> {
//! let llm = Arc::new(ChatGemini::new("api-key")?);
//! let advisor = Advisor::new(llm);
//!
//! let (outcome, transcript) = advisor
//!     .process_turn("I grow 2 acres of wheat", Transcript::new())
//!     .await;
//! if let TurnOutcome::Report(report) = outcome {
//!     println!("estimated emission: {} kg CO2e", report.carbon_emission);
//! }
//! assert_eq!(transcript.len(), 2); // user + assistant
//! # Ok(())
//! # }
//! ```

pub mod advisor;
pub mod cache;
pub mod llm;
pub mod lookup;
pub mod message;
pub mod report;
pub mod schema;
pub mod summary;

pub use advisor::{Advisor, TurnOutcome, SYSTEM_INSTRUCTION};
pub use llm::{ChatGemini, GenerationConfig, LlmClient, LlmError, LlmRequest, MessageChunk, MockLlm};
pub use message::{Role, Transcript, Turn};
pub use report::StructuredReport;
pub use schema::report_schema;
pub use summary::{ReportSummary, EMISSION_CEILING_KG};
