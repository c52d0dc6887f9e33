//! Dialogue transcript: typed turns with explicit wire (de)serialization.
//!
//! Earlier revisions of this system kept session-loaded turns as plain key/value
//! records and upcast them ad hoc at each use site. Here there is exactly one in-memory
//! representation ([`Turn`]); the Gemini `contents` form ([`wire::Content`]) exists only
//! at the session/network boundary.

pub mod wire;

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One dialogue turn: role plus verbatim text content.
///
/// Assistant turns store the raw model output (the JSON blob), not the parsed report;
/// feeding the raw text back on the next call is what gives the model its continuity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only sequence of turns for one session.
///
/// Lifecycle is owned by the caller (a web session or REPL); the advisor takes a
/// transcript in and hands the updated one back. Turns are never reordered or deleted
/// here; expiry is the session owner's business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.0.push(turn);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.0.iter()
    }

    /// Serializes the transcript into Gemini `contents` order-preservingly.
    pub fn to_wire(&self) -> Vec<wire::Content> {
        self.0.iter().map(wire::Content::from).collect()
    }

    /// Rebuilds a transcript from wire contents. Fails on an unknown role.
    pub fn from_wire(contents: &[wire::Content]) -> Result<Self, wire::WireError> {
        let turns = contents
            .iter()
            .map(Turn::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(turns))
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self(turns)
    }
}
