//! Gemini wire form of a transcript: `contents` entries with `role` and text `parts`.
//!
//! The API speaks `user`/`model`; in memory we use [`Role::Assistant`]. Inbound we also
//! accept `assistant` so transcripts written by older sessions still load.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Role, Turn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("unknown wire role: {0}")]
    UnknownRole(String),
    #[error("content entry has no text part")]
    NoText,
}

/// One text segment of a content entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One `contents` entry: role plus ordered parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    pub parts: Vec<Part>,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "model",
        };
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: turn.content.clone(),
            }],
        }
    }
}

impl TryFrom<&Content> for Turn {
    type Error = WireError;

    fn try_from(content: &Content) -> Result<Self, Self::Error> {
        let role = match content.role.as_str() {
            "user" => Role::User,
            "model" | "assistant" => Role::Assistant,
            other => return Err(WireError::UnknownRole(other.to_string())),
        };
        if content.parts.is_empty() {
            return Err(WireError::NoText);
        }
        // Multi-part contents are concatenated; we only ever emit single-part entries.
        let text = content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<String>();
        Ok(Turn {
            role,
            content: text,
        })
    }
}
