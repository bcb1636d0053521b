//! Chat turn model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::ids::SessionId;

/// Author of a chat turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Message typed by the visitor.
    User,
    /// Reply generated by the model.
    Bot,
}

impl Sender {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "bot" => Ok(Self::Bot),
            _ => Err(value.to_string()),
        }
    }
}

/// A persisted chat turn. Immutable once written.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Store-assigned, strictly increasing identifier.
    pub id: i64,
    /// Conversation this turn belongs to.
    pub session_id: SessionId,
    /// Author of the turn.
    pub sender: Sender,
    /// Message text.
    pub content: String,
    /// Creation instant assigned by the store.
    pub timestamp: DateTime<Utc>,
}
