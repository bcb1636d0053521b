//! Session identifier newtype.
//!
//! Chat sessions are keyed by an opaque string the browser picks, so unlike
//! cart sessions they are not generated server-side.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{AppError, AppResult};

/// Opaque client-chosen key grouping chat turns into one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw session key as sent, rejecting blank values.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the key is empty or whitespace.
    pub fn parse(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Err(AppError::Validation("session_id is required".to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Parse an optional raw key, treating blanks as absent.
    #[must_use]
    pub fn from_optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| Self::parse(value).ok())
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_key_as_sent() {
        let id = SessionId::parse(" abc-123").unwrap();
        assert_eq!(id.as_str(), " abc-123");
        assert_ne!(id, SessionId::parse("abc-123").unwrap());
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("   ").is_err());
        assert!(SessionId::from_optional(None).is_none());
        assert!(SessionId::from_optional(Some(" ")).is_none());
    }
}
