//! Error types for the chat backend.

use thiserror::Error;

use crate::llm::GatewayError;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A required request field was missing or empty.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// The hosted model failed to produce text.
    #[error("generation error: {0}")]
    Generation(#[from] GatewayError),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias.
pub type AppResult<T> = Result<T, AppError>;
