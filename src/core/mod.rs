//! Core types shared by every subsystem: configuration, errors and identifiers.

pub mod config;
pub mod errors;
pub mod ids;

pub use config::{AppConfig, GeminiConfig, KnowledgeConfig, ServerConfig, ShopConfig, StorageConfig};
pub use errors::{AppError, AppResult};
pub use ids::SessionId;
