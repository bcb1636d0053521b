//! Conversation log: chat turns keyed by session.

pub mod message;
pub mod store;

pub use message::{ChatMessage, Sender};
pub use store::{ConversationStore, SqliteConversationStore};
