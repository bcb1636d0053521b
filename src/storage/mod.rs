//! `SQLite` connection setup shared by the conversation and knowledge stores.

pub mod database;

pub use database::{StoreFuture, open_database, open_in_memory};
