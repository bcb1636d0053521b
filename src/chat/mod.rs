//! Chat request pipeline, independent of the HTTP layer.

pub mod service;

pub use service::{ChatService, GENERIC_ERROR_MESSAGE, VALIDATION_ERROR_MESSAGE};
