//! Hosted text-generation gateway.

pub mod gateway;
pub mod gemini;

pub use gateway::{GatewayError, GenerateFuture, ModelGateway};
pub use gemini::GeminiGateway;
