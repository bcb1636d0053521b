//! Model gateway abstraction.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Boxed future returned by [`ModelGateway::generate`].
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send + 'a>>;

/// Reasons a generation call produced no text.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key was configured.
    #[error("model API key is not configured")]
    MissingApiKey,
    /// Transport or decoding failure.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("model http status not ok: {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
    /// The prompt was refused by the service.
    #[error("prompt blocked: {0}")]
    Blocked(String),
    /// The response carried no text.
    #[error("model returned no text")]
    EmptyResponse,
}

/// Single-shot text generation. No retries, no streaming.
pub trait ModelGateway: Send + Sync {
    /// Model identifier used for every call.
    fn model(&self) -> &str;

    /// Generate a reply for `prompt`.
    ///
    /// # Errors
    /// Returns an error on any transport, quota, or response-shape failure.
    fn generate(&self, prompt: String) -> GenerateFuture<'_>;
}
