//! AI backend port
//!
//! Defines the interface for the text-generation service behind the
//! [`AiGateway`](crate::gateway::AiGateway).

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during a backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The service asked us to slow down; the only retried condition
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BackendError::RateLimited(_))
    }
}

/// A slow, unreliable text generator
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;

    /// Short name for logs
    fn name(&self) -> &str;
}
