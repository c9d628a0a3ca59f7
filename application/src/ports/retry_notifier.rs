//! Retry notification port
//!
//! Lets the gateway tell players that the AI is busy before it backs off.

use super::transport::{Transport, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Called before each backoff sleep; errors are ignored by the gateway
#[async_trait]
pub trait RetryNotifier: Send + Sync {
    async fn on_retry(&self, attempt: u32, delay: Duration) -> Result<(), TransportError>;
}

/// Posts a short notice to the room channel
pub struct ChannelRetryNotifier {
    transport: Arc<dyn Transport>,
}

impl ChannelRetryNotifier {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl RetryNotifier for ChannelRetryNotifier {
    async fn on_retry(&self, attempt: u32, delay: Duration) -> Result<(), TransportError> {
        self.transport
            .send_message(&format!(
                "The AI is busy, retrying in {}s (attempt {}).",
                delay.as_secs(),
                attempt
            ))
            .await
    }
}
