//! Chat transport port
//!
//! One transport instance serves one room: a shared channel plus private
//! messages to individual humans.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use werewolf_domain::UserId;

/// Errors raised by the chat transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The bot lacks a permission (muting, locking the channel)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Timed out waiting for a reply")]
    Timeout,

    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Transport error: {0}")]
    Other(String),
}

/// Accepts or rejects a private reply
pub type InputValidator<'a> = &'a (dyn Fn(&str) -> bool + Send + Sync);

/// The chat surface the game is played on
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post to the shared room channel
    async fn send_message(&self, text: &str) -> Result<(), TransportError>;

    /// Send a private message to one human
    async fn send_private(&self, user: &UserId, text: &str) -> Result<(), TransportError>;

    /// Ask a human privately and wait for the first reply `validator` accepts
    async fn request_private_input(
        &self,
        user: &UserId,
        prompt: &str,
        validator: InputValidator<'_>,
        timeout: Duration,
    ) -> Result<String, TransportError>;

    /// Wait for the next message `user` posts in the room channel
    async fn await_channel_message(
        &self,
        user: &UserId,
        timeout: Duration,
    ) -> Result<String, TransportError>;

    /// Mute or unmute one human in the room channel
    async fn set_user_muted(&self, user: &UserId, muted: bool) -> Result<(), TransportError>;

    /// Allow or forbid posting in the room channel
    async fn set_channel_postable(&self, postable: bool) -> Result<(), TransportError>;
}
