//! Application layer for werewolf
//!
//! This crate contains the AI gateway, the decision provider, the per-room
//! use cases and the port definitions. It depends only on the domain layer.

pub mod config;
pub mod decision;
pub mod gateway;
pub mod ports;
pub mod session;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{GameConfig, PacingConfig, RateLimitConfig, RetryPolicy};
pub use decision::{ActionKind, ActionRequest, DecisionProvider};
pub use gateway::{AiGateway, RateLimiter};
pub use ports::{
    ai_backend::{AiBackend, BackendError},
    retry_notifier::{ChannelRetryNotifier, RetryNotifier},
    template_store::{NoTemplateStore, RoleTemplateStore, StoreError},
    transport::{InputValidator, Transport, TransportError},
};
pub use session::{SessionRegistry, SharedGame};
pub use use_cases::{CommandError, GameContext, GameController};
