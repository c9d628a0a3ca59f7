//! Application-level configuration.
//!
//! - [`GameConfig`]: timeouts, table limits and [`PacingConfig`]
//! - [`RateLimitConfig`] / [`RetryPolicy`]: AI gateway admission and backoff

pub mod game_config;
pub mod gateway_config;

pub use game_config::{GameConfig, PacingConfig};
pub use gateway_config::{RateLimitConfig, RetryPolicy};
