//! AI request gateway and its admission control

pub mod ai_gateway;
pub mod rate_limiter;

pub use ai_gateway::AiGateway;
pub use rate_limiter::RateLimiter;
