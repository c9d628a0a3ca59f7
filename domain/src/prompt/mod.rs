//! Prompt domain
//!
//! Templates for every request the AI gateway sends, plus per-role play
//! guidance for autonomous players.

mod strategy;
mod template;

pub use strategy::RoleStrategy;
pub use template::PromptTemplate;
