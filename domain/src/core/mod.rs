//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: rule violations raised by [`crate::game::GameState`]
//! - [`string::truncate`]: UTF-8 safe truncation for logs and chat lines

pub mod error;
pub mod string;
