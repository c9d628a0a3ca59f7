//! Presentation layer for werewolf
//!
//! This crate contains the CLI definition, console output formatting and
//! the terminal chat transport the game is played on.

pub mod cli;
pub mod console;
pub mod output;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use console::{ConsoleCommand, ConsoleSession, ConsoleTransport, Flow};
pub use output::console::ConsoleFormatter;
