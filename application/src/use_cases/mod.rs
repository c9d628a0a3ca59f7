//! Use cases
//!
//! One module per phase of the game, plus the [`GameController`] that
//! sequences them for a room.

pub mod cascade;
pub mod context;
pub mod controller;
pub mod night;
pub mod speech;
pub mod vote;

pub use cascade::{CascadeReport, DeathCascade};
pub use context::GameContext;
pub use controller::{CommandError, GameController};
pub use night::{NightReport, NightResolver};
pub use speech::{SILENT_REMARK, SpeechScheduler};
pub use vote::{VoteConclusion, VoteResolution, VoteResolver};
