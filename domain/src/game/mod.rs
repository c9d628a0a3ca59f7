//! Game rules
//!
//! Pure, synchronous rules of a Werewolf game. Nothing here awaits or
//! performs I/O; the application layer drives these types from its use
//! cases and keeps a [`GameState`] per room behind a lock.

pub mod night;
pub mod outcome;
pub mod phase;
pub mod speech;
pub mod state;
pub mod vote;

pub use night::{NightOutcome, SeerReading, tally_wolf_votes};
pub use outcome::{GameOutcome, WinReason, Winner};
pub use phase::{GameMode, Phase};
pub use speech::{SpeakingQueue, Transcript};
pub use state::{
    BallotReceipt, GameSnapshot, GameState, MAX_PLAYERS, MIN_PLAYERS, TableLimits, WitchPotions,
};
pub use vote::{VoteOutcome, VoteTally};
