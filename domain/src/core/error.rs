//! Domain error types

use crate::game::Phase;
use crate::participant::PlayerId;
use thiserror::Error;

/// A command that the game rules refuse
///
/// Every variant leaves the game state untouched. The message is shown to
/// the user who issued the command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("A game is already in progress")]
    GameInProgress,

    #[error("No game is running")]
    GameNotActive,

    #[error("The game is over; reset the room to play again")]
    GameOver,

    #[error("You have already joined")]
    AlreadyJoined,

    #[error("The table is full ({max} players)")]
    TableFull { max: usize },

    #[error("Not enough players: {have} joined, at least {need} needed")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("Invalid role pool: {0}")]
    InvalidRolePool(String),

    #[error("There is no player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} is not alive")]
    PlayerNotAlive(PlayerId),

    #[error("You are not a living player in this game")]
    NotAPlayer,

    #[error("You have already voted")]
    AlreadyVoted,

    #[error("Not allowed during the {actual} phase (expected {expected})")]
    WrongPhase { expected: Phase, actual: Phase },
}

impl DomainError {
    /// Whether the error comes from the game having ended
    pub fn is_game_over(&self) -> bool {
        matches!(self, DomainError::GameOver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DomainError::NotEnoughPlayers { have: 2, need: 3 }.to_string(),
            "Not enough players: 2 joined, at least 3 needed"
        );
        assert_eq!(
            DomainError::WrongPhase {
                expected: Phase::Voting,
                actual: Phase::Speaking
            }
            .to_string(),
            "Not allowed during the speaking phase (expected voting)"
        );
    }

    #[test]
    fn test_is_game_over() {
        assert!(DomainError::GameOver.is_game_over());
        assert!(!DomainError::AlreadyVoted.is_game_over());
    }
}
