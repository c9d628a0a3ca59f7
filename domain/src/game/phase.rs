//! Game phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level state of a room's game
///
/// ```text
/// Lobby → Setup → Night → Dawn → Speaking → Voting → Dusk ─┐
///                   ↑                         ↺ tie            │
///                   └──────────────────────────────────────────┘
///              (any casualty-producing step) → GameOver
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Players are joining; no game yet
    #[default]
    Lobby,
    /// Roles are being dealt
    Setup,
    /// Role actions are being collected
    Night,
    /// Night casualties and on-death abilities are being announced
    Dawn,
    /// Players speak in turn
    Speaking,
    /// Ballots are being collected
    Voting,
    /// The day's vote is settled; last words and on-death shots run
    Dusk,
    /// A faction has won; the state is frozen until reset
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lobby => "lobby",
            Phase::Setup => "setup",
            Phase::Night => "night",
            Phase::Dawn => "dawn",
            Phase::Speaking => "speaking",
            Phase::Voting => "voting",
            Phase::Dusk => "dusk",
            Phase::GameOver => "game_over",
        }
    }

    /// Whether a game is running (roles dealt or being dealt, not finished)
    pub fn is_in_game(&self) -> bool {
        !matches!(self, Phase::Lobby | Phase::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where narration is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Narration is posted to the room
    #[default]
    Online,
    /// Narration is sent privately to the room creator, who reads it aloud
    Offline,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Online => "online",
            GameMode::Offline => "offline",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(GameMode::Online),
            "offline" => Ok(GameMode::Offline),
            other => Err(format!("unknown game mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_game_phases() {
        assert!(!Phase::Lobby.is_in_game());
        assert!(Phase::Setup.is_in_game());
        assert!(Phase::Voting.is_in_game());
        assert!(Phase::Dusk.is_in_game());
        assert!(!Phase::GameOver.is_in_game());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Offline".parse::<GameMode>(), Ok(GameMode::Offline));
        assert!("hybrid".parse::<GameMode>().is_err());
    }
}
