//! Win-condition evaluation

use crate::role::FactionCounts;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// Gods and villagers
    Good,
    Wolves,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Good => write!(f, "the village"),
            Winner::Wolves => write!(f, "the wolves"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// No wolf is alive
    WolvesEliminated,
    /// Every God-faction role is dead (faction wipe)
    GodsEliminated,
    /// Every plain villager is dead (faction wipe)
    VillagersEliminated,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinReason::WolvesEliminated => write!(f, "every wolf has been eliminated"),
            WinReason::GodsEliminated => write!(f, "every special role has fallen"),
            WinReason::VillagersEliminated => write!(f, "every villager has fallen"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Winner,
    pub reason: WinReason,
}

impl GameOutcome {
    /// Evaluate the living faction counts.
    ///
    /// A wolf wipe wins for the village even when a good group is also
    /// empty.
    pub fn evaluate(counts: FactionCounts) -> Option<Self> {
        if counts.wolves == 0 {
            return Some(Self {
                winner: Winner::Good,
                reason: WinReason::WolvesEliminated,
            });
        }
        if counts.gods == 0 {
            return Some(Self {
                winner: Winner::Wolves,
                reason: WinReason::GodsEliminated,
            });
        }
        if counts.villagers == 0 {
            return Some(Self {
                winner: Winner::Wolves,
                reason: WinReason::VillagersEliminated,
            });
        }
        None
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Winner: {}. Reason: {}.", self.winner, self.reason)
    }
}
