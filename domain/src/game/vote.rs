//! Day vote tally

use crate::decision::Decision;
use crate::participant::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of resolving a full round of ballots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
    /// A unique plurality target
    Eliminated { target: PlayerId, votes: usize },
    /// Several targets share the highest count; a new round opens
    Tied { candidates: Vec<PlayerId>, votes: usize },
    /// Every ballot abstained
    NoElimination,
}

/// Ballots of the current round
///
/// Tracks who has voted and how many votes each target has. Abstentions
/// count towards completion but not towards any target.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    counts: BTreeMap<PlayerId, usize>,
    voters: BTreeSet<PlayerId>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, voter: PlayerId) -> bool {
        self.voters.contains(&voter)
    }

    /// Record a ballot; returns `false` if the voter already voted
    pub fn cast(&mut self, voter: PlayerId, ballot: Decision) -> bool {
        if !self.voters.insert(voter) {
            return false;
        }
        if let Decision::Target(target) = ballot {
            *self.counts.entry(target).or_default() += 1;
        }
        true
    }

    pub fn ballots_cast(&self) -> usize {
        self.voters.len()
    }

    pub fn votes_for(&self, target: PlayerId) -> usize {
        self.counts.get(&target).copied().unwrap_or(0)
    }

    /// Plurality over non-abstain ballots
    pub fn outcome(&self) -> VoteOutcome {
        let Some(max) = self.counts.values().copied().max() else {
            return VoteOutcome::NoElimination;
        };

        let candidates: Vec<PlayerId> = self
            .counts
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(id, _)| *id)
            .collect();

        match candidates.as_slice() {
            [target] => VoteOutcome::Eliminated {
                target: *target,
                votes: max,
            },
            _ => VoteOutcome::Tied {
                candidates,
                votes: max,
            },
        }
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.voters.clear();
    }
}
