//! Night outcome and casualty rule

use crate::participant::PlayerId;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeMap;

/// What the Seer learned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeerReading {
    pub target: PlayerId,
    pub is_wolf: bool,
}

/// Everything decided during one night; discarded after dawn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightOutcome {
    pub wolf_target: Option<PlayerId>,
    pub guard_target: Option<PlayerId>,
    pub witch_saved: bool,
    pub poison_target: Option<PlayerId>,
    pub seer_reading: Option<SeerReading>,
}

impl NightOutcome {
    /// Seats that die at dawn.
    ///
    /// The wolves' target dies only when it was neither guarded nor saved.
    /// A target that was both guarded and saved survives. The poison target
    /// always dies, guarded or not.
    pub fn casualties(&self) -> Vec<PlayerId> {
        let mut dead = Vec::new();

        if let Some(target) = self.wolf_target {
            let guarded = self.guard_target == Some(target);
            if !guarded && !self.witch_saved {
                dead.push(target);
            }
        }

        if let Some(target) = self.poison_target
            && !dead.contains(&target)
        {
            dead.push(target);
        }

        dead
    }

    /// Whether `id` died from poison tonight (disables on-death shots)
    pub fn is_poisoned(&self, id: PlayerId) -> bool {
        self.poison_target == Some(id)
    }
}

/// Plurality of the wolves' individual votes, ties broken uniformly at random
pub fn tally_wolf_votes<R: Rng + ?Sized>(votes: &[PlayerId], rng: &mut R) -> Option<PlayerId> {
    let mut counts: BTreeMap<PlayerId, usize> = BTreeMap::new();
    for vote in votes {
        *counts.entry(*vote).or_default() += 1;
    }

    let max = counts.values().copied().max()?;
    let candidates: Vec<PlayerId> = counts
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(id, _)| id)
        .collect();

    candidates.choose(rng).copied()
}
