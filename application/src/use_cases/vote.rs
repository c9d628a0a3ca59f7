//! Day vote
//!
//! Ballots arrive from two sides: humans through the controller's `vote`
//! command and autonomous players through [`VoteResolver::collect_autonomous`].
//! Whichever ballot completes the round resolves it, inside the same lock.

use super::cascade::DeathCascade;
use super::context::GameContext;
use crate::config::PacingConfig;
use crate::decision::{ActionKind, ActionRequest};
use futures::future::join_all;
use tracing::{debug, info};
use werewolf_domain::{
    BallotReceipt, Decision, DomainError, GameOutcome, PlayerId, Seat, VoteOutcome,
};

/// A closed round and what it did to the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteResolution {
    pub outcome: VoteOutcome,
    pub game_over: Option<GameOutcome>,
}

/// Where the game goes after a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteConclusion {
    NextNight,
    Revote,
    GameOver(GameOutcome),
}

pub struct VoteResolver<'a> {
    ctx: &'a GameContext,
}

impl<'a> VoteResolver<'a> {
    pub fn new(ctx: &'a GameContext) -> Self {
        Self { ctx }
    }

    /// Record one ballot; the ballot that completes the round also
    /// resolves it
    pub async fn submit(
        &self,
        voter: PlayerId,
        ballot: Decision,
    ) -> Result<(BallotReceipt, Option<VoteResolution>), DomainError> {
        let mut state = self.ctx.state.lock().await;
        let receipt = state.cast_ballot(voter, ballot)?;
        if !receipt.complete {
            return Ok((receipt, None));
        }
        let outcome = state.resolve_votes();
        let game_over = state.evaluate_game_over();
        info!("Vote resolved: {:?}", outcome);
        Ok((receipt, Some(VoteResolution { outcome, game_over })))
    }

    /// Ballots for every living autonomous player who has not voted yet.
    ///
    /// Returns the resolution if one of them completed the round.
    pub async fn collect_autonomous(&self) -> Option<VoteResolution> {
        let (voters, snapshot) = {
            let state = self.ctx.state.lock().await;
            let voters: Vec<Seat> = state
                .living_seats()
                .into_iter()
                .filter(|s| s.participant.is_autonomous() && !state.has_voted(s.id))
                .collect();
            (voters, state.snapshot())
        };
        if voters.is_empty() {
            return None;
        }

        let results = join_all(voters.iter().map(|seat| {
            let snapshot = &snapshot;
            async move {
                let delay = PacingConfig::jitter(self.ctx.config.pacing.ai_vote_delay, &mut rand::rng());
                tokio::time::sleep(delay).await;

                let role = snapshot.role_of(seat.id)?;
                let targets = snapshot
                    .living_ids()
                    .into_iter()
                    .filter(|id| *id != seat.id)
                    .collect();
                let request = ActionRequest::new(ActionKind::Vote, role, snapshot.situation())
                    .with_targets(targets)
                    .with_transcript(snapshot.transcript.clone());
                let ballot = self.ctx.decisions.request_decision(seat, &request).await;

                match self.submit(seat.id, ballot).await {
                    Ok((_, resolution)) => {
                        let line = match ballot {
                            Decision::Target(target) => {
                                format!("{} votes for player {}.", seat.label(), target)
                            }
                            Decision::Abstain => format!("{} abstains.", seat.label()),
                        };
                        self.ctx.post(&line).await;
                        resolution
                    }
                    Err(e) => {
                        debug!("Ballot from {} rejected: {}", seat.label(), e);
                        None
                    }
                }
            }
        }))
        .await;

        results.into_iter().flatten().next()
    }

    /// Announce a closed round and carry out its consequences
    pub async fn conclude(&self, resolution: &VoteResolution) -> VoteConclusion {
        match &resolution.outcome {
            VoteOutcome::Eliminated { target, votes } => {
                let (seat, role, situation) = {
                    let state = self.ctx.state.lock().await;
                    (
                        state.seat(*target),
                        state.role_of(*target),
                        state.snapshot().situation(),
                    )
                };
                let label = seat
                    .as_ref()
                    .map(Seat::label)
                    .unwrap_or_else(|| target.to_string());
                self.ctx
                    .announce(
                        "vote_elimination",
                        &format!("{} was voted out with {} votes.", label, votes),
                    )
                    .await;

                if let Some(outcome) = resolution.game_over {
                    return VoteConclusion::GameOver(outcome);
                }

                if let (Some(seat), Some(role)) = (seat, role) {
                    let words = self
                        .ctx
                        .decisions
                        .request_last_words(&seat, role, &situation)
                        .await;
                    if !words.trim().is_empty() {
                        self.ctx
                            .post(&format!("Last words of {}: {}", label, words.trim()))
                            .await;
                    }
                }

                match DeathCascade::new(self.ctx)
                    .resolve(&[*target], None)
                    .await
                    .game_over
                {
                    Some(outcome) => VoteConclusion::GameOver(outcome),
                    None => VoteConclusion::NextNight,
                }
            }
            VoteOutcome::Tied { candidates, votes } => {
                let names: Vec<String> = candidates.iter().map(|id| id.to_string()).collect();
                self.ctx
                    .announce(
                        "vote_tie",
                        &format!(
                            "The vote is tied between players {} with {} votes each. Vote again.",
                            names.join(", "),
                            votes
                        ),
                    )
                    .await;
                VoteConclusion::Revote
            }
            VoteOutcome::NoElimination => {
                self.ctx
                    .announce("vote_none", "Nobody was voted out today.")
                    .await;
                VoteConclusion::NextNight
            }
        }
    }
}
