//! Death-triggered abilities
//!
//! A dying Hunter or Wolf King may take one living player down with them.
//! The shot can hit another shooter, so deaths are processed frontier by
//! frontier until nothing new dies or the game ends.

use super::context::GameContext;
use crate::decision::{ActionKind, ActionRequest};
use std::collections::HashSet;
use tracing::info;
use werewolf_domain::{GameOutcome, PlayerId};

/// Who was shot, in order, and whether a shot ended the game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub shot: Vec<PlayerId>,
    pub game_over: Option<GameOutcome>,
}

pub struct DeathCascade<'a> {
    ctx: &'a GameContext,
}

impl<'a> DeathCascade<'a> {
    pub fn new(ctx: &'a GameContext) -> Self {
        Self { ctx }
    }

    /// Give every shooter among `dead` their shot.
    ///
    /// `poisoned` loses the ability: the Witch's poison silences a Hunter.
    pub async fn resolve(&self, dead: &[PlayerId], poisoned: Option<PlayerId>) -> CascadeReport {
        let mut report = CascadeReport::default();
        let mut processed: HashSet<PlayerId> = HashSet::new();
        let mut frontier: Vec<PlayerId> = dead.to_vec();

        while !frontier.is_empty() {
            let mut next = Vec::new();

            for id in frontier {
                if !processed.insert(id) || Some(id) == poisoned {
                    continue;
                }

                let (seat, role, snapshot) = {
                    let state = self.ctx.state.lock().await;
                    if state.is_over() {
                        return report;
                    }
                    let (Some(seat), Some(role)) = (state.seat(id), state.role_of(id)) else {
                        continue;
                    };
                    (seat, role, state.snapshot())
                };
                if !role.shoots_on_death() {
                    continue;
                }

                let request = ActionRequest::new(ActionKind::Shoot, role, snapshot.situation())
                    .with_targets(snapshot.living_ids())
                    .with_transcript(snapshot.transcript.clone());
                let Some(target) = self
                    .ctx
                    .decisions
                    .request_decision(&seat, &request)
                    .await
                    .target()
                else {
                    self.ctx
                        .post(&format!("{} ({}) holds their fire.", seat.label(), role))
                        .await;
                    continue;
                };

                let (killed, game_over) = {
                    let mut state = self.ctx.state.lock().await;
                    let killed = state.eliminate(target);
                    (killed, state.evaluate_game_over())
                };
                if !killed {
                    continue;
                }

                info!("{} ({}) shot player {}", seat.label(), role, target);
                report.shot.push(target);
                self.ctx
                    .announce(
                        "shot",
                        &format!(
                            "{} was a {} and shot player {} on the way out.",
                            seat.label(),
                            role,
                            target
                        ),
                    )
                    .await;

                if game_over.is_some() {
                    report.game_over = game_over;
                    return report;
                }
                next.push(target);
            }

            frontier = next;
        }

        report
    }
}
