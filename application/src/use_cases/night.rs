//! Night resolution
//!
//! ```text
//! Dusk ──▶ ┌─ Guard ─────────────────────────┐
//!          ├─ Seer ──────────────────────────┤──▶ Resolve ──▶ Dawn
//!          └─ Wolves (plurality) ──▶ Witch ──┘
//! ```
//!
//! Guard, Seer and the wolf pack are solicited concurrently. The Witch is
//! asked only after the wolves' target is final, still concurrently with
//! the Guard and the Seer. Each branch degrades to "no action" on its own.

use super::context::GameContext;
use crate::decision::{ActionKind, ActionRequest};
use futures::future::join_all;
use tracing::{debug, info};
use werewolf_domain::{
    DomainError, GameOutcome, GameSnapshot, NightOutcome, PlayerId, Role, Seat, SeerReading,
    tally_wolf_votes,
};

/// What happened overnight
#[derive(Debug, Clone)]
pub struct NightReport {
    pub day: u32,
    pub outcome: NightOutcome,
    pub dead: Vec<PlayerId>,
    pub game_over: Option<GameOutcome>,
}

/// The wolves' branch: their target and the Witch's reaction to it
#[derive(Debug, Default)]
struct WolfBranch {
    target: Option<PlayerId>,
    saved: bool,
    poisoned: Option<PlayerId>,
}

pub struct NightResolver<'a> {
    ctx: &'a GameContext,
}

impl<'a> NightResolver<'a> {
    pub fn new(ctx: &'a GameContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self) -> Result<NightReport, DomainError> {
        let (day, snapshot) = {
            let mut state = self.ctx.state.lock().await;
            let day = state.begin_night()?;
            (day, state.snapshot())
        };
        info!("Night {} begins with {} players", day, snapshot.living.len());

        self.ctx.set_postable(false).await;
        self.ctx
            .announce(
                "night_start",
                &format!("Night {} falls. Everyone, close your eyes.", day),
            )
            .await;

        let (guard_target, seer_reading, wolves) = tokio::join!(
            self.guard(&snapshot),
            self.seer(&snapshot),
            self.wolves_then_witch(&snapshot),
        );

        let outcome = NightOutcome {
            wolf_target: wolves.target,
            guard_target,
            witch_saved: wolves.saved,
            poison_target: wolves.poisoned,
            seer_reading,
        };

        let (dead, game_over) = {
            let mut state = self.ctx.state.lock().await;
            let dead = state.apply_night(&outcome);
            (dead, state.evaluate_game_over())
        };
        info!("Night {} resolved: {} dead", day, dead.len());

        Ok(NightReport {
            day,
            outcome,
            dead,
            game_over,
        })
    }

    fn first_with_role(snapshot: &GameSnapshot, role: Role) -> Option<Seat> {
        snapshot.seats_where(|r| r == role).into_iter().next()
    }

    async fn guard(&self, snapshot: &GameSnapshot) -> Option<PlayerId> {
        let guard = Self::first_with_role(snapshot, Role::Guard)?;
        let targets = {
            let state = self.ctx.state.lock().await;
            snapshot
                .living_ids()
                .into_iter()
                .filter(|id| state.guard_allowed(*id))
                .collect()
        };
        let request = ActionRequest::new(ActionKind::Protect, Role::Guard, snapshot.situation())
            .with_targets(targets)
            .with_transcript(snapshot.transcript.clone());

        let target = self
            .ctx
            .decisions
            .request_decision(&guard, &request)
            .await
            .target();
        self.ctx.state.lock().await.record_guard(target);

        let note = match target {
            Some(t) => format!("You protect player {} tonight.", t),
            None => "You protect nobody tonight.".to_string(),
        };
        self.ctx.decisions.notify(&guard.participant, &note).await;
        target
    }

    async fn seer(&self, snapshot: &GameSnapshot) -> Option<SeerReading> {
        let seer = Self::first_with_role(snapshot, Role::Seer)?;
        let targets = snapshot
            .living_ids()
            .into_iter()
            .filter(|id| *id != seer.id)
            .collect();
        let request = ActionRequest::new(ActionKind::Inspect, Role::Seer, snapshot.situation())
            .with_targets(targets)
            .with_transcript(snapshot.transcript.clone());

        let target = self
            .ctx
            .decisions
            .request_decision(&seer, &request)
            .await
            .target()?;
        let is_wolf = snapshot
            .role_of(target)
            .is_some_and(|r| r.seer_reads_as_wolf());

        let verdict = if is_wolf { "a wolf" } else { "not a wolf" };
        self.ctx
            .decisions
            .notify(
                &seer.participant,
                &format!("Player {} is {}.", target, verdict),
            )
            .await;
        Some(SeerReading { target, is_wolf })
    }

    async fn wolves_then_witch(&self, snapshot: &GameSnapshot) -> WolfBranch {
        let target = self.wolf_kill(snapshot).await;
        let Some(witch) = Self::first_with_role(snapshot, Role::Witch) else {
            return WolfBranch {
                target,
                ..WolfBranch::default()
            };
        };

        let potions = self.ctx.state.lock().await.potions();
        let mut saved = false;

        if let Some(victim) = target
            && potions.antidote
        {
            let wants_save = self
                .ctx
                .decisions
                .request_confirmation(
                    &witch,
                    &format!("Player {} was attacked tonight. Use your antidote?", victim),
                    true,
                )
                .await;
            if wants_save {
                saved = self.ctx.state.lock().await.take_antidote();
                if saved {
                    self.ctx
                        .decisions
                        .notify(&witch.participant, &format!("You saved player {}.", victim))
                        .await;
                }
            }
        }

        let mut poisoned = None;
        if potions.poison {
            let targets = snapshot
                .living_ids()
                .into_iter()
                .filter(|id| *id != witch.id)
                .collect();
            let request = ActionRequest::new(ActionKind::Poison, Role::Witch, snapshot.situation())
                .with_targets(targets)
                .with_transcript(snapshot.transcript.clone());

            if let Some(victim) = self
                .ctx
                .decisions
                .request_decision(&witch, &request)
                .await
                .target()
                && self.ctx.state.lock().await.take_poison()
            {
                poisoned = Some(victim);
                self.ctx
                    .decisions
                    .notify(&witch.participant, &format!("You poisoned player {}.", victim))
                    .await;
            }
        }

        WolfBranch {
            target,
            saved,
            poisoned,
        }
    }

    /// Each wolf votes on its own; plurality wins, ties at random
    async fn wolf_kill(&self, snapshot: &GameSnapshot) -> Option<PlayerId> {
        let wolves = snapshot.seats_where(|r| r.joins_wolf_kill());
        if wolves.is_empty() {
            return None;
        }
        let prey: Vec<PlayerId> = snapshot
            .living
            .iter()
            .filter(|s| !snapshot.role_of(s.id).is_some_and(|r| r.is_wolf()))
            .map(|s| s.id)
            .collect();
        let situation = snapshot.situation();

        let ballots = join_all(wolves.iter().map(|wolf| {
            let role = snapshot.role_of(wolf.id).unwrap_or(Role::Werewolf);
            let request = ActionRequest::new(ActionKind::WolfKill, role, situation.clone())
                .with_targets(prey.clone())
                .with_transcript(snapshot.transcript.clone());
            async move { self.ctx.decisions.request_decision(wolf, &request).await }
        }))
        .await;

        let picks: Vec<PlayerId> = ballots.iter().filter_map(|d| d.target()).collect();
        let target = tally_wolf_votes(&picks, &mut rand::rng());
        debug!("Wolf ballots {:?} -> {:?}", picks, target);

        let note = match target {
            Some(t) => format!("The pack attacks player {} tonight.", t),
            None => "The pack could not choose; nobody is attacked tonight.".to_string(),
        };
        join_all(
            wolves
                .iter()
                .map(|wolf| self.ctx.decisions.notify(&wolf.participant, &note)),
        )
        .await;
        target
    }
}
