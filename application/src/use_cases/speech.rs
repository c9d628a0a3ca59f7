//! Speaking phase
//!
//! Living players speak one at a time in a shuffled order. Autonomous
//! players get a generated remark; humans are unmuted and hold the floor
//! until they end their turn or the speech timeout expires.

use super::context::GameContext;
use crate::config::PacingConfig;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use werewolf_domain::{DomainError, PlayerId, Seat};

/// Placeholder recorded when an autonomous player has nothing to say
pub const SILENT_REMARK: &str = "(no comment)";

pub struct SpeechScheduler<'a> {
    ctx: &'a GameContext,
    turns: &'a Mutex<mpsc::UnboundedReceiver<PlayerId>>,
}

impl<'a> SpeechScheduler<'a> {
    /// `turns` receives the seat of every human who ends their turn
    pub fn new(ctx: &'a GameContext, turns: &'a Mutex<mpsc::UnboundedReceiver<PlayerId>>) -> Self {
        Self { ctx, turns }
    }

    /// Run the whole phase; on return the game is voting (or over)
    pub async fn run(&self) -> Result<(), DomainError> {
        let order = {
            let mut state = self.ctx.state.lock().await;
            state.begin_speaking(&mut rand::rng())?
        };
        let order_text: Vec<String> = order.iter().map(|id| id.to_string()).collect();
        info!("Speaking order: {:?}", order);

        self.ctx.set_living_muted(true).await;
        self.ctx
            .post(&format!("Discussion begins. Speaking order: {}.", order_text.join(", ")))
            .await;

        loop {
            let turn = {
                let mut state = self.ctx.state.lock().await;
                state.next_speaker().and_then(|id| {
                    let seat = state.seat(id)?;
                    let role = state.role_of(id)?;
                    Some((seat, role, state.snapshot()))
                })
            };
            let Some((seat, role, snapshot)) = turn else {
                break;
            };

            if seat.participant.is_autonomous() {
                self.pause(self.ctx.config.pacing.ai_think_delay).await;
                let remark = self
                    .ctx
                    .decisions
                    .request_speech(&seat, role, &snapshot.situation(), &snapshot.transcript)
                    .await
                    .unwrap_or_default();
                let remark = if remark.is_empty() {
                    SILENT_REMARK.to_string()
                } else {
                    remark
                };
                self.ctx.state.lock().await.record_remark(seat.id, &remark);
                self.ctx
                    .post(&format!("{}: {}", seat.label(), remark))
                    .await;
                self.pause(self.ctx.config.pacing.ai_reading_delay).await;
            } else {
                self.human_turn(&seat, snapshot.transcript.is_empty()).await;
            }
        }

        if self.ctx.state.lock().await.is_over() {
            return Ok(());
        }
        self.ctx.set_living_muted(false).await;
        self.ctx
            .post("Discussion is over. Voting is open: /vote <seat> or /vote no.")
            .await;
        Ok(())
    }

    async fn pause(&self, range: (Duration, Duration)) {
        let delay = PacingConfig::jitter(range, &mut rand::rng());
        tokio::time::sleep(delay).await;
    }

    async fn human_turn(&self, seat: &Seat, first: bool) {
        let mut turns = self.turns.lock().await;
        while turns.try_recv().is_ok() {}

        self.ctx.set_muted(seat, false).await;
        self.ctx
            .post(&format!(
                "{}, it is your turn to speak. Type /done when you are finished.",
                seat.label()
            ))
            .await;
        if first {
            self.ctx
                .decisions
                .notify(
                    &seat.participant,
                    "Nobody has spoken yet; you open today's discussion.",
                )
                .await;
        }

        let finished = async {
            while let Some(id) = turns.recv().await {
                if id == seat.id {
                    return;
                }
                debug!("Ignoring end of turn from player {}", id);
            }
        };
        if tokio::time::timeout(self.ctx.config.speech_timeout, finished)
            .await
            .is_err()
        {
            self.ctx
                .post(&format!("Time is up for {}.", seat.label()))
                .await;
        }
        self.ctx.set_muted(seat, true).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PromptBackend, RecordingTransport, context, seated};
    use werewolf_domain::{Phase, Role, UserId};

    fn day_one(humans: &[&str], bots: usize, pool: Vec<Role>) -> crate::session::registry::SharedGame {
        let state = seated(humans, bots, pool);
        state.try_lock().unwrap().begin_night().unwrap();
        state
    }

    #[tokio::test]
    async fn test_autonomous_players_speak_in_turn() {
        let state = day_one(&[], 3, vec![Role::Werewolf, Role::Seer, Role::Villager]);
        let transport = RecordingTransport::new();
        let ctx = context(PromptBackend::new(), transport.clone(), state.clone());
        let (_tx, rx) = mpsc::unbounded_channel();
        let turns = Mutex::new(rx);

        SpeechScheduler::new(&ctx, &turns).run().await.unwrap();

        let s = state.lock().await;
        assert_eq!(s.phase(), Phase::Voting);
        assert_eq!(s.transcript().lines().len(), 3);
        assert!(
            s.transcript()
                .lines()
                .iter()
                .all(|l| l.ends_with("I have nothing to hide."))
        );
        assert!(transport.channel_contains("Voting is open"));
    }

    #[tokio::test]
    async fn test_human_turn_ends_on_done() {
        let state = day_one(&["alice"], 2, vec![Role::Werewolf, Role::Seer, Role::Villager]);
        let transport = RecordingTransport::new();
        let ctx = context(PromptBackend::new(), transport.clone(), state.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let turns = Mutex::new(rx);

        // Keep ending alice's turn until the floor moves on
        let speaker = {
            let ctx = ctx.clone();
            async move {
                loop {
                    let (phase, current) = {
                        let s = ctx.state.lock().await;
                        (s.phase(), s.current_speaker())
                    };
                    if matches!(phase, Phase::Voting | Phase::GameOver) {
                        return;
                    }
                    if current == Some(PlayerId(1)) {
                        tx.send(PlayerId(2)).unwrap();
                        tx.send(PlayerId(1)).unwrap();
                    }
                    tokio::task::yield_now().await;
                }
            }
        };
        let scheduler = SpeechScheduler::new(&ctx, &turns);
        let (result, ()) = tokio::join!(scheduler.run(), speaker);
        result.unwrap();

        assert!(!transport.channel_contains("Time is up"));
        assert_eq!(state.lock().await.phase(), Phase::Voting);
        let muted = transport.muted.lock().unwrap();
        assert_eq!(muted.get(&UserId::new("alice")), Some(&false));
    }

    #[tokio::test]
    async fn test_silent_human_times_out() {
        let state = day_one(&["alice"], 2, vec![Role::Werewolf, Role::Seer, Role::Villager]);
        let transport = RecordingTransport::new();
        let ctx = context(PromptBackend::new(), transport.clone(), state.clone());
        let (_tx, rx) = mpsc::unbounded_channel();
        let turns = Mutex::new(rx);

        SpeechScheduler::new(&ctx, &turns).run().await.unwrap();
        assert!(transport.channel_contains("Time is up for 1. alice."));
        assert_eq!(state.lock().await.phase(), Phase::Voting);
    }

    #[tokio::test]
    async fn test_missing_permissions_do_not_stall() {
        let state = day_one(&["alice"], 2, vec![Role::Werewolf, Role::Seer, Role::Villager]);
        let transport = std::sync::Arc::new(RecordingTransport {
            deny_permissions: true,
            ..Default::default()
        });
        let ctx = context(PromptBackend::new(), transport.clone(), state.clone());
        let (_tx, rx) = mpsc::unbounded_channel();
        let turns = Mutex::new(rx);

        SpeechScheduler::new(&ctx, &turns).run().await.unwrap();
        assert_eq!(state.lock().await.phase(), Phase::Voting);
        assert!(transport.muted.lock().unwrap().is_empty());
    }
}
