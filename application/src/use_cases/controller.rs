//! Game Controller
//!
//! Top-level state machine for one room. Lobby commands mutate the
//! [`GameState`](werewolf_domain::GameState) directly; once a game starts,
//! a background loop drives the phases:
//!
//! ```text
//! Setup ──▶ Night ──▶ Dawn ──▶ Speaking ──▶ Voting ──┬──▶ Night …
//!                                              ▲     │
//!                                              └─tie─┘──▶ GameOver
//! ```
//!
//! The loop runs in a spawned task guarded by a [`CancellationToken`], so
//! `reset`, `force_day` and `force_night` can replace it at any point. The
//! current phase is published on a `watch` channel.

use super::cascade::DeathCascade;
use super::context::GameContext;
use super::night::NightResolver;
use super::speech::SpeechScheduler;
use super::vote::{VoteConclusion, VoteResolution, VoteResolver};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use werewolf_domain::{
    BASIC_BOARD_LIMIT, Decision, DomainError, FactionCounts, GameMode, GameOutcome, Participant,
    Phase, PlayerId, Role, Seat, TemplateCatalog, UserId, VoteOutcome,
};

/// Why a command was refused; the state is unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Rule(#[from] DomainError),

    #[error("Only the room creator or an administrator can do that")]
    NotPermitted,

    #[error("{0}")]
    InvalidInput(String),

    #[error("It is not your turn to speak")]
    NotYourTurn,
}

/// Where the background loop picks up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Night,
    Day,
    Vote,
}

pub struct GameController {
    ctx: GameContext,
    catalog: TemplateCatalog,
    admins: HashSet<UserId>,
    turns_tx: mpsc::UnboundedSender<PlayerId>,
    turns_rx: Mutex<mpsc::UnboundedReceiver<PlayerId>>,
    votes_tx: mpsc::UnboundedSender<VoteResolution>,
    votes_rx: Mutex<mpsc::UnboundedReceiver<VoteResolution>>,
    phase: watch::Sender<Phase>,
    running: Mutex<Option<CancellationToken>>,
}

impl GameController {
    pub fn new(ctx: GameContext) -> Self {
        let (turns_tx, turns_rx) = mpsc::unbounded_channel();
        let (votes_tx, votes_rx) = mpsc::unbounded_channel();
        let (phase, _) = watch::channel(Phase::Lobby);
        Self {
            ctx,
            catalog: TemplateCatalog::standard(),
            admins: HashSet::new(),
            turns_tx,
            turns_rx: Mutex::new(turns_rx),
            votes_tx,
            votes_rx: Mutex::new(votes_rx),
            phase,
            running: Mutex::new(None),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_admins(mut self, admins: impl IntoIterator<Item = UserId>) -> Self {
        self.admins = admins.into_iter().collect();
        self
    }

    pub fn with_catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Phase updates; the current value is available immediately
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    fn publish(&self, phase: Phase) {
        self.phase.send_replace(phase);
    }

    fn is_admin(&self, user: &UserId) -> bool {
        self.admins.contains(user)
    }

    async fn ensure_moderator(&self, user: &UserId) -> Result<(), CommandError> {
        if self.is_admin(user) || self.ctx.state.lock().await.is_creator(user) {
            Ok(())
        } else {
            Err(CommandError::NotPermitted)
        }
    }

    // ==================== Lobby ====================

    pub async fn join(&self, user: &UserId, name: &str) -> Result<String, CommandError> {
        let count = self.ctx.state.lock().await.join(user, name)?;
        info!("{} joined ({} players)", name, count);
        Ok(format!("{} joined the game. Players: {}.", name, count))
    }

    pub async fn spectate(&self, user: &UserId, name: &str) -> Result<String, CommandError> {
        self.ctx.state.lock().await.spectate(user, name)?;
        Ok(format!("{} is now spectating.", name))
    }

    pub async fn add_bots(&self, count: usize) -> Result<String, CommandError> {
        let names = self.ctx.state.lock().await.add_bots(count)?;
        if names.is_empty() {
            return Err(CommandError::InvalidInput(
                "No bots were added; the table is full.".to_string(),
            ));
        }
        Ok(format!("Added {}.", names.join(", ")))
    }

    pub async fn set_mode(&self, user: &UserId, mode: GameMode) -> Result<String, CommandError> {
        self.ensure_moderator(user).await?;
        self.ctx.state.lock().await.set_mode(mode)?;
        Ok(format!("Game mode set to {}.", mode))
    }

    // ==================== Start ====================

    /// Deal roles, brief every participant and start the first night
    pub async fn start(self: &Arc<Self>, user: &UserId) -> Result<String, CommandError> {
        let count = self.ctx.state.lock().await.begin_setup(user)?;
        self.publish(Phase::Setup);
        info!("Setting up a game for {} players", count);

        let pool = self.plan_roles(count).await;
        let dealt = {
            let mut state = self.ctx.state.lock().await;
            let dealt = state.deal_roles(pool, &mut rand::rng());
            if dealt.is_err() {
                state.abort_setup();
            }
            dealt
        };
        let dealt = match dealt {
            Ok(dealt) => dealt,
            Err(e) => {
                self.publish(Phase::Lobby);
                return Err(e.into());
            }
        };

        self.brief(&dealt).await;
        let roster: Vec<String> = dealt.iter().map(|(seat, _)| seat.label()).collect();
        self.ctx
            .post(&format!(
                "The game begins with {} players: {}.",
                dealt.len(),
                roster.join(", ")
            ))
            .await;

        self.spawn_loop(Step::Night).await;
        Ok(format!("Game started with {} players.", dealt.len()))
    }

    /// Standard board, basic board or AI-designed list, in that order.
    ///
    /// An unusable AI list trims the table to the largest standard board.
    async fn plan_roles(&self, count: usize) -> Vec<Role> {
        if let Some(template) = self.catalog.choose(count, &mut rand::rng()) {
            info!("Using the {} board", template.name);
            return template.roles.clone();
        }
        if count < BASIC_BOARD_LIMIT {
            return TemplateCatalog::basic_pool(count);
        }

        let roles = self
            .ctx
            .gateway
            .generate_role_template(count, &Role::ALL)
            .await;
        let counts = FactionCounts::from_roles(&roles);
        if roles.len() == count && counts.wolves > 0 && counts.gods > 0 && counts.villagers > 0 {
            info!("Using an AI-designed board for {} players", count);
            return roles;
        }

        warn!("No usable AI board for {} players; trimming the table", count);
        let Some(keep) = self.catalog.largest_fitting(count) else {
            return TemplateCatalog::basic_pool(count);
        };
        let (benched, template) = {
            let mut state = self.ctx.state.lock().await;
            let benched = state.trim_table(keep, &mut rand::rng());
            (benched, self.catalog.choose(keep, &mut rand::rng()).cloned())
        };
        for participant in &benched {
            self.ctx
                .decisions
                .notify(participant, "The table was trimmed; you are now spectating.")
                .await;
        }
        if !benched.is_empty() {
            let names: Vec<String> = benched.iter().map(|p| p.name.clone()).collect();
            self.ctx
                .post(&format!("Moved to spectators: {}.", names.join(", ")))
                .await;
        }
        template
            .map(|t| t.roles)
            .unwrap_or_else(|| TemplateCatalog::basic_pool(keep))
    }

    /// Private role cards; wolves learn their pack, spectators see everything
    async fn brief(&self, dealt: &[(Seat, Role)]) {
        let pack: Vec<String> = dealt
            .iter()
            .filter(|(_, role)| role.is_wolf())
            .map(|(seat, role)| format!("{} ({})", seat.label(), role))
            .collect();

        for (seat, role) in dealt {
            let mut card = format!(
                "You are seat {} ({}). Your role: {}. {}",
                seat.id,
                seat.participant.name,
                role,
                role.description()
            );
            if role.is_wolf() {
                card.push_str(&format!("\nYour pack: {}.", pack.join(", ")));
            }
            self.ctx.decisions.notify(&seat.participant, &card).await;
        }

        let summary: Vec<String> = dealt
            .iter()
            .map(|(seat, role)| format!("{}: {}", seat.label(), role))
            .collect();
        let spectators: Vec<Participant> = self.ctx.state.lock().await.spectators().to_vec();
        let text = format!("Roles this game:\n{}", summary.join("\n"));
        for spectator in &spectators {
            self.ctx.decisions.notify(spectator, &text).await;
        }
    }

    // ==================== In-game Commands ====================

    /// Hand the floor on; the speaker, the creator or an admin may do this
    pub async fn end_turn(&self, user: &UserId) -> Result<(), CommandError> {
        let current = {
            let state = self.ctx.state.lock().await;
            let Some(current) = state.current_speaker() else {
                return Err(CommandError::Rule(DomainError::WrongPhase {
                    expected: Phase::Speaking,
                    actual: state.phase(),
                }));
            };
            let own_turn = state.seat_of_user(user) == Some(current);
            if !own_turn && !state.is_creator(user) && !self.is_admin(user) {
                return Err(CommandError::NotYourTurn);
            }
            current
        };
        debug!("Turn of player {} ended by {}", current, user);
        // The scheduler may already have moved on; a stale id is ignored there
        let _ = self.turns_tx.send(current);
        Ok(())
    }

    /// `/vote <seat>` or `/vote no`
    pub async fn vote(&self, user: &UserId, input: &str) -> Result<String, CommandError> {
        let input = input.trim();
        if input.chars().count() > self.ctx.config.max_vote_chars {
            return Err(CommandError::InvalidInput("That vote is too long.".to_string()));
        }
        let ballot = if input.eq_ignore_ascii_case(werewolf_domain::ABSTAIN_TOKEN) {
            Decision::Abstain
        } else {
            let seat = input.parse::<u32>().map_err(|_| {
                CommandError::InvalidInput(format!(
                    "'{}' is not a seat number. Use /vote <seat> or /vote no.",
                    input
                ))
            })?;
            Decision::Target(PlayerId(seat))
        };

        let (voter, label) = {
            let state = self.ctx.state.lock().await;
            let voter = state
                .seat_of_user(user)
                .ok_or(CommandError::Rule(DomainError::NotAPlayer))?;
            let label = state
                .seat(voter)
                .map(|s| s.label())
                .unwrap_or_else(|| voter.to_string());
            (voter, label)
        };

        let (receipt, resolution) = VoteResolver::new(&self.ctx).submit(voter, ballot).await?;
        let line = match ballot {
            Decision::Target(target) => format!("{} votes for player {}.", label, target),
            Decision::Abstain => format!("{} abstains.", label),
        };
        self.ctx.post(&line).await;
        if let Some(resolution) = resolution {
            let _ = self.votes_tx.send(resolution);
        }
        Ok(format!(
            "Vote recorded ({}/{}).",
            receipt.ballots_cast, receipt.living
        ))
    }

    /// Append a chat line to the transcript; `false` if it was not heard
    pub async fn record_chat(&self, user: &UserId, text: &str) -> bool {
        self.ctx.state.lock().await.record_chat(user, text)
    }

    // ==================== Moderator Commands ====================

    /// Remove a player outside the normal flow
    pub async fn execute(&self, user: &UserId, seat: PlayerId) -> Result<String, CommandError> {
        self.ensure_moderator(user).await?;
        let (label, game_over) = {
            let mut state = self.ctx.state.lock().await;
            state.execute(seat)?;
            let label = state
                .seat(seat)
                .map(|s| s.label())
                .unwrap_or_else(|| seat.to_string());
            (label, state.evaluate_game_over())
        };
        self.ctx
            .announce(
                "execution",
                &format!("The moderator removed {} from the game.", label),
            )
            .await;
        if let Some(outcome) = game_over {
            self.cancel_loop().await;
            self.finish(outcome).await;
        }
        Ok(format!("{} was executed.", label))
    }

    /// Skip straight to the speaking phase
    pub async fn force_day(self: &Arc<Self>, user: &UserId) -> Result<(), CommandError> {
        self.force(user, Step::Day).await
    }

    /// Skip straight to the next night
    pub async fn force_night(self: &Arc<Self>, user: &UserId) -> Result<(), CommandError> {
        self.force(user, Step::Night).await
    }

    async fn force(self: &Arc<Self>, user: &UserId, step: Step) -> Result<(), CommandError> {
        if !self.is_admin(user) {
            return Err(CommandError::NotPermitted);
        }
        {
            let state = self.ctx.state.lock().await;
            if state.is_over() {
                return Err(DomainError::GameOver.into());
            }
            if !state.phase().is_in_game() || state.phase() == Phase::Setup {
                return Err(DomainError::GameNotActive.into());
            }
        }
        info!("{} forced {:?}", user, step);
        self.spawn_loop(step).await;
        Ok(())
    }

    /// Stop any running game and clear the room
    pub async fn reset(&self, user: &UserId) -> Result<(), CommandError> {
        self.ensure_moderator(user).await?;
        self.cancel_loop().await;
        self.ctx.set_postable(true).await;
        self.ctx.set_living_muted(false).await;
        self.ctx.state.lock().await.reset();
        self.publish(Phase::Lobby);
        self.ctx.post("The room has been reset.").await;
        Ok(())
    }

    // ==================== Phase Loop ====================

    async fn cancel_loop(&self) {
        if let Some(token) = self.running.lock().await.take() {
            token.cancel();
        }
    }

    async fn spawn_loop(self: &Arc<Self>, step: Step) {
        let token = CancellationToken::new();
        if let Some(previous) = self.running.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Game loop cancelled");
                }
                result = this.run_loop(step) => {
                    if let Err(e) = result {
                        warn!("Game loop stopped: {}", e);
                    }
                }
            }
        });
    }

    async fn run_loop(&self, mut step: Step) -> Result<(), DomainError> {
        loop {
            step = match step {
                Step::Night => match self.night().await? {
                    Some(next) => next,
                    None => return Ok(()),
                },
                Step::Day => {
                    self.publish(Phase::Speaking);
                    self.ctx.set_postable(true).await;
                    SpeechScheduler::new(&self.ctx, &self.turns_rx).run().await?;
                    if self.ctx.state.lock().await.is_over() {
                        return Ok(());
                    }
                    Step::Vote
                }
                Step::Vote => match self.vote_round().await {
                    Some(next) => next,
                    None => return Ok(()),
                },
            };
        }
    }

    /// Night and dawn; `None` once the game has ended
    async fn night(&self) -> Result<Option<Step>, DomainError> {
        {
            let mut votes = self.votes_rx.lock().await;
            while votes.try_recv().is_ok() {}
        }

        if let Some(max_days) = self.ctx.config.max_days {
            let day = self.ctx.state.lock().await.day();
            if day >= max_days {
                self.ctx.state.lock().await.abandon();
                self.ctx
                    .post(&format!("No winner after {} days. The game ends.", max_days))
                    .await;
                self.restore_room().await;
                self.publish(Phase::GameOver);
                return Ok(None);
            }
        }

        self.publish(Phase::Night);
        let report = NightResolver::new(&self.ctx).run().await?;
        self.publish(Phase::Dawn);
        self.ctx.set_postable(true).await;

        let dead_labels: Vec<String> = {
            let state = self.ctx.state.lock().await;
            report
                .dead
                .iter()
                .map(|id| state.seat(*id).map(|s| s.label()).unwrap_or_else(|| id.to_string()))
                .collect()
        };
        let dawn = if dead_labels.is_empty() {
            format!("Day {} dawns. Nobody died last night.", report.day)
        } else {
            format!("Day {} dawns. Died last night: {}.", report.day, dead_labels.join(", "))
        };
        self.ctx.announce("dawn", &dawn).await;

        if let Some(outcome) = report.game_over {
            self.finish(outcome).await;
            return Ok(None);
        }

        let cascade = DeathCascade::new(&self.ctx)
            .resolve(&report.dead, report.outcome.poison_target)
            .await;
        if let Some(outcome) = cascade.game_over {
            self.finish(outcome).await;
            return Ok(None);
        }
        Ok(Some(Step::Day))
    }

    /// One voting round; `None` once the game has ended
    async fn vote_round(&self) -> Option<Step> {
        self.publish(Phase::Voting);
        tokio::time::sleep(self.ctx.config.pacing.vote_open_delay).await;

        let resolver = VoteResolver::new(&self.ctx);
        let resolution = match resolver.collect_autonomous().await {
            Some(resolution) => resolution,
            None => self.votes_rx.lock().await.recv().await?,
        };
        if !matches!(resolution.outcome, VoteOutcome::Tied { .. }) {
            self.publish(Phase::Dusk);
        }

        match resolver.conclude(&resolution).await {
            VoteConclusion::NextNight => Some(Step::Night),
            VoteConclusion::Revote => Some(Step::Vote),
            VoteConclusion::GameOver(outcome) => {
                self.finish(outcome).await;
                None
            }
        }
    }

    async fn restore_room(&self) {
        self.ctx.set_postable(true).await;
        self.ctx.set_living_muted(false).await;
    }

    /// Reveal every role and reopen the room
    async fn finish(&self, outcome: GameOutcome) {
        info!("Game over: {}", outcome);
        let reveal: Vec<String> = self
            .ctx
            .state
            .lock()
            .await
            .reveal_roles()
            .iter()
            .map(|(seat, role)| format!("{}: {}", seat.label(), role))
            .collect();

        self.restore_room().await;
        self.ctx.announce("game_over", &outcome.to_string()).await;
        self.ctx
            .post(&format!("Roles:\n{}", reveal.join("\n")))
            .await;
        self.publish(Phase::GameOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PromptBackend, RecordingTransport, context};
    use std::time::Duration;
    use werewolf_domain::GameState;

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    fn controller(
        backend: Arc<PromptBackend>,
        transport: Arc<RecordingTransport>,
    ) -> Arc<GameController> {
        let state = Arc::new(Mutex::new(GameState::new()));
        Arc::new(GameController::new(context(backend, transport, state)).with_admins([user("admin")]))
    }

    async fn wait_for(controller: &GameController, phase: Phase) {
        let mut rx = controller.subscribe();
        tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|p| *p == phase))
            .await
            .expect("phase not reached")
            .unwrap();
    }

    #[tokio::test]
    async fn test_bot_game_runs_to_completion() {
        let transport = RecordingTransport::new();
        let controller = controller(PromptBackend::new(), transport.clone());

        controller.join(&user("host"), "Host").await.unwrap();
        controller.add_bots(3).await.unwrap();
        let reply = controller.start(&user("host")).await.unwrap();
        assert_eq!(reply, "Game started with 3 players.");

        wait_for(&controller, Phase::GameOver).await;
        let state = controller.context().state.lock().await;
        assert!(state.outcome().is_some());
        assert!(transport.channel_contains("Roles:"));
        assert!(transport.private_to("host").iter().any(|m| m.starts_with("Roles this game")));
    }

    #[tokio::test]
    async fn test_start_needs_enough_players() {
        let controller = controller(PromptBackend::new(), RecordingTransport::new());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.add_bots(2).await.unwrap();
        assert_eq!(
            controller.start(&user("host")).await.unwrap_err(),
            CommandError::Rule(DomainError::NotEnoughPlayers { have: 2, need: 3 })
        );
    }

    #[tokio::test]
    async fn test_failed_ai_board_trims_table() {
        let controller = controller(PromptBackend::new(), RecordingTransport::new());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.add_bots(7).await.unwrap();
        controller.start(&user("host")).await.unwrap();

        {
            let state = controller.context().state.lock().await;
            assert_eq!(state.living_count(), 6);
            assert_eq!(state.spectators().len(), 1);
        }
        controller.reset(&user("host")).await.unwrap();
    }

    #[tokio::test]
    async fn test_ai_board_used_when_balanced() {
        let backend = PromptBackend::new();
        *backend.role_template.lock().unwrap() = Some(
            r#"["Werewolf", "Werewolf", "Seer", "Witch", "Hunter", "Villager", "Villager"]"#
                .to_string(),
        );
        let controller = controller(backend, RecordingTransport::new());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.add_bots(7).await.unwrap();
        controller.start(&user("host")).await.unwrap();

        {
            let state = controller.context().state.lock().await;
            assert_eq!(state.living_count(), 7);
            assert!(
                state
                    .reveal_roles()
                    .iter()
                    .any(|(_, role)| *role == Role::Hunter)
            );
        }
        controller.reset(&user("host")).await.unwrap();
    }

    #[tokio::test]
    async fn test_roles_briefed_privately() {
        let transport = RecordingTransport::new();
        let controller = controller(PromptBackend::new(), transport.clone());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.join(&user("alice"), "alice").await.unwrap();
        controller.add_bots(2).await.unwrap();
        controller.start(&user("host")).await.unwrap();

        let cards = transport.private_to("alice");
        assert!(cards[0].starts_with("You are seat 1 (alice). Your role:"));
        controller.reset(&user("host")).await.unwrap();
    }

    #[tokio::test]
    async fn test_vote_validation() {
        let controller = controller(PromptBackend::new(), RecordingTransport::new());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.join(&user("alice"), "alice").await.unwrap();
        controller.add_bots(2).await.unwrap();

        // Before the game
        assert_eq!(
            controller.vote(&user("alice"), "2").await.unwrap_err(),
            CommandError::Rule(DomainError::NotAPlayer)
        );
        assert!(matches!(
            controller.vote(&user("alice"), "12345678901").await,
            Err(CommandError::InvalidInput(_))
        ));
        assert!(matches!(
            controller.vote(&user("alice"), "maybe").await,
            Err(CommandError::InvalidInput(_))
        ));

        {
            let mut state = controller.context().state.lock().await;
            state.begin_setup(&user("host")).unwrap();
            state
                .deal_roles(
                    vec![Role::Werewolf, Role::Seer, Role::Villager],
                    &mut rand::rng(),
                )
                .unwrap();
            state.begin_night().unwrap();
            state.begin_voting();
        }

        assert_eq!(
            controller.vote(&user("alice"), "9").await.unwrap_err(),
            CommandError::Rule(DomainError::UnknownPlayer(PlayerId(9)))
        );
        assert_eq!(
            controller.vote(&user("alice"), "2").await.unwrap(),
            "Vote recorded (1/3)."
        );
        assert_eq!(
            controller.vote(&user("alice"), "no").await.unwrap_err(),
            CommandError::Rule(DomainError::AlreadyVoted)
        );
        assert_eq!(
            controller.vote(&user("host"), "2").await.unwrap_err(),
            CommandError::Rule(DomainError::NotAPlayer)
        );
    }

    #[tokio::test]
    async fn test_vote_rejected_while_speaking() {
        let controller = controller(PromptBackend::new(), RecordingTransport::new());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.join(&user("alice"), "alice").await.unwrap();
        controller.add_bots(2).await.unwrap();
        {
            let mut state = controller.context().state.lock().await;
            state.begin_setup(&user("host")).unwrap();
            state
                .deal_roles(vec![Role::Werewolf, Role::Seer, Role::Villager], &mut rand::rng())
                .unwrap();
            state.begin_night().unwrap();
            state.begin_speaking(&mut rand::rng()).unwrap();
        }
        assert!(matches!(
            controller.vote(&user("alice"), "2").await,
            Err(CommandError::Rule(DomainError::WrongPhase { .. }))
        ));
    }

    #[tokio::test]
    async fn test_end_turn_permissions() {
        let controller = controller(PromptBackend::new(), RecordingTransport::new());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.join(&user("alice"), "alice").await.unwrap();
        controller.join(&user("bob"), "bob").await.unwrap();
        controller.add_bots(1).await.unwrap();

        assert!(matches!(
            controller.end_turn(&user("alice")).await,
            Err(CommandError::Rule(DomainError::WrongPhase { .. }))
        ));

        let speaker = {
            let mut state = controller.context().state.lock().await;
            state.begin_setup(&user("host")).unwrap();
            state
                .deal_roles(vec![Role::Werewolf, Role::Seer, Role::Villager], &mut rand::rng())
                .unwrap();
            state.begin_night().unwrap();
            state.begin_speaking(&mut rand::rng()).unwrap();
            state.next_speaker().unwrap()
        };
        let (speaker_user, other_user) = if speaker == PlayerId(1) {
            ("alice", "bob")
        } else {
            ("bob", "alice")
        };

        if speaker != PlayerId(3) {
            assert_eq!(
                controller.end_turn(&user(other_user)).await.unwrap_err(),
                CommandError::NotYourTurn
            );
            controller.end_turn(&user(speaker_user)).await.unwrap();
        }
        controller.end_turn(&user("host")).await.unwrap();
        controller.end_turn(&user("admin")).await.unwrap();
    }

    #[tokio::test]
    async fn test_moderator_commands_need_permission() {
        let controller = controller(PromptBackend::new(), RecordingTransport::new());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.join(&user("alice"), "alice").await.unwrap();

        assert_eq!(
            controller.reset(&user("alice")).await.unwrap_err(),
            CommandError::NotPermitted
        );
        assert_eq!(
            controller.execute(&user("alice"), PlayerId(1)).await.unwrap_err(),
            CommandError::NotPermitted
        );
        assert_eq!(
            controller.force_night(&user("host")).await.unwrap_err(),
            CommandError::NotPermitted
        );
        assert_eq!(
            controller.force_night(&user("admin")).await.unwrap_err(),
            CommandError::Rule(DomainError::GameNotActive)
        );
        assert_eq!(
            controller.set_mode(&user("alice"), GameMode::Offline).await.unwrap_err(),
            CommandError::NotPermitted
        );
        controller.set_mode(&user("host"), GameMode::Offline).await.unwrap();
        controller.reset(&user("host")).await.unwrap();
        assert!(controller.context().state.lock().await.lobby().is_empty());
    }

    #[tokio::test]
    async fn test_execution_can_end_the_game() {
        let transport = RecordingTransport::new();
        let controller = controller(PromptBackend::new(), transport.clone());
        controller.join(&user("host"), "Host").await.unwrap();
        controller.add_bots(3).await.unwrap();
        let wolf = {
            let mut state = controller.context().state.lock().await;
            state.begin_setup(&user("host")).unwrap();
            state
                .deal_roles(vec![Role::Werewolf, Role::Seer, Role::Villager], &mut rand::rng())
                .unwrap();
            state.begin_night().unwrap();
            state
                .living()
                .into_iter()
                .find(|id| state.role_of(*id) == Some(Role::Werewolf))
                .unwrap()
        };

        controller.execute(&user("host"), wolf).await.unwrap();
        assert_eq!(*controller.subscribe().borrow(), Phase::GameOver);
        assert!(transport.channel_contains("Winner: the village"));
    }
}
