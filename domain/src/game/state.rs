//! Per-room game record
//!
//! [`GameState`] is a plain value: it performs no I/O and never awaits. The
//! application layer keeps one per room behind an async mutex and only
//! touches it in short critical sections. Every rule check happens inside
//! the method that mutates, so a caller holding the lock cannot observe a
//! half-applied transition.

use super::night::NightOutcome;
use super::outcome::GameOutcome;
use super::phase::{GameMode, Phase};
use super::speech::{SpeakingQueue, Transcript};
use super::vote::{VoteOutcome, VoteTally};
use crate::core::error::DomainError;
use crate::decision::Decision;
use crate::participant::{Participant, PlayerId, Seat, UserId};
use crate::role::{FactionCounts, Role};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};

/// Fewest players a game can start with
pub const MIN_PLAYERS: usize = 3;
/// Most players a table can seat
pub const MAX_PLAYERS: usize = 20;

/// Table size bounds enforced by `join` and `begin_setup`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLimits {
    pub min_players: usize,
    pub max_players: usize,
}

impl Default for TableLimits {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
        }
    }
}

/// The Witch's single-use inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WitchPotions {
    pub antidote: bool,
    pub poison: bool,
}

impl Default for WitchPotions {
    fn default() -> Self {
        Self {
            antidote: true,
            poison: true,
        }
    }
}

/// Ballot accepted; `complete` is set once every living player has voted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallotReceipt {
    pub ballots_cast: usize,
    pub living: usize,
    pub complete: bool,
}

/// Immutable copy of what decision makers need, taken before the lock is
/// released
#[derive(Debug, Clone, Default)]
pub struct GameSnapshot {
    pub day: u32,
    pub living: Vec<Seat>,
    pub roles: BTreeMap<PlayerId, Role>,
    pub transcript: Vec<String>,
    pub last_dead: Vec<PlayerId>,
}

impl GameSnapshot {
    pub fn living_ids(&self) -> Vec<PlayerId> {
        self.living.iter().map(|s| s.id).collect()
    }

    pub fn role_of(&self, id: PlayerId) -> Option<Role> {
        self.roles.get(&id).copied()
    }

    /// Living seats whose role satisfies `pred`
    pub fn seats_where(&self, pred: impl Fn(Role) -> bool) -> Vec<Seat> {
        self.living
            .iter()
            .filter(|s| self.role_of(s.id).is_some_and(&pred))
            .cloned()
            .collect()
    }

    /// Public situation summary used in AI prompts
    pub fn situation(&self) -> String {
        let living: Vec<String> = self.living.iter().map(Seat::label).collect();
        let mut text = format!("Day {}. Living players: {}.", self.day, living.join(", "));
        if self.last_dead.is_empty() {
            text.push_str(" Nobody died last night.");
        } else {
            let dead: Vec<String> = self.last_dead.iter().map(|id| id.to_string()).collect();
            text.push_str(&format!(" Died most recently: {}.", dead.join(", ")));
        }
        text
    }
}

/// Everything known about one room
#[derive(Debug, Clone, Default)]
pub struct GameState {
    limits: TableLimits,
    phase: Phase,
    mode: GameMode,
    creator: Option<UserId>,
    lobby: Vec<Participant>,
    spectators: Vec<Participant>,
    bots_added: u32,

    seats: BTreeMap<PlayerId, Participant>,
    living: BTreeSet<PlayerId>,
    roles: BTreeMap<PlayerId, Role>,
    potions: WitchPotions,
    last_guard_target: Option<PlayerId>,
    votes: VoteTally,
    speaking: SpeakingQueue,
    transcript: Transcript,
    day: u32,
    last_dead: Vec<PlayerId>,
    outcome: Option<GameOutcome>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: TableLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    // ==================== Queries ====================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn creator(&self) -> Option<&UserId> {
        self.creator.as_ref()
    }

    pub fn is_creator(&self, user: &UserId) -> bool {
        self.creator.as_ref() == Some(user)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn lobby(&self) -> &[Participant] {
        &self.lobby
    }

    pub fn spectators(&self) -> &[Participant] {
        &self.spectators
    }

    pub fn potions(&self) -> WitchPotions {
        self.potions
    }

    pub fn last_guard_target(&self) -> Option<PlayerId> {
        self.last_guard_target
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn last_dead(&self) -> &[PlayerId] {
        &self.last_dead
    }

    pub fn seat(&self, id: PlayerId) -> Option<Seat> {
        self.seats.get(&id).map(|p| Seat::new(id, p.clone()))
    }

    pub fn role_of(&self, id: PlayerId) -> Option<Role> {
        self.roles.get(&id).copied()
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.living.contains(&id)
    }

    pub fn living(&self) -> Vec<PlayerId> {
        self.living.iter().copied().collect()
    }

    pub fn living_count(&self) -> usize {
        self.living.len()
    }

    pub fn living_seats(&self) -> Vec<Seat> {
        self.living.iter().filter_map(|id| self.seat(*id)).collect()
    }

    /// Seat of a human transport user, if they are seated
    pub fn seat_of_user(&self, user: &UserId) -> Option<PlayerId> {
        self.seats
            .iter()
            .find(|(_, p)| p.is_user(user))
            .map(|(id, _)| *id)
    }

    pub fn faction_counts(&self) -> FactionCounts {
        FactionCounts::from_roles(self.living.iter().filter_map(|id| self.roles.get(id)))
    }

    pub fn current_speaker(&self) -> Option<PlayerId> {
        self.speaking.current()
    }

    pub fn is_speaking_active(&self) -> bool {
        self.speaking.is_active()
    }

    pub fn ballots_cast(&self) -> usize {
        self.votes.ballots_cast()
    }

    pub fn has_voted(&self, id: PlayerId) -> bool {
        self.votes.has_voted(id)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            day: self.day,
            living: self.living_seats(),
            roles: self.roles.clone(),
            transcript: self.transcript.snapshot(),
            last_dead: self.last_dead.clone(),
        }
    }

    // ==================== Lobby ====================

    fn ensure_lobby(&self) -> Result<(), DomainError> {
        match self.phase {
            Phase::Lobby => Ok(()),
            Phase::GameOver => Err(DomainError::GameOver),
            _ => Err(DomainError::GameInProgress),
        }
    }

    fn is_in_lobby(&self, user: &UserId) -> bool {
        self.lobby.iter().any(|p| p.is_user(user))
    }

    /// Register the first user to touch an empty room as its creator
    pub fn claim_creator(&mut self, user: &UserId) {
        if self.creator.is_none() {
            self.creator = Some(user.clone());
        }
    }

    /// Add a human to the table; a spectator who joins becomes a player.
    ///
    /// Returns the new number of players.
    pub fn join(&mut self, user: &UserId, name: &str) -> Result<usize, DomainError> {
        self.ensure_lobby()?;
        if self.is_in_lobby(user) {
            return Err(DomainError::AlreadyJoined);
        }
        if self.lobby.len() >= self.limits.max_players {
            return Err(DomainError::TableFull {
                max: self.limits.max_players,
            });
        }

        self.claim_creator(user);
        self.spectators.retain(|p| !p.is_user(user));
        self.lobby.push(Participant::human(user.as_str(), name));
        Ok(self.lobby.len())
    }

    /// Seat `count` autonomous players named `AI-<n>`.
    ///
    /// Stops at the table limit; fails only if no bot could be seated.
    pub fn add_bots(&mut self, count: usize) -> Result<Vec<String>, DomainError> {
        self.ensure_lobby()?;
        let free = self.limits.max_players.saturating_sub(self.lobby.len());
        if free == 0 && count > 0 {
            return Err(DomainError::TableFull {
                max: self.limits.max_players,
            });
        }

        let mut names = Vec::new();
        for _ in 0..count.min(free) {
            self.bots_added += 1;
            let name = format!("AI-{}", self.bots_added);
            self.lobby.push(Participant::autonomous(name.clone()));
            names.push(name);
        }
        Ok(names)
    }

    /// Leave the table (if seated) and watch instead
    pub fn spectate(&mut self, user: &UserId, name: &str) -> Result<(), DomainError> {
        self.ensure_lobby()?;
        self.claim_creator(user);
        self.lobby.retain(|p| !p.is_user(user));
        if !self.spectators.iter().any(|p| p.is_user(user)) {
            self.spectators.push(Participant::human(user.as_str(), name));
        }
        Ok(())
    }

    pub fn set_mode(&mut self, mode: GameMode) -> Result<(), DomainError> {
        self.ensure_lobby()?;
        self.mode = mode;
        Ok(())
    }

    // ==================== Setup ====================

    /// Lock the lobby for role dealing.
    ///
    /// The starter stops playing and becomes a spectator. Returns the
    /// number of players to deal roles for.
    pub fn begin_setup(&mut self, starter: &UserId) -> Result<usize, DomainError> {
        self.ensure_lobby()?;

        let remaining = self.lobby.iter().filter(|p| !p.is_user(starter)).count();
        if remaining < self.limits.min_players {
            return Err(DomainError::NotEnoughPlayers {
                have: remaining,
                need: self.limits.min_players,
            });
        }

        self.claim_creator(starter);
        if let Some(pos) = self.lobby.iter().position(|p| p.is_user(starter)) {
            let starter = self.lobby.remove(pos);
            self.spectators.push(starter);
        }
        self.phase = Phase::Setup;
        Ok(self.lobby.len())
    }

    /// Cut the table down to `keep` players chosen at random; the rest
    /// become spectators (autonomous players are simply dropped).
    pub fn trim_table<R: Rng + ?Sized>(&mut self, keep: usize, rng: &mut R) -> Vec<Participant> {
        if self.lobby.len() <= keep {
            return Vec::new();
        }
        self.lobby.shuffle(rng);
        let trimmed = self.lobby.split_off(keep);
        for p in &trimmed {
            if !p.is_autonomous() {
                self.spectators.push(p.clone());
            }
        }
        trimmed
    }

    /// Shuffle `pool` and deal it in seat order (seats follow join order).
    pub fn deal_roles<R: Rng + ?Sized>(
        &mut self,
        mut pool: Vec<Role>,
        rng: &mut R,
    ) -> Result<Vec<(Seat, Role)>, DomainError> {
        if self.phase != Phase::Setup {
            return Err(DomainError::WrongPhase {
                expected: Phase::Setup,
                actual: self.phase,
            });
        }
        if pool.len() != self.lobby.len() {
            return Err(DomainError::InvalidRolePool(format!(
                "{} roles for {} players",
                pool.len(),
                self.lobby.len()
            )));
        }
        if !pool.iter().any(Role::is_wolf) {
            return Err(DomainError::InvalidRolePool("no wolf in the pool".to_string()));
        }

        pool.shuffle(rng);

        let mut dealt = Vec::with_capacity(pool.len());
        for (index, (participant, role)) in self.lobby.iter().zip(pool).enumerate() {
            let id = PlayerId(index as u32 + 1);
            self.seats.insert(id, participant.clone());
            self.living.insert(id);
            self.roles.insert(id, role);
            dealt.push((Seat::new(id, participant.clone()), role));
        }
        Ok(dealt)
    }

    /// Return to the lobby after a failed setup
    pub fn abort_setup(&mut self) {
        if self.phase == Phase::Setup {
            self.seats.clear();
            self.living.clear();
            self.roles.clear();
            self.phase = Phase::Lobby;
        }
    }

    // ==================== Night ====================

    /// Enter the next night; returns the new day number
    pub fn begin_night(&mut self) -> Result<u32, DomainError> {
        self.ensure_running()?;
        self.day += 1;
        self.phase = Phase::Night;
        self.speaking.clear();
        self.votes.clear();
        Ok(self.day)
    }

    /// Whether the Guard may protect `target` tonight
    pub fn guard_allowed(&self, target: PlayerId) -> bool {
        self.last_guard_target != Some(target) && self.is_alive(target)
    }

    /// Remember tonight's protection; an abstaining guard clears it
    pub fn record_guard(&mut self, target: Option<PlayerId>) {
        self.last_guard_target = target;
    }

    /// Check-and-clear the antidote
    pub fn take_antidote(&mut self) -> bool {
        std::mem::replace(&mut self.potions.antidote, false)
    }

    /// Check-and-clear the poison
    pub fn take_poison(&mut self) -> bool {
        std::mem::replace(&mut self.potions.poison, false)
    }

    /// Apply a resolved night: remove casualties, remember them for the day
    /// and move to dawn. Returns who died.
    pub fn apply_night(&mut self, night: &NightOutcome) -> Vec<PlayerId> {
        let dead: Vec<PlayerId> = night
            .casualties()
            .into_iter()
            .filter(|id| self.eliminate(*id))
            .collect();
        self.last_dead = dead.clone();
        if !self.is_over() {
            self.phase = Phase::Dawn;
        }
        dead
    }

    // ==================== Deaths ====================

    /// Remove a living player; `false` if they were not alive
    pub fn eliminate(&mut self, id: PlayerId) -> bool {
        if !self.living.remove(&id) {
            return false;
        }
        self.speaking.remove(id);
        true
    }

    /// Check the win condition; returns the outcome only on the transition
    /// into game over.
    pub fn evaluate_game_over(&mut self) -> Option<GameOutcome> {
        if self.is_over() || !self.phase.is_in_game() || self.roles.is_empty() {
            return None;
        }
        let outcome = GameOutcome::evaluate(self.faction_counts())?;
        self.outcome = Some(outcome);
        self.phase = Phase::GameOver;
        self.speaking.clear();
        self.votes.clear();
        Some(outcome)
    }

    /// Every seat with its role, for the end-of-game reveal
    pub fn reveal_roles(&self) -> Vec<(Seat, Role)> {
        self.seats
            .iter()
            .filter_map(|(id, p)| {
                self.roles
                    .get(id)
                    .map(|role| (Seat::new(*id, p.clone()), *role))
            })
            .collect()
    }

    // ==================== Day ====================

    fn ensure_running(&self) -> Result<(), DomainError> {
        match self.phase {
            Phase::GameOver => Err(DomainError::GameOver),
            Phase::Lobby => Err(DomainError::GameNotActive),
            _ => Ok(()),
        }
    }

    /// Open the speaking phase with a shuffled queue of living players.
    ///
    /// Clears yesterday's transcript. Returns the order.
    pub fn begin_speaking<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<PlayerId>, DomainError> {
        self.ensure_running()?;
        let mut order = self.living();
        order.shuffle(rng);
        self.phase = Phase::Speaking;
        self.transcript.clear();
        self.votes.clear();
        self.speaking.begin(order.clone());
        Ok(order)
    }

    /// Hand the floor to the next speaker; `None` ends the speaking phase
    /// and opens voting.
    pub fn next_speaker(&mut self) -> Option<PlayerId> {
        if self.is_over() {
            return None;
        }
        let next = self.speaking.advance();
        if next.is_none() {
            self.begin_voting();
        }
        next
    }

    /// Open a fresh voting round
    pub fn begin_voting(&mut self) {
        if self.is_over() {
            return;
        }
        self.speaking.clear();
        self.votes.clear();
        self.phase = Phase::Voting;
    }

    /// Append a chat line if the author may talk right now.
    ///
    /// During the speaking phase only the current speaker is heard; outside
    /// it any living player is.
    pub fn record_chat(&mut self, user: &UserId, text: &str) -> bool {
        if !self.phase.is_in_game() {
            return false;
        }
        let Some(id) = self.seat_of_user(user) else {
            return false;
        };
        if !self.is_alive(id) {
            return false;
        }
        if self.speaking.is_active() && self.speaking.current() != Some(id) {
            return false;
        }
        let name = self.seats.get(&id).map(|p| p.name.clone()).unwrap_or_default();
        self.transcript.push(&name, text);
        true
    }

    /// Append a line spoken by a seated player (autonomous remarks)
    pub fn record_remark(&mut self, id: PlayerId, text: &str) {
        if let Some(p) = self.seats.get(&id) {
            let name = p.name.clone();
            self.transcript.push(&name, text);
        }
    }

    pub fn record_system(&mut self, text: &str) {
        self.transcript.push_system(text);
    }

    // ==================== Voting ====================

    /// Validate and record one ballot
    pub fn cast_ballot(
        &mut self,
        voter: PlayerId,
        ballot: Decision,
    ) -> Result<BallotReceipt, DomainError> {
        if self.is_over() {
            return Err(DomainError::GameOver);
        }
        if self.phase != Phase::Voting {
            return Err(DomainError::WrongPhase {
                expected: Phase::Voting,
                actual: self.phase,
            });
        }
        if !self.is_alive(voter) {
            return Err(DomainError::NotAPlayer);
        }
        if self.votes.has_voted(voter) {
            return Err(DomainError::AlreadyVoted);
        }
        if let Decision::Target(target) = ballot {
            if !self.seats.contains_key(&target) {
                return Err(DomainError::UnknownPlayer(target));
            }
            if !self.is_alive(target) {
                return Err(DomainError::PlayerNotAlive(target));
            }
        }

        self.votes.cast(voter, ballot);
        let ballots_cast = self.votes.ballots_cast();
        let living = self.living.len();
        Ok(BallotReceipt {
            ballots_cast,
            living,
            complete: ballots_cast >= living,
        })
    }

    /// Close the round: compute the outcome and discard the ballots.
    ///
    /// An elimination removes the target immediately. A tie is written to
    /// the transcript and leaves the phase in voting for a fresh round; any
    /// other outcome settles the day and moves to dusk, where no further
    /// ballots are accepted.
    pub fn resolve_votes(&mut self) -> VoteOutcome {
        let outcome = self.votes.outcome();
        self.votes.clear();

        match &outcome {
            VoteOutcome::Eliminated { target, .. } => {
                self.eliminate(*target);
                self.last_dead = vec![*target];
                self.phase = Phase::Dusk;
            }
            VoteOutcome::Tied { candidates, votes } => {
                let names: Vec<String> = candidates.iter().map(|id| id.to_string()).collect();
                self.transcript.push_system(&format!(
                    "The vote tied between players {} with {} votes each. Vote again.",
                    names.join(", "),
                    votes
                ));
            }
            VoteOutcome::NoElimination => self.phase = Phase::Dusk,
        }
        outcome
    }

    // ==================== Moderator ====================

    /// Moderator kill outside the normal flow
    pub fn execute(&mut self, id: PlayerId) -> Result<(), DomainError> {
        self.ensure_running()?;
        if !self.seats.contains_key(&id) {
            return Err(DomainError::UnknownPlayer(id));
        }
        if !self.eliminate(id) {
            return Err(DomainError::PlayerNotAlive(id));
        }
        self.last_dead = vec![id];
        Ok(())
    }

    /// Stop a running game without a winner
    pub fn abandon(&mut self) {
        if !self.phase.is_in_game() || self.is_over() {
            return;
        }
        self.phase = Phase::GameOver;
        self.speaking.clear();
        self.votes.clear();
    }

    /// Clear the room; limits survive
    pub fn reset(&mut self) {
        *self = Self::with_limits(self.limits);
    }
}
