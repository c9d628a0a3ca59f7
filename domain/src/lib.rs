//! Domain layer for werewolf
//!
//! This crate contains the game rules, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns and
//! never awaits.
//!
//! # Core Concepts
//!
//! ## Roles and factions
//!
//! Every seated participant holds one [`Role`]; every role belongs to one
//! [`Faction`]. Faction head-counts decide the winner ([`GameOutcome`]).
//!
//! ## Game state
//!
//! [`GameState`] is the per-room record. Each rule check lives in the method
//! that mutates, so callers only need to hold the room lock for the call.
//!
//! ## Decisions
//!
//! Participants answer with a [`Decision`]: a seat number or an abstain.
//! Replies from the AI backend are decoded with [`parse_action_decision`].

pub mod cache;
pub mod core;
pub mod decision;
pub mod game;
pub mod participant;
pub mod prompt;
pub mod role;

pub use cache::{
    DEFAULT_CACHE_CAPACITY, NarrativeKey, RecencyCache, RoleTemplateKey, RoleTemplateRecord,
};
pub use core::error::DomainError;
pub use decision::{
    ABSTAIN_TOKEN, Decision, parse_action_decision, parse_role_template, parse_yes_no,
};
pub use game::{
    BallotReceipt, GameMode, GameOutcome, GameSnapshot, GameState, MAX_PLAYERS, MIN_PLAYERS,
    NightOutcome, Phase, SeerReading, TableLimits, VoteOutcome, WinReason, Winner, WitchPotions,
    tally_wolf_votes,
};
pub use participant::{Participant, ParticipantKind, PlayerId, Seat, UserId};
pub use prompt::{PromptTemplate, RoleStrategy};
pub use role::{
    BASIC_BOARD_LIMIT, Faction, FactionCounts, GameTemplate, Role, TemplateCatalog,
};
