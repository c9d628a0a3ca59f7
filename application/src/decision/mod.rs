//! Participant decisions
//!
//! [`DecisionProvider`] gives the resolvers one interface over both kinds
//! of participant:
//!
//! | Participant | Decision source | Time limit |
//! |-------------|-----------------|------------|
//! | Human | private prompt on the transport | action / last-words timeout |
//! | Autonomous | [`AiGateway`](crate::gateway::AiGateway) | bounded by the retry policy |

pub mod provider;

pub use provider::DecisionProvider;

use werewolf_domain::{PlayerId, Role};

/// What a participant is being asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    WolfKill,
    Protect,
    Inspect,
    Poison,
    Shoot,
    Vote,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::WolfKill => "wolf_kill",
            ActionKind::Protect => "protect",
            ActionKind::Inspect => "inspect",
            ActionKind::Poison => "poison",
            ActionKind::Shoot => "shoot",
            ActionKind::Vote => "vote",
        }
    }

    /// What the participant should do, in one sentence
    pub fn instruction(&self) -> &'static str {
        match self {
            ActionKind::WolfKill => "Choose a player for the wolves to kill tonight.",
            ActionKind::Protect => "Choose a player to protect tonight.",
            ActionKind::Inspect => "Choose a player whose identity you want to check.",
            ActionKind::Poison => "Choose a player to poison, or decline to use the poison.",
            ActionKind::Shoot => "You are dying. Choose a player to take down with you.",
            ActionKind::Vote => "Vote for the player to eliminate today.",
        }
    }
}

/// One solicitation, built from a snapshot taken under the room lock
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub role: Role,
    /// Public situation summary
    pub situation: String,
    pub valid_targets: Vec<PlayerId>,
    /// Today's discussion, oldest line first
    pub transcript: Vec<String>,
}

impl ActionRequest {
    pub fn new(kind: ActionKind, role: Role, situation: impl Into<String>) -> Self {
        Self {
            kind,
            role,
            situation: situation.into(),
            valid_targets: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: Vec<PlayerId>) -> Self {
        self.valid_targets = targets;
        self
    }

    pub fn with_transcript(mut self, transcript: Vec<String>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn allows(&self, id: PlayerId) -> bool {
        self.valid_targets.contains(&id)
    }

    /// Situation plus instruction (and discussion, if any) for the AI
    pub fn ai_context(&self) -> String {
        let mut context = format!("{} {}", self.situation, self.kind.instruction());
        if !self.transcript.is_empty() {
            context.push_str("\nToday's discussion:\n");
            context.push_str(&self.transcript.join("\n"));
        }
        context
    }

    /// Private prompt shown to a human
    pub fn human_prompt(&self) -> String {
        let targets: Vec<String> = self.valid_targets.iter().map(|id| id.to_string()).collect();
        format!(
            "[{}] {}\nOptions: {}\nReply with a seat number, or 'no' to pass.",
            self.role,
            self.kind.instruction(),
            targets.join(", ")
        )
    }
}
