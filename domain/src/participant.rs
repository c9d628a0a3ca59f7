//! Participants: human relays and autonomous agents

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat number of a participant in a running game (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a human on the chat transport
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a participant makes decisions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantKind {
    /// A human reached through private messages on the transport
    Human { user_id: UserId },
    /// An AI player driven by the gateway
    Autonomous,
}

/// Someone sitting at the table
///
/// Identity is the `key`: the transport user id for humans and the
/// generated name for autonomous agents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub kind: ParticipantKind,
}

impl Participant {
    pub fn human(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParticipantKind::Human {
                user_id: UserId::new(user_id),
            },
        }
    }

    pub fn autonomous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParticipantKind::Autonomous,
        }
    }

    pub fn is_autonomous(&self) -> bool {
        matches!(self.kind, ParticipantKind::Autonomous)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match &self.kind {
            ParticipantKind::Human { user_id } => Some(user_id),
            ParticipantKind::Autonomous => None,
        }
    }

    /// Whether this participant is the given transport user
    pub fn is_user(&self, user: &UserId) -> bool {
        self.user_id() == Some(user)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A participant together with their seat, as handed to decision requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: PlayerId,
    pub participant: Participant,
}

impl Seat {
    pub fn new(id: PlayerId, participant: Participant) -> Self {
        Self { id, participant }
    }

    /// `"3. Alice"` style label
    pub fn label(&self) -> String {
        format!("{}. {}", self.id, self.participant.name)
    }
}
