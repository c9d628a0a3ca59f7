//! Decisions returned by participants
//!
//! A decision is either a seat number or an explicit abstain. Malformed,
//! illegal and timed-out decisions are all coerced to [`Decision::Abstain`]
//! before they reach a resolver.

pub mod parsing;

use crate::participant::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use parsing::{ABSTAIN_TOKEN, parse_action_decision, parse_role_template, parse_yes_no};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Target(PlayerId),
    Abstain,
}

impl Decision {
    pub fn target(&self) -> Option<PlayerId> {
        match self {
            Decision::Target(id) => Some(*id),
            Decision::Abstain => None,
        }
    }

    pub fn is_abstain(&self) -> bool {
        matches!(self, Decision::Abstain)
    }

    /// Keep the target only if `is_valid` accepts it
    pub fn restrict(self, is_valid: impl FnOnce(PlayerId) -> bool) -> Self {
        match self {
            Decision::Target(id) if is_valid(id) => self,
            _ => Decision::Abstain,
        }
    }

    /// Parse a human reply that already passed the input validator
    pub fn from_reply(reply: &str) -> Self {
        let trimmed = reply.trim();
        if trimmed.eq_ignore_ascii_case(ABSTAIN_TOKEN) {
            return Decision::Abstain;
        }
        trimmed
            .parse::<u32>()
            .map(|n| Decision::Target(PlayerId(n)))
            .unwrap_or(Decision::Abstain)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Target(id) => write!(f, "{}", id),
            Decision::Abstain => write!(f, "{}", ABSTAIN_TOKEN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restrict() {
        let d = Decision::Target(PlayerId(4));
        assert_eq!(d.restrict(|id| id.0 < 5), d);
        assert_eq!(d.restrict(|id| id.0 > 5), Decision::Abstain);
        assert_eq!(Decision::Abstain.restrict(|_| true), Decision::Abstain);
    }

    #[test]
    fn test_from_reply() {
        assert_eq!(Decision::from_reply(" 7 "), Decision::Target(PlayerId(7)));
        assert_eq!(Decision::from_reply("NO"), Decision::Abstain);
        assert_eq!(Decision::from_reply("seven"), Decision::Abstain);
    }
}
