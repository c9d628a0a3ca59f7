//! Decoding of free-form AI responses into structured decisions.
//!
//! Pure text handling, no I/O. Every function degrades to a neutral value
//! (abstain, `None`) instead of failing.
//!
//! | Function | Input | Output |
//! |----------|-------|--------|
//! | [`parse_action_decision`] | `"I pick 5."` | `Decision::Target(5)` |
//! | [`parse_role_template`] | `` ```json ["Seer", ...]``` `` | `Some(vec![Role::Seer, ...])` |
//! | [`parse_yes_no`] | `"Yes"` | `Some(true)` |

use super::Decision;
use crate::participant::PlayerId;
use crate::role::Role;

/// Word meaning "no action" / "no vote"
pub const ABSTAIN_TOKEN: &str = "no";

/// Decode an action decision from an AI response.
///
/// Rules, in order:
/// 1. any word equal to `no` (case-insensitive) → abstain
/// 2. the first run of ASCII digits → that seat
/// 3. anything else → abstain
///
/// The seat is not checked against the valid targets here.
///
/// ```
/// use werewolf_domain::decision::{Decision, parse_action_decision};
/// use werewolf_domain::PlayerId;
///
/// assert_eq!(parse_action_decision("Target: 5."), Decision::Target(PlayerId(5)));
/// assert_eq!(parse_action_decision("No."), Decision::Abstain);
/// assert_eq!(parse_action_decision("hmm"), Decision::Abstain);
/// ```
pub fn parse_action_decision(response: &str) -> Decision {
    let clean = response.trim().to_lowercase().replace('.', "");

    let abstains = clean
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == ABSTAIN_TOKEN);
    if abstains {
        return Decision::Abstain;
    }

    let digits: String = clean
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits
        .parse::<u32>()
        .map(|n| Decision::Target(PlayerId(n)))
        .unwrap_or(Decision::Abstain)
}

/// Decode a generated role list.
///
/// Strips markdown code fences, takes the first `[...]` span and parses it as
/// a JSON array of role names. The list is accepted only when it has exactly
/// `player_count` entries and every entry is one of `allowed`.
pub fn parse_role_template(response: &str, player_count: usize, allowed: &[Role]) -> Option<Vec<Role>> {
    let clean = response.replace("```json", "").replace("```", "");
    let start = clean.find('[')?;
    let end = start + clean[start..].find(']')?;
    let names: Vec<String> = serde_json::from_str(&clean[start..=end]).ok()?;

    if names.len() != player_count {
        return None;
    }

    names
        .iter()
        .map(|name| {
            name.parse::<Role>()
                .ok()
                .filter(|role| allowed.contains(role))
        })
        .collect()
}

/// Decode a yes/no confirmation (`yes`, `y`, `no`, `n`)
pub fn parse_yes_no(reply: &str) -> Option<bool> {
    match reply.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}
