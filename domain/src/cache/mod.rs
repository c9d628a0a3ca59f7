//! Response caches for the AI gateway
//!
//! Two result kinds are cached:
//!
//! - **Role templates**, keyed by player count and the sorted allowed role
//!   names. These persist across restarts as [`RoleTemplateRecord`]s.
//! - **Narratives**, keyed by event type, context and language. Process-local.

pub mod recency;

use crate::role::Role;
use serde::{Deserialize, Serialize};

pub use recency::{DEFAULT_CACHE_CAPACITY, RecencyCache};

/// Cache key for generated role lists
///
/// `existing_roles` is always sorted so the key does not depend on the order
/// the caller listed the allowed roles in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleTemplateKey {
    pub player_count: usize,
    pub existing_roles: Vec<String>,
}

impl RoleTemplateKey {
    pub fn new(player_count: usize, allowed: &[Role]) -> Self {
        Self {
            player_count,
            existing_roles: Role::sorted_names(allowed),
        }
    }
}

/// Cache key for narration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NarrativeKey {
    pub event_type: String,
    pub context: String,
    pub language: String,
}

impl NarrativeKey {
    pub fn new(event_type: &str, context: &str, language: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            context: context.to_string(),
            language: language.to_string(),
        }
    }
}

/// One persisted role-template entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTemplateRecord {
    pub player_count: usize,
    pub existing_roles: Vec<String>,
    pub roles: Vec<String>,
}

impl RoleTemplateRecord {
    pub fn new(key: &RoleTemplateKey, roles: &[Role]) -> Self {
        Self {
            player_count: key.player_count,
            existing_roles: key.existing_roles.clone(),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }

    /// Split into a cache entry; `None` if a role name is unknown.
    ///
    /// The key is re-sorted in case the file was edited by hand.
    pub fn into_entry(self) -> Option<(RoleTemplateKey, Vec<Role>)> {
        let roles = self
            .roles
            .iter()
            .map(|name| name.parse::<Role>().ok())
            .collect::<Option<Vec<_>>>()?;
        let mut existing_roles = self.existing_roles;
        existing_roles.sort();
        Some((
            RoleTemplateKey {
                player_count: self.player_count,
                existing_roles,
            },
            roles,
        ))
    }
}
