//! Room id → game state

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use werewolf_domain::{GameState, TableLimits};

/// A room's state, shared by its controller and command handlers
pub type SharedGame = Arc<Mutex<GameState>>;

/// Lazily creates one [`GameState`] per room
///
/// The registry lock is only held to look up or insert; each room has its
/// own lock for everything else.
pub struct SessionRegistry {
    limits: TableLimits,
    sessions: Mutex<HashMap<String, SharedGame>>,
}

impl SessionRegistry {
    pub fn new(limits: TableLimits) -> Self {
        Self {
            limits,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The room's state, created on first reference
    pub async fn session(&self, room: &str) -> SharedGame {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(
            sessions
                .entry(room.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(GameState::with_limits(self.limits)))),
        )
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(TableLimits::default())
    }
}
