//! Mock ports shared by the use case tests

use crate::config::{GameConfig, PacingConfig, RateLimitConfig};
use crate::gateway::{AiGateway, RateLimiter};
use crate::ports::ai_backend::{AiBackend, BackendError};
use crate::ports::transport::{InputValidator, Transport, TransportError};
use crate::session::registry::SharedGame;
use crate::use_cases::context::GameContext;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use werewolf_domain::{GameState, PlayerId, Role, UserId};

const TARGET_MARKER: &str = "Players you may choose (seat numbers): ";

/// Backend that reads the prompt to answer like a cooperative player.
///
/// Queued `actions` answer action prompts first; after that the first
/// offered seat is chosen. Narration is empty so tests see system messages
/// verbatim.
#[derive(Default)]
pub struct PromptBackend {
    pub actions: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub role_template: Mutex<Option<String>>,
}

impl PromptBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_actions(&self, answers: &[&str]) {
        self.actions
            .lock()
            .unwrap()
            .extend(answers.iter().map(|a| a.to_string()));
    }

    pub fn prompt_count(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

#[async_trait]
impl AiBackend for PromptBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(start) = prompt.find(TARGET_MARKER) {
            if let Some(answer) = self.actions.lock().unwrap().pop_front() {
                return Ok(answer);
            }
            let rest = &prompt[start + TARGET_MARKER.len()..];
            let first: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            return Ok(if first.is_empty() { "no".into() } else { first });
        }
        if prompt.starts_with("Design a balanced") {
            return self
                .role_template
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| BackendError::RequestFailed("no template".into()));
        }
        if prompt.contains("just been eliminated") {
            return Ok("Farewell.".into());
        }
        if prompt.contains("It is your turn to speak") {
            return Ok("I have nothing to hide.".into());
        }
        Ok(String::new())
    }

    fn name(&self) -> &str {
        "prompt"
    }
}

/// Transport that records everything and answers private prompts from a
/// per-user script
#[derive(Default)]
pub struct RecordingTransport {
    pub channel: Mutex<Vec<String>>,
    pub private: Mutex<Vec<(UserId, String)>>,
    pub replies: Mutex<HashMap<UserId, VecDeque<String>>>,
    pub muted: Mutex<HashMap<UserId, bool>>,
    pub postable: Mutex<Vec<bool>>,
    pub deny_permissions: bool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, user: &str, replies: &[&str]) {
        self.replies
            .lock()
            .unwrap()
            .entry(UserId::new(user))
            .or_default()
            .extend(replies.iter().map(|r| r.to_string()));
    }

    pub fn channel_contains(&self, needle: &str) -> bool {
        self.channel.lock().unwrap().iter().any(|m| m.contains(needle))
    }

    pub fn private_to(&self, user: &str) -> Vec<String> {
        self.private
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u.as_str() == user)
            .map(|(_, t)| t.clone())
            .collect()
    }

    fn next_reply(&self, user: &UserId) -> Option<String> {
        self.replies
            .lock()
            .unwrap()
            .get_mut(user)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, text: &str) -> Result<(), TransportError> {
        self.channel.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_private(&self, user: &UserId, text: &str) -> Result<(), TransportError> {
        self.private
            .lock()
            .unwrap()
            .push((user.clone(), text.to_string()));
        Ok(())
    }

    async fn request_private_input(
        &self,
        user: &UserId,
        prompt: &str,
        validator: InputValidator<'_>,
        _timeout: Duration,
    ) -> Result<String, TransportError> {
        self.private
            .lock()
            .unwrap()
            .push((user.clone(), prompt.to_string()));
        while let Some(reply) = self.next_reply(user) {
            if validator(&reply) {
                return Ok(reply);
            }
        }
        Err(TransportError::Timeout)
    }

    async fn await_channel_message(
        &self,
        user: &UserId,
        _timeout: Duration,
    ) -> Result<String, TransportError> {
        self.next_reply(user).ok_or(TransportError::Timeout)
    }

    async fn set_user_muted(&self, user: &UserId, muted: bool) -> Result<(), TransportError> {
        if self.deny_permissions {
            return Err(TransportError::PermissionDenied("mute".into()));
        }
        self.muted.lock().unwrap().insert(user.clone(), muted);
        Ok(())
    }

    async fn set_channel_postable(&self, postable: bool) -> Result<(), TransportError> {
        if self.deny_permissions {
            return Err(TransportError::PermissionDenied("channel".into()));
        }
        self.postable.lock().unwrap().push(postable);
        Ok(())
    }
}

pub fn fast_config() -> GameConfig {
    GameConfig::default()
        .with_pacing(PacingConfig::instant())
        .with_speech_timeout(Duration::from_millis(200))
}

pub fn context(
    backend: Arc<PromptBackend>,
    transport: Arc<RecordingTransport>,
    state: SharedGame,
) -> GameContext {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        rate: 1000.0,
        capacity: 1000.0,
    }));
    let gateway = Arc::new(AiGateway::new(backend, limiter));
    GameContext::new(state, transport, gateway, fast_config())
}

/// A started game with the given humans (user id = name) followed by
/// `bots` autonomous players, dealt `pool`
pub fn seated(humans: &[&str], bots: usize, pool: Vec<Role>) -> SharedGame {
    let mut state = GameState::new();
    state.spectate(&UserId::new("host"), "Host").unwrap();
    for name in humans {
        state.join(&UserId::new(*name), name).unwrap();
    }
    state.add_bots(bots).unwrap();
    state.begin_setup(&UserId::new("host")).unwrap();
    state.deal_roles(pool, &mut rand::rng()).unwrap();
    Arc::new(AsyncMutex::new(state))
}

/// Seat currently holding `role`
pub async fn seat_with(state: &SharedGame, role: Role) -> PlayerId {
    let state = state.lock().await;
    state
        .reveal_roles()
        .into_iter()
        .find(|(_, r)| *r == role)
        .map(|(seat, _)| seat.id)
        .unwrap()
}
