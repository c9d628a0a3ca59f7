//! Collaborators shared by every use case of one room

use crate::config::GameConfig;
use crate::decision::DecisionProvider;
use crate::decision::provider::DecisionLimits;
use crate::gateway::AiGateway;
use crate::ports::transport::{Transport, TransportError};
use crate::session::registry::SharedGame;
use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;
use werewolf_domain::{GameMode, Seat};

/// Cheap to clone; every field is shared
#[derive(Clone)]
pub struct GameContext {
    pub state: SharedGame,
    pub transport: Arc<dyn Transport>,
    pub gateway: Arc<AiGateway>,
    pub decisions: Arc<DecisionProvider>,
    pub config: Arc<GameConfig>,
}

impl GameContext {
    pub fn new(
        state: SharedGame,
        transport: Arc<dyn Transport>,
        gateway: Arc<AiGateway>,
        config: GameConfig,
    ) -> Self {
        let decisions = DecisionProvider::new(Arc::clone(&gateway), Arc::clone(&transport))
            .with_limits(DecisionLimits {
                action_timeout: config.action_timeout,
                last_words_timeout: config.last_words_timeout,
                max_input_chars: config.max_input_chars,
            });
        Self {
            state,
            transport,
            gateway,
            decisions: Arc::new(decisions),
            config: Arc::new(config),
        }
    }

    /// Post to the room channel; failures are logged
    pub async fn post(&self, text: &str) {
        if let Err(e) = self.transport.send_message(text).await {
            warn!("Could not post to the channel: {}", e);
        }
    }

    /// Narrate an event, then show the system message.
    ///
    /// Offline games send the narration privately to the creator, who reads
    /// it aloud; if that fails it goes to the channel instead. An empty
    /// narration leaves just the system message.
    pub async fn announce(&self, event_type: &str, system_message: &str) {
        let narrative = self
            .gateway
            .generate_narrative(event_type, system_message)
            .await;
        if narrative.is_empty() {
            self.post(system_message).await;
            return;
        }

        let (mode, creator) = {
            let state = self.state.lock().await;
            (state.mode(), state.creator().cloned())
        };

        match (mode, creator) {
            (GameMode::Offline, Some(creator)) => {
                let aloud = format!("[Read aloud] {}", narrative);
                if let Err(e) = self.transport.send_private(&creator, &aloud).await {
                    warn!("Could not reach the narrator privately: {}", e);
                    self.post(&narrative).await;
                }
                self.post(system_message).await;
            }
            _ => {
                self.post(&format!("{}\n{}", narrative, system_message))
                    .await;
            }
        }
    }

    /// Open or lock the channel; a missing permission is reported, not fatal
    pub async fn set_postable(&self, postable: bool) {
        match self.transport.set_channel_postable(postable).await {
            Ok(()) => {}
            Err(TransportError::PermissionDenied(msg)) => {
                warn!("Cannot change channel permissions: {}", msg);
                self.post("Warning: missing permission to lock the channel. Please stay quiet at night.")
                    .await;
            }
            Err(e) => warn!("Cannot change channel permissions: {}", e),
        }
    }

    pub async fn set_muted(&self, seat: &Seat, muted: bool) {
        if let Some(user) = seat.participant.user_id()
            && let Err(e) = self.transport.set_user_muted(user, muted).await
        {
            warn!("Could not change mute for {}: {}", seat.label(), e);
        }
    }

    /// Mute or unmute every living human at once
    pub async fn set_living_muted(&self, muted: bool) {
        let seats = self.state.lock().await.living_seats();
        join_all(seats.iter().map(|seat| self.set_muted(seat, muted))).await;
    }
}
