//! Console session: one keyboard driving one room
//!
//! The person at the keyboard acts as the *active user*. Lines answer a
//! pending private prompt first; otherwise they are parsed as commands
//! or posted as chat.

use super::command::ConsoleCommand;
use super::transport::ConsoleTransport;
use crate::output::console::ConsoleFormatter;
use std::sync::Arc;
use tracing::debug;
use werewolf_application::{CommandError, GameController, Transport};
use werewolf_domain::{GameState, UserId};

/// What the input loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ConsoleSession {
    controller: Arc<GameController>,
    transport: Arc<ConsoleTransport>,
    active: UserId,
}

impl ConsoleSession {
    pub fn new(
        controller: Arc<GameController>,
        transport: Arc<ConsoleTransport>,
        active: UserId,
    ) -> Self {
        Self {
            controller,
            transport,
            active,
        }
    }

    pub fn active(&self) -> &UserId {
        &self.active
    }

    /// Handle one typed line
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        if !line.starts_with('/') && self.transport.route(&self.active, line) {
            debug!("Routed reply from {}", self.active);
            return Flow::Continue;
        }

        let command = match ConsoleCommand::parse(line) {
            Ok(command) => command,
            Err(message) => {
                self.transport.emit(&ConsoleFormatter::error(&message));
                return Flow::Continue;
            }
        };

        if command == ConsoleCommand::Quit {
            return Flow::Quit;
        }
        match self.dispatch(command).await {
            Ok(Some(reply)) => self.transport.emit(&ConsoleFormatter::notice(&reply)),
            Ok(None) => {}
            Err(e) => self.transport.emit(&ConsoleFormatter::error(&e.to_string())),
        }
        Flow::Continue
    }

    async fn dispatch(&mut self, command: ConsoleCommand) -> Result<Option<String>, CommandError> {
        let user = self.active.clone();
        let reply = match command {
            ConsoleCommand::Join(name) => {
                let name = name.unwrap_or_else(|| user.to_string());
                self.controller.join(&user, &name).await?
            }
            ConsoleCommand::Spectate => {
                self.controller.spectate(&user, user.as_str()).await?
            }
            ConsoleCommand::Bots(count) => self.controller.add_bots(count).await?,
            ConsoleCommand::Mode(mode) => self.controller.set_mode(&user, mode).await?,
            ConsoleCommand::Start => self.controller.start(&user).await?,
            ConsoleCommand::Done => {
                self.controller.end_turn(&user).await?;
                return Ok(None);
            }
            ConsoleCommand::Vote(ballot) => self.controller.vote(&user, &ballot).await?,
            ConsoleCommand::Execute(seat) => self.controller.execute(&user, seat).await?,
            ConsoleCommand::Day => {
                self.controller.force_day(&user).await?;
                "Skipping to the day.".to_string()
            }
            ConsoleCommand::Night => {
                self.controller.force_night(&user).await?;
                "Skipping to the night.".to_string()
            }
            ConsoleCommand::Reset => {
                self.controller.reset(&user).await?;
                return Ok(None);
            }
            ConsoleCommand::As(name) => {
                self.active = UserId::new(name);
                format!("Now acting as {}.", self.active)
            }
            ConsoleCommand::Status => {
                let state = self.controller.context().state.lock().await;
                Self::status(&state)
            }
            ConsoleCommand::Help => {
                self.transport.emit(&ConsoleFormatter::help());
                return Ok(None);
            }
            ConsoleCommand::Quit => return Ok(None),
            ConsoleCommand::Chat(text) => return self.chat(&user, &text).await,
        };
        Ok(Some(reply))
    }

    async fn chat(&self, user: &UserId, text: &str) -> Result<Option<String>, CommandError> {
        if !self.transport.may_post(user) {
            return Err(CommandError::InvalidInput(
                "You cannot speak in the room right now.".to_string(),
            ));
        }
        self.controller.record_chat(user, text).await;
        // Posting cannot fail on the console
        let _ = self
            .transport
            .send_message(&format!("{}: {}", user, text))
            .await;
        Ok(None)
    }

    /// One-screen summary of the room
    fn status(state: &GameState) -> String {
        let mut lines = vec![format!("Phase: {} (day {})", state.phase(), state.day())];
        if state.phase().is_in_game() {
            let living: Vec<String> = state.living_seats().iter().map(|s| s.label()).collect();
            lines.push(format!("Alive: {}", living.join(", ")));
        } else {
            let lobby: Vec<String> = state.lobby().iter().map(|p| p.name.clone()).collect();
            lines.push(format!("Seated: {} ({})", lobby.len(), lobby.join(", ")));
        }
        if !state.spectators().is_empty() {
            let names: Vec<String> = state.spectators().iter().map(|p| p.name.clone()).collect();
            lines.push(format!("Spectators: {}", names.join(", ")));
        }
        if let Some(outcome) = state.outcome() {
            lines.push(format!("Result: {}", outcome));
        }
        lines.join("\n")
    }
}
