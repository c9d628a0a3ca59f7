//! Terminal implementation of the chat transport
//!
//! Everything is printed to one console. Lines typed at the keyboard are
//! handed to [`ConsoleTransport::route`], which delivers them to whichever
//! private prompt or channel wait is pending for the acting user.

use crate::output::console::ConsoleFormatter;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use werewolf_application::{InputValidator, Transport, TransportError};
use werewolf_domain::UserId;

type Waiters = HashMap<UserId, mpsc::UnboundedSender<String>>;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where formatted lines go
enum Sink {
    Stdout,
    Capture(Arc<Mutex<Vec<String>>>),
}

pub struct ConsoleTransport {
    sink: Sink,
    private_waiters: Mutex<Waiters>,
    channel_waiters: Mutex<Waiters>,
    muted: Mutex<HashSet<UserId>>,
    postable: AtomicBool,
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            sink: Sink::Stdout,
            private_waiters: Mutex::new(HashMap::new()),
            channel_waiters: Mutex::new(HashMap::new()),
            muted: Mutex::new(HashSet::new()),
            postable: AtomicBool::new(true),
        }
    }

    /// Record output instead of printing it
    pub fn capturing() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let transport = Self {
            sink: Sink::Capture(Arc::clone(&lines)),
            ..Self::new()
        };
        (transport, lines)
    }

    /// Print one formatted line
    pub fn emit(&self, line: &str) {
        match &self.sink {
            Sink::Stdout => println!("{}", line),
            Sink::Capture(lines) => guard(lines).push(line.to_string()),
        }
    }

    /// Deliver a typed line to a pending prompt of `user`.
    ///
    /// Private prompts take precedence over channel waits. Returns `false`
    /// if nothing was waiting, so the caller treats the line as a command
    /// or chat.
    pub fn route(&self, user: &UserId, line: &str) -> bool {
        for waiters in [&self.private_waiters, &self.channel_waiters] {
            if let Some(tx) = guard(waiters).get(user)
                && tx.send(line.to_string()).is_ok()
            {
                return true;
            }
        }
        false
    }

    /// Whether `user` is being asked something privately
    pub fn is_prompted(&self, user: &UserId) -> bool {
        guard(&self.private_waiters).contains_key(user)
    }

    /// Whether `user` may post chat in the room right now
    pub fn may_post(&self, user: &UserId) -> bool {
        self.postable.load(Ordering::SeqCst) && !guard(&self.muted).contains(user)
    }

    async fn wait_for(
        &self,
        waiters: &Mutex<Waiters>,
        user: &UserId,
        timeout: Duration,
        validator: Option<InputValidator<'_>>,
    ) -> Result<String, TransportError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        guard(waiters).insert(user.clone(), tx);

        let replies = async {
            while let Some(reply) = rx.recv().await {
                match validator {
                    Some(accepts) if !accepts(&reply) => {
                        self.emit(&ConsoleFormatter::private(
                            user,
                            "That answer is not valid, try again.",
                        ));
                    }
                    _ => return Ok(reply),
                }
            }
            Err(TransportError::Unavailable("input closed".to_string()))
        };
        let result = tokio::time::timeout(timeout, replies)
            .await
            .unwrap_or(Err(TransportError::Timeout));

        guard(waiters).remove(user);
        result
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_message(&self, text: &str) -> Result<(), TransportError> {
        self.emit(&ConsoleFormatter::channel(text));
        Ok(())
    }

    async fn send_private(&self, user: &UserId, text: &str) -> Result<(), TransportError> {
        self.emit(&ConsoleFormatter::private(user, text));
        Ok(())
    }

    async fn request_private_input(
        &self,
        user: &UserId,
        prompt: &str,
        validator: InputValidator<'_>,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        self.emit(&ConsoleFormatter::prompt(user, prompt));
        self.wait_for(&self.private_waiters, user, timeout, Some(validator))
            .await
    }

    async fn await_channel_message(
        &self,
        user: &UserId,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        self.wait_for(&self.channel_waiters, user, timeout, None)
            .await
    }

    async fn set_user_muted(&self, user: &UserId, muted: bool) -> Result<(), TransportError> {
        debug!("{} {}", if muted { "Muting" } else { "Unmuting" }, user);
        let mut set = guard(&self.muted);
        if muted {
            set.insert(user.clone());
        } else {
            set.remove(user);
        }
        Ok(())
    }

    async fn set_channel_postable(&self, postable: bool) -> Result<(), TransportError> {
        self.postable.store(postable, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserId {
        UserId::new("alice")
    }

    #[tokio::test]
    async fn test_private_input_skips_rejected_replies() {
        let (transport, lines) = ConsoleTransport::capturing();
        let transport = Arc::new(transport);

        let answer = {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move {
                let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
                transport
                    .request_private_input(&alice(), "Pick a seat", &digits, Duration::from_secs(5))
                    .await
            })
        };

        while !transport.is_prompted(&alice()) {
            tokio::task::yield_now().await;
        }
        assert!(transport.route(&alice(), "seat three"));
        assert!(transport.route(&alice(), "3"));

        assert_eq!(answer.await.unwrap(), Ok("3".to_string()));
        assert!(!transport.is_prompted(&alice()));
        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("Pick a seat")));
        assert!(lines.iter().any(|l| l.contains("not valid")));
    }

    #[tokio::test]
    async fn test_unprompted_lines_are_not_routed() {
        let transport = ConsoleTransport::new();
        assert!(!transport.route(&alice(), "hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_wait_times_out() {
        let transport = ConsoleTransport::new();
        let result = transport
            .await_channel_message(&alice(), Duration::from_secs(60))
            .await;
        assert_eq!(result, Err(TransportError::Timeout));
        assert!(!transport.route(&alice(), "too late"));
    }

    #[tokio::test]
    async fn test_mute_and_lock_block_posting() {
        let transport = ConsoleTransport::new();
        assert!(transport.may_post(&alice()));

        transport.set_user_muted(&alice(), true).await.unwrap();
        assert!(!transport.may_post(&alice()));
        transport.set_user_muted(&alice(), false).await.unwrap();

        transport.set_channel_postable(false).await.unwrap();
        assert!(!transport.may_post(&alice()));
    }
}
