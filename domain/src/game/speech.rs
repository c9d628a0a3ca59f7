//! Speaking order and the shared transcript

use crate::participant::PlayerId;
use std::collections::VecDeque;

/// FIFO of the day's speakers with exactly one current speaker
#[derive(Debug, Clone, Default)]
pub struct SpeakingQueue {
    queue: VecDeque<PlayerId>,
    current: Option<PlayerId>,
    active: bool,
}

impl SpeakingQueue {
    /// Start a new day with the given (already shuffled) order
    pub fn begin(&mut self, order: Vec<PlayerId>) {
        self.queue = order.into();
        self.current = None;
        self.active = true;
    }

    /// Move to the next speaker; `None` once the queue is exhausted, which
    /// also ends the speaking phase
    pub fn advance(&mut self) -> Option<PlayerId> {
        self.current = self.queue.pop_front();
        if self.current.is_none() {
            self.active = false;
        }
        self.current
    }

    pub fn current(&self) -> Option<PlayerId> {
        self.current
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Drop a speaker who died mid-phase
    pub fn remove(&mut self, id: PlayerId) {
        self.queue.retain(|p| *p != id);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.current = None;
        self.active = false;
    }
}

/// Lines spoken during the current day, visible to later speakers
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    pub fn push(&mut self, speaker: &str, text: &str) {
        self.lines.push(format!("{}: {}", speaker, text));
    }

    pub fn push_system(&mut self, text: &str) {
        self.push("System", text);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
