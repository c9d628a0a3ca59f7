//! Game parameters: timeouts, table limits and pacing.
//!
//! [`GameConfig`] groups the static parameters the use cases read while a
//! game runs. The infrastructure config loader builds one from the
//! `[game]` section of the config file.

use rand::Rng;
use std::time::Duration;
use werewolf_domain::TableLimits;

/// Simulated "thinking" and "reading" delays for autonomous players
///
/// Every delay is drawn uniformly from its `[min, max]` range.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    /// Delay before an autonomous player casts a ballot
    pub ai_vote_delay: (Duration, Duration),
    /// Delay before an autonomous player starts speaking
    pub ai_think_delay: (Duration, Duration),
    /// Delay after an autonomous remark before the turn passes
    pub ai_reading_delay: (Duration, Duration),
    /// Pause between the end of the speaking phase and autonomous voting
    pub vote_open_delay: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            ai_vote_delay: (Duration::from_secs(1), Duration::from_secs(3)),
            ai_think_delay: (Duration::from_secs(2), Duration::from_secs(5)),
            ai_reading_delay: (Duration::from_secs(2), Duration::from_secs(4)),
            vote_open_delay: Duration::from_secs(5),
        }
    }
}

impl PacingConfig {
    /// No artificial delays at all
    pub fn instant() -> Self {
        Self {
            ai_vote_delay: (Duration::ZERO, Duration::ZERO),
            ai_think_delay: (Duration::ZERO, Duration::ZERO),
            ai_reading_delay: (Duration::ZERO, Duration::ZERO),
            vote_open_delay: Duration::ZERO,
        }
    }

    /// Draw a delay from `range`
    pub fn jitter<R: Rng + ?Sized>(range: (Duration, Duration), rng: &mut R) -> Duration {
        let (min, max) = range;
        if max <= min {
            return min;
        }
        let secs = rng.random_range(min.as_secs_f64()..=max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Game-wide parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Language code passed to narration prompts
    pub language: String,
    pub min_players: usize,
    pub max_players: usize,
    /// Hard limit for a human night action or ballot prompt
    pub action_timeout: Duration,
    /// Hard limit for a human's last words
    pub last_words_timeout: Duration,
    /// Hard limit for a human speaking turn
    pub speech_timeout: Duration,
    /// Longest accepted private reply
    pub max_input_chars: usize,
    /// Longest accepted `/vote` argument
    pub max_vote_chars: usize,
    /// Stop after this many days without a winner
    pub max_days: Option<u32>,
    pub pacing: PacingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            min_players: werewolf_domain::MIN_PLAYERS,
            max_players: werewolf_domain::MAX_PLAYERS,
            action_timeout: Duration::from_secs(45),
            last_words_timeout: Duration::from_secs(60),
            speech_timeout: Duration::from_secs(120),
            max_input_chars: 100,
            max_vote_chars: 10,
            max_days: None,
            pacing: PacingConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn table_limits(&self) -> TableLimits {
        TableLimits {
            min_players: self.min_players,
            max_players: self.max_players,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn with_last_words_timeout(mut self, timeout: Duration) -> Self {
        self.last_words_timeout = timeout;
        self
    }

    pub fn with_speech_timeout(mut self, timeout: Duration) -> Self {
        self.speech_timeout = timeout;
        self
    }

    pub fn with_max_days(mut self, max_days: Option<u32>) -> Self {
        self.max_days = max_days;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }
}
