//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types with
//! the `to_*` methods once validated.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use werewolf_application::{GameConfig, PacingConfig, RateLimitConfig, RetryPolicy};
use werewolf_domain::{DEFAULT_CACHE_CAPACITY, GameMode, MAX_PLAYERS, MIN_PLAYERS};

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("rate_limit.rate must be positive (got {0})")]
    InvalidRate(f64),

    #[error("rate_limit.capacity must be positive (got {0})")]
    InvalidCapacity(f64),

    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("cache.capacity cannot be 0")]
    ZeroCacheCapacity,

    #[error("game.min_players ({min}) must be at least 3 and no more than game.max_players ({max})")]
    InvalidPlayerLimits { min: usize, max: usize },

    #[error("{0} must be two non-negative seconds, smallest first")]
    InvalidDelayRange(&'static str),

    #[error("unknown game mode '{0}' (expected online or offline)")]
    UnknownMode(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend selection and credentials
    pub ai: FileAiConfig,
    /// Outbound AI call admission
    pub rate_limit: FileRateLimitConfig,
    /// Backoff on rate-limited backends
    pub retry: FileRetryConfig,
    /// Role-template cache file
    pub cache: FileCacheConfig,
    /// Timeouts, table limits and pacing
    pub game: FileGameConfig,
}

/// Raw `[ai]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAiConfig {
    /// `ollama`, `gemini-cli` or `gemini-api`; anything else means `gemini-cli`
    pub provider: String,
    /// Per-request limit for HTTP and subprocess backends
    pub request_timeout_secs: u64,
    pub ollama: FileOllamaConfig,
    pub gemini: FileGeminiConfig,
}

impl Default for FileAiConfig {
    fn default() -> Self {
        Self {
            provider: "gemini-cli".to_string(),
            request_timeout_secs: 120,
            ollama: FileOllamaConfig::default(),
            gemini: FileGeminiConfig::default(),
        }
    }
}

/// Raw `[ai.ollama]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    pub host: String,
    pub model: String,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "gpt-oss:20b".to_string(),
        }
    }
}

/// Raw `[ai.gemini]` section, shared by the CLI and REST backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Executable for the `gemini-cli` backend
    pub cli_binary: String,
    /// Model for the `gemini-api` backend
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (prefer the environment variable)
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            cli_binary: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl FileGeminiConfig {
    /// The configured key, else the one in `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Raw `[rate_limit]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRateLimitConfig {
    /// Tokens per second
    pub rate: f64,
    /// Burst size
    pub capacity: f64,
}

impl Default for FileRateLimitConfig {
    fn default() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            rate: defaults.rate,
            capacity: defaults.capacity,
        }
    }
}

/// Raw `[retry]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: u32,
    pub base_delay_secs: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            max_retries: defaults.max_retries,
            base_delay_secs: defaults.base_delay.as_secs(),
        }
    }
}

/// Raw `[cache]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    /// Role-template cache file; `None` keeps the cache in memory only
    pub file: Option<PathBuf>,
    pub capacity: usize,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("ai_cache.json")),
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Raw `[game]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGameConfig {
    pub language: String,
    /// `online` or `offline`
    pub mode: String,
    pub min_players: usize,
    pub max_players: usize,
    pub action_timeout_secs: u64,
    pub last_words_timeout_secs: u64,
    pub speech_timeout_secs: u64,
    pub max_input_chars: usize,
    pub max_vote_chars: usize,
    pub max_days: Option<u32>,
    pub pacing: FilePacingConfig,
}

impl Default for FileGameConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            mode: "online".to_string(),
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            action_timeout_secs: 45,
            last_words_timeout_secs: 60,
            speech_timeout_secs: 120,
            max_input_chars: 100,
            max_vote_chars: 10,
            max_days: None,
            pacing: FilePacingConfig::default(),
        }
    }
}

/// Raw `[game.pacing]` section; ranges are `[min, max]` in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePacingConfig {
    pub ai_vote_delay_secs: [f64; 2],
    pub ai_think_delay_secs: [f64; 2],
    pub ai_reading_delay_secs: [f64; 2],
    pub vote_open_delay_secs: f64,
}

impl Default for FilePacingConfig {
    fn default() -> Self {
        Self {
            ai_vote_delay_secs: [1.0, 3.0],
            ai_think_delay_secs: [2.0, 5.0],
            ai_reading_delay_secs: [2.0, 4.0],
            vote_open_delay_secs: 5.0,
        }
    }
}

fn secs_range(range: [f64; 2]) -> (Duration, Duration) {
    (
        Duration::from_secs_f64(range[0]),
        Duration::from_secs_f64(range[1]),
    )
}

fn valid_range(range: [f64; 2]) -> bool {
    range.iter().all(|s| s.is_finite() && *s >= 0.0) && range[0] <= range[1]
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let rate = &self.rate_limit;
        if !(rate.rate.is_finite() && rate.rate > 0.0) {
            return Err(ConfigValidationError::InvalidRate(rate.rate));
        }
        if !(rate.capacity.is_finite() && rate.capacity > 0.0) {
            return Err(ConfigValidationError::InvalidCapacity(rate.capacity));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigValidationError::ZeroCacheCapacity);
        }
        if self.ai.request_timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroTimeout("ai.request_timeout_secs"));
        }

        let game = &self.game;
        for (field, value) in [
            ("game.action_timeout_secs", game.action_timeout_secs),
            ("game.last_words_timeout_secs", game.last_words_timeout_secs),
            ("game.speech_timeout_secs", game.speech_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroTimeout(field));
            }
        }
        if game.min_players < MIN_PLAYERS
            || game.min_players > game.max_players
            || game.max_players > MAX_PLAYERS
        {
            return Err(ConfigValidationError::InvalidPlayerLimits {
                min: game.min_players,
                max: game.max_players,
            });
        }

        let pacing = &game.pacing;
        for (field, range) in [
            ("game.pacing.ai_vote_delay_secs", pacing.ai_vote_delay_secs),
            ("game.pacing.ai_think_delay_secs", pacing.ai_think_delay_secs),
            ("game.pacing.ai_reading_delay_secs", pacing.ai_reading_delay_secs),
        ] {
            if !valid_range(range) {
                return Err(ConfigValidationError::InvalidDelayRange(field));
            }
        }
        if !(pacing.vote_open_delay_secs.is_finite() && pacing.vote_open_delay_secs >= 0.0) {
            return Err(ConfigValidationError::InvalidDelayRange(
                "game.pacing.vote_open_delay_secs",
            ));
        }

        self.game_mode().map(|_| ())
    }

    pub fn game_mode(&self) -> Result<GameMode, ConfigValidationError> {
        self.game
            .mode
            .parse()
            .map_err(|_| ConfigValidationError::UnknownMode(self.game.mode.clone()))
    }

    pub fn to_game_config(&self) -> GameConfig {
        let game = &self.game;
        GameConfig {
            language: game.language.clone(),
            min_players: game.min_players,
            max_players: game.max_players,
            action_timeout: Duration::from_secs(game.action_timeout_secs),
            last_words_timeout: Duration::from_secs(game.last_words_timeout_secs),
            speech_timeout: Duration::from_secs(game.speech_timeout_secs),
            max_input_chars: game.max_input_chars,
            max_vote_chars: game.max_vote_chars,
            max_days: game.max_days,
            pacing: PacingConfig {
                ai_vote_delay: secs_range(game.pacing.ai_vote_delay_secs),
                ai_think_delay: secs_range(game.pacing.ai_think_delay_secs),
                ai_reading_delay: secs_range(game.pacing.ai_reading_delay_secs),
                vote_open_delay: Duration::from_secs_f64(game.pacing.vote_open_delay_secs),
            },
        }
    }

    pub fn to_rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            rate: self.rate_limit.rate,
            capacity: self.rate_limit.capacity,
        }
    }

    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_secs(self.retry.base_delay_secs),
        }
    }
}
