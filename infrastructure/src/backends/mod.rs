//! AI backend adapters
//!
//! Each adapter implements [`AiBackend`]; [`create_backend`] picks one from
//! the `[ai]` config section.

mod gemini_api;
mod gemini_cli;
mod ollama;

pub use gemini_api::GeminiApiBackend;
pub use gemini_cli::GeminiCliBackend;
pub use ollama::OllamaBackend;

use crate::config::FileAiConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use werewolf_application::AiBackend;

/// Which adapter serves AI requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    GeminiCli,
    GeminiApi,
}

impl BackendKind {
    /// Parse a provider name; unknown names fall back to the Gemini CLI
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "ollama" => BackendKind::Ollama,
            "gemini-api" | "gemini_api" => BackendKind::GeminiApi,
            "gemini-cli" | "gemini_cli" | "gemini" => BackendKind::GeminiCli,
            other => {
                warn!("Unknown AI provider '{}', using gemini-cli", other);
                BackendKind::GeminiCli
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::GeminiCli => "gemini-cli",
            BackendKind::GeminiApi => "gemini-api",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BackendSetupError {
    #[error("gemini-api needs an API key: set {0} or ai.gemini.api_key")]
    MissingApiKey(String),
}

/// Build the configured backend
pub fn create_backend(config: &FileAiConfig) -> Result<Arc<dyn AiBackend>, BackendSetupError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let backend: Arc<dyn AiBackend> = match BackendKind::parse(&config.provider) {
        BackendKind::Ollama => Arc::new(
            OllamaBackend::new(&config.ollama.host, &config.ollama.model).with_timeout(timeout),
        ),
        BackendKind::GeminiCli => {
            let backend =
                GeminiCliBackend::new(&config.gemini.cli_binary).with_timeout(timeout);
            if backend.locate().is_none() {
                warn!(
                    "'{}' is not on PATH; AI requests will fail over to defaults",
                    config.gemini.cli_binary
                );
            }
            Arc::new(backend)
        }
        BackendKind::GeminiApi => {
            let key = config
                .gemini
                .resolve_api_key()
                .ok_or_else(|| BackendSetupError::MissingApiKey(config.gemini.api_key_env.clone()))?;
            Arc::new(
                GeminiApiBackend::new(&config.gemini.base_url, &config.gemini.model, key)
                    .with_timeout(timeout),
            )
        }
    };
    Ok(backend)
}
