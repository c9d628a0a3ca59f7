//! AI request gateway
//!
//! Every autonomous decision goes through [`AiGateway`]. It adds, in order:
//!
//! ```text
//! caller ──▶ cache? ──▶ RateLimiter::acquire ──▶ AiBackend::generate
//!                            ▲                         │
//!                            └── backoff (RateLimited) ┘
//! ```
//!
//! None of the public operations fail: on error they log and return an
//! empty or neutral value (`""`, an empty list, [`Decision::Abstain`]).

use super::rate_limiter::RateLimiter;
use crate::config::RetryPolicy;
use crate::ports::ai_backend::{AiBackend, BackendError};
use crate::ports::retry_notifier::RetryNotifier;
use crate::ports::template_store::{NoTemplateStore, RoleTemplateStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use werewolf_domain::{
    DEFAULT_CACHE_CAPACITY, Decision, NarrativeKey, PlayerId, PromptTemplate, RecencyCache, Role,
    RoleTemplateKey, RoleTemplateRecord, parse_action_decision, parse_role_template,
};

pub struct AiGateway {
    backend: Arc<dyn AiBackend>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    notifier: Option<Arc<dyn RetryNotifier>>,
    store: Arc<dyn RoleTemplateStore>,
    role_templates: Mutex<RecencyCache<RoleTemplateKey, Vec<Role>>>,
    narratives: Mutex<RecencyCache<NarrativeKey, String>>,
    language: String,
}

impl AiGateway {
    pub fn new(backend: Arc<dyn AiBackend>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            backend,
            limiter,
            retry: RetryPolicy::default(),
            notifier: None,
            store: Arc::new(NoTemplateStore),
            role_templates: Mutex::new(RecencyCache::new(DEFAULT_CACHE_CAPACITY)),
            narratives: Mutex::new(RecencyCache::new(DEFAULT_CACHE_CAPACITY)),
            language: "en".to_string(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn RetryNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Both caches get `capacity`; any loaded entries are dropped
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.role_templates = Mutex::new(RecencyCache::new(capacity));
        self.narratives = Mutex::new(RecencyCache::new(capacity));
        self
    }

    /// Attach a durable store and load every record it holds.
    ///
    /// Unreadable stores and malformed records are logged and skipped.
    pub fn with_store(mut self, store: Arc<dyn RoleTemplateStore>) -> Self {
        match store.load() {
            Ok(records) => {
                let cache = self.role_templates.get_mut();
                let total = records.len();
                for record in records {
                    match record.into_entry() {
                        Some((key, roles)) => {
                            cache.insert(key, roles);
                        }
                        None => warn!("Skipping malformed role template record"),
                    }
                }
                info!("Loaded {} of {} cached role templates", cache.len(), total);
            }
            Err(e) => warn!("Could not load role template cache: {}", e),
        }
        self.store = store;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    // ==================== Generation ====================

    /// Raw generation with rate limiting and backoff; `""` on failure
    pub async fn generate(&self, prompt: &str) -> String {
        let mut attempt: u32 = 0;
        loop {
            self.limiter.acquire().await;

            match self.backend.generate(prompt).await {
                Ok(text) => return text,
                Err(BackendError::RateLimited(msg)) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        "{} rate limited ({}), retry {}/{} in {:?}",
                        self.backend.name(),
                        msg,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    if let Some(notifier) = &self.notifier
                        && let Err(e) = notifier.on_retry(attempt, delay).await
                    {
                        debug!("Retry notice not delivered: {}", e);
                    }
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("{} failed: {}", self.backend.name(), e);
                    return String::new();
                }
            }
        }
    }

    /// A role list of exactly `player_count` roles drawn from `allowed`, or
    /// an empty list.
    ///
    /// Successful results are cached and persisted; a cache hit makes no
    /// backend call.
    pub async fn generate_role_template(&self, player_count: usize, allowed: &[Role]) -> Vec<Role> {
        let key = RoleTemplateKey::new(player_count, allowed);
        if let Some(roles) = self.role_templates.lock().await.get(&key) {
            debug!("Role template cache hit for {} players", player_count);
            return roles;
        }

        let prompt = PromptTemplate::role_template(player_count, allowed);
        let response = self.generate(&prompt).await;
        let Some(roles) = parse_role_template(&response, player_count, allowed) else {
            warn!("AI returned an invalid role template for {} players", player_count);
            return Vec::new();
        };

        let records: Vec<RoleTemplateRecord> = {
            let mut cache = self.role_templates.lock().await;
            cache.insert(key, roles.clone());
            cache
                .iter()
                .map(|(k, v)| RoleTemplateRecord::new(k, v))
                .collect()
        };
        if let Err(e) = self.store.save(&records) {
            warn!("Could not persist role template cache: {}", e);
        }

        roles
    }

    /// Flavor narration for an event; `""` on failure (not cached)
    pub async fn generate_narrative(&self, event_type: &str, context: &str) -> String {
        let key = NarrativeKey::new(event_type, context, &self.language);
        if let Some(text) = self.narratives.lock().await.get(&key) {
            debug!("Narrative cache hit for {}", event_type);
            return text;
        }

        let prompt = PromptTemplate::narrative(event_type, context, &self.language);
        let text = self.generate(&prompt).await.trim().to_string();
        if !text.is_empty() {
            self.narratives.lock().await.insert(key, text.clone());
        }
        text
    }

    /// A seat number or an abstain; targets are not checked here
    pub async fn decide_action(
        &self,
        role: Role,
        situation: &str,
        valid_targets: &[PlayerId],
    ) -> Decision {
        let prompt = PromptTemplate::action(role, situation, valid_targets);
        let response = self.generate(&prompt).await;
        if response.trim().is_empty() {
            return Decision::Abstain;
        }
        let decision = parse_action_decision(&response);
        debug!("{} decided {}", role, decision);
        decision
    }

    /// A short in-character remark; `""` on failure
    pub async fn generate_speech(
        &self,
        seat: PlayerId,
        role: Role,
        situation: &str,
        history: &[String],
    ) -> String {
        let prompt = PromptTemplate::speech(seat, role, situation, history);
        self.generate(&prompt).await.trim().to_string()
    }

    /// A final statement after elimination; `""` on failure
    pub async fn generate_last_words(&self, seat: PlayerId, role: Role, situation: &str) -> String {
        let prompt = PromptTemplate::last_words(seat, role, situation);
        self.generate(&prompt).await.trim().to_string()
    }
}
