//! Uniform decision interface over humans and autonomous agents

use super::ActionRequest;
use crate::gateway::AiGateway;
use crate::ports::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use werewolf_domain::{
    ABSTAIN_TOKEN, Decision, Participant, ParticipantKind, PlayerId, Role, Seat, UserId,
    parse_yes_no,
};

/// Time limits for human replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionLimits {
    pub action_timeout: Duration,
    pub last_words_timeout: Duration,
    pub max_input_chars: usize,
}

impl Default for DecisionLimits {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(45),
            last_words_timeout: Duration::from_secs(60),
            max_input_chars: 100,
        }
    }
}

pub struct DecisionProvider {
    gateway: Arc<AiGateway>,
    transport: Arc<dyn Transport>,
    limits: DecisionLimits,
}

impl DecisionProvider {
    pub fn new(gateway: Arc<AiGateway>, transport: Arc<dyn Transport>) -> Self {
        Self {
            gateway,
            transport,
            limits: DecisionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: DecisionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn gateway(&self) -> &Arc<AiGateway> {
        &self.gateway
    }

    /// A target from `request.valid_targets`, or an abstain.
    ///
    /// Never fails: timeouts, transport errors and illegal targets all come
    /// back as [`Decision::Abstain`].
    pub async fn request_decision(&self, seat: &Seat, request: &ActionRequest) -> Decision {
        let decision = match &seat.participant.kind {
            ParticipantKind::Autonomous => {
                self.gateway
                    .decide_action(request.role, &request.ai_context(), &request.valid_targets)
                    .await
            }
            ParticipantKind::Human { user_id } => self.ask_human(user_id, request).await,
        };

        let decision = decision.restrict(|id| request.allows(id));
        debug!(
            "{} ({}) {} -> {}",
            seat.label(),
            request.role,
            request.kind.as_str(),
            decision
        );
        decision
    }

    async fn ask_human(&self, user: &UserId, request: &ActionRequest) -> Decision {
        let max_chars = self.limits.max_input_chars;
        let validator = |input: &str| {
            let input = input.trim();
            input.len() <= max_chars
                && (input.eq_ignore_ascii_case(ABSTAIN_TOKEN)
                    || input
                        .parse::<u32>()
                        .is_ok_and(|n| request.allows(PlayerId(n))))
        };

        match self
            .transport
            .request_private_input(
                user,
                &request.human_prompt(),
                &validator,
                self.limits.action_timeout,
            )
            .await
        {
            Ok(reply) => Decision::from_reply(&reply),
            Err(e) => {
                debug!("No decision from {}: {}", user, e);
                Decision::Abstain
            }
        }
    }

    /// A yes/no answer; autonomous participants answer `ai_answer`
    pub async fn request_confirmation(&self, seat: &Seat, prompt: &str, ai_answer: bool) -> bool {
        let ParticipantKind::Human { user_id } = &seat.participant.kind else {
            return ai_answer;
        };

        let validator = |input: &str| parse_yes_no(input).is_some();
        match self
            .transport
            .request_private_input(
                user_id,
                &format!("{}\nReply 'yes' or 'no'.", prompt),
                &validator,
                self.limits.action_timeout,
            )
            .await
        {
            Ok(reply) => parse_yes_no(&reply).unwrap_or(false),
            Err(e) => {
                debug!("No confirmation from {}: {}", user_id, e);
                false
            }
        }
    }

    /// An autonomous remark for the speaking phase; `None` for humans, who
    /// speak in the channel themselves
    pub async fn request_speech(
        &self,
        seat: &Seat,
        role: Role,
        situation: &str,
        history: &[String],
    ) -> Option<String> {
        if !seat.participant.is_autonomous() {
            return None;
        }
        Some(
            self.gateway
                .generate_speech(seat.id, role, situation, history)
                .await,
        )
    }

    /// Final statement after elimination; `""` when nothing was said
    pub async fn request_last_words(&self, seat: &Seat, role: Role, situation: &str) -> String {
        match &seat.participant.kind {
            ParticipantKind::Autonomous => {
                self.gateway
                    .generate_last_words(seat.id, role, situation)
                    .await
            }
            ParticipantKind::Human { user_id } => {
                self.notify(
                    &seat.participant,
                    &format!(
                        "You have been eliminated. You have {}s to say your last words in the channel.",
                        self.limits.last_words_timeout.as_secs()
                    ),
                )
                .await;
                self.transport
                    .await_channel_message(user_id, self.limits.last_words_timeout)
                    .await
                    .unwrap_or_default()
            }
        }
    }

    /// Private message for humans; autonomous participants ignore it
    pub async fn notify(&self, participant: &Participant, text: &str) {
        if let Some(user) = participant.user_id()
            && let Err(e) = self.transport.send_private(user, text).await
        {
            warn!("Could not message {}: {}", participant, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::decision::ActionKind;
    use crate::gateway::RateLimiter;
    use crate::ports::ai_backend::{AiBackend, BackendError};
    use crate::ports::transport::{InputValidator, TransportError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct FixedBackend(&'static str);

    #[async_trait]
    impl AiBackend for FixedBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Replies with scripted lines, passing each through the validator
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<String>>,
        private: Mutex<Vec<(UserId, String)>>,
    }

    impl ScriptedTransport {
        fn with_replies(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                private: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send_message(&self, _text: &str) -> Result<(), TransportError> {
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
            _user: &UserId,
            _prompt: &str,
            validator: InputValidator<'_>,
            _timeout: Duration,
        ) -> Result<String, TransportError> {
            let mut replies = self.replies.lock().unwrap();
            while let Some(reply) = replies.pop_front() {
                if validator(&reply) {
                    return Ok(reply);
                }
            }
            Err(TransportError::Timeout)
        }

        async fn await_channel_message(
            &self,
            _user: &UserId,
            _timeout: Duration,
        ) -> Result<String, TransportError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(TransportError::Timeout)
        }

        async fn set_user_muted(&self, _user: &UserId, _muted: bool) -> Result<(), TransportError> {
            Ok(())
        }

        async fn set_channel_postable(&self, _postable: bool) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn provider(reply: &'static str, transport: Arc<ScriptedTransport>) -> DecisionProvider {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            rate: 1000.0,
            capacity: 1000.0,
        }));
        let gateway = Arc::new(AiGateway::new(Arc::new(FixedBackend(reply)), limiter));
        DecisionProvider::new(gateway, transport)
    }

    fn request() -> ActionRequest {
        ActionRequest::new(ActionKind::Vote, Role::Villager, "Day 1.")
            .with_targets(vec![PlayerId(2), PlayerId(3)])
    }

    fn human() -> Seat {
        Seat::new(PlayerId(1), Participant::human("u-1", "Alice"))
    }

    fn bot() -> Seat {
        Seat::new(PlayerId(1), Participant::autonomous("AI-1"))
    }

    #[tokio::test]
    async fn test_human_invalid_replies_are_skipped() {
        let transport = ScriptedTransport::with_replies(&["9", "maybe", "3"]);
        let p = provider("", transport);
        assert_eq!(
            p.request_decision(&human(), &request()).await,
            Decision::Target(PlayerId(3))
        );
    }

    #[tokio::test]
    async fn test_human_overlong_reply_rejected() {
        let long = format!("{}3", "0".repeat(120));
        let transport = ScriptedTransport::with_replies(&[long.as_str()]);
        let p = provider("", transport);
        assert_eq!(p.request_decision(&human(), &request()).await, Decision::Abstain);
    }

    #[tokio::test]
    async fn test_human_timeout_abstains() {
        let transport = ScriptedTransport::with_replies(&[]);
        let p = provider("", transport);
        assert_eq!(p.request_decision(&human(), &request()).await, Decision::Abstain);
    }

    #[tokio::test]
    async fn test_human_no_abstains() {
        let transport = ScriptedTransport::with_replies(&["NO"]);
        let p = provider("", transport);
        assert_eq!(p.request_decision(&human(), &request()).await, Decision::Abstain);
    }

    #[tokio::test]
    async fn test_autonomous_illegal_target_abstains() {
        let p = provider("I vote 7", ScriptedTransport::with_replies(&[]));
        assert_eq!(p.request_decision(&bot(), &request()).await, Decision::Abstain);

        let p = provider("I vote 2", ScriptedTransport::with_replies(&[]));
        assert_eq!(
            p.request_decision(&bot(), &request()).await,
            Decision::Target(PlayerId(2))
        );
    }

    #[tokio::test]
    async fn test_confirmation() {
        let p = provider("", ScriptedTransport::with_replies(&["perhaps", "Y"]));
        assert!(p.request_confirmation(&human(), "Save?", false).await);
        assert!(p.request_confirmation(&bot(), "Save?", true).await);

        let p = provider("", ScriptedTransport::with_replies(&[]));
        assert!(!p.request_confirmation(&human(), "Save?", true).await);
    }

    #[tokio::test]
    async fn test_last_words() {
        let transport = ScriptedTransport::with_replies(&["Trust 3."]);
        let p = provider("Goodbye, village.", transport.clone());
        assert_eq!(
            p.request_last_words(&human(), Role::Seer, "").await,
            "Trust 3."
        );
        assert_eq!(transport.private.lock().unwrap().len(), 1);
        assert_eq!(
            p.request_last_words(&bot(), Role::Seer, "").await,
            "Goodbye, village."
        );
        assert_eq!(p.request_speech(&human(), Role::Seer, "", &[]).await, None);
    }
}
