//! Ollama backend
//!
//! Calls a local Ollama server's non-streaming `/api/generate` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use werewolf_application::{AiBackend, BackendError};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaBackend {
    client: reqwest::Client,
    host: String,
    model: String,
    timeout: Duration,
}

impl OllamaBackend {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.host)
    }
}

#[async_trait]
impl AiBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        debug!("Ollama request to {} (model {})", self.host, self.model);

        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BackendError::Unavailable(format!("cannot reach {}: {}", self.host, e))
                } else {
                    BackendError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited(format!("HTTP {}", status.as_u16())));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        Ok(body.response.trim().to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_returns_trimmed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-oss:20b",
                "stream": false,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "  3\n", "done": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = OllamaBackend::new(server.uri(), "gpt-oss:20b");
        assert_eq!(backend.generate("Pick a seat").await, Ok("3".to_string()));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let backend = OllamaBackend::new(server.uri(), "gpt-oss:20b");
        let err = backend.generate("hi").await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_server_error_is_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let backend = OllamaBackend::new(format!("{}/", server.uri()), "gpt-oss:20b");
        match backend.generate("hi").await {
            Err(BackendError::RequestFailed(msg)) => assert!(msg.contains("model not loaded")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
