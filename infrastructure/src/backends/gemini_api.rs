//! Gemini REST backend
//!
//! Calls `models/{model}:generateContent` with the API key in the
//! `x-goog-api-key` header and returns the first candidate's text.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use werewolf_application::{AiBackend, BackendError};

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

pub struct GeminiApiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiApiBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn first_text(body: GenerateContentResponse) -> Option<String> {
    let content = body.candidates.into_iter().next()?.content?;
    let part = content.parts.into_iter().next()?;
    Some(part.text)
}

#[async_trait]
impl AiBackend for GeminiApiBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        debug!("Gemini API request (model {})", self.model);

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RateLimited(body.trim().to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        first_text(body)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| BackendError::InvalidResponse("no candidate text".to_string()))
    }

    fn name(&self) -> &str {
        "gemini-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> GeminiApiBackend {
        GeminiApiBackend::new(server.uri(), "gemini-2.5-flash", "secret")
    }

    #[tokio::test]
    async fn test_generate_reads_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "content": { "parts": [{ "text": " The village wakes.\n" }] } },
                    { "content": { "parts": [{ "text": "ignored" }] } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = backend(&server).generate("Narrate").await;
        assert_eq!(text, Ok("The village wakes.".to_string()));
    }

    #[tokio::test]
    async fn test_quota_exhaustion_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"),
            )
            .mount(&server)
            .await;

        let err = backend(&server).generate("hi").await.unwrap_err();
        assert_eq!(err, BackendError::RateLimited("RESOURCE_EXHAUSTED".to_string()));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let err = backend(&server).generate("hi").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }
}
