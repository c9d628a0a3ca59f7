//! Gemini CLI backend
//!
//! Runs `gemini -p <prompt>` as a subprocess and returns its stdout.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};
use werewolf_application::{AiBackend, BackendError};

/// Markers the CLI prints on stderr when the quota is exhausted
const RATE_LIMIT_MARKERS: [&str; 3] = ["429", "resource_exhausted", "quota"];

pub struct GeminiCliBackend {
    binary: String,
    timeout: Duration,
}

impl GeminiCliBackend {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolved path of the executable, if it is installed
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.binary).ok()
    }
}

fn is_rate_limited(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

#[async_trait]
impl AiBackend for GeminiCliBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let Some(path) = self.locate() else {
            return Err(BackendError::Unavailable(format!(
                "'{}' not found on PATH",
                self.binary
            )));
        };
        debug!("Running {} -p <{} chars>", path.display(), prompt.len());

        let mut cmd = Command::new(&path);
        cmd.arg("-p")
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                BackendError::RequestFailed(format!("timed out after {:?}", self.timeout))
            })?
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_rate_limited(&stderr) {
            return Err(BackendError::RateLimited(stderr));
        }
        warn!("{} exited with {}", self.binary, output.status);
        Err(BackendError::RequestFailed(format!(
            "exit status {}: {}",
            output.status, stderr
        )))
    }

    fn name(&self) -> &str {
        "gemini-cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_markers() {
        assert!(is_rate_limited("Error: 429 Too Many Requests"));
        assert!(is_rate_limited("status: RESOURCE_EXHAUSTED"));
        assert!(is_rate_limited("You exceeded your current Quota"));
        assert!(!is_rate_limited("permission denied"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let backend = GeminiCliBackend::new("werewolf-no-such-binary");
        let err = backend.generate("hi").await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }

    #[cfg(unix)]
    fn script(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join("fake-gemini");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_the_answer() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the prompt passed after -p
        let backend = GeminiCliBackend::new(script(&dir, "echo \"  $2  \""));
        assert_eq!(backend.generate("yes").await, Ok("yes".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_quota_error_is_rate_limited() {
        let dir = tempfile::tempdir().unwrap();
        let backend =
            GeminiCliBackend::new(script(&dir, "echo 'RESOURCE_EXHAUSTED' >&2\nexit 1"));
        let err = backend.generate("hi").await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_other_failures_are_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let backend = GeminiCliBackend::new(script(&dir, "echo 'bad flag' >&2\nexit 2"));
        let err = backend.generate("hi").await.unwrap_err();
        assert!(matches!(err, BackendError::RequestFailed(_)));
    }
}
