//! Ollama tier — the offline backend.
//!
//! Runs `ollama run <model> <prompt>` as a subprocess with a hard deadline.
//! The child is killed when the deadline passes. A missing binary and a
//! timeout are logged as distinct conditions; the caller only sees
//! `Unavailable`.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use steward_config::OllamaConfig;
use steward_core::error::TierError;
use steward_core::tier::{ModelTier, TierOutcome};
use tokio::process::Command;
use tracing::{debug, warn};

/// Offline tier backed by a local Ollama engine.
pub struct OllamaTier {
    name: String,
    binary: String,
    model: String,
    timeout: Duration,
    /// Persona prompt and speaker label used to frame each prompt
    persona: Option<(String, String)>,
}

impl OllamaTier {
    pub fn new(binary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "ollama".into(),
            binary: binary.into(),
            model: model.into(),
            timeout: Duration::from_secs(60),
            persona: None,
        }
    }

    pub fn from_config(config: &OllamaConfig) -> Self {
        Self::new(&config.binary, &config.model)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Frame prompts as a transcript: `<system>\nUser: <prompt>\n<label>:`.
    pub fn with_persona(mut self, system_prompt: impl Into<String>, label: impl Into<String>) -> Self {
        self.persona = Some((system_prompt.into(), label.into()));
        self
    }

    fn frame(&self, prompt: &str) -> String {
        match &self.persona {
            Some((system, label)) => format!("{}\nUser: {prompt}\n{label}:", system.trim_end()),
            None => prompt.to_string(),
        }
    }

    async fn run(&self, prompt: &str) -> Result<String, TierError> {
        let framed = self.frame(prompt);

        debug!(tier = %self.name, binary = %self.binary, model = %self.model, "Starting offline engine");

        let child = Command::new(&self.binary)
            .args(["run", &self.model, &framed])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    warn!(tier = %self.name, binary = %self.binary, "Offline engine is not installed");
                    TierError::EngineNotFound(self.binary.clone())
                } else {
                    TierError::Spawn(e.to_string())
                }
            })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| TierError::Spawn(e.to_string()))?,
            Err(_) => {
                warn!(
                    tier = %self.name,
                    timeout_secs = self.timeout.as_secs(),
                    "Offline engine took too long"
                );
                return Err(TierError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            return Err(TierError::ProcessFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl ModelTier for OllamaTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, prompt: &str) -> TierOutcome {
        TierOutcome::collapse(&self.name, self.run(prompt).await)
    }
}
