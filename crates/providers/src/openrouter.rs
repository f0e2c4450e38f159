//! OpenRouter tier — the secondary online backend.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol, so any
//! compatible endpoint can be configured in its place. Each call is
//! stateless: a short persona system message plus the user prompt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use steward_config::OpenRouterConfig;
use steward_core::error::TierError;
use steward_core::tier::{ModelTier, TierOutcome};
use tracing::{debug, warn};

/// Secondary online tier backed by an OpenAI-compatible endpoint.
pub struct OpenRouterTier {
    name: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    system_message: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenRouterTier {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: "openrouter".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            system_message: "Be concise, calm, intelligent.".into(),
            temperature: 0.6,
            max_tokens: 300,
            timeout: Duration::from_secs(30),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config; `assistant_name` personalizes the system message.
    pub fn from_config(config: &OpenRouterConfig, assistant_name: &str) -> Self {
        let mut tier = Self::new(&config.api_url, config.api_key.clone(), &config.model)
            .with_system_message(format!(
                "You are {assistant_name}. Be concise, calm, intelligent."
            ))
            .with_timeout(Duration::from_secs(config.timeout_secs));
        tier.temperature = config.temperature;
        tier.max_tokens = config.max_tokens;
        tier
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = message.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn to_api_messages(&self, prompt: &str) -> Vec<ApiMessage> {
        vec![
            ApiMessage {
                role: "system".into(),
                content: Some(self.system_message.clone()),
            },
            ApiMessage {
                role: "user".into(),
                content: Some(prompt.to_string()),
            },
        ]
    }

    async fn complete(&self, prompt: &str) -> Result<String, TierError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TierError::NotConfigured("OPENROUTER_API_KEY is not set".into()))?;

        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": self.to_api_messages(prompt),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        debug!(tier = %self.name, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "http://localhost")
            .header("X-Title", "Steward Assistant")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TierError::Timeout(self.timeout.as_secs())
                } else {
                    TierError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(tier = %self.name, status, body = %error_body, "OpenRouter returned error");
            return Err(TierError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| TierError::Malformed(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TierError::Malformed("No choices in response".into()))?;

        choice.message.content.ok_or(TierError::EmptyReply)
    }
}

#[async_trait]
impl ModelTier for OpenRouterTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, prompt: &str) -> TierOutcome {
        TierOutcome::collapse(&self.name, self.complete(prompt).await)
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}
