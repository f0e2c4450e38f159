//! Gemini tier — the primary online backend.
//!
//! Uses the `generateContent` REST endpoint with `x-goog-api-key`
//! authentication. The tier keeps a bounded chat history so the one-time
//! priming exchange frames every later prompt, the way a chat session would.
//! Only successful exchanges are recorded, and the first one is never evicted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use steward_config::GeminiConfig;
use steward_core::error::TierError;
use steward_core::tier::{ModelTier, TierOutcome};
use tracing::{debug, warn};

/// Primary online tier backed by Google Gemini.
pub struct GeminiTier {
    name: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    max_history: usize,
    history: Mutex<Vec<Content>>,
    client: reqwest::Client,
}

impl GeminiTier {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: "gemini".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            timeout: Duration::from_secs(30),
            max_history: 40,
            history: Mutex::new(Vec::new()),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(&config.api_url, config.api_key.clone(), &config.model)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_max_history(config.max_history)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Number of recorded history entries (user + model turns).
    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    async fn generate(&self, prompt: &str) -> Result<String, TierError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TierError::NotConfigured("GEMINI_API_KEY is not set".into()))?;

        let user_turn = Content::text("user", prompt);
        let mut contents = self
            .history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default();
        contents.push(user_turn.clone());

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(tier = %self.name, model = %self.model, turns = contents.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", api_key)
            .json(&GenerateRequest { contents })
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
            warn!(tier = %self.name, status, body = %error_body, "Gemini returned error");
            return Err(TierError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TierError::Malformed(format!("Failed to parse response: {e}")))?;

        let text = body.text()?;

        if let Ok(mut history) = self.history.lock() {
            history.push(user_turn);
            history.push(Content::text("model", &text));
            trim_history(&mut history, self.max_history);
        }

        Ok(text)
    }
}

/// Entries of the first exchange, which is never evicted.
const PINNED_TURNS: usize = 2;

/// Evict the oldest exchanges after the first one until `history` fits `max`.
///
/// The first exchange carries the session's priming context. Whole exchanges
/// are dropped so roles keep alternating, and the cap never goes below the
/// pinned exchange plus the latest one.
fn trim_history(history: &mut Vec<Content>, max: usize) {
    let cap = max.max(PINNED_TURNS * 2);
    let len = history.len();
    if len <= cap {
        return;
    }
    let excess = len - cap;
    let excess = excess + excess % 2;
    let end = (PINNED_TURNS + excess).min(len);
    history.drain(PINNED_TURNS..end);
}

#[async_trait]
impl ModelTier for GeminiTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, prompt: &str) -> TierOutcome {
        TierOutcome::collapse(&self.name, self.generate(prompt).await)
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.into()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate.
    fn text(self) -> Result<String, TierError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(TierError::Malformed(format!("Prompt blocked: {reason}")));
        }

        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| TierError::Malformed("No candidates in response".into()))?;

        let text: String = content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(TierError::EmptyReply);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

    fn reply_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    fn tier(server: &MockServer) -> GeminiTier {
        GeminiTier::new(server.uri(), Some("gm-test".into()), "gemini-2.5-flash")
    }

    #[tokio::test]
    async fn successful_reply_is_returned_and_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "gm-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ACK")))
            .mount(&server)
            .await;

        let tier = tier(&server);
        assert_eq!(tier.invoke("prime").await, TierOutcome::Reply("ACK".into()));
        assert_eq!(tier.history_len(), 2);
    }

    #[tokio::test]
    async fn history_is_sent_with_later_prompts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("Noted.")))
            .mount(&server)
            .await;

        let tier = tier(&server);
        tier.invoke("first").await;
        tier.invoke("second").await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["parts"][0]["text"], "first");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "second");
    }

    #[tokio::test]
    async fn server_error_is_unavailable_and_not_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let tier = tier(&server);
        assert_eq!(tier.invoke("hello").await, TierOutcome::Unavailable);
        assert_eq!(tier.history_len(), 0);
    }

    #[tokio::test]
    async fn missing_key_never_calls_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("hi")))
            .expect(0)
            .mount(&server)
            .await;

        let tier = GeminiTier::new(server.uri(), None, "gemini-2.5-flash");
        assert_eq!(tier.invoke("hello").await, TierOutcome::Unavailable);
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_body("late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let tier = tier(&server).with_timeout(Duration::from_millis(100));
        assert_eq!(tier.invoke("hello").await, TierOutcome::Unavailable);
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ok")))
            .mount(&server)
            .await;

        let tier = tier(&server).with_max_history(4);
        for i in 0..5 {
            tier.invoke(&format!("prompt {i}")).await;
        }
        assert_eq!(tier.history_len(), 4);
    }

    #[tokio::test]
    async fn first_exchange_survives_history_cap() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ok")))
            .mount(&server)
            .await;

        let tier = tier(&server).with_max_history(4);
        tier.invoke("You are Steward.\nReply only with: ACK").await;
        for i in 0..3 {
            tier.invoke(&format!("q{i}")).await;
        }
        assert_eq!(tier.history_len(), 4);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[3].body).unwrap();
        let texts: Vec<&str> = body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["parts"][0]["text"].as_str().unwrap())
            .collect();
        assert_eq!(
            texts,
            vec!["You are Steward.\nReply only with: ACK", "ok", "q1", "ok", "q2"]
        );
    }

    #[test]
    fn trim_keeps_roles_alternating() {
        let mut history: Vec<Content> = (0..9)
            .flat_map(|i| [Content::text("user", &format!("u{i}")), Content::text("model", "m")])
            .collect();
        trim_history(&mut history, 5);
        assert_eq!(history.len(), 4);
        let roles: Vec<_> = history.iter().map(|c| c.role.as_deref()).collect();
        assert_eq!(roles, vec![Some("user"), Some("model"), Some("user"), Some("model")]);
        assert_eq!(history[0].parts[0].text.as_deref(), Some("u0"));
        assert_eq!(history[2].parts[0].text.as_deref(), Some("u8"));

        let mut tiny = history.clone();
        trim_history(&mut tiny, 1);
        assert_eq!(tiny.len(), 4);
    }

    #[test]
    fn parse_multi_part_reply() {
        let body: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Good " }, { "text": "evening." }] } }]
        }))
        .unwrap();
        assert_eq!(body.text().unwrap(), "Good evening.");
    }

    #[test]
    fn parse_blocked_prompt() {
        let body: GenerateResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert!(matches!(body.text(), Err(TierError::Malformed(m)) if m.contains("SAFETY")));
    }

    #[test]
    fn parse_empty_candidates() {
        let body: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(matches!(body.text(), Err(TierError::Malformed(_))));
    }
}
