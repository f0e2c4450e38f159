//! Configuration loading, validation, and management for Steward.
//!
//! Loads configuration from `~/.steward/config.toml` (or `$STEWARD_CONFIG`)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use steward_core::LaunchTarget;

/// The root configuration structure.
///
/// Maps directly to `~/.steward/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The name the assistant answers to
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// How the assistant addresses the user
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Override the generated persona prompt entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Optional JSON file overriding the built-in response templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses_path: Option<PathBuf>,

    /// Online/offline probe settings
    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    /// Language-model tiers, in preference order
    #[serde(default)]
    pub tiers: TiersConfig,

    /// Extra application names for `open_app` (merged over the built-in table)
    #[serde(default)]
    pub apps: BTreeMap<String, LaunchTarget>,

    /// Text-to-speech settings
    #[serde(default)]
    pub speech: SpeechConfig,
}

fn default_assistant_name() -> String {
    "Steward".into()
}
fn default_user_name() -> String {
    "friend".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// A highly-available host to handshake with
    #[serde(default = "default_probe_host")]
    pub host: String,

    #[serde(default = "default_probe_port")]
    pub port: u16,

    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_probe_host() -> String {
    "8.8.8.8".into()
}
fn default_probe_port() -> u16 {
    53
}
fn default_probe_timeout_ms() -> u64 {
    2000
}

impl ConnectivityConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            host: default_probe_host(),
            port: default_probe_port(),
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TiersConfig {
    #[serde(default)]
    pub primary: GeminiConfig,

    #[serde(default)]
    pub secondary: OpenRouterConfig,

    #[serde(default)]
    pub offline: OllamaConfig,
}

/// Primary online tier.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_url")]
    pub api_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_online_timeout")]
    pub timeout_secs: u64,

    /// Chat-session messages kept for context (user + model turns)
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_online_timeout() -> u64 {
    30
}
fn default_max_history() -> usize {
    40
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_gemini_url(),
            model: default_gemini_model(),
            timeout_secs: default_online_timeout(),
            max_history: default_max_history(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_history", &self.max_history)
            .finish()
    }
}

/// Secondary online tier.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openrouter_url")]
    pub api_url: String,

    #[serde(default = "default_openrouter_model")]
    pub model: String,

    #[serde(default = "default_openrouter_temperature")]
    pub temperature: f32,

    #[serde(default = "default_openrouter_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_online_timeout")]
    pub timeout_secs: u64,
}

fn default_openrouter_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_openrouter_model() -> String {
    "deepseek/deepseek-r1-0528:free".into()
}
fn default_openrouter_temperature() -> f32 {
    0.6
}
fn default_openrouter_max_tokens() -> u32 {
    300
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_openrouter_url(),
            model: default_openrouter_model(),
            temperature: default_openrouter_temperature(),
            max_tokens: default_openrouter_max_tokens(),
            timeout_secs: default_online_timeout(),
        }
    }
}

impl std::fmt::Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Offline tier (local Ollama engine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Executable name or absolute path
    #[serde(default = "default_ollama_binary")]
    pub binary: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,

    #[serde(default = "default_offline_timeout")]
    pub timeout_secs: u64,
}

fn default_ollama_binary() -> String {
    "ollama".into()
}
fn default_ollama_model() -> String {
    "phi".into()
}
fn default_offline_timeout() -> u64 {
    60
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            binary: default_ollama_binary(),
            model: default_ollama_model(),
            timeout_secs: default_offline_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// TTS commands tried in order; the first one that works speaks the reply
    #[serde(default = "default_speech_engines")]
    pub engines: Vec<String>,
}

fn default_speech_engines() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["say".into()]
    } else {
        vec!["espeak-ng".into(), "espeak".into()]
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engines: default_speech_engines(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `$STEWARD_CONFIG` or `~/.steward/config.toml`.
    ///
    /// Environment variables override the file:
    /// - `GEMINI_API_KEY`, `OPENROUTER_API_KEY`
    /// - `STEWARD_OLLAMA_BIN`, `STEWARD_OFFLINE_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::active_path();
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Keys in the file win over
    /// environment keys; engine settings from the environment win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.tiers.primary.api_key.is_none() {
            self.tiers.primary.api_key = non_empty("GEMINI_API_KEY");
        }
        if self.tiers.secondary.api_key.is_none() {
            self.tiers.secondary.api_key = non_empty("OPENROUTER_API_KEY");
        }
        if let Some(binary) = non_empty("STEWARD_OLLAMA_BIN") {
            self.tiers.offline.binary = binary;
        }
        if let Some(model) = non_empty("STEWARD_OFFLINE_MODEL") {
            self.tiers.offline.model = model;
        }
    }

    /// The file [`load`](Self::load) reads: `$STEWARD_CONFIG` if set,
    /// otherwise [`config_path`](Self::config_path).
    pub fn active_path() -> PathBuf {
        Self::resolve_path(|key| std::env::var(key).ok())
    }

    fn resolve_path(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
        lookup("STEWARD_CONFIG")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::config_path)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".steward")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.connectivity.host.trim().is_empty() || self.connectivity.port == 0 {
            return Err(ConfigError::ValidationError(
                "connectivity.host must be set and connectivity.port must be non-zero".into(),
            ));
        }

        if self.connectivity.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "connectivity.timeout_ms must be > 0".into(),
            ));
        }

        let tiers = &self.tiers;
        if tiers.primary.timeout_secs == 0
            || tiers.secondary.timeout_secs == 0
            || tiers.offline.timeout_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "tier timeout_secs must be > 0".into(),
            ));
        }

        if !(0.0..=2.0).contains(&tiers.secondary.temperature) {
            return Err(ConfigError::ValidationError(
                "tiers.secondary.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if tiers.offline.binary.trim().is_empty() || tiers.offline.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tiers.offline.binary and tiers.offline.model must be set".into(),
            ));
        }

        Ok(())
    }

    /// The persona prompt shared by the priming call and the offline tier.
    pub fn system_prompt(&self) -> String {
        if let Some(ref prompt) = self.system_prompt {
            return prompt.clone();
        }
        format!(
            "ROLE: {}\nUSER: {}\nSTYLE: short, informative, polite, confident\nRULES: stay in character, no AI disclaimers\n",
            self.assistant_name, self.user_name
        )
    }

    /// The one-time warm-up prompt sent to the primary tier.
    pub fn priming_prompt(&self) -> String {
        format!("{}\nReply only with: ACK", self.system_prompt())
    }

    /// Whether either online tier has a key.
    pub fn has_online_key(&self) -> bool {
        self.tiers.primary.api_key.is_some() || self.tiers.secondary.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            user_name: default_user_name(),
            system_prompt: None,
            connectivity: ConnectivityConfig::default(),
            tiers: TiersConfig::default(),
            apps: BTreeMap::new(),
            speech: SpeechConfig::default(),
            responses_path: None,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
