//! Error types for the Steward domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum. None of these ever reach the
//! user directly: tiers collapse [`TierError`] into
//! [`TierOutcome::Unavailable`](crate::tier::TierOutcome), and the router turns
//! [`ActionError`] into a short spoken sentence.

use thiserror::Error;

/// The top-level error type for Steward operations that can fail at load time.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Tier error: {0}")]
    Tier(#[from] TierError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Response templates invalid: {0}")]
    Templates(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Why a model tier could not produce a reply.
///
/// Only ever logged: the dispatcher sees nothing but `Unavailable`.
#[derive(Debug, Clone, Error)]
pub enum TierError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Backend returned an empty reply")]
    EmptyReply,

    #[error("Tier not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Engine binary not found: {0}")]
    EngineNotFound(String),

    #[error("Engine process failed (exit code {code}): {stderr}")]
    ProcessFailed { code: i32, stderr: String },

    #[error("Failed to start engine: {0}")]
    Spawn(String),
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to launch {target}: {reason}")]
    SpawnFailed { target: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech engine not found: {0}")]
    EngineNotFound(String),

    #[error("Speech engine {engine} failed: {reason}")]
    Failed { engine: String, reason: String },

    #[error("No speech engine available")]
    NoEngine,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}
