//! Model tier trait — the abstraction over one language-model backend.
//!
//! A tier knows how to send a single prompt to one backend and get text back.
//! Every backend-specific failure is collapsed into
//! [`TierOutcome::Unavailable`] at the tier boundary; the dispatcher only ever
//! sees the two-outcome contract and owns all fallback policy.
//!
//! Implementations: Gemini (primary online), OpenRouter (secondary online),
//! Ollama (offline).

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use crate::error::TierError;

/// The result of invoking one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    /// A non-empty reply. Build it with [`TierOutcome::reply`] or
    /// [`TierOutcome::collapse`]; the dispatcher treats blank text as unavailable.
    Reply(String),
    /// The backend could not produce a reply, for whatever reason
    Unavailable,
}

impl TierOutcome {
    /// Build a reply, treating blank text as `Unavailable`.
    pub fn reply(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Unavailable
        } else {
            Self::Reply(text)
        }
    }

    /// Collapse a backend result into the two-outcome contract, logging the cause.
    pub fn collapse(tier: &str, result: std::result::Result<String, TierError>) -> Self {
        match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(tier = %tier, error = %TierError::EmptyReply, "Tier unavailable");
                    Self::Unavailable
                } else {
                    Self::Reply(text.to_string())
                }
            }
            Err(e) => {
                warn!(tier = %tier, error = %e, "Tier unavailable");
                Self::Unavailable
            }
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply(_))
    }

    pub fn into_reply(self) -> Option<String> {
        match self {
            Self::Reply(text) => Some(text),
            Self::Unavailable => None,
        }
    }
}

/// The core tier trait.
///
/// Implementations apply their own bounded timeout and never retry.
#[async_trait]
pub trait ModelTier: Send + Sync {
    /// A human-readable name for this tier (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Send a prompt and get a reply or `Unavailable`. Never fails.
    async fn invoke(&self, prompt: &str) -> TierOutcome;
}

/// The three tiers, in preference order.
#[derive(Clone)]
pub struct TierSet {
    pub primary: Arc<dyn ModelTier>,
    pub secondary: Arc<dyn ModelTier>,
    pub offline: Arc<dyn ModelTier>,
}

impl TierSet {
    pub fn new(
        primary: Arc<dyn ModelTier>,
        secondary: Arc<dyn ModelTier>,
        offline: Arc<dyn ModelTier>,
    ) -> Self {
        Self {
            primary,
            secondary,
            offline,
        }
    }
}
