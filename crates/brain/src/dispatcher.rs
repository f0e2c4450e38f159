//! Tiered model dispatch with fallback and one-time priming.
//!
//! One probe per call decides the branch. Online calls walk
//! Primary → Secondary → Offline; offline calls go straight to the offline
//! tier. Before the first online request of a session the primary tier is
//! primed with the persona prompt, exactly once, whatever the outcome.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use steward_core::{ConnectivityProbe, TierOutcome, TierSet};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const EMPTY_PROMPT_REPLY: &str = "Please say something meaningful.";
pub const OFFLINE_FAILURE_REPLY: &str = "My offline engine failed to respond. Please try again.";

/// Per-process dispatch state.
///
/// `primed` only ever goes from `false` to `true`.
#[derive(Debug, Default)]
pub struct DispatchSession {
    primed: bool,
}

impl DispatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session ready to hand to [`Dispatcher::new`].
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }
}

/// Which stage produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// The empty-prompt guard; no tier was asked
    Guard,
    Primary,
    Secondary,
    Offline,
    /// Every tier was unavailable
    OfflineFailure,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guard => "guard",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Offline => "offline",
            Self::OfflineFailure => "offline_failure",
        }
    }
}

impl std::fmt::Display for ReplySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

impl Reply {
    fn new(text: impl Into<String>, source: ReplySource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Orchestrates the probe and the three tiers into one fallback chain.
pub struct Dispatcher {
    tiers: TierSet,
    probe: Arc<dyn ConnectivityProbe>,
    session: Arc<Mutex<DispatchSession>>,
    probe_timeout: Duration,
    priming_prompt: String,
}

impl Dispatcher {
    pub fn new(
        tiers: TierSet,
        probe: Arc<dyn ConnectivityProbe>,
        session: Arc<Mutex<DispatchSession>>,
        priming_prompt: impl Into<String>,
    ) -> Self {
        Self {
            tiers,
            probe,
            session,
            probe_timeout: Duration::from_secs(2),
            priming_prompt: priming_prompt.into(),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub async fn is_primed(&self) -> bool {
        self.session.lock().await.is_primed()
    }

    /// Answer a prompt. Never fails; every path ends in non-empty text.
    pub async fn respond(&self, prompt: &str) -> String {
        self.respond_detailed(prompt).await.text
    }

    /// Like [`respond`](Self::respond), also reporting which stage answered.
    pub async fn respond_detailed(&self, prompt: &str) -> Reply {
        if prompt.trim().is_empty() {
            return Reply::new(EMPTY_PROMPT_REPLY, ReplySource::Guard);
        }

        let online = self.probe.probe(self.probe_timeout).await;
        debug!(online, "Connectivity checked");

        if online {
            self.ensure_primed().await;

            if let TierOutcome::Reply(text) = self.try_tier(ReplySource::Primary, prompt).await {
                return Reply::new(text, ReplySource::Primary);
            }
            if let TierOutcome::Reply(text) = self.try_tier(ReplySource::Secondary, prompt).await {
                return Reply::new(text, ReplySource::Secondary);
            }
            warn!("Online tiers unavailable, falling back to offline engine");
        }

        match self.try_tier(ReplySource::Offline, prompt).await {
            TierOutcome::Reply(text) => Reply::new(text, ReplySource::Offline),
            TierOutcome::Unavailable => {
                warn!("Offline engine unavailable");
                Reply::new(OFFLINE_FAILURE_REPLY, ReplySource::OfflineFailure)
            }
        }
    }

    /// Send the priming prompt once per session.
    ///
    /// The session lock is held across the priming call, so concurrent
    /// callers wait for it and no online request overtakes it.
    async fn ensure_primed(&self) {
        let mut session = self.session.lock().await;
        if session.primed {
            return;
        }

        let outcome = self.tiers.primary.invoke(&self.priming_prompt).await;
        info!(
            tier = self.tiers.primary.name(),
            acknowledged = outcome.is_reply(),
            "Primed online session"
        );
        // Not retried, even when the priming call failed
        session.primed = true;
    }

    async fn try_tier(&self, stage: ReplySource, prompt: &str) -> TierOutcome {
        let tier = match stage {
            ReplySource::Primary => &self.tiers.primary,
            ReplySource::Secondary => &self.tiers.secondary,
            _ => &self.tiers.offline,
        };

        info!(tier = tier.name(), stage = %stage, "Dispatching prompt");
        // Blank text from a tier that skipped `collapse` still counts as unavailable
        let outcome = match tier.invoke(prompt).await {
            TierOutcome::Reply(text) => TierOutcome::reply(text.trim()),
            TierOutcome::Unavailable => TierOutcome::Unavailable,
        };
        if !outcome.is_reply() {
            warn!(tier = tier.name(), stage = %stage, "Tier unavailable, trying next");
        }
        outcome
    }
}
