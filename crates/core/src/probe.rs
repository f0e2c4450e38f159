//! Connectivity probe — decides whether a call takes the online branch.

use async_trait::async_trait;
use std::time::Duration;

/// A bounded-time reachability check.
///
/// Implementations return `true` only when the check completed successfully
/// within `timeout`. Every failure (DNS, refusal, timeout, OS error) is plain
/// `false`: the caller's only decision is online vs. offline.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self, timeout: Duration) -> bool;
}

/// A probe with a fixed answer. Used to force offline mode.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

#[async_trait]
impl ConnectivityProbe for FixedProbe {
    async fn probe(&self, _timeout: Duration) -> bool {
        self.0
    }
}
