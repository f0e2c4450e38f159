//! The assembled assistant: classifier, router and dispatcher behind one call.

use std::sync::Arc;
use steward_actions::{AppTable, DesktopMedia, ProcessLauncher};
use steward_config::AppConfig;
use steward_core::{ConnectivityProbe, Speaker, TierSet};
use tracing::{debug, info};
use crate::classifier::classify;
use crate::dispatcher::{DispatchSession, Dispatcher};
use crate::router::{CommandRouter, RouteOutcome};
use crate::templates::ResponseTemplates;

/// Entry point for every surface (CLI, voice loop, tests).
pub struct Assistant {
    router: CommandRouter,
}

impl Assistant {
    pub fn new(router: CommandRouter) -> Self {
        Self { router }
    }

    /// Wire everything from configuration with the desktop actions.
    pub fn from_config(
        config: &AppConfig,
        tiers: TierSet,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> steward_core::Result<Self> {
        let templates = ResponseTemplates::load(config.responses_path.as_deref())?;

        let dispatcher = Dispatcher::new(
            tiers,
            probe,
            DispatchSession::shared(),
            config.priming_prompt(),
        )
        .with_probe_timeout(config.connectivity.timeout());

        let apps = AppTable::with_defaults().merge(&config.apps);
        info!(
            assistant = %config.assistant_name,
            apps = apps.len(),
            "Assistant ready"
        );

        Ok(Self::new(CommandRouter::new(
            Arc::new(dispatcher),
            Arc::new(templates),
            apps,
            Arc::new(ProcessLauncher::new()),
            Arc::new(DesktopMedia::with_defaults()),
        )))
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// Classify and route one utterance.
    pub async fn handle_text(&self, text: &str) -> RouteOutcome {
        let intent = classify(text);
        debug!(intent = %intent.kind(), confidence = intent.confidence(), "Classified utterance");
        self.router.route(&intent).await
    }

    /// Like [`handle_text`](Self::handle_text), also speaking the reply.
    pub async fn handle_and_speak(&self, text: &str, speaker: &dyn Speaker) -> RouteOutcome {
        let intent = classify(text);
        debug!(intent = %intent.kind(), confidence = intent.confidence(), "Classified utterance");
        self.router.route_and_speak(&intent, speaker).await
    }
}
