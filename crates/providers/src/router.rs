//! Tier assembly — builds the tier set and probe from configuration.

use std::sync::Arc;
use steward_config::AppConfig;
use steward_core::{ConnectivityProbe, FixedProbe, TierSet};
use tracing::info;
use crate::{GeminiTier, OllamaTier, OpenRouterTier, TcpProbe};

/// Build the three tiers in preference order: Gemini, OpenRouter, Ollama.
///
/// Tiers without a key are still built; they report `Unavailable` without
/// touching the network, which lets the dispatcher fall through naturally.
pub fn build_from_config(config: &AppConfig) -> TierSet {
    let tiers = &config.tiers;

    let primary = GeminiTier::from_config(&tiers.primary);
    let secondary = OpenRouterTier::from_config(&tiers.secondary, &config.assistant_name);
    let offline = OllamaTier::from_config(&tiers.offline)
        .with_persona(config.system_prompt(), &config.assistant_name);

    info!(
        primary = %tiers.primary.model,
        primary_key = tiers.primary.api_key.is_some(),
        secondary = %tiers.secondary.model,
        secondary_key = tiers.secondary.api_key.is_some(),
        offline = %tiers.offline.model,
        "Tiers configured"
    );

    TierSet::new(Arc::new(primary), Arc::new(secondary), Arc::new(offline))
}

/// Build the connectivity probe. `force_offline` pins the answer to "offline".
pub fn build_probe(config: &AppConfig, force_offline: bool) -> Arc<dyn ConnectivityProbe> {
    if force_offline {
        info!("Offline mode forced; skipping connectivity probe");
        return Arc::new(FixedProbe(false));
    }
    Arc::new(TcpProbe::from_config(&config.connectivity))
}
