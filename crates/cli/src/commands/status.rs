//! `steward status` — Show configuration and connectivity.

use steward_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let tiers = &config.tiers;
    let key = |k: &Option<String>| if k.is_some() { "key set" } else { "no key" };

    println!("Steward Status");
    println!("==============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Assistant:    {} (user: {})", config.assistant_name, config.user_name);
    println!("  Primary:      {} ({})", tiers.primary.model, key(&tiers.primary.api_key));
    println!("  Secondary:    {} ({})", tiers.secondary.model, key(&tiers.secondary.api_key));
    println!("  Offline:      {} via {}", tiers.offline.model, tiers.offline.binary);
    println!(
        "  Probe:        {}:{} ({} ms)",
        config.connectivity.host, config.connectivity.port, config.connectivity.timeout_ms
    );
    println!("  Speech:       {}", config.speech.engines.join(", "));

    let probe = steward_providers::build_probe(&config, false);
    let online = probe.probe(config.connectivity.timeout()).await;
    println!("  Network:      {}", if online { "online" } else { "offline" });

    let config_path = AppConfig::active_path();
    if config_path.exists() {
        println!("\n  ✅ Config file found: {}", config_path.display());
    } else {
        println!("\n  ⚠️  No config file — run `steward onboard` first");
    }

    Ok(())
}
