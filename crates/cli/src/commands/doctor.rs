//! `steward doctor` — Diagnose system health.

use std::process::Stdio;
use std::time::Duration;
use steward_brain::ResponseTemplates;
use steward_config::AppConfig;
use tokio::process::Command;

/// Whether `program` can be started at all.
async fn can_run(program: &str, args: &[&str]) -> bool {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();
    matches!(
        tokio::time::timeout(Duration::from_secs(5), status).await,
        Ok(Ok(_))
    )
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Steward Doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::active_path();
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid: {}", config_path.display());
                config
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                println!("\n  ⚠️  Fix the config file and run doctor again.");
                return Ok(());
            }
        }
    } else {
        println!(
            "  ⚠️  No config file at {} — using defaults (run `steward onboard`)",
            config_path.display()
        );
        issues += 1;
        AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?
    };

    let tiers = &config.tiers;
    if tiers.primary.api_key.is_some() {
        println!("  ✅ GEMINI_API_KEY configured");
    } else {
        println!("  ⚠️  No GEMINI_API_KEY — the primary tier will be skipped");
        issues += 1;
    }
    if tiers.secondary.api_key.is_some() {
        println!("  ✅ OPENROUTER_API_KEY configured");
    } else {
        println!("  ⚠️  No OPENROUTER_API_KEY — the secondary tier will be skipped");
        issues += 1;
    }

    let probe = steward_providers::build_probe(&config, false);
    if probe.probe(config.connectivity.timeout()).await {
        println!("  ✅ Network reachable ({}:{})", config.connectivity.host, config.connectivity.port);
    } else {
        println!("  ⚠️  Network unreachable — only the offline engine will answer");
        issues += 1;
    }

    if can_run(&tiers.offline.binary, &["--version"]).await {
        println!("  ✅ Offline engine found: {}", tiers.offline.binary);
    } else {
        println!(
            "  ❌ Offline engine not found: {} (install Ollama, then `ollama pull {}`)",
            tiers.offline.binary, tiers.offline.model
        );
        issues += 1;
    }

    let mut speech = Vec::new();
    for engine in &config.speech.engines {
        if can_run(engine, &["--version"]).await {
            speech.push(engine.as_str());
        }
    }
    if speech.is_empty() {
        println!("  ⚠️  No TTS engine found — `chat --voice` will only print replies");
        issues += 1;
    } else {
        println!("  ✅ TTS engines: {}", speech.join(", "));
    }

    match ResponseTemplates::load(config.responses_path.as_deref()) {
        Ok(_) => println!("  ✅ Response templates loaded"),
        Err(e) => {
            println!("  ❌ Response templates invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
