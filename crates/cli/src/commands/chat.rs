//! `steward chat` — Interactive or single-message conversation.

use std::sync::Arc;
use steward_brain::{Assistant, LoopEnd, run_loop};
use steward_channels::{CliListener, ConsoleSpeaker, SpeakerChain};
use steward_config::AppConfig;
use steward_core::Speaker;
use tokio::sync::mpsc;

pub async fn run(
    message: Option<String>,
    voice: bool,
    offline: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !offline && !config.has_online_key() {
        eprintln!();
        eprintln!("  NOTE: No online API key configured; replies will come from the offline engine.");
        eprintln!("  Set GEMINI_API_KEY and/or OPENROUTER_API_KEY, or add them to:");
        eprintln!("    {}", AppConfig::active_path().display());
        eprintln!();
    }

    let tiers = steward_providers::build_from_config(&config);
    let probe = steward_providers::build_probe(&config, offline);
    let assistant = Arc::new(
        Assistant::from_config(&config, tiers, probe)
            .map_err(|e| format!("Failed to start assistant: {e}"))?,
    );

    let speaker: Arc<dyn Speaker> = if voice {
        Arc::new(SpeakerChain::from_config(&config.speech).with_transcript(&config.assistant_name))
    } else {
        Arc::new(ConsoleSpeaker::new(&config.assistant_name))
    };

    if let Some(msg) = message {
        // Single message mode
        assistant.handle_and_speak(&msg, speaker.as_ref()).await;
        return Ok(());
    }

    println!();
    println!("  {} — Interactive Mode", config.assistant_name);
    println!();
    println!("  Online:   {} / {}", config.tiers.primary.model, config.tiers.secondary.model);
    println!("  Offline:  {} ({})", config.tiers.offline.model, config.tiers.offline.binary);
    println!("  Voice:    {}", if voice { "on" } else { "off" });
    println!();
    println!("  Type a message and press Enter. Say 'exit' to quit.");
    println!("  Ctrl+C cancels a reply in progress; press it again while idle to quit.");
    println!();

    let (interrupt_tx, interrupt_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt_tx.send(()).await.is_err() {
                break;
            }
        }
    });

    let listener = CliListener::new();
    let end = run_loop(&listener, speaker.as_ref(), assistant, interrupt_rx)
        .await
        .map_err(|e| format!("Input error: {e}"))?;

    if end != LoopEnd::Terminated {
        println!();
        println!("  Goodbye!");
    }
    println!();

    Ok(())
}
