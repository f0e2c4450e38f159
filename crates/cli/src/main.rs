//! Steward CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive conversation or a single message
//! - `classify` — Show the intent for a piece of text
//! - `status`   — Show configuration and connectivity
//! - `doctor`   — Diagnose keys, connectivity and local engines
//! - `onboard`  — Write a default config and response templates

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "steward",
    about = "Steward — a voice/text assistant with tiered model fallback",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Speak replies through the configured TTS engines
        #[arg(long)]
        voice: bool,

        /// Skip the connectivity probe and use only the offline engine
        #[arg(long)]
        offline: bool,
    },

    /// Classify text and print the intent as JSON
    Classify {
        /// The utterance to classify
        text: String,
    },

    /// Show configuration and connectivity
    Status,

    /// Diagnose system health
    Doctor,

    /// Initialize configuration
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A .env file is optional
    dotenvy::dotenv().ok();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat {
            message,
            voice,
            offline,
        } => commands::chat::run(message, voice, offline).await?,
        Commands::Classify { text } => commands::classify::run(&text)?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}
