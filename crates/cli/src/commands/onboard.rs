//! `steward onboard` — First-time setup.

use steward_brain::ResponseTemplates;
use steward_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();
    let responses_path = config_dir.join("responses.json");

    println!("Steward — First-Time Setup");
    println!("==========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if responses_path.exists() {
        println!("  Response templates exist: {}", responses_path.display());
    } else {
        std::fs::write(&responses_path, ResponseTemplates::builtin_json())?;
        println!("✅ Created responses.json at: {}", responses_path.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    let config = AppConfig {
        responses_path: Some(responses_path),
        ..AppConfig::default()
    };
    std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;
    println!("✅ Created config.toml at: {}", config_path.display());

    println!("\n📝 Next steps:");
    println!("   1. Set GEMINI_API_KEY and/or OPENROUTER_API_KEY (environment or .env)");
    println!("   2. Install Ollama and run: ollama pull {}", config.tiers.offline.model);
    println!("   3. Run: steward chat\n");

    Ok(())
}
