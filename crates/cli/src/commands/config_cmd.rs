//! `taskhawk config` — show (and optionally initialize) the configuration.

use anyhow::Context;
use taskhawk_config::AppConfig;

pub fn run(init: bool) -> anyhow::Result<()> {
    let path = AppConfig::config_dir().join("config.toml");

    if init {
        if path.exists() {
            println!("  Config file already exists: {}", path.display());
        } else {
            std::fs::create_dir_all(AppConfig::config_dir())
                .context("Failed to create config directory")?;
            std::fs::write(&path, AppConfig::default_toml())
                .context("Failed to write config file")?;
            println!("  Wrote default config to {}", path.display());
        }
    }

    let config = AppConfig::load().context("Failed to load config")?;

    println!();
    println!("  Config file: {}", path.display());
    println!("  API key:     {}", if config.has_api_key() { "set" } else { "NOT SET" });
    println!();
    // Debug output redacts secrets
    println!("{config:#?}");
    Ok(())
}
