//! `taskhawk tools` — list the registered tools.

use anyhow::Context;
use taskhawk_config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let registry =
        taskhawk_tools::default_registry(&config.tools).context("Failed to build toolkits")?;

    println!();
    println!("  {} tools registered:", registry.len());
    for def in registry.definitions() {
        println!("    {:<12} {}", def.name, def.description);
    }
    println!();
    Ok(())
}
