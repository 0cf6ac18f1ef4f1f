//! Configuration display.

use console::style;

use crate::cli::icons::dim_arrow;
use crate::config::{Config, Settings};

/// Print the effective settings and the hash of the loaded config.
pub fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults (no config file found)".to_string());

    println!("{}", style("Configuration").bold());
    println!("  {} Source: {}", dim_arrow(), source);
    println!("  {} Hash: {}", dim_arrow(), &config.hash()[..16]);
    println!();
    println!("{}", serde_json::to_string_pretty(settings)?);

    Ok(())
}
