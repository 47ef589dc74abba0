//! Config command handler

use crate::args::ConfigSubcommand;
use akiko::config::Config;
use std::io::{self, Write};

/// Dispatch config subcommands
///
/// # Errors
/// Returns a message if a key is unknown, a value does not parse, or the
/// config file cannot be written
pub fn run(
    subcommand: Option<ConfigSubcommand>,
    config: &mut Config,
    defaults: &Config,
) -> Result<(), String> {
    match subcommand {
        None => handle_config_get(config, None),
        Some(ConfigSubcommand::Get { key }) => handle_config_get(config, key),
        Some(ConfigSubcommand::Set { key, value }) => handle_config_set(config, &key, &value),
        Some(ConfigSubcommand::Unset { key }) => handle_config_unset(config, defaults, &key),
        Some(ConfigSubcommand::Reset) => handle_config_reset(),
    }
}

/// Handle the config get subcommand
///
/// # Errors
/// Returns a message if the key is unknown
pub fn handle_config_get(config: &Config, key: Option<String>) -> Result<(), String> {
    if let Some(k) = key {
        let value = config
            .get(&k)
            .ok_or_else(|| format!("Unknown config key: '{k}'"))?;
        println!("{value}");
    } else {
        println!("\n=== Configuration ===\n");
        print!("{config}");
    }
    Ok(())
}

/// Handle the config set subcommand
///
/// # Errors
/// Returns a message if the value is rejected or cannot be saved
pub fn handle_config_set(config: &mut Config, key: &str, value: &str) -> Result<(), String> {
    config.set(key, value)?;
    config
        .save()
        .map_err(|e| format!("Failed to save config: {e}"))?;
    println!("✓ Set {key} = {value}");
    Ok(())
}

/// Handle the config unset subcommand
///
/// # Errors
/// Returns a message if the key is unknown or the config cannot be saved
pub fn handle_config_unset(config: &mut Config, defaults: &Config, key: &str) -> Result<(), String> {
    config.unset(key, defaults)?;
    config
        .save()
        .map_err(|e| format!("Failed to save config: {e}"))?;
    println!("✓ Reset {key} to default");
    Ok(())
}

/// Handle the config reset subcommand
///
/// # Errors
/// Returns a message if the config file cannot be removed
pub fn handle_config_reset() -> Result<(), String> {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return Ok(());
    }

    print!("Are you sure you want to reset config to defaults? (y/n): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().read_line(&mut response).ok();

    let response = response.trim();
    if response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes") {
        Config::reset().map_err(|e| format!("Failed to remove config file: {e}"))?;
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
    Ok(())
}
