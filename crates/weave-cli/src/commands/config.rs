//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use weave_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "vault_dir": config.vault_dir,
                    "editor": config.editor,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.vault_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  vault_dir: {}", config.vault_dir.display());
            println!(
                "  editor:    {}",
                config.editor.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  log_file:  {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let cleared = value.is_empty() || value == "none";

    match key {
        "vault_dir" => {
            if cleared {
                bail!("vault_dir cannot be empty");
            }
            config.vault_dir = value.into();
        }
        "editor" => {
            config.editor = (!cleared).then(|| value.to_string());
        }
        "log_file" => {
            config.log_file = (!cleared).then(|| value.into());
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: vault_dir, editor, log_file",
                key
            );
        }
    }

    Ok(())
}
