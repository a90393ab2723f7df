//! # Process Configuration
//!
//! The only persisted setting is the path of the user's asset root. It is
//! stored as JSON at `<data_local_dir>/romfs/config.json`; `ROMFS_CONFIG` or
//! `--config` point elsewhere.
//!
//! Derived values (detected version, dictionary pack path) are computed
//! from the game path on demand and never written.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "ROMFS_CONFIG";

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Asset root used when `--root` is not given.
    pub game_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load from `path`. A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Write to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Configuration file location: `--config`, then `ROMFS_CONFIG`, then the
/// per-user data directory.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::data_local_dir()
        .map(|dir| dir.join("romfs").join("config.json"))
        .context("cannot determine the local data directory; pass --config")
}

/// Arguments for the `romfs config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the configuration and the values derived from it.
    Show,

    /// Set the asset root used when `--root` is omitted.
    SetGamePath {
        /// Directory containing the unpacked romfs.
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs, config: &AppConfig, path: &Path) -> Result<u8> {
    match &args.command {
        ConfigCommand::Show => cmd_show(config, path),
        ConfigCommand::SetGamePath { dir } => cmd_set_game_path(config, path, dir),
    }
}

fn cmd_show(config: &AppConfig, path: &Path) -> Result<u8> {
    let mut shown = serde_json::json!({
        "configFile": path,
        "gamePath": config.game_path,
    });
    if let Some(root) = &config.game_path {
        shown["dictionaryPath"] = serde_json::json!(romfs_codec::context::dictionary_path(root));
        match romfs_core::detect_version(root) {
            Ok(version) => shown["version"] = version.into(),
            Err(e) => tracing::warn!("cannot detect version of {}: {e}", root.display()),
        }
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(0)
}

fn cmd_set_game_path(config: &AppConfig, path: &Path, dir: &Path) -> Result<u8> {
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }
    let dir = std::fs::canonicalize(dir)
        .with_context(|| format!("failed to resolve {}", dir.display()))?;
    let mut updated = config.clone();
    updated.game_path = Some(dir.clone());
    updated.save(path)?;
    println!("OK: game path set to {}", dir.display());
    Ok(0)
}
