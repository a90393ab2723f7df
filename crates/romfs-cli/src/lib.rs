//! # romfs-cli — CLI for romfs Integrity Tracking
//!
//! Provides the `romfs` command-line interface.
//!
//! ## Subcommands
//!
//! - `romfs collect`: Build a checksum table from several release dumps.
//! - `romfs verify`: Check individual files against a table.
//! - `romfs scan`: Check a whole asset tree and report modified files.
//! - `romfs inspect`: Show the frame header of a compressed file.
//! - `romfs config`: Show or change the configured game path.
//!
//! ```bash
//! romfs collect dumps/100 dumps/110 dumps/121 --out checksums.bin --debug
//! romfs config set-game-path ~/games/romfs
//! romfs scan --table checksums.bin
//! romfs verify ~/games/romfs/Pack/Actor/Player.pack.zs --table checksums.bin
//! ```

pub mod collect;
pub mod config;
pub mod inspect;
pub mod scan;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use romfs_codec::RomfsContext;

use crate::config::AppConfig;

/// Pick the asset root: the explicit `--root` flag, else the configured
/// game path.
pub fn resolve_root(explicit: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.game_path.clone())
        .context("no asset root: pass --root or run `romfs config set-game-path <DIR>`")
}

/// Open the asset root and pick the version to check against: the explicit
/// `--version` flag, else the version detected in the root.
pub fn open_root(root: &Path, version: Option<i32>) -> Result<(RomfsContext, i32)> {
    let ctx = RomfsContext::open(root)
        .with_context(|| format!("failed to open asset root {}", root.display()))?;
    let version = version.unwrap_or_else(|| ctx.version());
    Ok((ctx, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_wins_over_config() {
        let config = AppConfig {
            game_path: Some(PathBuf::from("/configured")),
        };
        let root = resolve_root(Some(Path::new("/explicit")), &config).unwrap();
        assert_eq!(root, PathBuf::from("/explicit"));
    }

    #[test]
    fn configured_root_is_the_fallback() {
        let config = AppConfig {
            game_path: Some(PathBuf::from("/configured")),
        };
        assert_eq!(
            resolve_root(None, &config).unwrap(),
            PathBuf::from("/configured")
        );
    }

    #[test]
    fn missing_root_explains_how_to_fix() {
        let err = resolve_root(None, &AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("set-game-path"));
    }

    #[test]
    fn open_root_uses_detected_version_unless_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let (_, detected) = open_root(dir.path(), None).unwrap();
        assert_eq!(detected, romfs_core::DEFAULT_VERSION);
        let (_, forced) = open_root(dir.path(), Some(121)).unwrap();
        assert_eq!(forced, 121);
    }
}
