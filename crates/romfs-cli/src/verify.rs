//! # Verify Subcommand
//!
//! Checks individual files against a checksum table. Exits 0 only when
//! every file is vanilla.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use romfs_table::ChecksumTable;
use romfs_verify::{Verdict, Verifier};

use crate::config::AppConfig;

/// Arguments for the `romfs verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Files to check. Each must live inside the asset root.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Checksum table built by `romfs collect`.
    #[arg(long, value_name = "FILE")]
    pub table: PathBuf,

    /// Asset root the files belong to. Defaults to the configured game path.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Release version to check against. Defaults to the root's version.
    #[arg(long, value_name = "N")]
    pub version: Option<i32>,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs, config: &AppConfig) -> Result<u8> {
    let root = crate::resolve_root(args.root.as_deref(), config)?;
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("asset root not found: {}", root.display()))?;
    let (ctx, version) = crate::open_root(&root, args.version)?;
    let table = ChecksumTable::load(&args.table)
        .with_context(|| format!("failed to load table {}", args.table.display()))?;
    let verifier = Verifier::new(&table, ctx.dictionaries());

    let mut failures = 0usize;
    for file in &args.files {
        let verdict = verifier.check_file(&absolute(file), &root, version);
        report(file, &verdict);
        if !verdict.is_vanilla() {
            failures += 1;
        }
    }

    tracing::info!(files = args.files.len(), failures, version, "verification complete");
    Ok(u8::from(failures > 0))
}

fn report(file: &Path, verdict: &Verdict) {
    if verdict.is_vanilla() {
        println!("OK: {} is vanilla", file.display());
    } else {
        println!("FAIL: {} {verdict}", file.display());
    }
}

/// Resolve symlinks and relative components so the path can be compared
/// with the canonicalized root. Missing files are returned unchanged and
/// later reported as unreadable.
fn absolute(file: &Path) -> PathBuf {
    std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use romfs_core::{content_checksum, CanonicalKey};
    use romfs_table::ChecksumEntry;

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("romfs");
        std::fs::create_dir_all(root.join("Data")).unwrap();
        std::fs::write(root.join("Data/Item.bgyml"), b"items").unwrap();

        let table = ChecksumTable::from_rows(
            100,
            [(
                CanonicalKey::new("Data/Item.bgyml").name_hash(),
                vec![ChecksumEntry::new(100, 5, content_checksum(b"items"))],
            )],
        )
        .unwrap();
        let table_path = dir.path().join("checksums.bin");
        table.save(&table_path).unwrap();
        (dir, root, table_path)
    }

    #[test]
    fn vanilla_file_exits_zero() {
        let (_dir, root, table) = setup();
        let args = VerifyArgs {
            files: vec![root.join("Data/Item.bgyml")],
            table,
            root: Some(root),
            version: None,
        };
        assert_eq!(run_verify(&args, &AppConfig::default()).unwrap(), 0);
    }

    #[test]
    fn modified_file_exits_one() {
        let (_dir, root, table) = setup();
        std::fs::write(root.join("Data/Item.bgyml"), b"ITEMS").unwrap();
        let args = VerifyArgs {
            files: vec![root.join("Data/Item.bgyml")],
            table,
            root: Some(root),
            version: Some(110),
        };
        assert_eq!(run_verify(&args, &AppConfig::default()).unwrap(), 1);
    }

    #[test]
    fn configured_game_path_is_used() {
        let (_dir, root, table) = setup();
        let config = AppConfig {
            game_path: Some(root.clone()),
        };
        let args = VerifyArgs {
            files: vec![root.join("Data/Item.bgyml"), root.join("Data/Missing.bgyml")],
            table,
            root: None,
            version: None,
        };
        assert_eq!(run_verify(&args, &config).unwrap(), 1);
    }
}
