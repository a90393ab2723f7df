//! # Scan Subcommand
//!
//! Checks a whole asset tree against a checksum table and lists the files
//! that differ from vanilla.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use romfs_table::ChecksumTable;
use romfs_verify::{IntegrityReport, ScanOptions, Verifier};

use crate::config::AppConfig;

/// Arguments for the `romfs scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Checksum table built by `romfs collect`.
    #[arg(long, value_name = "FILE")]
    pub table: PathBuf,

    /// Asset root to scan. Defaults to the configured game path.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Release version to check against. Defaults to the root's version.
    #[arg(long, value_name = "N")]
    pub version: Option<i32>,

    /// Stop at the first modified file.
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the full report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Also list files that are not in the table.
    #[arg(long)]
    pub show_extra: bool,
}

/// Execute the scan subcommand.
pub fn run_scan(args: &ScanArgs, config: &AppConfig) -> Result<u8> {
    let root = crate::resolve_root(args.root.as_deref(), config)?;
    let (ctx, version) = crate::open_root(&root, args.version)?;
    let table = ChecksumTable::load(&args.table)
        .with_context(|| format!("failed to load table {}", args.table.display()))?;

    let verifier = Verifier::new(&table, ctx.dictionaries());
    let options = ScanOptions {
        fail_fast: args.fail_fast,
    };
    let report = verifier
        .scan_tree_with(ctx.root(), version, options)
        .with_context(|| format!("failed to scan {}", root.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.show_extra);
    }
    Ok(u8::from(!report.is_clean()))
}

fn print_report(report: &IntegrityReport, show_extra: bool) {
    for file in &report.modified {
        println!("MODIFIED: {} ({})", file.path.display(), file.verdict);
    }
    if show_extra {
        for path in &report.extra {
            println!("EXTRA: {}", path.display());
        }
    }
    if report.aborted {
        println!("stopped after the first modified file");
    }

    let status = if report.is_clean() { "OK" } else { "FAIL" };
    println!(
        "{status}: version {}: {} vanilla, {} modified, {} extra, {} ignored",
        report.version,
        report.vanilla,
        report.modified.len(),
        report.extra.len(),
        report.ignored.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_table(root: &std::path::Path, out: &std::path::Path) {
        let table = romfs_collect::collect([root]).unwrap();
        table.save(out).unwrap();
    }

    #[test]
    fn clean_tree_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("romfs");
        std::fs::create_dir_all(root.join("Data")).unwrap();
        std::fs::write(root.join("Data/Item.bgyml"), b"items").unwrap();
        let table = dir.path().join("checksums.bin");
        collect_table(&root, &table);

        let args = ScanArgs {
            table,
            root: Some(root),
            version: None,
            fail_fast: false,
            json: false,
            show_extra: true,
        };
        assert_eq!(run_scan(&args, &AppConfig::default()).unwrap(), 0);
    }

    #[test]
    fn modified_tree_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("romfs");
        std::fs::create_dir_all(root.join("Data")).unwrap();
        std::fs::write(root.join("Data/Item.bgyml"), b"items").unwrap();
        let table = dir.path().join("checksums.bin");
        collect_table(&root, &table);
        std::fs::write(root.join("Data/Item.bgyml"), b"items, modded").unwrap();

        let args = ScanArgs {
            table,
            root: Some(root),
            version: None,
            fail_fast: true,
            json: true,
            show_extra: false,
        };
        assert_eq!(run_scan(&args, &AppConfig::default()).unwrap(), 1);
    }
}
