//! # Collect Subcommand
//!
//! Builds a checksum table from release dumps. The table is built from
//! every collected root and saved before the optional debug dump is
//! written, so a failed collection or table build leaves no artifact
//! behind.

use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use romfs_collect::Collector;

/// Arguments for the `romfs collect` subcommand.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Asset roots, one per release. Order does not matter; each root's
    /// version is read from its metadata.
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// Output path for the binary checksum table.
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,

    /// Also write `<FILE>.json`, a readable dump keyed by canonical path.
    #[arg(long)]
    pub debug: bool,
}

/// Execute the collect subcommand.
pub fn run_collect(args: &CollectArgs) -> Result<u8> {
    let mut collector = Collector::new(&args.roots).context("failed to open asset roots")?;
    tracing::info!(versions = ?collector.versions(), "collecting");
    collector.collect().context("collection failed")?;
    let table = collector
        .to_table()
        .context("failed to build checksum table")?;

    for stats in collector.stats() {
        println!(
            "{}: version {}, {} files, {} archive members, {} new, {} changed",
            stats.root.display(),
            stats.version,
            stats.files,
            stats.archive_members,
            stats.merge.added,
            stats.merge.changed,
        );
    }

    table
        .save(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!(
        "OK: wrote {} rows (base version {}) to {}",
        table.len(),
        table.base_version(),
        args.out.display()
    );

    if args.debug {
        let path = debug_path(&args.out);
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        collector.write_debug_json(BufWriter::new(file))?;
        println!("OK: wrote debug dump {}", path.display());
    }
    Ok(0)
}

/// `<out>.json`, appended rather than replacing any extension.
pub fn debug_path(out: &Path) -> PathBuf {
    let mut name = OsString::from(out.as_os_str());
    name.push(".json");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use romfs_table::ChecksumTable;

    #[test]
    fn debug_path_appends_extension() {
        assert_eq!(
            debug_path(Path::new("out/checksums.bin")),
            PathBuf::from("out/checksums.bin.json")
        );
    }

    #[test]
    fn collect_writes_table_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("romfs");
        std::fs::create_dir_all(root.join("Data")).unwrap();
        std::fs::write(root.join("Data/Item.bgyml"), b"items").unwrap();
        let out = dir.path().join("checksums.bin");

        let args = CollectArgs {
            roots: vec![root],
            out: out.clone(),
            debug: true,
        };
        assert_eq!(run_collect(&args).unwrap(), 0);

        let table = ChecksumTable::load(&out).unwrap();
        assert_eq!(table.len(), 1);
        let dump: serde_json::Value =
            serde_json::from_slice(&std::fs::read(debug_path(&out)).unwrap()).unwrap();
        assert!(dump.get("Data/Item.bgyml").is_some());
    }

    #[test]
    fn failed_collection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("checksums.bin");
        let args = CollectArgs {
            roots: vec![dir.path().join("missing")],
            out: out.clone(),
            debug: false,
        };
        assert!(run_collect(&args).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn unwritable_table_leaves_no_debug_dump() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("romfs");
        std::fs::create_dir_all(root.join("Data")).unwrap();
        std::fs::write(root.join("Data/Item.bgyml"), b"items").unwrap();
        // A directory where the table file should go.
        let out = dir.path().join("checksums.bin");
        std::fs::create_dir_all(&out).unwrap();

        let args = CollectArgs {
            roots: vec![root],
            out: out.clone(),
            debug: true,
        };
        assert!(run_collect(&args).is_err());
        assert!(!debug_path(&out).exists());
    }

    #[test]
    fn corrupt_root_with_debug_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("romfs");
        std::fs::create_dir_all(root.join("Pack")).unwrap();
        std::fs::write(root.join("Pack/Actor.pack"), b"SARC\x14\x00\xFF\xFE").unwrap();
        let out = dir.path().join("checksums.bin");

        let args = CollectArgs {
            roots: vec![root],
            out: out.clone(),
            debug: true,
        };
        assert!(run_collect(&args).is_err());
        assert!(!out.exists());
        assert!(!debug_path(&out).exists());
    }
}
