//! # Inspect Subcommand
//!
//! Prints what the frame header of a file declares, without decompressing
//! it. With `--root`, also prints the file's canonical key and name hash.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use romfs_codec::frame::{self, FrameHeader, MAX_HEADER_LEN};
use romfs_core::canonicalize;

/// Arguments for the `romfs inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File to inspect.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Asset root the file belongs to, for printing its canonical key.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let header = read_header(&args.file)?;
    match header {
        Some(header) => println!("{}: {}", args.file.display(), describe(&header)),
        None => println!("{}: not compressed", args.file.display()),
    }

    if let Some(root) = &args.root {
        let (key, attributes) = canonicalize(&args.file, root)?;
        println!("key: {key}");
        println!("name hash: {}", key.name_hash());
        println!("attributes: {attributes:?}");
    }
    Ok(0)
}

fn read_header(path: &Path) -> Result<Option<FrameHeader>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut prefix = Vec::with_capacity(MAX_HEADER_LEN);
    file.take(MAX_HEADER_LEN as u64)
        .read_to_end(&mut prefix)
        .with_context(|| format!("failed to read {}", path.display()))?;
    frame::inspect(&prefix).with_context(|| format!("invalid frame header in {}", path.display()))
}

fn describe(header: &FrameHeader) -> String {
    match header.dictionary_id {
        Some(id) => format!(
            "zstd frame, {} bytes decompressed, dictionary {id}",
            header.decompressed_size
        ),
        None => format!(
            "zstd frame, {} bytes decompressed, no dictionary",
            header.decompressed_size
        ),
    }
}
