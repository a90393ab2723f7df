//! # romfs CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use romfs_cli::collect::{run_collect, CollectArgs};
use romfs_cli::config::{config_path, run_config, AppConfig, ConfigArgs};
use romfs_cli::inspect::{run_inspect, InspectArgs};
use romfs_cli::scan::{run_scan, ScanArgs};
use romfs_cli::verify::{run_verify, VerifyArgs};

/// romfs integrity toolkit.
///
/// Builds version-indexed checksum tables from release dumps and checks
/// game files against them to tell vanilla content from modified content.
#[derive(Parser, Debug)]
#[command(name = "romfs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a checksum table from one asset root per release.
    Collect(CollectArgs),

    /// Check files against a checksum table.
    Verify(VerifyArgs),

    /// Check every file of an asset root against a checksum table.
    Scan(ScanArgs),

    /// Show the frame header of a compressed file.
    Inspect(InspectArgs),

    /// Show or change the persisted configuration.
    Config(ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let config_file = config_path(cli.config.as_deref())?;
    let config = AppConfig::load(&config_file)?;
    tracing::debug!(config = %config_file.display(), "loaded configuration");

    match cli.command {
        Commands::Collect(args) => run_collect(&args),
        Commands::Verify(args) => run_verify(&args, &config),
        Commands::Scan(args) => run_scan(&args, &config),
        Commands::Inspect(args) => run_inspect(&args),
        Commands::Config(args) => run_config(&args, &config, &config_file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romfs_cli::config::ConfigCommand;

    #[test]
    fn cli_parse_collect() {
        let cli = Cli::try_parse_from([
            "romfs", "collect", "dumps/100", "dumps/110", "--out", "checksums.bin", "--debug",
        ])
        .unwrap();
        if let Commands::Collect(args) = cli.command {
            assert_eq!(
                args.roots,
                vec![PathBuf::from("dumps/100"), PathBuf::from("dumps/110")]
            );
            assert_eq!(args.out, PathBuf::from("checksums.bin"));
            assert!(args.debug);
        } else {
            panic!("expected collect");
        }
    }

    #[test]
    fn cli_parse_collect_requires_root_and_out() {
        assert!(Cli::try_parse_from(["romfs", "collect", "--out", "t.bin"]).is_err());
        assert!(Cli::try_parse_from(["romfs", "collect", "dumps/100"]).is_err());
    }

    #[test]
    fn cli_parse_verify_defaults() {
        let cli =
            Cli::try_parse_from(["romfs", "verify", "a.bgyml", "--table", "t.bin"]).unwrap();
        if let Commands::Verify(args) = cli.command {
            assert_eq!(args.files, vec![PathBuf::from("a.bgyml")]);
            assert_eq!(args.table, PathBuf::from("t.bin"));
            assert!(args.root.is_none());
            assert!(args.version.is_none());
        } else {
            panic!("expected verify");
        }
    }

    #[test]
    fn cli_parse_verify_with_root_and_version() {
        let cli = Cli::try_parse_from([
            "romfs", "verify", "a.bgyml", "b.bgyml", "--table", "t.bin", "--root", "romfs",
            "--version", "121",
        ])
        .unwrap();
        if let Commands::Verify(args) = cli.command {
            assert_eq!(args.files.len(), 2);
            assert_eq!(args.root, Some(PathBuf::from("romfs")));
            assert_eq!(args.version, Some(121));
        } else {
            panic!("expected verify");
        }
    }

    #[test]
    fn cli_parse_scan_flags() {
        let cli =
            Cli::try_parse_from(["romfs", "scan", "--table", "t.bin", "--fail-fast"]).unwrap();
        if let Commands::Scan(args) = cli.command {
            assert!(args.fail_fast);
            assert!(!args.json);
        } else {
            panic!("expected scan");
        }
    }

    #[test]
    fn cli_parse_inspect() {
        let cli = Cli::try_parse_from(["romfs", "inspect", "Item.bgyml.zs"]).unwrap();
        assert!(matches!(cli.command, Commands::Inspect(_)));
    }

    #[test]
    fn cli_parse_config_set_game_path() {
        let cli =
            Cli::try_parse_from(["romfs", "config", "set-game-path", "/games/romfs"]).unwrap();
        if let Commands::Config(args) = cli.command {
            match args.command {
                ConfigCommand::SetGamePath { dir } => {
                    assert_eq!(dir, PathBuf::from("/games/romfs"))
                }
                ConfigCommand::Show => panic!("expected set-game-path"),
            }
        } else {
            panic!("expected config");
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "romfs", "-vv", "config", "show", "--config", "/tmp/romfs.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/romfs.json")));
    }
}
