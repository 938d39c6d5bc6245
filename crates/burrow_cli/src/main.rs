//! Burrow CLI
//!
//! Command-line tools for checking Burrow data files and bucket catalogs
//! the way crash recovery reads them.
//!
//! # Commands
//!
//! - `verify-log` - Scan a data file and report where recovery would stop
//! - `verify-buckets` - Scan a bucket catalog
//! - `dump-log` - Print recovered entries
//! - `dump-buckets` - Print recovered bucket records

mod commands;

use burrow_core::RecoveryConfig;
use clap::{Parser, Subcommand};
use commands::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Burrow recovery tools.
#[derive(Parser)]
#[command(name = "burrow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Requested read buffer size in bytes
    #[arg(global = true, long, default_value_t = RecoveryConfig::default().buffer_size)]
    buffer_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every entry in a data file
    VerifyLog {
        /// Data file to scan
        file: PathBuf,
    },

    /// Verify every record in a bucket catalog
    VerifyBuckets {
        /// Catalog file to scan
        file: PathBuf,
    },

    /// Dump entries from a data file
    DumpLog {
        /// Data file to read
        file: PathBuf,

        /// Start from this offset
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Maximum number of entries to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Dump records from a bucket catalog
    DumpBuckets {
        /// Catalog file to read
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = RecoveryConfig::new().buffer_size(cli.buffer_size);

    match cli.command {
        Commands::VerifyLog { file } => {
            commands::verify::run_log(&file, &config)?;
        }
        Commands::VerifyBuckets { file } => {
            commands::verify::run_buckets(&file, &config)?;
        }
        Commands::DumpLog {
            file,
            offset,
            limit,
            format,
        } => {
            commands::dump::run_log(&file, &config, offset, limit, format)?;
        }
        Commands::DumpBuckets { file, format } => {
            commands::dump::run_buckets(&file, &config, format)?;
        }
        Commands::Version => {
            println!("Burrow CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Burrow Core v{}", burrow_core::VERSION);
        }
    }

    Ok(())
}
