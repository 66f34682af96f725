//! # msgvault
//!
//! CLI for archiving message exports with the msgvault engine.
//!
//! ## Commands
//!
//! - `init`: Initialize an archive profile
//! - `backup`: Archive new records from a JSON message export
//! - `status`: Show profile, watermark, and archive status
//! - `reset`: Clear watermarks so records are archived again
//!
//! ## Example
//!
//! ```bash
//! # Initialize the profile
//! msgvault init --account me@example.org
//!
//! # Archive everything new in an export
//! msgvault backup --export ~/exports/phone
//!
//! # Mark the current records as archived without transferring them
//! msgvault backup --export ~/exports/phone --skip
//!
//! # See where the archive stands
//! msgvault status
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod archive;
mod commands;
mod config;
mod convert;
mod credentials;
mod export;
mod watermarks;

use commands::{backup, init, reset, status};

/// CLI for archiving message exports with the msgvault engine.
#[derive(Parser, Debug)]
#[command(name = "msgvault")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the profile, watermarks, and default archive
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize an archive profile
    Init {
        /// Account the archive belongs to
        #[arg(long, short)]
        account: String,

        /// Where to write the mail archive (defaults to <data-dir>/archive)
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Access token (will prompt without echo if not provided)
        #[arg(long)]
        token: Option<String>,
    },

    /// Archive new records from a message export
    Backup {
        /// Directory holding the JSON message export
        #[arg(long)]
        export: Option<PathBuf>,

        /// Overall cap on records archived in this run
        #[arg(long, default_value = "5000")]
        max_items: usize,

        /// Records converted and appended per request
        #[arg(long, default_value = "50")]
        batch_size: usize,

        /// Only archive records from this contact group
        #[arg(long)]
        group: Option<i64>,

        /// Record everything as archived without transferring anything
        #[arg(long)]
        skip: bool,
    },

    /// Show profile, watermark, and archive status
    Status,

    /// Clear watermarks so records are archived again
    Reset {
        /// Only clear this category (sms, mms, calls, chats)
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    match cli.command {
        Commands::Init { account, archive_dir, token } => {
            init::run(&data_dir, &account, archive_dir, token).await?;
        }
        Commands::Backup { export, max_items, batch_size, group, skip } => {
            let opts = backup::BackupOpts {
                export: export.unwrap_or_else(|| data_dir.join("export")),
                max_items,
                batch_size,
                group,
                skip,
            };
            backup::run(&data_dir, opts).await?;
        }
        Commands::Status => {
            status::run(&data_dir).await?;
        }
        Commands::Reset { category } => {
            reset::run(&data_dir, category.as_deref()).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    // Honor RUST_LOG if set, otherwise use the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Get the default data directory for msgvault.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "msgvault", "msgvault")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
