//! Triagectl — governance cockpit for workflow approvals.
//!
//! An operator reviews and decides on pending approvals gating automated
//! workflow runs. Decisions get a short grace period to undo, and survive
//! network unavailability through a durable outbox.
//!
//! Quick start:
//!   triagectl triage --source approvals.json   # work through the queue
//!   triagectl outbox                           # see decisions awaiting replay
//!   triagectl outbox --flush                   # replay them

// Suppress warnings for items that are public library API
#![allow(dead_code)]

mod approval;
mod cli;
mod config;
mod notify;
mod outbox;
mod triage;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::TriageConfig;
use std::path::PathBuf;

/// Triagectl — rapid triage of pending workflow approvals.
#[derive(Parser)]
#[command(
    name = "triagectl",
    version,
    about = "Triage pending workflow approvals with undo and offline-safe submission"
)]
struct Cli {
    /// Path to a config file (default: ~/.triagectl/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work through the pending approval queue interactively
    Triage {
        /// JSON file listing the workspace's approvals
        #[arg(long)]
        source: PathBuf,

        /// Workspace to triage (overrides the config)
        #[arg(long)]
        workspace: Option<String>,
    },

    /// Inspect or replay decisions queued while offline
    Outbox {
        /// Replay queued decisions to the governance endpoint
        #[arg(long)]
        flush: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TriageConfig::load_from(path)?,
        None => TriageConfig::load()?,
    };

    match cli.command {
        Commands::Triage { source, workspace } => {
            if let Some(workspace) = workspace {
                config.workspace = workspace;
            }
            cli::triage::run_triage(&source, &config).await
        }
        Commands::Outbox { flush } => cli::outbox::run_outbox(flush, &config).await,
    }
}
