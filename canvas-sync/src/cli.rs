//! # canvas-sync CLI Interface (Module)
//!
//! This module implements the full CLI interface for canvas-sync: command
//! parsing, argument validation and the async entrypoint used both by
//! `main` and by integration tests.
//!
//! All core business logic (the hierarchy model, traversal and pipelines)
//! lives in the `canvas-sync-core` crate. This module is strictly CLI glue.

use crate::load_config::load_config;
use anyhow::Result;
use canvas_sync_core::api::InstructureClient;
use canvas_sync_core::hierarchy::Synchronizer;
use canvas_sync_core::report::SyncStatus;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for canvas-sync: mirror a Canvas course hierarchy into a local folder.
#[derive(Parser)]
#[clap(
    name = "canvas-sync",
    version,
    about = "Synchronize modules, assignments and files from a Canvas server to a local folder"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize all selected courses using the given config file
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync { config } => {
            let loaded = load_config(config)?;
            loaded.settings.trace_loaded();
            tracing::info!(command = "sync", "Starting synchronization");

            let api = InstructureClient::new(loaded.api);
            let synchronizer = Synchronizer::new(loaded.settings);
            match synchronizer.sync(&api).await {
                Ok(report) => {
                    tracing::info!(
                        command = "sync",
                        courses = report.courses.len(),
                        downloaded = report.count(SyncStatus::Downloaded),
                        synced = report.count(SyncStatus::AlreadySynced),
                        failed = report.count(SyncStatus::Failed),
                        locked = report.count(SyncStatus::Locked),
                        "Synchronization complete"
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronization failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
