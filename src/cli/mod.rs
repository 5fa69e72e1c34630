//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for brosync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// brosync - BRO registry submission tool
#[derive(Parser, Debug)]
#[command(name = "brosync")]
#[command(version, about, long_about = None)]
#[command(author = "Brosync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "brosync.toml", env = "BROSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BROSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deliver groundwater level observations for matching locations
    Deliver(commands::deliver::DeliverArgs),

    /// Remediate failed upload tasks with known error signatures
    RetryFailed(commands::retry::RetryFailedArgs),

    /// Move addition documents from one GLD dossier to another
    Retarget(commands::retarget::RetargetArgs),

    /// Write registry-assigned GLD ids back into Lizard
    SyncIds(commands::sync_ids::SyncIdsArgs),

    /// Show upload task counts and delivery totals
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
