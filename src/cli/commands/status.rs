//! Status command implementation
//!
//! This module implements the `status` command for displaying upload task
//! counts per lifecycle state and overall delivery totals.

use crate::cli::commands::brostar_client;
use crate::config::load_config;
use crate::core::upload::UploadCoordinator;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also compute delivered-event totals (extra registry calls)
    #[arg(long)]
    pub totals: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking upload task status");

        println!("📊 Upload Task Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let coordinator = UploadCoordinator::new(brostar_client(&config)?);

        let counts = match coordinator.status_counts().await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to reach the registry");
                println!("   Error: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        println!("{:<15} {:<10}", "Status", "Tasks");
        println!("{}", "-".repeat(25));
        for (status, count) in &counts {
            println!("{:<15} {:<10}", status.to_string(), count);
        }
        println!();

        if self.totals {
            match coordinator.total_events_delivered().await {
                Ok(report) => {
                    println!("Delivered observations: {}", report.total_events);
                    println!("Distinct dossiers:      {}", report.distinct_dossiers);
                    println!();
                }
                Err(e) => {
                    println!("❌ Failed to compute delivery totals");
                    println!("   Error: {e}");
                    return Ok(5); // Fatal error exit code
                }
            }
        }

        Ok(0)
    }
}
