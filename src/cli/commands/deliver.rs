//! Deliver command implementation
//!
//! Delivers undelivered groundwater level observations of every matching
//! location into their GLD dossiers, chunk by chunk.

use crate::cli::commands::{brostar_client, lizard_client};
use crate::config::load_config;
use crate::core::delivery::AdditionSubmitter;
use clap::Args;

/// Arguments for the deliver command
#[derive(Args, Debug)]
pub struct DeliverArgs {
    /// Location code prefix to deliver for (e.g. a well id prefix)
    #[arg(long)]
    pub prefix: String,
}

impl DeliverArgs {
    /// Execute the deliver command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(prefix = %self.prefix, "Starting delivery run");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if config.application.dry_run {
            println!("🔍 Dry run: nothing will be submitted");
            return Ok(0);
        }

        let brostar = brostar_client(&config)?;
        let lizard = lizard_client(&config)?;
        let submitter = AdditionSubmitter::new(brostar, lizard, config.delivery.clone());

        match submitter
            .deliver_for_locations(&self.prefix, &config.organisation)
            .await
        {
            Ok(summary) => {
                println!("📦 Delivery finished");
                println!("  Chunks submitted:  {}", summary.chunks_total);
                println!("  Chunks delivered:  {}", summary.chunks_delivered);
                println!("  Chunks failed:     {}", summary.chunks_failed);
                println!("  Events delivered:  {}", summary.events_delivered);
                println!("  Locations skipped: {}", summary.locations_skipped);
                if summary.chunks_failed > 0 {
                    Ok(3) // Partial failure exit code
                } else {
                    Ok(0)
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Delivery run failed");
                println!("❌ Delivery run failed: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }
}
