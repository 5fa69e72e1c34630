//! Sync-ids command implementation
//!
//! Writes the GLD ids of completed start registrations into the matching
//! Lizard tube locations.

use crate::cli::commands::{brostar_client, lizard_client};
use crate::config::load_config;
use crate::core::sync::IdSync;
use clap::Args;

/// Arguments for the sync-ids command
#[derive(Args, Debug)]
pub struct SyncIdsArgs {
    /// Sync a single location instead of sweeping all registrations
    #[arg(long, requires = "gld_id")]
    pub location_code: Option<String>,

    /// GLD id to store on the single location
    #[arg(long, requires = "location_code")]
    pub gld_id: Option<String>,
}

impl SyncIdsArgs {
    /// Execute the sync-ids command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let sync = IdSync::new(brostar_client(&config)?, lizard_client(&config)?);

        if let (Some(code), Some(gld_id)) = (&self.location_code, &self.gld_id) {
            tracing::info!(code = %code, gld_id = %gld_id, "Writing single GLD id");
            return match sync.write_gld_id(code, gld_id).await {
                Ok(()) => {
                    println!("✅ Stored {gld_id} on {code}");
                    Ok(0)
                }
                Err(e) => {
                    println!("❌ Failed to store id: {e}");
                    Ok(5) // Fatal error exit code
                }
            };
        }

        tracing::info!("Syncing all completed start registrations");
        match sync.ingest_gld_ids().await {
            Ok(summary) => {
                println!("🔗 Id sync finished");
                println!("  Examined: {}", summary.examined);
                println!("  Updated:  {}", summary.updated);
                println!("  Skipped:  {}", summary.skipped);
                println!("  Failed:   {}", summary.failed);
                Ok(if summary.failed > 0 { 3 } else { 0 })
            }
            Err(e) => {
                tracing::error!(error = %e, "Id sync failed");
                println!("❌ Id sync failed: {e}");
                Ok(5)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_ids_args_default() {
        let args = SyncIdsArgs {
            location_code: None,
            gld_id: None,
        };
        assert!(args.location_code.is_none());
    }
}
