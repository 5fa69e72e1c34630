//! Retry-failed command implementation
//!
//! Sweeps failed upload tasks and patches the ones whose diagnostic log
//! matches a known remediation; everything else stays put for manual
//! handling.

use crate::cli::commands::brostar_client;
use crate::config::load_config;
use crate::core::upload::UploadCoordinator;
use clap::Args;

/// Arguments for the retry-failed command
#[derive(Args, Debug)]
pub struct RetryFailedArgs {
    /// Also delete PROCESSING tasks whose log matches this substring
    #[arg(long)]
    pub delete_stuck: Option<String>,
}

impl RetryFailedArgs {
    /// Execute the retry-failed command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Remediating failed upload tasks");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let coordinator = UploadCoordinator::new(brostar_client(&config)?);

        let summary = match coordinator.remediate_failed().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Remediation sweep failed");
                println!("❌ Remediation sweep failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!("🔧 Remediation finished");
        println!("  Examined:   {}", summary.examined);
        println!("  Remediated: {}", summary.remediated);
        println!("  Manual:     {}", summary.skipped);
        println!("  Failed:     {}", summary.failed);

        if let Some(ref log_filter) = self.delete_stuck {
            match coordinator.delete_stuck_tasks(log_filter).await {
                Ok(deleted) => println!("  Stuck tasks deleted: {deleted}"),
                Err(e) => {
                    println!("❌ Failed to delete stuck tasks: {e}");
                    return Ok(5);
                }
            }
        }

        Ok(0)
    }
}
