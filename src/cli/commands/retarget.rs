//! Retarget command implementation
//!
//! Moves the addition documents of one GLD dossier onto another:
//! delete-then-recreate per task, both phases polled to completion.

use crate::cli::commands::brostar_client;
use crate::config::load_config;
use crate::core::upload::UploadCoordinator;
use crate::domain::BroId;
use clap::Args;
use std::str::FromStr;

/// Arguments for the retarget command
#[derive(Args, Debug)]
pub struct RetargetArgs {
    /// Dossier currently holding the documents
    #[arg(long)]
    pub current: String,

    /// Dossier the documents should live under
    #[arg(long)]
    pub target: String,

    /// Where to write the delete-ids audit CSV
    #[arg(long, default_value = "delete_ids.csv")]
    pub audit_file: String,
}

impl RetargetArgs {
    /// Execute the retarget command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let current = match BroId::from_str(&self.current) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ Invalid current dossier id: {e}");
                return Ok(2);
            }
        };
        let target = match BroId::from_str(&self.target) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ Invalid target dossier id: {e}");
                return Ok(2);
            }
        };

        tracing::info!(current = %current, target = %target, "Re-targeting dossier");

        let coordinator = UploadCoordinator::new(brostar_client(&config)?);
        let pairs = vec![(current, target)];
        let summary = match coordinator
            .retarget_dossiers(&pairs, config.delivery.skip_registered)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Retarget failed");
                println!("❌ Retarget failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!("🔁 Retarget finished");
        println!("  Pairs:    {}", summary.total);
        println!("  Migrated: {}", summary.migrated);
        println!("  Skipped:  {}", summary.skipped);
        println!("  Failed:   {}", summary.failed);

        if let Err(e) = summary.write_delete_ids_csv(&self.audit_file) {
            println!("❌ Failed to write audit file: {e}");
            return Ok(5);
        }
        println!("  Audit:    {}", self.audit_file);

        if summary.failed > 0 {
            Ok(3) // Partial failure exit code
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retarget_args() {
        let args = RetargetArgs {
            current: "GLD000000001".to_string(),
            target: "GLD000000002".to_string(),
            audit_file: "delete_ids.csv".to_string(),
        };
        assert_eq!(args.current, "GLD000000001");
        assert_eq!(args.audit_file, "delete_ids.csv");
    }
}
