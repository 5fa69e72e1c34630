//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the brosync configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates, so reaching Ok means the file is usable
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Environment: {:?}", config.environment);
        println!(
            "  BROSTAR: {}",
            config.brostar.resolved_base_url(config.environment)
        );
        println!("  Lizard: {}", config.lizard.base_url);
        println!("  Organisation KvK: {}", config.organisation.kvk);
        println!("  Project Number: {}", config.organisation.project_number);
        println!("  Quality Regime: {}", config.organisation.quality_regime);
        println!("  Chunk Size: {}", config.delivery.chunk_size);
        println!(
            "  Observation Types: {:?}",
            config.delivery.observation_types
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }
}
