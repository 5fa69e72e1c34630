//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "brosync.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing brosync configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export BROSTAR_API_KEY and LIZARD_API_KEY");
                println!("  3. Validate configuration: brosync validate-config");
                println!("  4. Check the registry: brosync status");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate the sample configuration
    fn generate_config() -> String {
        r#"# brosync Configuration File
# BRO registry submission tool

[application]
log_level = "info"
dry_run = false

# Registry environment: "staging" or "production"
environment = "staging"

[brostar]
# API key supplied out-of-band
api_key = "${BROSTAR_API_KEY}"
timeout_seconds = 60

[brostar.poll]
# Upload task polling: fixed interval, client-side ceiling
interval_ms = 3000
ceiling_ms = 45000

[lizard]
base_url = "https://vitens.lizard.net/api/v4"
api_key = "${LIZARD_API_KEY}"
timeout_seconds = 30

[organisation]
# Chamber-of-commerce number of the delivering organisation
kvk = "00000000"
# Registry project number
project_number = "1"
# "IMBRO" or "IMBRO/A"
quality_regime = "IMBRO"

[delivery]
# Observations per addition document
chunk_size = 7000
# Lizard observation type codes to deliver
observation_types = [28, 911]
# Status checks per chunk, and the pause between them (seconds)
status_check_attempts = 5
status_check_interval_seconds = 5
# Skip dossiers with nothing registered under them during bulk retargets
skip_registered = true

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }
}
