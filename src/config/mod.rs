//! Configuration management for brosync.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! brosync uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for optional settings
//! - Comprehensive validation
//! - Type-safe configuration structs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use brosync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from file
//! let config = load_config("brosync.toml")?;
//!
//! // Access configuration sections
//! println!("Environment: {:?}", config.environment);
//! println!("Lizard URL: {}", config.lizard.base_url);
//! println!("Chunk size: {}", config.delivery.chunk_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! environment = "staging"
//!
//! [brostar]
//! api_key = "${BROSTAR_API_KEY}"
//!
//! [lizard]
//! base_url = "https://vitens.lizard.net/api/v4"
//! api_key = "${LIZARD_API_KEY}"
//!
//! [organisation]
//! kvk = "27296013"
//! project_number = "5871"
//! quality_regime = "IMBRO"
//!
//! [delivery]
//! chunk_size = 7000
//! observation_types = [28, 911]
//! ```
//!
//! # Environment Variables
//!
//! The two API keys are supplied out-of-band; their absence fails
//! configuration loading before any network call:
//!
//! ```bash
//! export BROSTAR_API_KEY="..."
//! export LIZARD_API_KEY="..."
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BrosyncConfig, BrostarConfig, DeliveryConfig, Environment, LizardConfig,
    LoggingConfig, OrganisationConfig, PollConfig, RetryConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
