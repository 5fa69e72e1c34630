//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BrosyncConfig, Environment};
use super::secret::secret_string;
use crate::domain::errors::BrosyncError;
use crate::domain::result::Result;
use regex::Regex;
use secrecy::ExposeSecret;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BrosyncConfig
/// 4. Applies environment variable overrides (BROSYNC_* prefix) and picks
///    up the two API keys from BROSTAR_API_KEY / LIZARD_API_KEY when the
///    file leaves them unset
/// 5. Validates the configuration — a missing API key fails here, loudly,
///    before any network call
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use brosync::config::loader::load_config;
///
/// let config = load_config("brosync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BrosyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BrosyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BrosyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: BrosyncConfig = toml::from_str(&contents)
        .map_err(|e| BrosyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config);

    // Validate configuration
    config.validate().map_err(|e| {
        BrosyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BrosyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the BROSYNC_* prefix, plus
/// the out-of-band API key variables.
fn apply_env_overrides(config: &mut BrosyncConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("BROSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("BROSYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("BROSYNC_ENVIRONMENT") {
        match val.to_lowercase().as_str() {
            "production" => config.environment = Environment::Production,
            "staging" => config.environment = Environment::Staging,
            _ => {}
        }
    }

    // BROSTAR overrides
    if let Ok(val) = std::env::var("BROSYNC_BROSTAR_BASE_URL") {
        config.brostar.base_url = Some(val);
    }
    if let Ok(val) = std::env::var("BROSYNC_BROSTAR_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.brostar.timeout_seconds = seconds;
        }
    }

    // Lizard overrides
    if let Ok(val) = std::env::var("BROSYNC_LIZARD_BASE_URL") {
        config.lizard.base_url = val;
    }

    // Delivery overrides
    if let Ok(val) = std::env::var("BROSYNC_DELIVERY_CHUNK_SIZE") {
        if let Ok(size) = val.parse() {
            config.delivery.chunk_size = size;
        }
    }
    if let Ok(val) = std::env::var("BROSYNC_DELIVERY_SKIP_REGISTERED") {
        config.delivery.skip_registered = val.parse().unwrap_or(true);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BROSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("BROSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    // The two API keys are supplied out-of-band; the config file normally
    // references them as ${BROSTAR_API_KEY} / ${LIZARD_API_KEY}, but a bare
    // environment variable works too.
    let brostar_key_unset = config
        .brostar
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().is_empty())
        .unwrap_or(true);
    if brostar_key_unset {
        if let Ok(val) = std::env::var("BROSTAR_API_KEY") {
            config.brostar.api_key = Some(secret_string(val));
        }
    }

    let lizard_key_unset = config
        .lizard
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().is_empty())
        .unwrap_or(true);
    if lizard_key_unset {
        if let Ok(val) = std::env::var("LIZARD_API_KEY") {
            config.lizard.api_key = Some(secret_string(val));
        }
    }
}
