//! Configuration schema types
//!
//! This module defines the configuration structure for brosync. The TOML
//! file maps onto [`BrosyncConfig`]; every section validates itself so a
//! misconfigured run fails before any network call.

use crate::config::SecretString;
use crate::domain::QualityRegime;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Target registry environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// staging.brostar.nl — the default; production must be opted into
    #[default]
    Staging,
    /// www.brostar.nl
    Production,
}

/// Main brosync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Serialize, Deserialize)]
pub struct BrosyncConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// Registry environment (staging or production)
    #[serde(default)]
    pub environment: Environment,

    /// BROSTAR registry configuration
    pub brostar: BrostarConfig,

    /// Lizard asset-platform configuration
    pub lizard: LizardConfig,

    /// Organisation identity used on submissions
    pub organisation: OrganisationConfig,

    /// Time-series delivery settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BrosyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.brostar.validate()?;
        self.lizard.validate()?;
        self.organisation.validate()?;
        self.delivery.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (build and validate documents, submit nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Transport retry configuration
///
/// Applies to connection-level failures only; HTTP error statuses are
/// surfaced immediately, never retried here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Upload-task polling configuration
///
/// The interval and ceiling of the `await_completed` loop. The ceiling is
/// a client-side give-up point, not an error: callers receive the last
/// observed state and branch on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed interval between polls, milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// Total elapsed time before giving up, milliseconds
    #[serde(default = "default_poll_ceiling_ms")]
    pub ceiling_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            ceiling_ms: default_poll_ceiling_ms(),
        }
    }
}

/// BROSTAR registry configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct BrostarConfig {
    /// Explicit base URL override; when unset the environment picks
    /// staging.brostar.nl or www.brostar.nl
    #[serde(default)]
    pub base_url: Option<String>,

    /// Base URL of the public BRO services API (observation summaries);
    /// override is only useful for tests
    #[serde(default = "default_public_api_base")]
    pub public_api_base: String,

    /// API key, normally `${BROSTAR_API_KEY}`
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_brostar_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Transport retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Upload-task polling configuration
    #[serde(default)]
    pub poll: PollConfig,
}

impl BrostarConfig {
    fn validate(&self) -> Result<(), String> {
        match &self.api_key {
            None => {
                return Err(
                    "brostar.api_key is not set; supply BROSTAR_API_KEY".to_string()
                )
            }
            Some(key) if key.expose_secret().is_empty() => {
                return Err("brostar.api_key cannot be empty".to_string())
            }
            Some(_) => {}
        }
        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("brostar.base_url must start with http:// or https://".to_string());
            }
        }
        Ok(())
    }

    /// The base URL this run talks to: the explicit override when set,
    /// otherwise the environment's well-known URL.
    pub fn resolved_base_url(&self, environment: Environment) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => match environment {
                Environment::Production => "https://www.brostar.nl/api".to_string(),
                Environment::Staging => "https://staging.brostar.nl/api".to_string(),
            },
        }
    }
}

impl Default for BrostarConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            public_api_base: default_public_api_base(),
            api_key: None,
            timeout_seconds: default_brostar_timeout_seconds(),
            retry: RetryConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

/// Lizard asset-platform configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct LizardConfig {
    /// Base URL of the Lizard API, e.g. `https://vitens.lizard.net/api/v4`
    pub base_url: String,

    /// API key, normally `${LIZARD_API_KEY}`
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_lizard_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Transport retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl LizardConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("lizard.base_url cannot be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("lizard.base_url must start with http:// or https://".to_string());
        }
        match &self.api_key {
            None => Err("lizard.api_key is not set; supply LIZARD_API_KEY".to_string()),
            Some(key) if key.expose_secret().is_empty() => {
                Err("lizard.api_key cannot be empty".to_string())
            }
            Some(_) => Ok(()),
        }
    }
}

/// Organisation identity stamped onto every submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganisationConfig {
    /// Chamber-of-commerce number of the delivering organisation
    pub kvk: String,

    /// Registry project number submissions are booked under
    pub project_number: String,

    /// Quality regime documents register into
    #[serde(default = "default_quality_regime")]
    pub quality_regime: QualityRegime,
}

impl OrganisationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.kvk.is_empty() {
            return Err("organisation.kvk cannot be empty".to_string());
        }
        if self.project_number.is_empty() {
            return Err("organisation.project_number cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Time-series delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Observations per addition document
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Lizard observation type codes to deliver
    #[serde(default = "default_observation_types")]
    pub observation_types: Vec<u32>,

    /// Status-check attempts per chunk before giving up
    #[serde(default = "default_status_check_attempts")]
    pub status_check_attempts: u32,

    /// Pause between status checks, seconds
    #[serde(default = "default_status_check_interval_seconds")]
    pub status_check_interval_seconds: u64,

    /// Skip dossiers that have nothing registered under them (the
    /// bulk-retarget dedup policy; the source systems disagree on this,
    /// so it is a switch rather than a rule)
    #[serde(default = "default_true")]
    pub skip_registered: bool,
}

impl DeliveryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("delivery.chunk_size must be at least 1".to_string());
        }
        if self.status_check_attempts == 0 {
            return Err("delivery.status_check_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            observation_types: default_observation_types(),
            status_check_attempts: default_status_check_attempts(),
            status_check_interval_seconds: default_status_check_interval_seconds(),
            skip_registered: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default)]
    pub local_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: String::new(),
            local_rotation: default_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_retries() -> usize {
    6
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    16_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

fn default_poll_ceiling_ms() -> u64 {
    45_000
}

fn default_brostar_timeout_seconds() -> u64 {
    60
}

fn default_public_api_base() -> String {
    "https://publiek.broservices.nl/gm/gld/v1".to_string()
}

fn default_lizard_timeout_seconds() -> u64 {
    30
}

fn default_quality_regime() -> QualityRegime {
    QualityRegime::Imbro
}

fn default_chunk_size() -> usize {
    7_000
}

fn default_observation_types() -> Vec<u32> {
    vec![28, 911]
}

fn default_status_check_attempts() -> u32 {
    5
}

fn default_status_check_interval_seconds() -> u64 {
    5
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn valid_config() -> BrosyncConfig {
        BrosyncConfig {
            application: ApplicationConfig::default(),
            environment: Environment::Staging,
            brostar: BrostarConfig {
                api_key: Some(secret_string("key".to_string())),
                ..Default::default()
            },
            lizard: LizardConfig {
                base_url: "https://demo.lizard.net/api/v4".to_string(),
                api_key: Some(secret_string("key".to_string())),
                timeout_seconds: default_lizard_timeout_seconds(),
                retry: RetryConfig::default(),
            },
            organisation: OrganisationConfig {
                kvk: "27296013".to_string(),
                project_number: "5871".to_string(),
                quality_regime: QualityRegime::Imbro,
            },
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_brostar_key_fails() {
        let mut config = valid_config();
        config.brostar.api_key = None;
        let err = config.validate().unwrap_err();
        assert!(err.contains("BROSTAR_API_KEY"));
    }

    #[test]
    fn test_empty_brostar_key_fails() {
        let mut config = valid_config();
        config.brostar.api_key = Some(secret_string(String::new()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_lizard_key_fails() {
        let mut config = valid_config();
        config.lizard.api_key = None;
        let err = config.validate().unwrap_err();
        assert!(err.contains("LIZARD_API_KEY"));
    }

    #[test]
    fn test_resolved_base_url_per_environment() {
        let config = BrostarConfig::default();
        assert_eq!(
            config.resolved_base_url(Environment::Staging),
            "https://staging.brostar.nl/api"
        );
        assert_eq!(
            config.resolved_base_url(Environment::Production),
            "https://www.brostar.nl/api"
        );
    }

    #[test]
    fn test_resolved_base_url_override_wins() {
        let config = BrostarConfig {
            base_url: Some("http://localhost:8080/api/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolved_base_url(Environment::Production),
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn test_delivery_defaults() {
        let delivery = DeliveryConfig::default();
        assert_eq!(delivery.chunk_size, 7000);
        assert_eq!(delivery.observation_types, vec![28, 911]);
        assert_eq!(delivery.status_check_attempts, 5);
        assert_eq!(delivery.status_check_interval_seconds, 5);
        assert!(delivery.skip_registered);
    }

    #[test]
    fn test_poll_defaults() {
        let poll = PollConfig::default();
        assert_eq!(poll.interval_ms, 3_000);
        assert_eq!(poll.ceiling_ms, 45_000);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = valid_config();
        config.delivery.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
