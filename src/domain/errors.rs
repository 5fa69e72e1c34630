//! Domain error types
//!
//! This module defines the error hierarchy for brosync. All errors are
//! domain-specific and don't expose third-party types such as reqwest errors.

use thiserror::Error;

/// Main brosync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum BrosyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// BROSTAR registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Lizard asset-platform errors
    #[error("Lizard error: {0}")]
    Lizard(#[from] LizardError),

    /// Document validation errors, raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Delivery process errors
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// BROSTAR-specific errors
///
/// Errors that occur when interacting with the BROSTAR registry API.
/// These errors don't expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to the registry
    #[error("Failed to connect to BROSTAR: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Client error (4xx) — never retried
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx) — never retried
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Invalid response from the registry
    #[error("Invalid response from BROSTAR: {0}")]
    InvalidResponse(String),

    /// Upload task not found
    #[error("Upload task not found: {0}")]
    TaskNotFound(String),
}

impl RegistryError {
    /// Whether this error is a connection-level failure that the
    /// transport retry loop may retry. Application-level HTTP statuses
    /// are never retryable.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RegistryError::ConnectionFailed(_) | RegistryError::Timeout(_)
        )
    }
}

/// Lizard-specific errors
///
/// Errors that occur when interacting with the Lizard asset-platform API.
#[derive(Debug, Error)]
pub enum LizardError {
    /// Failed to connect to Lizard
    #[error("Failed to connect to Lizard: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Invalid response from Lizard
    #[error("Invalid response from Lizard: {0}")]
    InvalidResponse(String),

    /// Location not found for a code
    #[error("Location not found: {0}")]
    LocationNotFound(String),
}

impl LizardError {
    /// Connection-level failures eligible for the transport retry loop.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LizardError::ConnectionFailed(_) | LizardError::Timeout(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BrosyncError {
    fn from(err: std::io::Error) -> Self {
        BrosyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BrosyncError {
    fn from(err: serde_json::Error) -> Self {
        BrosyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BrosyncError {
    fn from(err: toml::de::Error) -> Self {
        BrosyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
