//! Logging and observability
//!
//! Structured logging for every operation: progress, per-item failures,
//! and batch summaries, all as field-style tracing records.
//!
//! # Example
//!
//! ```no_run
//! use brosync::logging::init_logging;
//! use brosync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(uuid = "0f8a7c1e", status = "COMPLETED", "Upload task finished");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};
