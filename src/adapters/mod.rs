//! External system integrations for brosync.
//!
//! This module provides adapters for the two HTTP services the tool talks
//! to:
//!
//! - [`brostar`] - the BROSTAR registry API (upload tasks, bulk uploads,
//!   registered objects)
//! - [`lizard`] - the Lizard asset-platform API (locations, timeseries,
//!   observation events)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies: the rest of the crate never sees
//! reqwest types, only domain errors and typed wire models. Each client is
//! constructed once per run from validated configuration and shared by
//! `Arc` — no process-wide singletons.
//!
//! ```rust,no_run
//! use brosync::adapters::brostar::BrostarClient;
//! use brosync::config::{secret_string, BrostarConfig, Environment};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BrostarConfig {
//!     api_key: Some(secret_string("api-key".to_string())),
//!     ..Default::default()
//! };
//!
//! let client = BrostarClient::new(&config, Environment::Staging)?;
//! // Use client for upload task operations
//! # Ok(())
//! # }
//! ```

pub mod brostar;
pub mod lizard;
pub mod pagination;
