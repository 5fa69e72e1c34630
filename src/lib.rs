// brosync - BRO registry submission tool
// Copyright (c) 2025 Brosync Contributors
// Licensed under the MIT License

//! # brosync - BRO registry submission and synchronization
//!
//! brosync submits groundwater monitoring well (GMW) and groundwater level
//! (GLD) documents to the national BRO registry through the BROSTAR API,
//! and synchronizes the registry-assigned identifiers back into the Lizard
//! asset platform.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Building** registry-compliant documents from loosely-typed source
//!   data, with alias tables for both naming conventions
//! - **Submitting** documents as asynchronous upload tasks and polling them
//!   to a terminal state
//! - **Remediating** failed tasks whose diagnostic log matches a known
//!   error signature
//! - **Delivering** large observation series in registry-sized chunks,
//!   advancing the asset platform's delivered watermark only on confirmed
//!   success
//!
//! ## Architecture
//!
//! brosync follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (upload coordination, chunked delivery,
//!   id sync)
//! - [`adapters`] - External integrations (BROSTAR, Lizard)
//! - [`domain`] - Core domain types and documents
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brosync::adapters::brostar::BrostarClient;
//! use brosync::config::load_config;
//! use brosync::core::upload::UploadCoordinator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration (fails fast on missing API keys)
//!     let config = load_config("brosync.toml")?;
//!
//!     // One client per run, shared by reference
//!     let client = Arc::new(BrostarClient::new(&config.brostar, config.environment)?);
//!     let coordinator = UploadCoordinator::new(client);
//!
//!     // Sweep failed tasks through the remediation table
//!     let summary = coordinator.remediate_failed().await?;
//!     println!("Remediated {} tasks", summary.remediated);
//!     Ok(())
//! }
//! ```
//!
//! ## The upload task lifecycle
//!
//! An upload task is the registry's unit of asynchronous work. Locally it
//! is built and validated; remotely it moves `PENDING` → `PROCESSING` →
//! `COMPLETED`/`FAILED`/`UNFINISHED`. The client polls at a fixed interval
//! up to a ceiling; hitting the ceiling returns the last observed state
//! rather than raising, and callers branch on it:
//!
//! ```rust,no_run
//! # use brosync::adapters::brostar::BrostarClient;
//! # async fn example(client: &BrostarClient) -> brosync::domain::Result<()> {
//! let record = client.await_completed("0f8a7c1e").await?;
//! if record.status.is_completed() {
//!     println!("bro id: {:?}", record.assigned_bro_id());
//! } else {
//!     println!("still {} after the ceiling", record.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! brosync uses the [`domain::BrosyncError`] type for all errors:
//!
//! ```rust,no_run
//! use brosync::domain::BrosyncError;
//!
//! fn example() -> Result<(), BrosyncError> {
//!     let config = brosync::config::load_config("brosync.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! brosync uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(uuid = "0f8a7c1e", "Upload task created");
//! warn!(uuid = "0f8a7c1e", status = "UNFINISHED", "Task not completed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
