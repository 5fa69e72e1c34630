//! Core business logic for brosync.
//!
//! This module contains the orchestration over the two adapters.
//!
//! # Modules
//!
//! - [`upload`] - Upload-task lifecycle: submit, poll, branch, remediate
//! - [`delivery`] - Chunked time-series delivery with watermark advance
//! - [`sync`] - Writing registry-assigned ids back into the asset platform
//!
//! # Submission Workflow
//!
//! Every registry operation runs the same lifecycle:
//!
//! 1. **Build**: assemble a schema-valid document (from source rows, or by
//!    fetching the registered document for corrections)
//! 2. **Validate**: metadata invariants and document shape, before any
//!    network call
//! 3. **Submit**: create the upload task
//! 4. **Poll**: fixed-interval polling up to a client-side ceiling —
//!    hitting the ceiling is a value, not an error
//! 5. **Branch**: completed tasks release their side effects (watermark
//!    advance, id sync); failed tasks go through the remediation table or
//!    stay put for manual handling
//!
//! # Example
//!
//! ```rust,no_run
//! use brosync::adapters::brostar::BrostarClient;
//! use brosync::config::load_config;
//! use brosync::core::upload::UploadCoordinator;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("brosync.toml")?;
//! let client = Arc::new(BrostarClient::new(&config.brostar, config.environment)?);
//! let coordinator = UploadCoordinator::new(client);
//!
//! let summary = coordinator.remediate_failed().await?;
//! println!("Remediated: {}", summary.remediated);
//! # Ok(())
//! # }
//! ```

pub mod delivery;
pub mod sync;
pub mod upload;
