//! Lizard asset-platform adapter
//!
//! HTTP integration with the Lizard API: source of raw observation events
//! and secondary store for registry-assigned identifiers.

pub mod client;
pub mod models;

pub use client::LizardClient;
pub use models::{LizardEvent, Location, TimeseriesInfo};
