//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod deliver;
pub mod init;
pub mod retarget;
pub mod retry;
pub mod status;
pub mod sync_ids;
pub mod validate;

use crate::adapters::brostar::BrostarClient;
use crate::adapters::lizard::LizardClient;
use crate::config::BrosyncConfig;
use std::sync::Arc;

/// Builds the shared registry client for a command run.
pub(crate) fn brostar_client(config: &BrosyncConfig) -> anyhow::Result<Arc<BrostarClient>> {
    Ok(Arc::new(BrostarClient::new(
        &config.brostar,
        config.environment,
    )?))
}

/// Builds the shared asset-platform client for a command run.
pub(crate) fn lizard_client(config: &BrosyncConfig) -> anyhow::Result<Arc<LizardClient>> {
    Ok(Arc::new(LizardClient::new(&config.lizard)?))
}
