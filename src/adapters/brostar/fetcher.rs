//! Read-modify-write document fetch
//!
//! Corrections never build a construction document from scratch: the
//! registered document is fetched back from the registry, mutated, and
//! resubmitted. [`DocumentFetcher`] assembles a [`GmwConstruction`] from
//! the registry's well record and its monitoring tube records.

use crate::domain::documents::GmwConstruction;
use crate::domain::{BroId, BrosyncError, Result};
use serde_json::Value;
use std::sync::Arc;

use super::client::{BrostarClient, BrostarEndpoint};

/// Assembles registry documents from the registry's own records.
pub struct DocumentFetcher {
    client: Arc<BrostarClient>,
}

impl DocumentFetcher {
    pub fn new(client: Arc<BrostarClient>) -> Self {
        Self { client }
    }

    /// Fetches everything the registry knows about a well and rebuilds the
    /// construction document for it, tubes in registry order.
    ///
    /// # Errors
    ///
    /// Fails when no well is registered under the BRO id, or when the
    /// registry data does not form a valid construction document.
    pub async fn fetch_gmw_construction(&self, bro_id: &BroId) -> Result<GmwConstruction> {
        let gmws = self
            .client
            .get_list(BrostarEndpoint::GmwGmws, &[("bro_id", bro_id.as_str())])
            .await?;

        let gmw = gmws.into_iter().next().ok_or_else(|| {
            BrosyncError::Other(format!("No GMW found with BRO-ID: {bro_id}"))
        })?;

        let tubes = self
            .client
            .get_list(
                BrostarEndpoint::GmwMonitoringTubes,
                &[("gmw_bro_id", bro_id.as_str())],
            )
            .await?;

        tracing::debug!(
            bro_id = %bro_id,
            tube_count = tubes.len(),
            "Fetched registered construction"
        );

        let mut document = match gmw {
            Value::Object(map) => map,
            other => {
                return Err(BrosyncError::Other(format!(
                    "Unexpected GMW record shape for {bro_id}: {other}"
                )))
            }
        };
        document.insert("monitoringTubes".to_string(), Value::Array(tubes));

        GmwConstruction::from_value(Value::Object(document))
    }
}
