//! Registry-id synchronization back into the asset platform
//!
//! Once a start registration completes, the registry assigns a GLD id.
//! The asset platform is the secondary store for those ids: they land in
//! the location's `extra_metadata.bro` section, keyed by quality regime.

use crate::adapters::brostar::{BrostarClient, BrostarEndpoint};
use crate::adapters::lizard::LizardClient;
use crate::domain::{BroId, LizardError, LocationCode, Result};
use serde_json::{json, Value};
use std::sync::Arc;

/// Outcome counts of an id-sync sweep.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Completed start registrations examined
    pub examined: usize,

    /// Locations patched with a registry id
    pub updated: usize,

    /// Registrations without a matching location (or without an id)
    pub skipped: usize,

    /// Patches that failed
    pub failed: usize,
}

/// Writes registry-assigned ids into Lizard location metadata.
pub struct IdSync {
    brostar: Arc<BrostarClient>,
    lizard: Arc<LizardClient>,
}

impl IdSync {
    pub fn new(brostar: Arc<BrostarClient>, lizard: Arc<LizardClient>) -> Self {
        Self { brostar, lizard }
    }

    /// Sweep all completed GLD start registrations and store their
    /// assigned ids on the matching tube locations. One registration's
    /// failure never stops the sweep.
    pub async fn ingest_gld_ids(&self) -> Result<SyncSummary> {
        let tasks = self
            .brostar
            .get_list(
                BrostarEndpoint::UploadTasks,
                &[
                    ("registration_type", "GLD_StartRegistration"),
                    ("status", "COMPLETED"),
                ],
            )
            .await?;

        let mut summary = SyncSummary {
            examined: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            match self.ingest_registration(&task).await {
                Ok(true) => summary.updated += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to sync registration id");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            examined = summary.examined,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Id sync finished"
        );
        Ok(summary)
    }

    /// Store one registration's id; `Ok(false)` when there is nothing to
    /// store or nowhere to store it.
    async fn ingest_registration(&self, task: &Value) -> Result<bool> {
        let Some(bro_id) = task.get("bro_id").and_then(Value::as_str).filter(|id| !id.is_empty())
        else {
            return Ok(false);
        };
        let document = task.get("sourcedocument_data").cloned().unwrap_or(Value::Null);
        let Some(gmw_bro_id) = document
            .get("gmwBroId")
            .and_then(Value::as_str)
            .and_then(|id| BroId::new(id).ok())
        else {
            return Ok(false);
        };
        let Some(tube_number) = document.get("tubeNumber").and_then(value_as_u64) else {
            return Ok(false);
        };

        let code = LocationCode::for_tube(&gmw_bro_id, tube_number as u32);
        let Some(location) = self.lizard.find_location(code.as_str()).await? else {
            tracing::info!(code = %code, "No location found for registration, skipping");
            return Ok(false);
        };

        let quality_regime = task
            .get("metadata")
            .and_then(|m| m.get("qualityRegime"))
            .and_then(Value::as_str)
            .unwrap_or("IMBRO");
        let key = if quality_regime == "IMBRO" {
            "gldIdImbro"
        } else {
            "gldIdImbroA"
        };

        tracing::info!(
            code = %code,
            bro_id = %bro_id,
            quality_regime = %quality_regime,
            "Storing registry id on location"
        );

        let mut extra_metadata = location.extra_metadata.clone();
        insert_bro_key(&mut extra_metadata, key, bro_id);
        self.lizard
            .patch_location_metadata(&location.url, &extra_metadata)
            .await?;
        Ok(true)
    }

    /// Store a GLD id on one location, by code.
    pub async fn write_gld_id(&self, location_code: &str, gld_id: &str) -> Result<()> {
        let location = self
            .lizard
            .find_location(location_code)
            .await?
            .ok_or_else(|| LizardError::LocationNotFound(location_code.to_string()))?;

        let mut extra_metadata = location.extra_metadata.clone();
        insert_bro_key(&mut extra_metadata, "broid_gld_imbro", gld_id);
        self.lizard
            .patch_location_metadata(&location.url, &extra_metadata)
            .await?;
        Ok(())
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn insert_bro_key(extra_metadata: &mut Value, key: &str, id: &str) {
    if !extra_metadata.is_object() {
        *extra_metadata = json!({});
    }
    if let Some(map) = extra_metadata.as_object_mut() {
        let bro = map.entry("bro".to_string()).or_insert_with(|| json!({}));
        if let Some(bro_map) = bro.as_object_mut() {
            bro_map.insert(key.to_string(), Value::from(id));
        }
    }
}
