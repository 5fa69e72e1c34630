//! Upload-task coordinator — main orchestrator for registry submissions
//!
//! Every operation shares the same shape: build a schema-valid document,
//! submit it as an upload task, poll the task until a terminal state or
//! the polling ceiling, then branch on the observed status. Batch
//! operations treat one item's failure as that item's problem: they log
//! it, count it, and move on.

use crate::adapters::brostar::{BrostarClient, BrostarEndpoint, DocumentFetcher, UploadTaskRecord};
use crate::domain::task::{clear_mutable_fields, strip_server_fields};
use crate::domain::{
    BroDomain, BroId, BrosyncError, QualityRegime, RegistrationType, RegistryError, RequestType,
    Result, SourceDocument, TaskStatus, UploadTask, UploadTaskMetadata,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::remediation::{diagnose, Remediation};
use super::summary::{EventsDeliveredReport, RemediationSummary, RetargetSummary};

/// Correction reason used for self-initiated corrections.
pub const SELF_CORRECTION: &str = "eigenCorrectie";

/// Parameters of a construction move/replace correction.
#[derive(Debug, Clone)]
pub struct ConstructionCorrection {
    /// The registered well being corrected
    pub bro_id: BroId,

    /// Internal object id to stamp on the corrected document
    pub internal_id: String,

    /// Registry correction reason (e.g. eigenCorrectie, inOnderzoek)
    pub correction_reason: String,

    pub quality_regime: QualityRegime,
    pub delivery_accountable_party: String,
    pub project_number: String,
    pub request_reference: String,

    /// Corrected construction date, when the correction is about dates
    pub new_construction_date: Option<String>,

    /// The wrong date being corrected away
    pub date_to_be_corrected: Option<String>,
}

/// Upload-task coordinator
///
/// Owns no state of its own: the registry's task queue is the only store,
/// and it is treated append-only — corrections are new tasks, never
/// in-place mutations, except for the explicit remediation patches.
pub struct UploadCoordinator {
    client: Arc<BrostarClient>,
}

impl UploadCoordinator {
    /// Create a new coordinator over a shared registry client
    pub fn new(client: Arc<BrostarClient>) -> Self {
        Self { client }
    }

    /// The underlying registry client
    pub fn client(&self) -> &Arc<BrostarClient> {
        &self.client
    }

    /// Validate and submit a task; returns the created record.
    ///
    /// Validation failures surface before any request is made.
    pub async fn submit(&self, task: &UploadTask) -> Result<UploadTaskRecord> {
        task.validate()?;
        let record = self.client.post_upload_task(task).await?;
        tracing::info!(
            uuid = %record.uuid,
            registration_type = ?task.registration_type,
            request_type = ?task.request_type,
            "Upload task created"
        );
        Ok(record)
    }

    /// Submit a task and poll it to a terminal state or the ceiling.
    ///
    /// The returned record may still be non-terminal; callers branch on
    /// its status explicitly.
    pub async fn submit_and_await(&self, task: &UploadTask) -> Result<UploadTaskRecord> {
        let record = self.submit(task).await?;
        self.client.await_completed(&record.uuid).await
    }

    /// Submit a start registration for a GLD dossier and return the
    /// assigned BRO id once registration completes within the polling
    /// ceiling.
    pub async fn register_gld_start(
        &self,
        document: crate::domain::documents::GldStartRegistration,
        metadata: UploadTaskMetadata,
        project_number: &str,
    ) -> Result<Option<String>> {
        let task = UploadTask {
            bro_domain: BroDomain::Gld,
            project_number: project_number.to_string(),
            registration_type: RegistrationType::GldStartRegistration,
            request_type: RequestType::Registration,
            metadata,
            sourcedocument_data: SourceDocument::GldStartRegistration(document),
        };
        let record = self.submit_and_await(&task).await?;
        Ok(record.assigned_bro_id().map(str::to_owned))
    }

    /// Move a construction event in time: fetch the registered document,
    /// override the dates, resubmit as a move request.
    pub async fn move_construction(
        &self,
        correction: ConstructionCorrection,
    ) -> Result<UploadTaskRecord> {
        self.correct_construction(correction, RequestType::Move).await
    }

    /// Replace a registered construction document wholesale.
    pub async fn replace_construction(
        &self,
        correction: ConstructionCorrection,
    ) -> Result<UploadTaskRecord> {
        self.correct_construction(correction, RequestType::Replace).await
    }

    /// Shared read-modify-write correction path.
    async fn correct_construction(
        &self,
        correction: ConstructionCorrection,
        request_type: RequestType,
    ) -> Result<UploadTaskRecord> {
        let fetcher = DocumentFetcher::new(self.client.clone());
        let mut construction = fetcher.fetch_gmw_construction(&correction.bro_id).await?;

        tracing::info!(
            bro_id = %correction.bro_id,
            request_type = ?request_type,
            "Correcting registered construction"
        );

        match request_type {
            RequestType::Move => {
                construction.object_id_accountable_party = correction.internal_id.clone();
                if let Some(ref date) = correction.new_construction_date {
                    construction.well_construction_date = date.clone();
                }
                construction.date_to_be_corrected = correction.date_to_be_corrected.clone();
            }
            _ => {
                // A replace re-registers under a correction id; the NITG
                // code must not ride along or the registry refuses it.
                let correction_id = construction
                    .nitg_code
                    .clone()
                    .unwrap_or_else(|| correction.bro_id.to_string());
                construction.object_id_accountable_party = format!("Correctie_{correction_id}");
                construction.nitg_code = None;
            }
        }

        let metadata = UploadTaskMetadata {
            request_reference: correction.request_reference.clone(),
            delivery_accountable_party: Some(correction.delivery_accountable_party.clone()),
            quality_regime: correction.quality_regime,
            bro_id: Some(correction.bro_id.to_string()),
            correction_reason: Some(correction.correction_reason.clone()),
        };

        let task = UploadTask {
            bro_domain: BroDomain::Gmw,
            project_number: correction.project_number.clone(),
            registration_type: RegistrationType::GmwConstruction,
            request_type,
            metadata,
            sourcedocument_data: SourceDocument::GmwConstruction(construction),
        };

        self.submit_and_await(&task).await
    }

    /// Re-target a GLD dossier: delete every addition task registered
    /// under `current_id` and recreate it under `target_id`.
    ///
    /// The delete phase must reach `COMPLETED` before the recreate phase
    /// is attempted; both phases must complete before a task counts as
    /// migrated. Returns the number of migrated tasks.
    pub async fn retarget_dossier(&self, current_id: &BroId, target_id: &BroId) -> Result<usize> {
        let tasks = self
            .client
            .get_list(
                BrostarEndpoint::UploadTasks,
                &[
                    ("registration_type", "GLD_Addition"),
                    ("bro_id", current_id.as_str()),
                ],
            )
            .await?;

        tracing::info!(
            current = %current_id,
            target = %target_id,
            task_count = tasks.len(),
            "Re-targeting dossier"
        );

        let mut migrated = 0;
        for task in tasks {
            let uuid = task
                .get("uuid")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    BrosyncError::Registry(RegistryError::InvalidResponse(
                        "upload task without uuid".to_string(),
                    ))
                })?
                .to_string();

            let detail = self
                .client
                .get_detail(BrostarEndpoint::UploadTasks, &uuid)
                .await?;
            let mut record = match detail {
                Value::Object(map) => map,
                other => {
                    return Err(BrosyncError::Registry(RegistryError::InvalidResponse(
                        format!("unexpected upload task shape: {other}"),
                    )))
                }
            };

            strip_server_fields(&mut record);
            clear_mutable_fields(&mut record);

            // Phase 1: delete the document from the old dossier.
            record.insert("request_type".to_string(), Value::from("delete"));
            set_metadata_field(&mut record, "correctionReason", Value::from(SELF_CORRECTION));

            let delete_task = self.client.post_upload_task(&Value::Object(record.clone())).await?;
            let delete_outcome = self.client.await_completed(&delete_task.uuid).await?;
            if !delete_outcome.status.is_completed() {
                return Err(BrosyncError::Delivery(format!(
                    "delete phase for task {uuid} ended as {}; recreate not attempted",
                    delete_outcome.status
                )));
            }

            // Phase 2: recreate the same document under the target dossier.
            record.insert("request_type".to_string(), Value::from("registration"));
            remove_metadata_field(&mut record, "correctionReason");
            set_metadata_field(&mut record, "broId", Value::from(target_id.as_str()));
            rewrite_request_reference(&mut record, current_id.as_str(), target_id.as_str());

            let create_task = self.client.post_upload_task(&Value::Object(record)).await?;
            let create_outcome = self.client.await_completed(&create_task.uuid).await?;
            if !create_outcome.status.is_completed() {
                return Err(BrosyncError::Delivery(format!(
                    "recreate phase for task {uuid} ended as {}",
                    create_outcome.status
                )));
            }

            migrated += 1;
        }

        Ok(migrated)
    }

    /// Bulk dossier retarget with the skip policy and the delete-ids audit
    /// trail. One pair's failure never stops the batch.
    pub async fn retarget_dossiers(
        &self,
        pairs: &[(BroId, BroId)],
        skip_empty_dossiers: bool,
    ) -> Result<RetargetSummary> {
        let mut summary = RetargetSummary {
            total: pairs.len(),
            ..Default::default()
        };

        for (index, (current, target)) in pairs.iter().enumerate() {
            tracing::info!(
                row = index + 1,
                total = summary.total,
                current = %current,
                target = %target,
                "Processing dossier pair"
            );

            if skip_empty_dossiers {
                match self.dossier_has_observations(current).await {
                    Ok(false) => {
                        tracing::info!(current = %current, "No observations found, skipping");
                        summary.skipped += 1;
                        summary.delete_ids.push(current.to_string());
                        continue;
                    }
                    Ok(true) => {}
                    Err(e) => {
                        tracing::warn!(
                            current = %current,
                            error = %e,
                            "Observation summary unavailable, proceeding with retarget"
                        );
                    }
                }
            }

            match self.retarget_dossier(current, target).await {
                Ok(_) => {
                    summary.migrated += 1;
                    summary.delete_ids.push(current.to_string());
                }
                Err(e) => {
                    tracing::error!(current = %current, error = %e, "Dossier retarget failed");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            migrated = summary.migrated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Bulk retarget finished"
        );
        Ok(summary)
    }

    /// Whether anything is registered under a dossier, per the public BRO
    /// services observation summary.
    async fn dossier_has_observations(&self, bro_id: &BroId) -> Result<bool> {
        let summary = self.client.public_observations_summary(bro_id.as_str()).await?;
        Ok(summary.as_array().map(|list| !list.is_empty()).unwrap_or(true))
    }

    /// Sweep failed tasks and patch the ones whose log matches the
    /// remediation table. Unmatched tasks are counted and left alone.
    pub async fn remediate_failed(&self) -> Result<RemediationSummary> {
        let tasks = self
            .client
            .get_list(BrostarEndpoint::UploadTasks, &[("status", "FAILED")])
            .await?;

        let mut summary = RemediationSummary {
            examined: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            let Some(uuid) = task.get("uuid").and_then(Value::as_str) else {
                summary.skipped += 1;
                continue;
            };
            let log = task
                .get("log")
                .or_else(|| task.get("bro_errors"))
                .and_then(Value::as_str)
                .unwrap_or_default();

            let Some(remediation) = diagnose(log) else {
                tracing::debug!(uuid = %uuid, "No remediation for task log, leaving for manual handling");
                summary.skipped += 1;
                continue;
            };

            tracing::info!(uuid = %uuid, remediation = ?remediation, "Remediating failed task");
            match self.apply_remediation(uuid, &task, &remediation).await {
                Ok(()) => summary.remediated += 1,
                Err(e) => {
                    tracing::error!(uuid = %uuid, error = %e, "Remediation patch failed");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            examined = summary.examined,
            remediated = summary.remediated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Remediation sweep finished"
        );
        Ok(summary)
    }

    async fn apply_remediation(
        &self,
        uuid: &str,
        task: &Value,
        remediation: &Remediation,
    ) -> Result<()> {
        match remediation {
            Remediation::ReplayAsInsert => {
                let mut metadata = task.get("metadata").cloned().unwrap_or_else(|| json!({}));
                if let Some(map) = metadata.as_object_mut() {
                    map.insert("correctionReason".to_string(), Value::from(SELF_CORRECTION));
                }
                self.client
                    .patch_upload_task(uuid, &json!({ "metadata": metadata }))
                    .await?;
                self.client
                    .patch_upload_task(uuid, &json!({ "request_type": "insert" }))
                    .await
            }
            Remediation::CorrectEventDate(date) => {
                let mut document = task
                    .get("sourcedocument_data")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                if let Some(map) = document.as_object_mut() {
                    map.insert("eventDate".to_string(), Value::from(date.as_str()));
                }
                self.client
                    .patch_upload_task(uuid, &json!({ "sourcedocument_data": document }))
                    .await
            }
            Remediation::MarkDelivered => {
                self.client
                    .patch_upload_task(
                        uuid,
                        &json!({ "status": "COMPLETED", "progress": 100.0, "log": "" }),
                    )
                    .await
            }
        }
    }

    /// Delete tasks stuck in `PROCESSING` whose log matches a filter (the
    /// registry filters by substring).
    pub async fn delete_stuck_tasks(&self, log_filter: &str) -> Result<usize> {
        let tasks = self
            .client
            .get_list(
                BrostarEndpoint::UploadTasks,
                &[("status", "PROCESSING"), ("log", log_filter)],
            )
            .await?;

        let mut deleted = 0;
        for task in tasks {
            let Some(uuid) = task.get("uuid").and_then(Value::as_str) else {
                continue;
            };
            tracing::info!(uuid = %uuid, "Deleting stuck upload task");
            match self.client.delete_upload_task(uuid).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::error!(uuid = %uuid, error = %e, "Failed to delete upload task");
                }
            }
        }
        Ok(deleted)
    }

    /// Totals over all completed addition deliveries.
    pub async fn total_events_delivered(&self) -> Result<EventsDeliveredReport> {
        let tasks = self
            .client
            .get_list(
                BrostarEndpoint::UploadTasks,
                &[
                    ("status", "COMPLETED"),
                    ("registration_type", "GLD_Addition"),
                ],
            )
            .await?;

        let mut report = EventsDeliveredReport::default();
        let mut dossiers = std::collections::HashSet::new();
        for task in &tasks {
            let count = task
                .get("sourcedocument_data")
                .and_then(|doc| doc.get("timeValuePairsCount"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            report.total_events += count;
            if let Some(bro_id) = task.get("bro_id").and_then(Value::as_str) {
                if !bro_id.is_empty() {
                    dossiers.insert(bro_id.to_string());
                }
            }
        }
        report.distinct_dossiers = dossiers.len();

        tracing::info!(
            total_events = report.total_events,
            distinct_dossiers = report.distinct_dossiers,
            "Computed delivery totals"
        );
        Ok(report)
    }

    /// Counts of upload tasks per lifecycle state.
    pub async fn status_counts(&self) -> Result<Vec<(TaskStatus, usize)>> {
        let mut counts = Vec::new();
        for status in [
            TaskStatus::Pending,
            TaskStatus::Processing,
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Unfinished,
        ] {
            let status_param = status.to_string();
            let tasks = self
                .client
                .get_list(
                    BrostarEndpoint::UploadTasks,
                    &[("status", status_param.as_str())],
                )
                .await?;
            counts.push((status, tasks.len()));
        }
        Ok(counts)
    }
}

fn set_metadata_field(record: &mut Map<String, Value>, key: &str, value: Value) {
    let metadata = record
        .entry("metadata".to_string())
        .or_insert_with(|| json!({}));
    if let Some(map) = metadata.as_object_mut() {
        map.insert(key.to_string(), value);
    }
}

fn remove_metadata_field(record: &mut Map<String, Value>, key: &str) {
    if let Some(map) = record.get_mut("metadata").and_then(Value::as_object_mut) {
        map.remove(key);
    }
}

fn rewrite_request_reference(record: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(map) = record.get_mut("metadata").and_then(Value::as_object_mut) {
        if let Some(reference) = map.get("requestReference").and_then(Value::as_str) {
            let rewritten = reference.replace(from, to);
            map.insert("requestReference".to_string(), Value::from(rewritten));
        }
    }
}
