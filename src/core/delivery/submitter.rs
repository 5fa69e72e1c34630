//! Chunked time-series submitter
//!
//! Delivers an observation series into a GLD dossier: split into
//! registry-sized chunks, wrap each chunk in an addition document, submit,
//! confirm, and only then advance the asset platform's delivered
//! watermark by re-posting the chunk's events with the validated flag.

use crate::adapters::brostar::BrostarClient;
use crate::adapters::lizard::{LizardClient, LizardEvent};
use crate::config::schema::{DeliveryConfig, OrganisationConfig};
use crate::domain::documents::format::{date_portion, parse_platform_timestamp};
use crate::domain::documents::GldAddition;
use crate::domain::{
    BroDomain, BrosyncError, QualityRegime, RegistrationType, RequestType, Result, SourceDocument,
    TaskStatus, UploadTask, UploadTaskMetadata,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::chunk::{chunk_events, to_time_value_pairs};
use super::quality::CensorLimits;

/// Delivery procedure window of one timeseries, as recorded in the asset
/// platform's metadata.
#[derive(Debug, Clone)]
pub struct ProcedureInfo {
    pub observation_type: String,
    pub process_reference: String,
    pub evaluation_procedure: String,
    pub measurement_instrument_type: String,
    pub air_pressure_compensation_type: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Open-ended procedures record their end as "None"; anything this far out
/// behaves as open-ended.
const OPEN_END: &str = "5000-01-01T00:00:00Z";

impl ProcedureInfo {
    /// Parses a procedure object from timeseries metadata.
    pub fn from_value(value: &Value) -> Result<Self> {
        let text = |key: &str| -> Result<String> {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| {
                    BrosyncError::Validation(format!("procedure is missing field `{key}`"))
                })
        };

        let start = parse_platform_timestamp(&text("start")?)?;
        let end_raw = text("eind")?;
        let end_raw = if end_raw == "None" { OPEN_END.to_string() } else { end_raw };
        let end = parse_platform_timestamp(&end_raw)?;

        let air_pressure = value
            .get("airpressurecompensationtype")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty() && *v != "geen")
            .map(str::to_owned);

        Ok(Self {
            observation_type: text("observationtype")?,
            process_reference: text("processreference")?,
            evaluation_procedure: text("evaluationprocedure")?,
            measurement_instrument_type: text("measurementinstrumenttype")?,
            air_pressure_compensation_type: air_pressure,
            start,
            end,
        })
    }

    /// Whether an event timestamp falls inside this procedure window.
    pub fn covers(&self, time: &DateTime<Utc>) -> bool {
        *time >= self.start && *time <= self.end
    }
}

/// The dossier and organisation a series is delivered into.
#[derive(Debug, Clone)]
pub struct DeliveryTarget {
    pub gld_bro_id: String,
    pub quality_regime: QualityRegime,
    pub investigator_kvk: String,
    pub delivery_accountable_party: String,
    pub project_number: String,
}

/// One ordered observation series bound for one dossier.
#[derive(Debug, Clone)]
pub struct ObservationSeries {
    pub timeseries_url: String,
    pub procedure: ProcedureInfo,
    pub events: Vec<LizardEvent>,
    pub limits: CensorLimits,
}

/// Per-run delivery counters.
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub chunks_total: usize,
    pub chunks_delivered: usize,
    pub chunks_failed: usize,
    pub events_delivered: usize,
    pub locations_skipped: usize,
}

impl DeliverySummary {
    pub fn merge(&mut self, other: DeliverySummary) {
        self.chunks_total += other.chunks_total;
        self.chunks_delivered += other.chunks_delivered;
        self.chunks_failed += other.chunks_failed;
        self.events_delivered += other.events_delivered;
        self.locations_skipped += other.locations_skipped;
    }
}

/// Chunked submitter over the two clients.
pub struct AdditionSubmitter {
    brostar: Arc<BrostarClient>,
    lizard: Arc<LizardClient>,
    config: DeliveryConfig,
}

impl AdditionSubmitter {
    pub fn new(
        brostar: Arc<BrostarClient>,
        lizard: Arc<LizardClient>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            brostar,
            lizard,
            config,
        }
    }

    /// Deliver one observation series chunk by chunk.
    ///
    /// A chunk's failure is logged with its payload context and the loop
    /// proceeds to the next chunk; the watermark only advances for chunks
    /// the registry confirmed.
    pub async fn deliver_series(
        &self,
        series: &ObservationSeries,
        target: &DeliveryTarget,
    ) -> Result<DeliverySummary> {
        let mut summary = DeliverySummary::default();

        for chunk in chunk_events(&series.events, self.config.chunk_size) {
            summary.chunks_total += 1;
            match self.deliver_chunk(chunk, series, target).await {
                Ok(true) => {
                    summary.chunks_delivered += 1;
                    summary.events_delivered += chunk.len();
                }
                Ok(false) => {
                    tracing::warn!(
                        gld = %target.gld_bro_id,
                        chunk_len = chunk.len(),
                        "Chunk not confirmed within status-check budget"
                    );
                    summary.chunks_failed += 1;
                }
                Err(e) => {
                    tracing::error!(
                        gld = %target.gld_bro_id,
                        chunk_len = chunk.len(),
                        first_time = %chunk.first().map(|e| e.time.as_str()).unwrap_or(""),
                        last_time = %chunk.last().map(|e| e.time.as_str()).unwrap_or(""),
                        error = %e,
                        "Failed to deliver chunk"
                    );
                    summary.chunks_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Deliver one chunk; `Ok(true)` once the registry confirmed it and
    /// the watermark advanced.
    async fn deliver_chunk(
        &self,
        chunk: &[LizardEvent],
        series: &ObservationSeries,
        target: &DeliveryTarget,
    ) -> Result<bool> {
        let pairs = to_time_value_pairs(chunk, &series.limits)?;
        let Some((first, last)) = pairs.first().zip(pairs.last()) else {
            return Ok(true);
        };

        let begin_position = date_portion(&first.time).to_string();
        let end_position = date_portion(&last.time).to_string();
        let result_time = last.time.clone();

        let procedure = &series.procedure;
        let mut document = GldAddition {
            date: Some(date_portion(&result_time).to_string()),
            observation_id: None,
            observation_process_id: None,
            measurement_timeseries_id: None,
            validation_status: (procedure.observation_type == "reguliereMeting")
                .then(|| "voorlopig".to_string()),
            investigator_kvk: target.investigator_kvk.clone(),
            observation_type: procedure.observation_type.clone(),
            evaluation_procedure: procedure.evaluation_procedure.clone(),
            measurement_instrument_type: procedure.measurement_instrument_type.clone(),
            process_reference: procedure.process_reference.clone(),
            air_pressure_compensation_type: procedure.air_pressure_compensation_type.clone(),
            begin_position,
            end_position,
            result_time: Some(result_time),
            time_value_pairs: pairs,
        };
        document.normalize();
        document.validate()?;

        let metadata = UploadTaskMetadata {
            request_reference: format!(
                "{}: {} {} {}-{} ({})",
                target.gld_bro_id,
                target.quality_regime,
                procedure.observation_type,
                document.begin_position,
                document.end_position,
                Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            ),
            delivery_accountable_party: Some(target.delivery_accountable_party.clone()),
            quality_regime: target.quality_regime,
            bro_id: Some(target.gld_bro_id.clone()),
            correction_reason: None,
        };

        let task = UploadTask {
            bro_domain: BroDomain::Gld,
            project_number: target.project_number.clone(),
            registration_type: RegistrationType::GldAddition,
            request_type: RequestType::Registration,
            metadata,
            sourcedocument_data: SourceDocument::GldAddition(document),
        };
        task.validate()?;

        let mut record = self.brostar.post_upload_task(&task).await?;
        tracing::info!(
            uuid = %record.uuid,
            gld = %target.gld_bro_id,
            pairs = chunk.len(),
            "Addition task created"
        );

        // Nudge the registry and re-read, a bounded number of times.
        let pause = Duration::from_secs(self.config.status_check_interval_seconds);
        let mut attempts = 0;
        while record.status.is_in_flight() && attempts < self.config.status_check_attempts {
            if let Err(e) = self.brostar.check_status(&record.uuid).await {
                tracing::warn!(uuid = %record.uuid, error = %e, "check_status failed");
            }
            match self.brostar.get_upload_task(&record.uuid).await {
                Ok(fresh) => record = fresh,
                Err(e) => {
                    tracing::warn!(uuid = %record.uuid, error = %e, "Status read failed");
                }
            }
            attempts += 1;
            tokio::time::sleep(pause).await;
        }

        // Watermark advance: only a confirmed chunk marks its events as
        // delivered. PENDING/PROCESSING never advances it.
        if matches!(record.status, TaskStatus::Completed | TaskStatus::Unfinished) {
            let mut validated = chunk.to_vec();
            for event in &mut validated {
                event.mark_validated();
            }
            self.lizard
                .post_events(&series.timeseries_url, &validated)
                .await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Deliver every undelivered observation of every matching location.
    ///
    /// Locations without a registered dossier id are skipped; every other
    /// failure is contained to its location or timeseries.
    pub async fn deliver_for_locations(
        &self,
        code_prefix: &str,
        organisation: &OrganisationConfig,
    ) -> Result<DeliverySummary> {
        let locations = self
            .lizard
            .list_locations(&[("code__startswith", code_prefix)])
            .await?;

        tracing::info!(
            prefix = %code_prefix,
            count = locations.len(),
            "Delivering additions for locations"
        );

        let mut summary = DeliverySummary::default();
        for location in locations {
            let Some(gld_id) = location.bro_gld_id() else {
                tracing::info!(code = %location.code, "No GLD id on location, skipping");
                summary.locations_skipped += 1;
                continue;
            };

            let limits = CensorLimits {
                reference_level: location.bro_reference_level(),
                filter_bottom_level: location.bro_filter_bottom_level(),
            };

            let target = DeliveryTarget {
                gld_bro_id: gld_id,
                quality_regime: organisation.quality_regime,
                investigator_kvk: organisation.kvk.clone(),
                delivery_accountable_party: organisation.kvk.clone(),
                project_number: organisation.project_number.clone(),
            };

            for observation_type in &self.config.observation_types {
                if let Err(e) = self
                    .deliver_location_timeseries(&location.code, *observation_type, &limits, &target, &mut summary)
                    .await
                {
                    tracing::error!(
                        code = %location.code,
                        observation_type = observation_type,
                        error = %e,
                        "Timeseries delivery failed, continuing with next"
                    );
                }
            }
        }

        Ok(summary)
    }

    async fn deliver_location_timeseries(
        &self,
        location_code: &str,
        observation_type: u32,
        limits: &CensorLimits,
        target: &DeliveryTarget,
        summary: &mut DeliverySummary,
    ) -> Result<()> {
        let observation_type_param = observation_type.to_string();
        let timeseries = self
            .lizard
            .list_timeseries(&[
                ("location__code", location_code),
                ("observation_type", observation_type_param.as_str()),
            ])
            .await?;

        if timeseries.len() != 1 {
            tracing::info!(
                code = %location_code,
                observation_type = observation_type,
                found = timeseries.len(),
                "Expected exactly one timeseries, skipping"
            );
            return Ok(());
        }
        let timeseries = &timeseries[0];

        let procedures = timeseries.bro_procedures();
        if procedures.is_empty() {
            tracing::info!(url = %timeseries.url, "No delivery procedures on timeseries, skipping");
            return Ok(());
        }

        // Undelivered events only; the validated flag is the watermark.
        let events = self
            .lizard
            .list_events(&timeseries.url, &[("validation_code!", "V"), ("limit", "10000")])
            .await?;
        let events: Vec<LizardEvent> =
            events.into_iter().filter(|e| e.value.is_some()).collect();

        for procedure_value in procedures {
            let procedure = match ProcedureInfo::from_value(&procedure_value) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "Unparseable procedure, skipping");
                    continue;
                }
            };

            let mut window_events = Vec::new();
            for event in &events {
                let time = parse_platform_timestamp(&event.time)?;
                if procedure.covers(&time) {
                    window_events.push(event.clone());
                }
            }
            if window_events.is_empty() {
                continue;
            }

            let series = ObservationSeries {
                timeseries_url: timeseries.url.clone(),
                procedure,
                events: window_events,
                limits: *limits,
            };
            summary.merge(self.deliver_series(&series, target).await?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_procedure_from_value() {
        let procedure = ProcedureInfo::from_value(&json!({
            "observationtype": "reguliereMeting",
            "processreference": "NEN5120",
            "evaluationprocedure": "oordeelDeskundige",
            "measurementinstrumenttype": "druksensor",
            "airpressurecompensationtype": "KNMImeting",
            "start": "2024-01-01T00:00:00Z",
            "eind": "2024-02-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(procedure.observation_type, "reguliereMeting");
        assert_eq!(
            procedure.air_pressure_compensation_type.as_deref(),
            Some("KNMImeting")
        );
    }

    #[test]
    fn test_procedure_open_end() {
        let procedure = ProcedureInfo::from_value(&json!({
            "observationtype": "reguliereMeting",
            "processreference": "NEN5120",
            "evaluationprocedure": "oordeelDeskundige",
            "measurementinstrumenttype": "druksensor",
            "airpressurecompensationtype": "geen",
            "start": "2024-01-01T00:00:00Z",
            "eind": "None",
        }))
        .unwrap();
        assert_eq!(procedure.air_pressure_compensation_type, None);
        let far_future = parse_platform_timestamp("2999-01-01T00:00:00Z").unwrap();
        assert!(procedure.covers(&far_future));
    }

    #[test]
    fn test_procedure_missing_field() {
        let err = ProcedureInfo::from_value(&json!({
            "observationtype": "reguliereMeting",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("processreference"));
    }

    #[test]
    fn test_procedure_covers_window() {
        let procedure = ProcedureInfo::from_value(&json!({
            "observationtype": "reguliereMeting",
            "processreference": "NEN5120",
            "evaluationprocedure": "oordeelDeskundige",
            "measurementinstrumenttype": "druksensor",
            "airpressurecompensationtype": null,
            "start": "2024-01-01T00:00:00Z",
            "eind": "2024-02-01T00:00:00Z",
        }))
        .unwrap();

        let inside = parse_platform_timestamp("2024-01-15T12:00:00Z").unwrap();
        let before = parse_platform_timestamp("2023-12-31T23:59:59Z").unwrap();
        let after = parse_platform_timestamp("2024-02-01T00:00:01Z").unwrap();
        assert!(procedure.covers(&inside));
        assert!(!procedure.covers(&before));
        assert!(!procedure.covers(&after));
    }

    #[test]
    fn test_summary_merge() {
        let mut a = DeliverySummary {
            chunks_total: 2,
            chunks_delivered: 1,
            chunks_failed: 1,
            events_delivered: 7000,
            locations_skipped: 0,
        };
        a.merge(DeliverySummary {
            chunks_total: 1,
            chunks_delivered: 1,
            chunks_failed: 0,
            events_delivered: 300,
            locations_skipped: 2,
        });
        assert_eq!(a.chunks_total, 3);
        assert_eq!(a.chunks_delivered, 2);
        assert_eq!(a.events_delivered, 7300);
        assert_eq!(a.locations_skipped, 2);
    }
}
