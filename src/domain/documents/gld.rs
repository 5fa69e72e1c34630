//! Groundwater level dossier (GLD) documents
//!
//! Two payloads live here: the start registration that opens a dossier for
//! one monitoring tube, and the addition document that delivers a batch of
//! time-value observations into an open dossier.

use super::{de, format, validation_error};
use crate::domain::errors::BrosyncError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Observation types the registry understands.
pub const OBSERVATION_TYPES: [&str; 2] = ["reguliereMeting", "controlemeting"];

/// Validation statuses the registry understands for regular observations.
pub const VALIDATION_STATUSES: [&str; 3] = ["voorlopig", "volledigBeoordeeld", "onbekend"];

/// Opens a groundwater level dossier for one tube of a registered well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GldStartRegistration {
    #[serde(alias = "object_id_accountable_party", default)]
    pub object_id_accountable_party: Option<String>,

    #[serde(alias = "groundwater_monitoring_nets", default)]
    pub groundwater_monitoring_nets: Option<Vec<String>>,

    #[serde(alias = "gmw_bro_id")]
    pub gmw_bro_id: String,

    #[serde(alias = "tube_number", deserialize_with = "de::lenient_u32")]
    pub tube_number: u32,
}

impl GldStartRegistration {
    /// Builds a start registration from loosely-typed source data.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(validation_error)
    }
}

/// One observation in an addition document.
///
/// `time` holds the registry wire format (`YYYY-MM-DDTHH:MM:SS+HH:MM`,
/// colon offset); use [`TimeValuePair::new`] to format it from a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeValuePair {
    pub time: String,

    #[serde(default, deserialize_with = "de::lenient_opt_f64")]
    pub value: Option<f64>,

    #[serde(alias = "status_quality_control", default = "default_status_qc")]
    pub status_quality_control: String,

    #[serde(alias = "censor_reason", default)]
    pub censor_reason: Option<String>,

    #[serde(
        alias = "censoring_limitvalue",
        default,
        deserialize_with = "de::lenient_opt_f64"
    )]
    pub censoring_limitvalue: Option<f64>,
}

fn default_status_qc() -> String {
    "onbekend".to_string()
}

impl TimeValuePair {
    /// Formats a timestamp into the registry shape and wraps the value.
    pub fn new(time: &chrono::DateTime<chrono::FixedOffset>, value: Option<f64>) -> Self {
        Self {
            time: format::format_timestamp(time),
            value,
            status_quality_control: default_status_qc(),
            censor_reason: None,
            censoring_limitvalue: None,
        }
    }
}

/// An addition document delivering observations into a GLD dossier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GldAddition {
    #[serde(default)]
    pub date: Option<String>,

    #[serde(alias = "observation_id", default)]
    pub observation_id: Option<String>,

    #[serde(alias = "observation_process_id", default)]
    pub observation_process_id: Option<String>,

    #[serde(alias = "measurement_timeseries_id", default)]
    pub measurement_timeseries_id: Option<String>,

    #[serde(alias = "validation_status", default)]
    pub validation_status: Option<String>,

    #[serde(alias = "investigator_kvk")]
    pub investigator_kvk: String,

    #[serde(alias = "observation_type")]
    pub observation_type: String,

    #[serde(alias = "evaluation_procedure")]
    pub evaluation_procedure: String,

    #[serde(alias = "measurement_instrument_type")]
    pub measurement_instrument_type: String,

    #[serde(alias = "process_reference")]
    pub process_reference: String,

    #[serde(alias = "air_pressure_compensation_type", default)]
    pub air_pressure_compensation_type: Option<String>,

    #[serde(alias = "begin_position")]
    pub begin_position: String,

    #[serde(alias = "end_position")]
    pub end_position: String,

    #[serde(alias = "result_time", default)]
    pub result_time: Option<String>,

    #[serde(alias = "time_value_pairs")]
    pub time_value_pairs: Vec<TimeValuePair>,
}

impl GldAddition {
    /// Builds an addition document from loosely-typed source data.
    ///
    /// The conditional validation-status rule runs on the raw map before
    /// any field-level validation, then the document is deserialized,
    /// normalized (generated identifiers) and format-validated.
    pub fn from_value(mut value: Value) -> Result<Self> {
        Self::pre_validate(&mut value);
        let mut doc: GldAddition = serde_json::from_value(value).map_err(validation_error)?;
        doc.normalize();
        doc.validate()?;
        Ok(doc)
    }

    /// Pre-validation hook on the raw input map.
    ///
    /// A regular observation without an explicit validation status defaults
    /// to "onbekend"; a control observation always gets a null validation
    /// status, whatever the input said. Both key spellings are honored.
    pub fn pre_validate(value: &mut Value) {
        let Some(map) = value.as_object_mut() else {
            return;
        };

        let observation_type = map
            .get("observationType")
            .or_else(|| map.get("observation_type"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        let has_status = map
            .get("validationStatus")
            .or_else(|| map.get("validation_status"))
            .map(|v| !v.is_null() && v.as_str() != Some(""))
            .unwrap_or(false);

        match observation_type.as_deref() {
            Some("reguliereMeting") if !has_status => {
                map.remove("validation_status");
                map.insert("validationStatus".to_string(), Value::from("onbekend"));
            }
            Some("controlemeting") => {
                map.remove("validation_status");
                map.insert("validationStatus".to_string(), Value::Null);
            }
            _ => {}
        }
    }

    /// Fills the generated identifiers when not already supplied.
    ///
    /// The registry requires opaque globally-unique ids for the observation,
    /// its process and its measurement timeseries; they are deterministic
    /// per document instance but never overwrite supplied values.
    pub fn normalize(&mut self) {
        for id in [
            &mut self.observation_id,
            &mut self.observation_process_id,
            &mut self.measurement_timeseries_id,
        ] {
            if id.as_deref().map(str::is_empty).unwrap_or(true) {
                *id = Some(format!("_{}", Uuid::new_v4()));
            }
        }
        // The struct-level counterpart of the pre-validation hook, for
        // documents built programmatically instead of via from_value.
        if self.observation_type == "controlemeting" {
            self.validation_status = None;
        } else if self.observation_type == "reguliereMeting"
            && self
                .validation_status
                .as_deref()
                .map(str::is_empty)
                .unwrap_or(true)
        {
            self.validation_status = Some("onbekend".to_string());
        }
    }

    /// Format and enumeration validation.
    pub fn validate(&self) -> Result<()> {
        if !OBSERVATION_TYPES.contains(&self.observation_type.as_str()) {
            return Err(BrosyncError::Validation(format!(
                "field `observationType` must be one of {OBSERVATION_TYPES:?}, got '{}'",
                self.observation_type
            )));
        }
        if let Some(ref status) = self.validation_status {
            if !VALIDATION_STATUSES.contains(&status.as_str()) {
                return Err(BrosyncError::Validation(format!(
                    "field `validationStatus` must be one of {VALIDATION_STATUSES:?}, got '{status}'"
                )));
            }
        }
        format::check_date_field("beginPosition", &self.begin_position)?;
        format::check_date_field("endPosition", &self.end_position)?;
        if let Some(ref date) = self.date {
            format::check_date_field("date", date)?;
        }
        Ok(())
    }
}
