//! Lizard wire types
//!
//! The asset platform is the source of raw observations and the secondary
//! store for registry-assigned identifiers. Locations carry a free-form
//! `extra_metadata` blob whose `bro` section holds the dossier id and the
//! censor limit levels.

pub use crate::adapters::pagination::Paginated;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A monitoring location.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub url: String,
    pub code: String,
    #[serde(default)]
    pub extra_metadata: Value,
}

impl Location {
    /// The `bro` section of the location metadata.
    pub fn bro_metadata(&self) -> Option<&Value> {
        self.extra_metadata.get("bro")
    }

    /// The GLD dossier id registered for this location, if any.
    pub fn bro_gld_id(&self) -> Option<String> {
        self.bro_metadata()?
            .get("broid_gld_imbro")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
    }

    /// Reference level used as the over-limit censor value.
    pub fn bro_reference_level(&self) -> Option<f64> {
        self.bro_metadata()?
            .get("temporal_data")?
            .get(0)?
            .get("referenceLevel")
            .and_then(value_as_f64)
    }

    /// Filter bottom depth used as the under-limit censor value.
    pub fn bro_filter_bottom_level(&self) -> Option<f64> {
        self.bro_metadata()?
            .get("filterBottomDepth")
            .and_then(value_as_f64)
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One timeseries of a location.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesInfo {
    pub url: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub extra_metadata: Value,
}

impl TimeseriesInfo {
    /// The delivery procedure windows recorded under `extra_metadata.bro`.
    /// A single procedure object is normalized to a one-element list.
    pub fn bro_procedures(&self) -> Vec<Value> {
        match self.extra_metadata.get("bro").and_then(|b| b.get("procedure")) {
            Some(Value::Array(list)) => list.clone(),
            Some(obj @ Value::Object(_)) => vec![obj.clone()],
            _ => Vec::new(),
        }
    }
}

/// One observation event of a timeseries.
///
/// `flag` is the numeric validation code the quality-control derivation
/// consumes; `validation_code` is the letter code the watermark advance
/// sets to `"V"` once the registry confirmed delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LizardEvent {
    pub time: String,

    #[serde(
        default,
        deserialize_with = "crate::domain::documents::de::lenient_opt_f64"
    )]
    pub value: Option<f64>,

    #[serde(default)]
    pub flag: Option<u32>,

    #[serde(default)]
    pub validation_code: Option<String>,

    #[serde(default)]
    pub detection_limit: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub last_modified: Option<String>,
}

impl LizardEvent {
    /// Marks the event as validated/delivered.
    pub fn mark_validated(&mut self) {
        self.validation_code = Some("V".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn location(extra_metadata: Value) -> Location {
        serde_json::from_value(json!({
            "url": "https://demo.lizard.net/api/v4/locations/1/",
            "code": "GMW000000042-001",
            "extra_metadata": extra_metadata,
        }))
        .unwrap()
    }

    #[test]
    fn test_location_gld_id() {
        let loc = location(json!({"bro": {"broid_gld_imbro": "GLD000000109"}}));
        assert_eq!(loc.bro_gld_id().as_deref(), Some("GLD000000109"));
    }

    #[test]
    fn test_location_gld_id_absent_or_empty() {
        assert_eq!(location(json!({})).bro_gld_id(), None);
        assert_eq!(
            location(json!({"bro": {"broid_gld_imbro": ""}})).bro_gld_id(),
            None
        );
    }

    #[test]
    fn test_location_censor_levels() {
        let loc = location(json!({
            "bro": {
                "temporal_data": [{"referenceLevel": 1.25}],
                "filterBottomDepth": "-3.5",
            }
        }));
        assert_eq!(loc.bro_reference_level(), Some(1.25));
        assert_eq!(loc.bro_filter_bottom_level(), Some(-3.5));
    }

    #[test]
    fn test_timeseries_single_procedure_normalized() {
        let ts: TimeseriesInfo = serde_json::from_value(json!({
            "url": "https://demo.lizard.net/api/v4/timeseries/7/",
            "extra_metadata": {"bro": {"procedure": {"observationtype": "reguliereMeting"}}},
        }))
        .unwrap();
        assert_eq!(ts.bro_procedures().len(), 1);
    }

    #[test]
    fn test_timeseries_procedure_list() {
        let ts: TimeseriesInfo = serde_json::from_value(json!({
            "url": "https://demo.lizard.net/api/v4/timeseries/7/",
            "extra_metadata": {"bro": {"procedure": [{"a": 1}, {"a": 2}]}},
        }))
        .unwrap();
        assert_eq!(ts.bro_procedures().len(), 2);
    }

    #[test]
    fn test_event_value_accepts_string() {
        let event: LizardEvent = serde_json::from_value(json!({
            "time": "2024-01-01T00:00:00Z",
            "value": "1.23",
            "flag": 2,
        }))
        .unwrap();
        assert_eq!(event.value, Some(1.23));
    }

    #[test]
    fn test_mark_validated() {
        let mut event: LizardEvent = serde_json::from_value(json!({
            "time": "2024-01-01T00:00:00Z",
            "value": 1.0,
        }))
        .unwrap();
        event.mark_validated();
        assert_eq!(event.validation_code.as_deref(), Some("V"));
    }
}
