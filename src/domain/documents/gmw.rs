//! Groundwater monitoring well (GMW) construction documents
//!
//! A construction document describes one well with its nested monitoring
//! tubes; tubes optionally nest geo-ohm cables, which nest electrodes. The
//! registry numbers tubes, cables and electrodes sequentially, so nested
//! list order is preserved exactly as supplied.

use super::{de, format, validation_error, MIN_TUBE_SECTION_LENGTH};
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};

/// One electrode on a geo-ohm cable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Electrode {
    #[serde(alias = "electrode_number", deserialize_with = "de::lenient_u32")]
    pub electrode_number: u32,

    #[serde(alias = "electrode_packing_material")]
    pub electrode_packing_material: String,

    #[serde(alias = "electrode_status")]
    pub electrode_status: String,

    #[serde(
        alias = "electrode_position",
        default,
        deserialize_with = "de::lenient_opt_f64"
    )]
    pub electrode_position: Option<f64>,
}

/// One geo-ohm cable with its electrodes, in measurement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoOhmCable {
    #[serde(alias = "cable_number", deserialize_with = "de::lenient_u32")]
    pub cable_number: u32,

    #[serde(default)]
    pub electrodes: Option<Vec<Electrode>>,
}

/// One monitoring tube of a well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringTube {
    #[serde(alias = "tube_number", deserialize_with = "de::lenient_u32")]
    pub tube_number: u32,

    #[serde(alias = "tube_type")]
    pub tube_type: String,

    #[serde(alias = "artesian_well_cap_present")]
    pub artesian_well_cap_present: String,

    #[serde(alias = "sediment_sump_present")]
    pub sediment_sump_present: String,

    #[serde(
        alias = "number_of_geo_ohm_cables",
        default,
        deserialize_with = "de::lenient_opt_u32"
    )]
    pub number_of_geo_ohm_cables: Option<u32>,

    #[serde(
        alias = "tube_top_diameter",
        default,
        deserialize_with = "de::lenient_opt_f64"
    )]
    pub tube_top_diameter: Option<f64>,

    #[serde(alias = "variable_diameter", deserialize_with = "de::lenient_string")]
    pub variable_diameter: String,

    #[serde(alias = "tube_status")]
    pub tube_status: String,

    #[serde(alias = "tube_top_position", deserialize_with = "de::lenient_f64")]
    pub tube_top_position: f64,

    #[serde(alias = "tube_top_positioning_method")]
    pub tube_top_positioning_method: String,

    #[serde(alias = "tube_packing_material")]
    pub tube_packing_material: String,

    #[serde(alias = "tube_material")]
    pub tube_material: String,

    pub glue: String,

    #[serde(alias = "screen_length", deserialize_with = "de::lenient_f64")]
    pub screen_length: f64,

    #[serde(alias = "screen_protection", default)]
    pub screen_protection: Option<String>,

    #[serde(alias = "sock_material")]
    pub sock_material: String,

    #[serde(alias = "plain_tube_part_length", deserialize_with = "de::lenient_f64")]
    pub plain_tube_part_length: f64,

    #[serde(
        alias = "sediment_sump_length",
        default,
        deserialize_with = "de::lenient_opt_f64"
    )]
    pub sediment_sump_length: Option<f64>,

    #[serde(alias = "geo_ohm_cables", default)]
    pub geo_ohm_cables: Option<Vec<GeoOhmCable>>,
}

impl MonitoringTube {
    /// Clamps screen and plain-tube lengths up to the registry floor.
    pub(crate) fn normalize(&mut self) {
        if self.screen_length < MIN_TUBE_SECTION_LENGTH {
            self.screen_length = MIN_TUBE_SECTION_LENGTH;
        }
        if self.plain_tube_part_length < MIN_TUBE_SECTION_LENGTH {
            self.plain_tube_part_length = MIN_TUBE_SECTION_LENGTH;
        }
    }
}

/// A well construction document.
///
/// Built either from spreadsheet-derived rows or from the registry's own
/// record of the well (read-modify-write corrections); both naming
/// conventions are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmwConstruction {
    #[serde(alias = "object_id_accountable_party")]
    pub object_id_accountable_party: String,

    #[serde(alias = "nitg_code", default)]
    pub nitg_code: Option<String>,

    #[serde(alias = "delivery_context")]
    pub delivery_context: String,

    #[serde(alias = "construction_standard")]
    pub construction_standard: String,

    #[serde(alias = "initial_function")]
    pub initial_function: String,

    #[serde(
        alias = "number_of_monitoring_tubes",
        deserialize_with = "de::lenient_u32"
    )]
    pub number_of_monitoring_tubes: u32,

    #[serde(alias = "ground_level_stable")]
    pub ground_level_stable: String,

    #[serde(alias = "well_stability", default)]
    pub well_stability: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(alias = "maintenance_responsible_party", default)]
    pub maintenance_responsible_party: Option<String>,

    #[serde(alias = "well_head_protector")]
    pub well_head_protector: String,

    #[serde(alias = "well_construction_date")]
    pub well_construction_date: String,

    #[serde(alias = "delivered_location")]
    pub delivered_location: String,

    #[serde(alias = "horizontal_positioning_method")]
    pub horizontal_positioning_method: String,

    #[serde(alias = "local_vertical_reference_point")]
    pub local_vertical_reference_point: String,

    #[serde(deserialize_with = "de::lenient_f64")]
    pub offset: f64,

    #[serde(alias = "vertical_datum")]
    pub vertical_datum: String,

    #[serde(
        alias = "ground_level_position",
        default,
        deserialize_with = "de::lenient_opt_f64"
    )]
    pub ground_level_position: Option<f64>,

    #[serde(alias = "ground_level_positioning_method")]
    pub ground_level_positioning_method: String,

    #[serde(alias = "monitoring_tubes")]
    pub monitoring_tubes: Vec<MonitoringTube>,

    #[serde(alias = "date_to_be_corrected", default)]
    pub date_to_be_corrected: Option<String>,
}

impl GmwConstruction {
    /// Builds a construction document from loosely-typed source data.
    ///
    /// Unknown fields are ignored; missing required fields produce a
    /// validation error naming the field. Normalization (length clamps)
    /// runs before format validation, and no network call happens on
    /// failure.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let mut doc: GmwConstruction =
            serde_json::from_value(value).map_err(validation_error)?;
        doc.normalize();
        doc.validate()?;
        Ok(doc)
    }

    /// Clamps tube section lengths on every nested tube.
    pub fn normalize(&mut self) {
        for tube in &mut self.monitoring_tubes {
            tube.normalize();
        }
    }

    /// Format validation for date fields.
    pub fn validate(&self) -> Result<()> {
        if !self.well_construction_date.is_empty() {
            format::check_date_field("wellConstructionDate", &self.well_construction_date)?;
        }
        if let Some(ref date) = self.date_to_be_corrected {
            format::check_date_field("dateToBeCorrected", date)?;
        }
        Ok(())
    }
}
