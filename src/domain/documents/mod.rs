//! Registry document payloads
//!
//! This module contains the typed source documents submitted inside an
//! upload task: well construction records, groundwater level additions and
//! start registrations. Every document type carries an explicit alias table:
//! fields deserialize from either the internal snake_case convention or the
//! registry's camelCase convention, and always serialize using the
//! camelCase names the registry requires.
//!
//! Construction goes through `from_value`, which ignores unknown fields and
//! reports missing required fields as a [`BrosyncError::Validation`] naming
//! the field. Normalization (generated identifiers, conditional validation
//! status, measurement clamps) runs before field-level validation.

pub mod gld;
pub mod gmw;

pub use gld::{GldAddition, GldStartRegistration, TimeValuePair};
pub use gmw::{Electrode, GeoOhmCable, GmwConstruction, MonitoringTube};

use crate::domain::errors::BrosyncError;
use crate::domain::result::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Minimum length in meters for screen and plain tube sections.
/// Registry validation rejects anything shorter; smaller inputs are
/// clamped up to this floor.
pub const MIN_TUBE_SECTION_LENGTH: f64 = 0.5;

/// Maps a serde error onto a validation error. The serde message names the
/// offending field (e.g. "missing field `constructionStandard`").
pub(crate) fn validation_error(err: serde_json::Error) -> BrosyncError {
    BrosyncError::Validation(err.to_string())
}

/// Date and timestamp formatting for the registry wire format.
pub mod format {
    use super::*;

    /// Serializes a date as `YYYY-MM-DD`.
    pub fn format_date(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Serializes a timestamp in the registry's required shape:
    /// `YYYY-MM-DDTHH:MM:SS+HH:MM`. The `%:z` specifier always writes the
    /// offset with a colon, which the registry insists on.
    pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
        ts.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    }

    /// Parses the asset platform's event timestamps (`...THH:MM:SSZ`).
    pub fn parse_platform_timestamp(s: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                BrosyncError::Validation(format!("invalid timestamp '{s}': {e}"))
            })
    }

    /// Checks that a string field holds a `YYYY-MM-DD` date.
    pub fn check_date_field(field: &str, value: &str) -> Result<()> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            BrosyncError::Validation(format!(
                "field `{field}` must be a YYYY-MM-DD date, got '{value}'"
            ))
        })?;
        Ok(())
    }

    /// The date portion (`YYYY-MM-DD`) of an already-formatted registry
    /// timestamp.
    pub fn date_portion(timestamp: &str) -> &str {
        timestamp.split('T').next().unwrap_or(timestamp)
    }
}

/// Lenient scalar deserializers.
///
/// Source rows arrive loosely typed: spreadsheets and API responses mix
/// numbers with numeric strings. These helpers accept both and decode to a
/// single canonical type so the rest of the crate never sees the mess.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Num(f64),
        Str(String),
    }

    fn scalar_to_f64<E: serde::de::Error>(scalar: Scalar) -> Result<Option<f64>, E> {
        match scalar {
            Scalar::Num(n) => Ok(Some(n)),
            Scalar::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| E::custom(format!("invalid numeric value '{s}'")))
            }
        }
    }

    pub fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let scalar = Scalar::deserialize(d)?;
        scalar_to_f64(scalar)?
            .ok_or_else(|| serde::de::Error::custom("expected a number, got an empty string"))
    }

    pub fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            None => Ok(None),
            Some(scalar) => scalar_to_f64(scalar),
        }
    }

    pub fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let value = lenient_f64(d)?;
        if value < 0.0 || value.fract() != 0.0 {
            return Err(serde::de::Error::custom(format!(
                "expected a non-negative integer, got {value}"
            )));
        }
        Ok(value as u32)
    }

    pub fn lenient_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        match lenient_opt_f64(d)? {
            None => Ok(None),
            Some(value) if value >= 0.0 && value.fract() == 0.0 => Ok(Some(value as u32)),
            Some(value) => Err(serde::de::Error::custom(format!(
                "expected a non-negative integer, got {value}"
            ))),
        }
    }

    /// Accepts a string or a number and yields its string form. Used for
    /// fields the registry types as text but sources sometimes hold as
    /// numbers (e.g. `variableDiameter`).
    pub fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Scalar::deserialize(d)? {
            Scalar::Str(s) => Ok(s),
            Scalar::Num(n) => {
                if n.fract() == 0.0 {
                    Ok(format!("{}", n as i64))
                } else {
                    Ok(format!("{n}"))
                }
            }
        }
    }
}
