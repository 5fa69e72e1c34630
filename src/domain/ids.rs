//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for registry and asset-platform
//! identifiers. Each type ensures type safety and provides validation for
//! format compliance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// BRO identifier newtype wrapper
///
/// Represents a registry-assigned object identifier such as `GMW000000042`
/// or `GLD000000109`. The three-letter prefix names the registry subsystem
/// the object lives in.
///
/// # Examples
///
/// ```
/// use brosync::domain::ids::BroId;
/// use std::str::FromStr;
///
/// let bro_id = BroId::from_str("GMW000000042").unwrap();
/// assert_eq!(bro_id.as_str(), "GMW000000042");
/// assert_eq!(bro_id.domain_prefix(), "GMW");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BroId(String);

impl BroId {
    /// Creates a new BroId from a string
    ///
    /// # Arguments
    ///
    /// * `id` - The BRO identifier string
    ///
    /// # Returns
    ///
    /// Returns `Ok(BroId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("BRO ID cannot be empty".to_string());
        }
        if !id
            .chars()
            .take(3)
            .all(|c| c.is_ascii_alphabetic() && c.is_ascii_uppercase())
        {
            return Err(format!(
                "Invalid BRO ID format. Expected an uppercase subsystem prefix (e.g. GMW, GLD), got: {}",
                id
            ));
        }
        Ok(Self(id))
    }

    /// Returns the BRO ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The registry subsystem prefix (first three characters)
    pub fn domain_prefix(&self) -> &str {
        &self.0[..self.0.len().min(3)]
    }
}

impl fmt::Display for BroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BroId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BroId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lizard location code newtype wrapper
///
/// Identifies a monitoring location in the asset platform. Tube-level
/// locations use the convention `{gmw_bro_id}-{tube_number:03}`.
///
/// # Examples
///
/// ```
/// use brosync::domain::ids::{BroId, LocationCode};
///
/// let gmw = BroId::new("GMW000000042").unwrap();
/// let code = LocationCode::for_tube(&gmw, 3);
/// assert_eq!(code.as_str(), "GMW000000042-003");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationCode(String);

impl LocationCode {
    /// Creates a new LocationCode from a string
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err("Location code cannot be empty".to_string());
        }
        Ok(Self(code))
    }

    /// The conventional code for one monitoring tube of a well
    pub fn for_tube(gmw_bro_id: &BroId, tube_number: u32) -> Self {
        Self(format!("{}-{:03}", gmw_bro_id.as_str(), tube_number))
    }

    /// Returns the location code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocationCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for LocationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bro_id_creation() {
        let id = BroId::new("GMW000000042").unwrap();
        assert_eq!(id.as_str(), "GMW000000042");
    }

    #[test]
    fn test_bro_id_empty_fails() {
        assert!(BroId::new("").is_err());
        assert!(BroId::new("   ").is_err());
    }

    #[test]
    fn test_bro_id_lowercase_prefix_fails() {
        assert!(BroId::new("gmw000000042").is_err());
        assert!(BroId::new("123456").is_err());
    }

    #[test]
    fn test_bro_id_domain_prefix() {
        let id = BroId::new("GLD000000109").unwrap();
        assert_eq!(id.domain_prefix(), "GLD");
    }

    #[test]
    fn test_bro_id_display() {
        let id = BroId::new("GMW000000042").unwrap();
        assert_eq!(format!("{}", id), "GMW000000042");
    }

    #[test]
    fn test_bro_id_from_str() {
        let id: BroId = "GMW000000042".parse().unwrap();
        assert_eq!(id.as_str(), "GMW000000042");
    }

    #[test]
    fn test_location_code_for_tube() {
        let gmw = BroId::new("GMW000000042").unwrap();
        assert_eq!(
            LocationCode::for_tube(&gmw, 1).as_str(),
            "GMW000000042-001"
        );
        assert_eq!(
            LocationCode::for_tube(&gmw, 12).as_str(),
            "GMW000000042-012"
        );
    }

    #[test]
    fn test_location_code_empty_fails() {
        assert!(LocationCode::new("").is_err());
    }

    #[test]
    fn test_bro_id_serialization() {
        let id = BroId::new("GMW000000042").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: BroId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
