//! BROSTAR wire types
//!
//! Response shapes of the registry API. List endpoints are paginated with a
//! `next` link; upload task records carry the lifecycle fields the
//! coordinator branches on.

use crate::domain::TaskStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::adapters::pagination::Paginated;

/// The registry's record of an upload task.
///
/// Responses use the registry's snake_case field names; `metadata` and
/// `sourcedocument_data` are kept raw because correction flows resubmit
/// them verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTaskRecord {
    pub uuid: String,

    /// Self link, present on create responses
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub progress: Option<f64>,

    /// Diagnostic text; carries the error signatures remediation matches on
    #[serde(default)]
    pub log: String,

    #[serde(default)]
    pub bro_id: Option<String>,

    #[serde(default)]
    pub metadata: Value,

    #[serde(default)]
    pub sourcedocument_data: Value,

    #[serde(default)]
    pub bro_domain: Option<String>,

    #[serde(default)]
    pub project_number: Option<String>,

    #[serde(default)]
    pub registration_type: Option<String>,

    #[serde(default)]
    pub request_type: Option<String>,
}

impl UploadTaskRecord {
    /// The assigned BRO id, if any. The registry reports an empty string
    /// until registration completes.
    pub fn assigned_bro_id(&self) -> Option<&str> {
        self.bro_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_task_record_minimal() {
        let record: UploadTaskRecord = serde_json::from_value(json!({
            "uuid": "0f8a7c1e",
            "status": "PROCESSING",
        }))
        .unwrap();
        assert_eq!(record.status, TaskStatus::Processing);
        assert_eq!(record.assigned_bro_id(), None);
    }

    #[test]
    fn test_assigned_bro_id_filters_empty_string() {
        let record: UploadTaskRecord = serde_json::from_value(json!({
            "uuid": "0f8a7c1e",
            "status": "COMPLETED",
            "bro_id": "",
        }))
        .unwrap();
        assert_eq!(record.assigned_bro_id(), None);

        let record: UploadTaskRecord = serde_json::from_value(json!({
            "uuid": "0f8a7c1e",
            "status": "COMPLETED",
            "bro_id": "GLD000000109",
        }))
        .unwrap();
        assert_eq!(record.assigned_bro_id(), Some("GLD000000109"));
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let record: UploadTaskRecord = serde_json::from_value(json!({
            "uuid": "0f8a7c1e",
            "status": "RETRYING",
        }))
        .unwrap();
        assert_eq!(record.status, TaskStatus::Unknown);
    }
}
