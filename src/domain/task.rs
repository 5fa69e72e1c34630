//! Upload task entity and its envelope types
//!
//! An upload task is the registry's unit of asynchronous work: one document
//! submission. The task is constructed locally, validated, serialized with
//! the registry's camelCase naming, and then only ever observed through the
//! registry's own record of it.

use crate::domain::documents::{GldAddition, GldStartRegistration, GmwConstruction};
use crate::domain::errors::BrosyncError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registry subsystems an upload task can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BroDomain {
    Gmw,
    Gld,
    Gmn,
    Gar,
    Frd,
}

/// The kind of request an upload task carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Registration,
    Replace,
    Insert,
    Move,
    Delete,
}

impl RequestType {
    /// Correction-style requests require a correction reason in the
    /// metadata; an initial registration must not carry one.
    pub fn is_correction(&self) -> bool {
        !matches!(self, RequestType::Registration)
    }
}

/// Document kinds the registry accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationType {
    #[serde(rename = "GMW_Construction")]
    GmwConstruction,
    #[serde(rename = "GLD_Addition")]
    GldAddition,
    #[serde(rename = "GLD_StartRegistration")]
    GldStartRegistration,
}

/// Provenance regime a document registers under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityRegime {
    #[serde(rename = "IMBRO")]
    Imbro,
    #[serde(rename = "IMBRO/A")]
    ImbroA,
}

impl std::fmt::Display for QualityRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QualityRegime::Imbro => "IMBRO",
            QualityRegime::ImbroA => "IMBRO/A",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of an upload task as reported by the registry.
///
/// The registry may grow new states; unknown values deserialize to
/// [`TaskStatus::Unknown`] instead of failing the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Unfinished,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Terminal success, exactly.
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Still queued or running on the registry side.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Processing)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Unfinished => "UNFINISHED",
            TaskStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// Per-submission envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTaskMetadata {
    #[serde(alias = "request_reference")]
    pub request_reference: String,

    #[serde(alias = "delivery_accountable_party")]
    pub delivery_accountable_party: Option<String>,

    #[serde(alias = "quality_regime")]
    pub quality_regime: QualityRegime,

    #[serde(alias = "bro_id", default, skip_serializing_if = "Option::is_none")]
    pub bro_id: Option<String>,

    #[serde(
        alias = "correction_reason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correction_reason: Option<String>,
}

impl UploadTaskMetadata {
    /// Checks the correction-reason invariant against the request type.
    pub fn validate(&self, request_type: RequestType) -> Result<()> {
        match (request_type.is_correction(), &self.correction_reason) {
            (true, None) => Err(BrosyncError::Validation(format!(
                "field `correctionReason` is required for request type {request_type:?}"
            ))),
            (false, Some(_)) => Err(BrosyncError::Validation(
                "field `correctionReason` must be absent for an initial registration".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Polymorphic document payload of an upload task.
///
/// `Raw` carries a document fetched from the registry untouched; the
/// dossier-retarget flow resubmits those verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceDocument {
    GmwConstruction(GmwConstruction),
    GldAddition(GldAddition),
    GldStartRegistration(GldStartRegistration),
    Raw(Value),
}

impl SourceDocument {
    /// Whether this payload variant matches the declared registration type.
    /// Raw pass-through documents match any type.
    pub fn matches(&self, registration_type: RegistrationType) -> bool {
        matches!(
            (self, registration_type),
            (SourceDocument::GmwConstruction(_), RegistrationType::GmwConstruction)
                | (SourceDocument::GldAddition(_), RegistrationType::GldAddition)
                | (
                    SourceDocument::GldStartRegistration(_),
                    RegistrationType::GldStartRegistration
                )
                | (SourceDocument::Raw(_), _)
        )
    }

    fn validate(&self) -> Result<()> {
        match self {
            SourceDocument::GmwConstruction(doc) => doc.validate(),
            SourceDocument::GldAddition(doc) => doc.validate(),
            SourceDocument::GldStartRegistration(_) | SourceDocument::Raw(_) => Ok(()),
        }
    }
}

/// A locally-constructed upload task, ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTask {
    #[serde(alias = "bro_domain")]
    pub bro_domain: BroDomain,

    #[serde(alias = "project_number")]
    pub project_number: String,

    #[serde(alias = "registration_type")]
    pub registration_type: RegistrationType,

    #[serde(alias = "request_type")]
    pub request_type: RequestType,

    pub metadata: UploadTaskMetadata,

    #[serde(alias = "sourcedocument_data")]
    pub sourcedocument_data: SourceDocument,
}

impl UploadTask {
    /// Full pre-submission validation: the metadata invariant and the
    /// document-shape invariant. The coordinator never submits a task this
    /// has not accepted.
    pub fn validate(&self) -> Result<()> {
        self.metadata.validate(self.request_type)?;
        if !self.sourcedocument_data.matches(self.registration_type) {
            return Err(BrosyncError::Validation(format!(
                "sourcedocument_data does not match registration type {:?}",
                self.registration_type
            )));
        }
        self.sourcedocument_data.validate()
    }
}

/// Fields the registry manages itself; a task record must shed these before
/// it can be resubmitted as a new task.
const SERVER_MANAGED_FIELDS: [&str; 4] = ["uuid", "created_at", "updated_at", "data_owner"];

/// Removes server-managed fields from a raw task record.
pub fn strip_server_fields(task: &mut Map<String, Value>) {
    for field in SERVER_MANAGED_FIELDS {
        task.remove(field);
    }
}

/// Resets the mutable lifecycle fields of a raw task record, turning it
/// back into a submittable document. Corrections always resubmit as a new
/// task; they never mutate one past submission.
pub fn clear_mutable_fields(task: &mut Map<String, Value>) {
    task.insert("status".to_string(), Value::from("PENDING"));
    task.insert("log".to_string(), Value::from(""));
    task.insert("progress".to_string(), Value::from(0));
    task.insert("bro_id".to_string(), Value::from(""));
    task.insert("bro_delivery_url".to_string(), Value::from(""));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(request_reference: &str) -> UploadTaskMetadata {
        UploadTaskMetadata {
            request_reference: request_reference.to_string(),
            delivery_accountable_party: Some("27296013".to_string()),
            quality_regime: QualityRegime::Imbro,
            bro_id: None,
            correction_reason: None,
        }
    }

    #[test]
    fn test_metadata_registration_without_reason_ok() {
        assert!(metadata("ref").validate(RequestType::Registration).is_ok());
    }

    #[test]
    fn test_metadata_registration_with_reason_fails() {
        let mut md = metadata("ref");
        md.correction_reason = Some("eigenCorrectie".to_string());
        assert!(md.validate(RequestType::Registration).is_err());
    }

    #[test]
    fn test_metadata_correction_requires_reason() {
        for request_type in [
            RequestType::Replace,
            RequestType::Insert,
            RequestType::Move,
            RequestType::Delete,
        ] {
            let err = metadata("ref").validate(request_type).unwrap_err();
            assert!(err.to_string().contains("correctionReason"));

            let mut md = metadata("ref");
            md.correction_reason = Some("eigenCorrectie".to_string());
            assert!(md.validate(request_type).is_ok());
        }
    }

    #[test]
    fn test_metadata_serializes_camel_case_and_omits_absent_reason() {
        let serialized = serde_json::to_value(metadata("ref")).unwrap();
        assert!(serialized.get("requestReference").is_some());
        assert!(serialized.get("qualityRegime").is_some());
        assert!(serialized.get("correctionReason").is_none());
    }

    #[test]
    fn test_quality_regime_wire_values() {
        assert_eq!(
            serde_json::to_value(QualityRegime::Imbro).unwrap(),
            json!("IMBRO")
        );
        assert_eq!(
            serde_json::to_value(QualityRegime::ImbroA).unwrap(),
            json!("IMBRO/A")
        );
    }

    #[test]
    fn test_request_type_wire_values() {
        assert_eq!(
            serde_json::to_value(RequestType::Registration).unwrap(),
            json!("registration")
        );
        assert_eq!(serde_json::to_value(RequestType::Move).unwrap(), json!("move"));
    }

    #[test]
    fn test_registration_type_wire_values() {
        assert_eq!(
            serde_json::to_value(RegistrationType::GmwConstruction).unwrap(),
            json!("GMW_Construction")
        );
        assert_eq!(
            serde_json::to_value(RegistrationType::GldAddition).unwrap(),
            json!("GLD_Addition")
        );
    }

    #[test]
    fn test_task_status_unknown_value_tolerated() {
        let status: TaskStatus = serde_json::from_value(json!("SOMETHING_NEW")).unwrap();
        assert_eq!(status, TaskStatus::Unknown);
        assert!(!status.is_completed());
    }

    #[test]
    fn test_task_status_predicates() {
        assert!(TaskStatus::Completed.is_completed());
        assert!(TaskStatus::Pending.is_in_flight());
        assert!(TaskStatus::Processing.is_in_flight());
        assert!(!TaskStatus::Failed.is_in_flight());
        assert!(!TaskStatus::Unfinished.is_completed());
    }

    #[test]
    fn test_document_shape_must_match_registration_type() {
        let doc = GldStartRegistration::from_value(json!({
            "gmwBroId": "GMW000000042",
            "tubeNumber": 1,
        }))
        .unwrap();
        let task = UploadTask {
            bro_domain: BroDomain::Gld,
            project_number: "5871".to_string(),
            registration_type: RegistrationType::GldAddition,
            request_type: RequestType::Registration,
            metadata: metadata("ref"),
            sourcedocument_data: SourceDocument::GldStartRegistration(doc),
        };
        let err = task.validate().unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_raw_document_matches_any_type() {
        let task = UploadTask {
            bro_domain: BroDomain::Gld,
            project_number: "5871".to_string(),
            registration_type: RegistrationType::GldAddition,
            request_type: RequestType::Registration,
            metadata: metadata("ref"),
            sourcedocument_data: SourceDocument::Raw(json!({"anything": true})),
        };
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = UploadTask {
            bro_domain: BroDomain::Gmw,
            project_number: "1".to_string(),
            registration_type: RegistrationType::GmwConstruction,
            request_type: RequestType::Registration,
            metadata: metadata("PUT-12"),
            sourcedocument_data: SourceDocument::Raw(json!({})),
        };
        let serialized = serde_json::to_value(&task).unwrap();
        assert_eq!(serialized["broDomain"], "GMW");
        assert_eq!(serialized["projectNumber"], "1");
        assert_eq!(serialized["registrationType"], "GMW_Construction");
        assert_eq!(serialized["requestType"], "registration");
        assert!(serialized.get("sourcedocumentData").is_some());
    }

    #[test]
    fn test_strip_server_fields() {
        let mut task = json!({
            "uuid": "abc",
            "created_at": "2024-01-01",
            "updated_at": "2024-01-02",
            "data_owner": "org",
            "request_type": "registration",
        });
        strip_server_fields(task.as_object_mut().unwrap());
        assert!(task.get("uuid").is_none());
        assert!(task.get("created_at").is_none());
        assert!(task.get("data_owner").is_none());
        assert!(task.get("request_type").is_some());
    }

    #[test]
    fn test_clear_mutable_fields() {
        let mut task = json!({
            "status": "FAILED",
            "log": "some error",
            "progress": 80,
            "bro_id": "GLD000000109",
            "bro_delivery_url": "https://example/delivery/1",
        });
        clear_mutable_fields(task.as_object_mut().unwrap());
        assert_eq!(task["status"], "PENDING");
        assert_eq!(task["log"], "");
        assert_eq!(task["progress"], 0);
        assert_eq!(task["bro_id"], "");
        assert_eq!(task["bro_delivery_url"], "");
    }
}
