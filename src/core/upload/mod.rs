//! Upload-task orchestration
//!
//! The coordinator drives every registry submission through the same
//! build → submit → poll → branch lifecycle; the remediation table handles
//! the known failure signatures; summaries report what a batch run did.

pub mod coordinator;
pub mod remediation;
pub mod summary;

pub use coordinator::{ConstructionCorrection, UploadCoordinator, SELF_CORRECTION};
pub use remediation::{diagnose, Remediation};
pub use summary::{EventsDeliveredReport, RemediationSummary, RetargetSummary};
