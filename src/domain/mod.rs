//! Domain models and types for brosync.
//!
//! This module contains the core domain models, types, and business rules
//! for the registry integration.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`BroId`], [`LocationCode`])
//! - **The upload task entity** ([`UploadTask`], [`UploadTaskMetadata`],
//!   [`TaskStatus`]) and its closed enumerations
//! - **Document payloads** ([`documents::GmwConstruction`],
//!   [`documents::GldAddition`], [`documents::GldStartRegistration`])
//! - **Error types** ([`BrosyncError`], [`RegistryError`], [`LizardError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a registry id can never be
//! confused with a platform location code:
//!
//! ```rust
//! use brosync::domain::{BroId, LocationCode};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gld_id = BroId::new("GLD000000109")?;
//! let code = LocationCode::new("GMW000000042-001")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BrosyncError>`]:
//!
//! ```rust
//! use brosync::domain::{BrosyncError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(BrosyncError::Validation("missing field".to_string()))
//! }
//! ```

pub mod documents;
pub mod errors;
pub mod ids;
pub mod result;
pub mod task;

// Re-export commonly used types for convenience
pub use errors::{BrosyncError, LizardError, RegistryError};
pub use ids::{BroId, LocationCode};
pub use result::Result;
pub use task::{
    clear_mutable_fields, strip_server_fields, BroDomain, QualityRegime, RegistrationType,
    RequestType, SourceDocument, TaskStatus, UploadTask, UploadTaskMetadata,
};
