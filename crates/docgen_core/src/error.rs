//! crates/docgen_core/src/error.rs
//!
//! The error taxonomy surfaced by the authoring engine to its callers.

use crate::domain::{ProjectId, SectionId};
use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required field was empty, an index was out of range, or the operation
    /// is not allowed in the current state. Raised before any remote call.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The bearer credential is missing, invalid or expired.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// The generation, export or project backend failed.
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// A section already has an operation in flight.
    #[error("Section {0} is busy with another operation")]
    Busy(SectionId),

    /// The project was created remotely but its sections were not.
    #[error("Project {project_id} was created but its sections could not be saved: {source}")]
    Consistency {
        project_id: ProjectId,
        #[source]
        source: Box<CoreError>,
    },
}

impl From<PortError> for CoreError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => CoreError::NotFound(what),
            PortError::Unauthorized => {
                CoreError::Authorization("the service rejected the credential".to_string())
            }
            PortError::InvalidRequest(msg) => CoreError::Validation(msg),
            PortError::Unexpected(msg) => CoreError::RemoteService(msg),
        }
    }
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
