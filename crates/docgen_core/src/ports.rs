//! crates/docgen_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the authoring engine.
//! These traits form the boundary of the hexagonal architecture: the remote
//! project store, the AI generation backend, the export renderer and the auth
//! service are all reached through them, so the engine never depends on a
//! concrete transport.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    DocumentType, Identity, NewProject, NewSection, Project, ProjectId, ProjectSummary, Section,
    SectionGenerationRequest, SectionRefinementRequest,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Request rejected: {0}")]
    InvalidRequest(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Lists the authenticated identity's projects in creation order.
    async fn list_projects(&self) -> PortResult<Vec<ProjectSummary>>;

    async fn create_project(&self, project: &NewProject) -> PortResult<Project>;

    /// Fails with `NotFound` for unknown ids and for projects owned by someone else.
    async fn get_project(&self, project_id: ProjectId) -> PortResult<Project>;

    async fn list_sections(&self, project_id: ProjectId) -> PortResult<Vec<Section>>;

    async fn bulk_create_sections(
        &self,
        project_id: ProjectId,
        sections: &[NewSection],
    ) -> PortResult<()>;
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Suggests an ordered list of section (or slide) titles for a topic.
    async fn suggest_outline(
        &self,
        topic: &str,
        document_type: DocumentType,
    ) -> PortResult<Vec<String>>;

    /// Writes the content of one section from its title and the project context.
    async fn generate_section(&self, request: &SectionGenerationRequest) -> PortResult<String>;

    /// Revises existing section content following a natural-language instruction.
    async fn refine_section(&self, request: &SectionRefinementRequest) -> PortResult<String>;
}

#[async_trait]
pub trait ExportService: Send + Sync {
    /// Renders the project in its document format and returns the raw artifact.
    async fn export_project(&self, project_id: ProjectId) -> PortResult<Bytes>;
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, email: &str, password: &str) -> PortResult<()>;

    /// Exchanges credentials for a bearer identity.
    async fn login(&self, email: &str, password: &str) -> PortResult<Identity>;
}

/// Persists the bearer identity between runs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> PortResult<Option<Identity>>;
    async fn save(&self, identity: &Identity) -> PortResult<()>;
    async fn clear(&self) -> PortResult<()>;
}

/// Hands an exported artifact to the user's environment.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Delivers `bytes` under `file_name` and returns where it ended up.
    async fn deliver(&self, file_name: &str, bytes: Bytes) -> PortResult<String>;
}
