pub mod domain;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod outline;
pub mod ports;
pub mod session;
pub mod store;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::{
    DocumentType, Identity, NewProject, NewSection, Project, ProjectId, ProjectSummary, Section,
    SectionGenerationRequest, SectionId, SectionRefinementRequest,
};
pub use error::{CoreError, CoreResult};
pub use export::{ExportTrigger, ExportedFile};
pub use orchestrator::{GenerationOrchestrator, GenerationOutcome, SectionStatus};
pub use outline::OutlineDraft;
pub use ports::{
    AuthService, CredentialStore, DownloadSink, ExportService, GenerationService, PortError,
    PortResult, ProjectService,
};
pub use session::AuthSession;
pub use store::{ProjectStore, SharedProjectStore};
pub use workflow::{CreationStage, CreationState, ProjectCreationWorkflow};
