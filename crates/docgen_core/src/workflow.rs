//! crates/docgen_core/src/workflow.rs
//!
//! The project creation workflow: choose a document type, capture the topic,
//! assemble an outline, then materialize the project and its sections remotely.
//!
//! The stages form an explicit state machine. `CreationState::next` is the only
//! place a stage changes, and it rejects anything but the single forward step
//! from the current stage.

use std::fmt;
use tracing::{error, info};

use crate::domain::{DocumentType, NewProject, NewSection, ProjectId, Section};
use crate::error::{CoreError, CoreResult};
use crate::outline::OutlineDraft;
use crate::ports::{GenerationService, ProjectService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStage {
    SelectingType,
    CapturingTopic,
    AssemblingOutline,
    Materialized,
}

impl fmt::Display for CreationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreationStage::SelectingType => "type selection",
            CreationStage::CapturingTopic => "topic capture",
            CreationStage::AssemblingOutline => "outline assembly",
            CreationStage::Materialized => "materialized",
        };
        f.write_str(name)
    }
}

/// Everything collected before the project exists remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub document_type: DocumentType,
    pub title: String,
    pub topic: String,
    pub outline: OutlineDraft,
    /// A project created remotely whose sections failed to save.
    orphan: Option<ProjectId>,
}

impl ProjectDraft {
    pub fn orphaned_project(&self) -> Option<ProjectId> {
        self.orphan
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationState {
    SelectingType,
    CapturingTopic { document_type: DocumentType },
    AssemblingOutline(ProjectDraft),
    Materialized { project_id: ProjectId },
}

/// The inputs that move the workflow forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationEvent {
    TypeChosen(DocumentType),
    TopicCaptured { title: String, topic: String },
    ProjectMaterialized(ProjectId),
}

impl CreationEvent {
    fn target(&self) -> CreationStage {
        match self {
            CreationEvent::TypeChosen(_) => CreationStage::CapturingTopic,
            CreationEvent::TopicCaptured { .. } => CreationStage::AssemblingOutline,
            CreationEvent::ProjectMaterialized(_) => CreationStage::Materialized,
        }
    }
}

impl CreationState {
    pub fn stage(&self) -> CreationStage {
        match self {
            CreationState::SelectingType => CreationStage::SelectingType,
            CreationState::CapturingTopic { .. } => CreationStage::CapturingTopic,
            CreationState::AssemblingOutline(_) => CreationStage::AssemblingOutline,
            CreationState::Materialized { .. } => CreationStage::Materialized,
        }
    }

    /// The transition function. Returns the following state, or a validation
    /// error when the event does not belong to the current stage.
    pub fn next(&self, event: CreationEvent) -> CoreResult<CreationState> {
        match (self, event) {
            (CreationState::SelectingType, CreationEvent::TypeChosen(document_type)) => {
                Ok(CreationState::CapturingTopic { document_type })
            }
            (
                CreationState::CapturingTopic { document_type },
                CreationEvent::TopicCaptured { title, topic },
            ) => {
                let topic = topic.trim().to_string();
                if topic.is_empty() {
                    return Err(CoreError::Validation("a topic is required".to_string()));
                }
                let title = match title.trim() {
                    "" => topic.clone(),
                    title => title.to_string(),
                };
                Ok(CreationState::AssemblingOutline(ProjectDraft {
                    document_type: *document_type,
                    title,
                    topic,
                    outline: OutlineDraft::new(),
                    orphan: None,
                }))
            }
            (CreationState::AssemblingOutline(_), CreationEvent::ProjectMaterialized(project_id)) => {
                Ok(CreationState::Materialized { project_id })
            }
            (state, event) => Err(CoreError::Validation(format!(
                "cannot move from {} to {}",
                state.stage(),
                event.target()
            ))),
        }
    }
}

/// Walks a user through creating a project.
///
/// Async steps borrow the workflow mutably, so a second suggestion or
/// materialization cannot start while one is outstanding.
#[derive(Debug, Clone)]
pub struct ProjectCreationWorkflow {
    state: CreationState,
}

impl Default for ProjectCreationWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectCreationWorkflow {
    pub fn new() -> Self {
        Self {
            state: CreationState::SelectingType,
        }
    }

    pub fn state(&self) -> &CreationState {
        &self.state
    }

    pub fn stage(&self) -> CreationStage {
        self.state.stage()
    }

    fn apply(&mut self, event: CreationEvent) -> CoreResult<()> {
        let next = self.state.next(event)?;
        info!("Project creation: {} -> {}", self.state.stage(), next.stage());
        self.state = next;
        Ok(())
    }

    pub fn select_document_type(&mut self, document_type: DocumentType) -> CoreResult<()> {
        self.apply(CreationEvent::TypeChosen(document_type))
    }

    /// Captures the topic (required) and title (defaults to the topic when empty).
    pub fn capture_topic(&mut self, title: &str, topic: &str) -> CoreResult<()> {
        self.apply(CreationEvent::TopicCaptured {
            title: title.to_string(),
            topic: topic.to_string(),
        })
    }

    pub fn draft(&self) -> CoreResult<&ProjectDraft> {
        match &self.state {
            CreationState::AssemblingOutline(draft) => Ok(draft),
            other => Err(not_assembling(other.stage())),
        }
    }

    fn draft_mut(&mut self) -> CoreResult<&mut ProjectDraft> {
        match &mut self.state {
            CreationState::AssemblingOutline(draft) => Ok(draft),
            other => Err(not_assembling(other.stage())),
        }
    }

    pub fn outline(&self) -> CoreResult<&OutlineDraft> {
        self.draft().map(|draft| &draft.outline)
    }

    pub fn outline_mut(&mut self) -> CoreResult<&mut OutlineDraft> {
        self.draft_mut().map(|draft| &mut draft.outline)
    }

    /// Replaces the outline with an AI suggestion for the captured topic.
    pub async fn suggest_outline(&mut self, generation: &dyn GenerationService) -> CoreResult<()> {
        let draft = self.draft_mut()?;
        draft
            .outline
            .request_ai_suggestion(generation, &draft.topic, draft.document_type)
            .await
    }

    /// Points the workflow at a project an earlier, interrupted run created, so
    /// `materialize` completes that project instead of creating another.
    pub fn resume_project(&mut self, project_id: ProjectId) -> CoreResult<()> {
        let draft = self.draft_mut()?;
        draft.orphan = Some(project_id);
        info!("Resuming previously created project {}", project_id);
        Ok(())
    }

    /// Creates the project, then its sections, and finishes the workflow.
    ///
    /// If the project is created but the sections are not, a `Consistency` error
    /// names the orphaned project. Calling `materialize` again reuses that
    /// project; a second project is never created. Before re-sending, the retry
    /// reads back what the service holds for the orphan: nothing means the
    /// sections are sent again, an exact copy of the outline means the earlier
    /// write landed after all, and anything else is a `Consistency` error with
    /// no further writes.
    pub async fn materialize(&mut self, projects: &dyn ProjectService) -> CoreResult<ProjectId> {
        let draft = self.draft_mut()?;
        if draft.outline.is_empty() {
            return Err(CoreError::Validation(
                "the outline needs at least one item".to_string(),
            ));
        }
        let sections = draft.outline.to_new_sections();
        let orphan = draft.orphan;

        let project_id = match orphan {
            Some(project_id) => {
                info!("Retrying sections for previously created project {}", project_id);
                let saved = projects
                    .list_sections(project_id)
                    .await
                    .map_err(|e| consistency(project_id, e.into()))?;
                if saved_matches(&saved, &sections) {
                    info!(
                        "Project {} already holds its {} sections",
                        project_id,
                        sections.len()
                    );
                    self.apply(CreationEvent::ProjectMaterialized(project_id))?;
                    return Ok(project_id);
                }
                if !saved.is_empty() {
                    error!(
                        "Project {} holds {} sections that differ from the outline; not re-sending",
                        project_id,
                        saved.len()
                    );
                    return Err(consistency(
                        project_id,
                        CoreError::Validation(format!(
                            "{} sections were already saved and do not match the outline",
                            saved.len()
                        )),
                    ));
                }
                project_id
            }
            None => {
                let created = projects
                    .create_project(&NewProject {
                        title: draft.title.clone(),
                        document_type: draft.document_type,
                        topic: draft.topic.clone(),
                    })
                    .await?;
                info!("Created project {} ('{}')", created.id, created.title);
                draft.orphan = Some(created.id);
                created.id
            }
        };

        if let Err(e) = projects.bulk_create_sections(project_id, &sections).await {
            error!(
                "Project {} exists but its {} sections were not saved: {}",
                project_id,
                sections.len(),
                e
            );
            return Err(consistency(project_id, e.into()));
        }

        info!("Saved {} sections for project {}", sections.len(), project_id);
        self.apply(CreationEvent::ProjectMaterialized(project_id))?;
        Ok(project_id)
    }

    /// The created project, once the workflow has finished.
    pub fn project_id(&self) -> Option<ProjectId> {
        match self.state {
            CreationState::Materialized { project_id } => Some(project_id),
            _ => None,
        }
    }
}

fn consistency(project_id: ProjectId, source: CoreError) -> CoreError {
    CoreError::Consistency {
        project_id,
        source: Box::new(source),
    }
}

/// True when the saved sections are exactly the outline, title for title and in order.
fn saved_matches(saved: &[Section], outline: &[NewSection]) -> bool {
    let mut saved: Vec<&Section> = saved.iter().collect();
    saved.sort_by_key(|s| s.order_index);
    saved.len() == outline.len()
        && saved
            .iter()
            .zip(outline)
            .all(|(s, o)| s.title == o.title && s.order_index == o.order_index)
}

fn not_assembling(stage: CreationStage) -> CoreError {
    CoreError::Validation(format!(
        "the outline can only be edited during outline assembly (currently in {})",
        stage
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{is_contiguous, ProjectStore};
    use crate::testing::FakeBackend;

    fn assembling(document_type: DocumentType) -> ProjectCreationWorkflow {
        let mut workflow = ProjectCreationWorkflow::new();
        workflow.select_document_type(document_type).unwrap();
        workflow.capture_topic("", "Electric vehicles in 2025").unwrap();
        workflow
    }

    #[test]
    fn stages_cannot_be_skipped() {
        let mut workflow = ProjectCreationWorkflow::new();

        assert!(matches!(
            workflow.capture_topic("Title", "Topic"),
            Err(CoreError::Validation(_))
        ));
        assert!(workflow.outline_mut().is_err());
        assert_eq!(workflow.stage(), CreationStage::SelectingType);

        workflow.select_document_type(DocumentType::Deck).unwrap();
        assert!(workflow.select_document_type(DocumentType::Doc).is_err());
        assert_eq!(workflow.stage(), CreationStage::CapturingTopic);
    }

    #[test]
    fn transition_function_only_allows_single_forward_steps() {
        let state = CreationState::SelectingType;
        assert!(state
            .next(CreationEvent::ProjectMaterialized(ProjectId(1)))
            .is_err());
        let state = state.next(CreationEvent::TypeChosen(DocumentType::Doc)).unwrap();
        assert!(state.next(CreationEvent::TypeChosen(DocumentType::Deck)).is_err());
    }

    #[test]
    fn topic_is_required_and_title_defaults_to_it() {
        let mut workflow = ProjectCreationWorkflow::new();
        workflow.select_document_type(DocumentType::Doc).unwrap();

        assert!(workflow.capture_topic("Title", "   ").is_err());
        assert_eq!(workflow.stage(), CreationStage::CapturingTopic);

        workflow.capture_topic("  ", "Solar power").unwrap();
        let draft = workflow.draft().unwrap();
        assert_eq!(draft.title, "Solar power");
        assert_eq!(draft.topic, "Solar power");
    }

    #[tokio::test]
    async fn materialize_requires_an_outline() {
        let backend = FakeBackend::new();
        let mut workflow = assembling(DocumentType::Doc);

        let result = workflow.materialize(&backend).await;

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(backend.calls().create_project, 0);
    }

    #[tokio::test]
    async fn materialize_creates_sections_in_outline_order() {
        let backend = FakeBackend::new();
        backend.set_suggestion(&["Conclusion", "Intro"]);
        let mut workflow = assembling(DocumentType::Doc);

        workflow.suggest_outline(&backend).await.unwrap();
        {
            let outline = workflow.outline_mut().unwrap();
            outline.update(0, "Intro").unwrap();
            outline.update(1, "Body").unwrap();
            outline.append("Conclusion");
        }
        let project_id = workflow.materialize(&backend).await.unwrap();

        assert_eq!(workflow.stage(), CreationStage::Materialized);
        assert_eq!(workflow.project_id(), Some(project_id));
        assert_eq!(
            backend.bulk_payloads(),
            vec![vec![
                NewSection { title: "Intro".into(), order_index: 0 },
                NewSection { title: "Body".into(), order_index: 1 },
                NewSection { title: "Conclusion".into(), order_index: 2 },
            ]]
        );
        assert!(workflow.outline_mut().is_err());
    }

    #[tokio::test]
    async fn failed_project_creation_creates_nothing() {
        let backend = FakeBackend::new();
        backend.fail(|f| f.create_project = true);
        let mut workflow = assembling(DocumentType::Deck);
        workflow.outline_mut().unwrap().append("Title slide");

        let result = workflow.materialize(&backend).await;

        assert!(matches!(result, Err(CoreError::RemoteService(_))));
        assert_eq!(backend.calls().bulk_sections, 0);
        assert_eq!(workflow.stage(), CreationStage::AssemblingOutline);
    }

    #[tokio::test]
    async fn section_failure_is_a_consistency_error_and_retry_reuses_project() {
        let backend = FakeBackend::new();
        backend.fail(|f| f.bulk_sections = true);
        let mut workflow = assembling(DocumentType::Doc);
        workflow.outline_mut().unwrap().append("Intro");

        let err = workflow.materialize(&backend).await.unwrap_err();
        let orphan = match err {
            CoreError::Consistency { project_id, .. } => project_id,
            other => panic!("expected consistency error, got {:?}", other),
        };
        assert_eq!(workflow.stage(), CreationStage::AssemblingOutline);
        assert_eq!(workflow.draft().unwrap().orphaned_project(), Some(orphan));

        backend.fail(|f| f.bulk_sections = false);
        let project_id = workflow.materialize(&backend).await.unwrap();

        assert_eq!(project_id, orphan);
        assert_eq!(backend.calls().create_project, 1);
        assert_eq!(backend.project_count(), 1);
        assert_eq!(backend.calls().bulk_sections, 2);
    }

    #[tokio::test]
    async fn retry_after_a_lost_response_does_not_resend_saved_sections() {
        let backend = FakeBackend::new();
        backend.fail(|f| f.bulk_sections_commit_then_fail = true);
        let mut workflow = assembling(DocumentType::Deck);
        {
            let outline = workflow.outline_mut().unwrap();
            outline.append("Title");
            outline.append("Market");
            outline.append("Outlook");
        }

        let first = workflow.materialize(&backend).await;
        assert!(matches!(first, Err(CoreError::Consistency { .. })));

        backend.fail(|f| f.bulk_sections_commit_then_fail = false);
        let project_id = workflow.materialize(&backend).await.unwrap();

        assert_eq!(workflow.stage(), CreationStage::Materialized);
        assert_eq!(backend.calls().bulk_sections, 1);
        let store = ProjectStore::load(&backend, project_id).await.unwrap();
        let order: Vec<usize> = store.sections().iter().map(|s| s.order_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(is_contiguous(store.sections()));
    }

    #[tokio::test]
    async fn retry_refuses_to_write_over_sections_that_differ_from_the_outline() {
        let backend = FakeBackend::new();
        backend.fail(|f| f.bulk_sections_commit_then_fail = true);
        let mut workflow = assembling(DocumentType::Doc);
        workflow.outline_mut().unwrap().append("Intro");

        let orphan = match workflow.materialize(&backend).await {
            Err(CoreError::Consistency { project_id, .. }) => project_id,
            other => panic!("expected consistency error, got {:?}", other),
        };
        backend.fail(|f| f.bulk_sections_commit_then_fail = false);
        workflow.outline_mut().unwrap().append("Body");

        let retry = workflow.materialize(&backend).await;

        assert!(matches!(
            retry,
            Err(CoreError::Consistency { project_id, .. }) if project_id == orphan
        ));
        assert_eq!(backend.calls().bulk_sections, 1);
        assert_eq!(backend.section_ids(orphan).len(), 1);
        assert_eq!(workflow.stage(), CreationStage::AssemblingOutline);
    }

    #[tokio::test]
    async fn resumed_project_gets_its_sections_without_a_new_project() {
        let backend = FakeBackend::new();
        let earlier = backend.seed_project("Solar power", DocumentType::Doc, &[]);
        let mut workflow = assembling(DocumentType::Doc);
        workflow.outline_mut().unwrap().append("Overview");

        workflow.resume_project(earlier).unwrap();
        let project_id = workflow.materialize(&backend).await.unwrap();

        assert_eq!(project_id, earlier);
        assert_eq!(backend.calls().create_project, 0);
        assert_eq!(backend.section_ids(earlier).len(), 1);
        assert!(workflow.resume_project(earlier).is_err());
    }
}
