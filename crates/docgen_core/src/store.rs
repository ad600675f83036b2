//! crates/docgen_core/src/store.rs
//!
//! The project store: the in-memory source of truth for one open project view.
//! Only the generation orchestrator (content) and direct user edits (titles)
//! mutate it, and sections are always kept sorted by `order_index`.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Project, ProjectId, Section, SectionId};
use crate::error::{CoreError, CoreResult};
use crate::ports::ProjectService;

/// The store shared between the orchestrator and the rest of a project view.
pub type SharedProjectStore = Arc<Mutex<ProjectStore>>;

/// Identifies one loaded view of a project. Reloading or switching projects
/// produces a new id, which is how late results are recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug)]
pub struct ProjectStore {
    view_id: ViewId,
    project: Project,
    sections: Vec<Section>,
    open: bool,
    cancellation: CancellationToken,
}

impl ProjectStore {
    /// Fetches a project and its sections from the remote service.
    pub async fn load(projects: &dyn ProjectService, project_id: ProjectId) -> CoreResult<Self> {
        let project = projects.get_project(project_id).await?;
        let sections = projects.list_sections(project_id).await?;
        info!(
            "Loaded project {} ('{}') with {} sections",
            project.id,
            project.title,
            sections.len()
        );
        Ok(Self::from_parts(project, sections))
    }

    /// Builds a store from already fetched records. Foreign sections are dropped.
    pub fn from_parts(project: Project, sections: Vec<Section>) -> Self {
        let mut sections: Vec<Section> = sections
            .into_iter()
            .filter(|s| {
                let owned = s.project_id == project.id;
                if !owned {
                    warn!(
                        "Ignoring section {} that belongs to project {}, not {}",
                        s.id, s.project_id, project.id
                    );
                }
                owned
            })
            .collect();
        sections.sort_by_key(|s| s.order_index);
        if !is_contiguous(&sections) {
            warn!(
                "Sections of project {} do not form a contiguous order; keeping sorted order",
                project.id
            );
        }

        Self {
            view_id: ViewId::new(),
            project,
            sections,
            open: true,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn into_shared(self) -> SharedProjectStore {
        Arc::new(Mutex::new(self))
    }

    /// Loads another project into an existing shared store. The previous view is
    /// closed first, so results still in flight for it are discarded.
    pub async fn switch_to(
        shared: &SharedProjectStore,
        projects: &dyn ProjectService,
        project_id: ProjectId,
    ) -> CoreResult<()> {
        let next = Self::load(projects, project_id).await?;
        let mut store = shared.lock().await;
        store.close();
        *store = next;
        Ok(())
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Sections ordered by `order_index`.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True while `view_id` is still the loaded, open view.
    pub fn is_current(&self, view_id: ViewId) -> bool {
        self.open && self.view_id == view_id
    }

    /// Fires when the view is closed.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn section(&self, section_id: SectionId) -> CoreResult<&Section> {
        if !self.open {
            return Err(closed(section_id));
        }
        self.sections
            .iter()
            .find(|s| s.id == section_id)
            .ok_or_else(|| not_member(section_id, self.project.id))
    }

    fn section_mut(&mut self, section_id: SectionId) -> CoreResult<&mut Section> {
        if !self.open {
            return Err(closed(section_id));
        }
        let project_id = self.project.id;
        self.sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| not_member(section_id, project_id))
    }

    /// Replaces a section's content with a complete new value.
    pub fn set_section_content(
        &mut self,
        section_id: SectionId,
        content: impl Into<String>,
    ) -> CoreResult<()> {
        let section = self.section_mut(section_id)?;
        section.content = Some(content.into());
        Ok(())
    }

    /// Applies a user edit to a section title.
    pub fn rename_section(&mut self, section_id: SectionId, title: &str) -> CoreResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation(
                "a section title cannot be empty".to_string(),
            ));
        }
        let section = self.section_mut(section_id)?;
        section.title = title.to_string();
        Ok(())
    }

    /// Marks the view as navigated away from.
    pub fn close(&mut self) {
        if self.open {
            info!("Closing view of project {}", self.project.id);
            self.open = false;
            self.cancellation.cancel();
        }
    }
}

/// True when the order indices are exactly `0..n` in order.
pub fn is_contiguous(sections: &[Section]) -> bool {
    sections
        .iter()
        .enumerate()
        .all(|(position, s)| s.order_index == position)
}

fn closed(section_id: SectionId) -> CoreError {
    CoreError::NotFound(format!(
        "section {} is not part of an open project",
        section_id
    ))
}

fn not_member(section_id: SectionId, project_id: ProjectId) -> CoreError {
    CoreError::NotFound(format!(
        "section {} does not belong to project {}",
        section_id, project_id
    ))
}
