//! In-memory implementations of every port, used by the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::domain::{
    DocumentType, Identity, NewProject, NewSection, Project, ProjectId, ProjectSummary, Section,
    SectionGenerationRequest, SectionId, SectionRefinementRequest,
};
use crate::ports::{
    AuthService, CredentialStore, DownloadSink, ExportService, GenerationService, PortError,
    PortResult, ProjectService,
};

/// Which fake operations should fail.
#[derive(Debug, Default, Clone)]
pub struct Failures {
    pub create_project: bool,
    pub bulk_sections: bool,
    /// Saves the sections, then reports a failure as if the response was lost.
    pub bulk_sections_commit_then_fail: bool,
    pub suggest: bool,
    pub generate: bool,
    pub refine: bool,
    pub export: bool,
    pub login: bool,
}

/// How many times each remote operation was invoked.
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub create_project: usize,
    pub bulk_sections: usize,
    pub suggest: usize,
    pub generate: usize,
    pub refine: usize,
    pub export: usize,
}

#[derive(Default)]
struct State {
    projects: HashMap<ProjectId, Project>,
    sections: Vec<Section>,
    next_id: i64,
    suggestion: Vec<String>,
    failures: Failures,
    calls: Calls,
    bulk_payloads: Vec<Vec<NewSection>>,
}

/// A fake remote service. Generation calls can be held in flight with `hold_generation`.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.set_suggestion(&["Introduction", "Analysis", "Conclusion"]);
        backend
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_suggestion(&self, titles: &[&str]) {
        self.state().suggestion = titles.iter().map(|t| t.to_string()).collect();
    }

    pub fn fail(&self, configure: impl FnOnce(&mut Failures)) {
        configure(&mut self.state().failures);
    }

    pub fn calls(&self) -> Calls {
        self.state().calls.clone()
    }

    pub fn bulk_payloads(&self) -> Vec<Vec<NewSection>> {
        self.state().bulk_payloads.clone()
    }

    pub fn project_count(&self) -> usize {
        self.state().projects.len()
    }

    /// Seeds a project with the given sections; `Some` entries are already generated.
    pub fn seed_project(
        &self,
        title: &str,
        document_type: DocumentType,
        sections: &[(&str, Option<&str>)],
    ) -> ProjectId {
        let mut state = self.state();
        state.next_id += 1;
        let project_id = ProjectId(state.next_id);
        state.projects.insert(
            project_id,
            Project {
                id: project_id,
                title: title.to_string(),
                document_type,
                topic: format!("All about {}", title),
                created_at: Utc::now(),
            },
        );
        for (index, (section_title, content)) in sections.iter().enumerate() {
            state.next_id += 1;
            let id = SectionId(state.next_id);
            state.sections.push(Section {
                id,
                project_id,
                title: section_title.to_string(),
                order_index: index,
                content: content.map(str::to_string),
            });
        }
        project_id
    }

    pub fn section_ids(&self, project_id: ProjectId) -> Vec<SectionId> {
        let mut sections: Vec<Section> = self
            .state()
            .sections
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        sections.sort_by_key(|s| s.order_index);
        sections.into_iter().map(|s| s.id).collect()
    }

    /// From now on, generation and refinement wait until `release_generation` is called.
    pub fn hold_generation(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_generation(&self, calls: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(calls);
        }
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl ProjectService for FakeBackend {
    async fn list_projects(&self) -> PortResult<Vec<ProjectSummary>> {
        let mut projects: Vec<ProjectSummary> =
            self.state().projects.values().map(ProjectSummary::from).collect();
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    async fn create_project(&self, project: &NewProject) -> PortResult<Project> {
        let mut state = self.state();
        state.calls.create_project += 1;
        if state.failures.create_project {
            return Err(PortError::Unexpected("project backend down".to_string()));
        }
        state.next_id += 1;
        let created = Project {
            id: ProjectId(state.next_id),
            title: project.title.clone(),
            document_type: project.document_type,
            topic: project.topic.clone(),
            created_at: Utc::now(),
        };
        state.projects.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_project(&self, project_id: ProjectId) -> PortResult<Project> {
        self.state()
            .projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Project {} not found", project_id)))
    }

    async fn list_sections(&self, project_id: ProjectId) -> PortResult<Vec<Section>> {
        Ok(self
            .state()
            .sections
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn bulk_create_sections(
        &self,
        project_id: ProjectId,
        sections: &[NewSection],
    ) -> PortResult<()> {
        let mut state = self.state();
        state.calls.bulk_sections += 1;
        state.bulk_payloads.push(sections.to_vec());
        if state.failures.bulk_sections {
            return Err(PortError::Unexpected("section backend down".to_string()));
        }
        for new_section in sections {
            state.next_id += 1;
            let id = SectionId(state.next_id);
            state.sections.push(Section {
                id,
                project_id,
                title: new_section.title.clone(),
                order_index: new_section.order_index,
                content: None,
            });
        }
        if state.failures.bulk_sections_commit_then_fail {
            return Err(PortError::Unexpected("the request timed out".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl GenerationService for FakeBackend {
    async fn suggest_outline(
        &self,
        _topic: &str,
        _document_type: DocumentType,
    ) -> PortResult<Vec<String>> {
        let mut state = self.state();
        state.calls.suggest += 1;
        if state.failures.suggest {
            return Err(PortError::Unexpected("model unavailable".to_string()));
        }
        Ok(state.suggestion.clone())
    }

    async fn generate_section(&self, request: &SectionGenerationRequest) -> PortResult<String> {
        {
            let mut state = self.state();
            state.calls.generate += 1;
        }
        self.pass_gate().await;
        if self.state().failures.generate {
            return Err(PortError::Unexpected("generation failed".to_string()));
        }
        Ok(format!("Generated {}", request.section_title))
    }

    async fn refine_section(&self, request: &SectionRefinementRequest) -> PortResult<String> {
        {
            let mut state = self.state();
            state.calls.refine += 1;
        }
        self.pass_gate().await;
        if self.state().failures.refine {
            return Err(PortError::Unexpected("refinement failed".to_string()));
        }
        Ok(format!("{} ({})", request.current_content, request.instruction))
    }
}

#[async_trait]
impl ExportService for FakeBackend {
    async fn export_project(&self, project_id: ProjectId) -> PortResult<Bytes> {
        let mut state = self.state();
        state.calls.export += 1;
        if state.failures.export {
            return Err(PortError::Unexpected("renderer crashed".to_string()));
        }
        if !state.projects.contains_key(&project_id) {
            return Err(PortError::NotFound(format!("Project {} not found", project_id)));
        }
        Ok(Bytes::from_static(b"PK\x03\x04fake-office-file"))
    }
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn register(&self, _email: &str, _password: &str) -> PortResult<()> {
        Ok(())
    }

    async fn login(&self, email: &str, _password: &str) -> PortResult<Identity> {
        if self.state().failures.login {
            return Err(PortError::Unauthorized);
        }
        Ok(Identity {
            access_token: format!("token-for-{}", email),
            email: Some(email.to_string()),
        })
    }
}

/// Credential store and download sink kept in memory.
#[derive(Clone, Default)]
pub struct MemoryEnvironment {
    pub credential: Arc<Mutex<Option<Identity>>>,
    pub downloads: Arc<Mutex<Vec<(String, Bytes)>>>,
}

#[async_trait]
impl CredentialStore for MemoryEnvironment {
    async fn load(&self) -> PortResult<Option<Identity>> {
        Ok(self.credential.lock().unwrap().clone())
    }

    async fn save(&self, identity: &Identity) -> PortResult<()> {
        *self.credential.lock().unwrap() = Some(identity.clone());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        *self.credential.lock().unwrap() = None;
        Ok(())
    }
}

#[async_trait]
impl DownloadSink for MemoryEnvironment {
    async fn deliver(&self, file_name: &str, bytes: Bytes) -> PortResult<String> {
        self.downloads
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes));
        Ok(format!("memory://{}", file_name))
    }
}
