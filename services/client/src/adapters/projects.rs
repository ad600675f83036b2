//! services/client/src/adapters/projects.rs
//!
//! This module contains the adapter for the remote project store.
//! It implements the `ProjectService` port from the `core` crate.

use async_trait::async_trait;
use docgen_core::{
    NewProject, NewSection, PortResult, Project, ProjectId, ProjectService, ProjectSummary,
    Section,
};
use reqwest::Method;
use serde::Serialize;

use super::http::ApiClient;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ProjectService` over the service's REST API.
#[derive(Clone)]
pub struct HttpProjectsAdapter {
    api: ApiClient,
}

impl HttpProjectsAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Serialize)]
struct BulkSectionsRequest<'a> {
    sections: &'a [NewSection],
}

//=========================================================================================
// `ProjectService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProjectService for HttpProjectsAdapter {
    async fn list_projects(&self) -> PortResult<Vec<ProjectSummary>> {
        let request = self.api.authed(Method::GET, "projects/")?;
        self.api.send_json(request).await
    }

    async fn create_project(&self, project: &NewProject) -> PortResult<Project> {
        let request = self.api.authed(Method::POST, "projects/")?.json(project);
        self.api.send_json(request).await
    }

    async fn get_project(&self, project_id: ProjectId) -> PortResult<Project> {
        let request = self
            .api
            .authed(Method::GET, &format!("projects/{}", project_id))?;
        self.api.send_json(request).await
    }

    async fn list_sections(&self, project_id: ProjectId) -> PortResult<Vec<Section>> {
        let request = self
            .api
            .authed(Method::GET, &format!("projects/{}/sections", project_id))?;
        self.api.send_json(request).await
    }

    /// The response body only acknowledges the write, so it is not decoded.
    async fn bulk_create_sections(
        &self,
        project_id: ProjectId,
        sections: &[NewSection],
    ) -> PortResult<()> {
        let request = self
            .api
            .authed(Method::POST, &format!("projects/{}/sections/bulk", project_id))?
            .json(&BulkSectionsRequest { sections });
        self.api.send(request).await?;
        Ok(())
    }
}
