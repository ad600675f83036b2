//! services/client/src/adapters/export.rs
//!
//! This module contains the adapter for the remote document renderer.
//! It implements the `ExportService` port from the `core` crate.

use async_trait::async_trait;
use bytes::Bytes;
use docgen_core::{ExportService, PortError, PortResult, ProjectId};
use reqwest::{header::CONTENT_TYPE, Method};
use tracing::debug;

use super::http::ApiClient;

/// An adapter that implements `ExportService` by downloading the rendered artifact.
#[derive(Clone)]
pub struct HttpExportAdapter {
    api: ApiClient,
}

impl HttpExportAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ExportService for HttpExportAdapter {
    async fn export_project(&self, project_id: ProjectId) -> PortResult<Bytes> {
        let request = self
            .api
            .authed(Method::GET, &format!("export/{}", project_id))?;
        let response = self.api.send(request).await?;
        debug!(
            "Export of project {} served as {:?}",
            project_id,
            response.headers().get(CONTENT_TYPE)
        );
        response
            .bytes()
            .await
            .map_err(|e| PortError::Unexpected(format!("export download interrupted: {}", e)))
    }
}
