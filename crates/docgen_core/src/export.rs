//! crates/docgen_core/src/export.rs
//!
//! Requests a rendered artifact for a project and delivers it as a file.

use std::sync::Arc;
use tracing::{error, info};

use crate::domain::{DocumentType, ProjectId};
use crate::error::CoreResult;
use crate::ports::{DownloadSink, ExportService, ProjectService};

/// A delivered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub location: String,
    pub size: usize,
}

#[derive(Clone)]
pub struct ExportTrigger {
    projects: Arc<dyn ProjectService>,
    exporter: Arc<dyn ExportService>,
    sink: Arc<dyn DownloadSink>,
}

impl ExportTrigger {
    pub fn new(
        projects: Arc<dyn ProjectService>,
        exporter: Arc<dyn ExportService>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            projects,
            exporter,
            sink,
        }
    }

    /// Exports the project in its own format as `{title}.{extension}`.
    ///
    /// Sections without content are allowed; the renderer leaves them empty.
    /// Nothing is delivered when the export fails.
    pub async fn export_project(&self, project_id: ProjectId) -> CoreResult<ExportedFile> {
        let project = self.projects.get_project(project_id).await?;
        let file_name = export_file_name(&project.title, project.document_type);
        info!("Exporting project {} as {}", project_id, file_name);

        let bytes = self.exporter.export_project(project_id).await.map_err(|e| {
            error!("Export of project {} failed: {}", project_id, e);
            e
        })?;
        let size = bytes.len();

        let location = self.sink.deliver(&file_name, bytes).await?;
        info!("Delivered {} ({} bytes) to {}", file_name, size, location);

        Ok(ExportedFile {
            file_name,
            location,
            size,
        })
    }
}

/// `{title}.{extension}`, with characters that would break a file name replaced.
pub fn export_file_name(title: &str, document_type: DocumentType) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim_matches('.');
    let stem = if stem.is_empty() { "untitled" } else { stem };
    format!("{}.{}", stem, document_type.file_extension())
}
