//! crates/docgen_core/src/orchestrator.rs
//!
//! Drives the remote "generate" and "refine" operations for individual sections.
//!
//! Every section has its own `Idle`/`InFlight` status kept in a keyed map, so work
//! on one section never waits on another. A section that is `InFlight` rejects a
//! second operation until the first settles, and it always returns to `Idle`
//! afterwards, whatever the outcome.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::domain::{SectionGenerationRequest, SectionId, SectionRefinementRequest};
use crate::error::{CoreError, CoreResult};
use crate::ports::{GenerationService, PortResult};
use crate::store::{SharedProjectStore, ViewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    Idle,
    InFlight,
}

/// What happened to a successful remote result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The new content was written to the section.
    Applied(String),
    /// The project view was closed or replaced before the result arrived.
    Discarded,
}

type StatusMap = Arc<Mutex<HashMap<SectionId, SectionStatus>>>;

#[derive(Clone)]
pub struct GenerationOrchestrator {
    generation: Arc<dyn GenerationService>,
    store: SharedProjectStore,
    statuses: StatusMap,
}

/// Holds a section in `InFlight`; dropping it puts the section back to `Idle`.
struct InFlightGuard {
    statuses: StatusMap,
    section_id: SectionId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.statuses).remove(&self.section_id);
    }
}

fn lock(statuses: &StatusMap) -> MutexGuard<'_, HashMap<SectionId, SectionStatus>> {
    statuses.lock().unwrap_or_else(PoisonError::into_inner)
}

impl GenerationOrchestrator {
    pub fn new(generation: Arc<dyn GenerationService>, store: SharedProjectStore) -> Self {
        Self {
            generation,
            store,
            statuses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &SharedProjectStore {
        &self.store
    }

    pub fn status(&self, section_id: SectionId) -> SectionStatus {
        lock(&self.statuses)
            .get(&section_id)
            .copied()
            .unwrap_or(SectionStatus::Idle)
    }

    /// Sections that currently have an operation outstanding.
    pub fn in_flight(&self) -> Vec<SectionId> {
        let mut ids: Vec<SectionId> = lock(&self.statuses)
            .iter()
            .filter(|(_, status)| **status == SectionStatus::InFlight)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    fn begin(&self, section_id: SectionId) -> CoreResult<InFlightGuard> {
        let mut statuses = lock(&self.statuses);
        if statuses.get(&section_id) == Some(&SectionStatus::InFlight) {
            warn!("Rejecting operation on section {}: already in flight", section_id);
            return Err(CoreError::Busy(section_id));
        }
        statuses.insert(section_id, SectionStatus::InFlight);
        Ok(InFlightGuard {
            statuses: self.statuses.clone(),
            section_id,
        })
    }

    /// Generates (or regenerates) a section's content from its title and the project topic.
    pub async fn generate(&self, section_id: SectionId) -> CoreResult<GenerationOutcome> {
        let (request, view_id, cancelled) = {
            let store = self.store.lock().await;
            let section = store.section(section_id)?;
            let project = store.project();
            let request = SectionGenerationRequest {
                section_id,
                section_title: section.title.clone(),
                topic: project.generation_context().to_string(),
                document_type: project.document_type,
            };
            (request, store.view_id(), store.cancellation_token())
        };

        let _guard = self.begin(section_id)?;
        info!("Generating content for section {} ('{}')", section_id, request.section_title);

        let result = tokio::select! {
            _ = cancelled.cancelled() => {
                info!("View closed while section {} was generating; result dropped", section_id);
                return Ok(GenerationOutcome::Discarded);
            }
            result = self.generation.generate_section(&request) => result,
        };
        self.settle(section_id, view_id, "generation", result).await
    }

    /// Revises a section's existing content following `instruction`.
    pub async fn refine(
        &self,
        section_id: SectionId,
        instruction: &str,
    ) -> CoreResult<GenerationOutcome> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(CoreError::Validation(
                "a refinement instruction is required".to_string(),
            ));
        }

        let (request, view_id, cancelled) = {
            let store = self.store.lock().await;
            let section = store.section(section_id)?;
            let current_content = section.content.clone().ok_or_else(|| {
                CoreError::Validation(format!(
                    "section {} has no content to refine yet",
                    section_id
                ))
            })?;
            let request = SectionRefinementRequest {
                section_id,
                current_content,
                instruction: instruction.to_string(),
            };
            (request, store.view_id(), store.cancellation_token())
        };

        let _guard = self.begin(section_id)?;
        info!("Refining section {} with '{}'", section_id, request.instruction);

        let result = tokio::select! {
            _ = cancelled.cancelled() => {
                info!("View closed while section {} was refining; result dropped", section_id);
                return Ok(GenerationOutcome::Discarded);
            }
            result = self.generation.refine_section(&request) => result,
        };
        self.settle(section_id, view_id, "refinement", result).await
    }

    /// Generates every section that has no content yet, all at once. Results
    /// come back per section in outline order; the calls themselves may settle
    /// in any order.
    pub async fn generate_missing(&self) -> Vec<(SectionId, CoreResult<GenerationOutcome>)> {
        let pending: Vec<SectionId> = {
            let store = self.store.lock().await;
            if !store.is_open() {
                return Vec::new();
            }
            store
                .sections()
                .iter()
                .filter(|s| !s.is_generated())
                .map(|s| s.id)
                .collect()
        };
        info!("Generating {} sections without content", pending.len());

        join_all(
            pending
                .into_iter()
                .map(|id| async move { (id, self.generate(id).await) }),
        )
        .await
    }

    async fn settle(
        &self,
        section_id: SectionId,
        view_id: ViewId,
        operation: &str,
        result: PortResult<String>,
    ) -> CoreResult<GenerationOutcome> {
        match result {
            Ok(content) => {
                let mut store = self.store.lock().await;
                if !store.is_current(view_id) {
                    warn!(
                        "Discarding {} result for section {}: the project view changed",
                        operation, section_id
                    );
                    return Ok(GenerationOutcome::Discarded);
                }
                store.set_section_content(section_id, content.clone())?;
                info!("Section {} {} applied ({} chars)", section_id, operation, content.len());
                Ok(GenerationOutcome::Applied(content))
            }
            Err(e) => {
                error!("Section {} {} failed: {}", section_id, operation, e);
                Err(e.into())
            }
        }
    }
}
