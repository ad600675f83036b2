//! services/client/src/adapters/generation.rs
//!
//! This module contains the adapter for the remote AI generation endpoints.
//! It implements the `GenerationService` port from the `core` crate.
//!
//! The service keeps its own copy of each section, so the section endpoints are
//! addressed by id alone; the title, topic and current content carried in the
//! port requests are only needed by in-process generation backends.

use async_trait::async_trait;
use docgen_core::{
    DocumentType, GenerationService, PortError, PortResult, SectionGenerationRequest,
    SectionRefinementRequest,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::http::ApiClient;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationService` over the service's REST API.
#[derive(Clone)]
pub struct HttpGenerationAdapter {
    api: ApiClient,
}

impl HttpGenerationAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

//=========================================================================================
// Wire Payloads
//=========================================================================================

#[derive(Serialize)]
struct SuggestOutlineRequest<'a> {
    topic: &'a str,
    document_type: DocumentType,
}

#[derive(Deserialize)]
struct SuggestOutlineResponse {
    outline: Vec<String>,
}

#[derive(Serialize)]
struct RefineRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: Option<String>,
}

impl ContentResponse {
    fn into_content(self) -> PortResult<String> {
        self.content.ok_or_else(|| {
            PortError::Unexpected("generation response contained no content".to_string())
        })
    }
}

//=========================================================================================
// `GenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationService for HttpGenerationAdapter {
    async fn suggest_outline(
        &self,
        topic: &str,
        document_type: DocumentType,
    ) -> PortResult<Vec<String>> {
        let request = self
            .api
            .authed(Method::POST, "generation/suggest-outline")?
            .json(&SuggestOutlineRequest {
                topic,
                document_type,
            });
        let response: SuggestOutlineResponse = self.api.send_json(request).await?;
        info!("Service suggested {} outline items", response.outline.len());
        Ok(response.outline)
    }

    async fn generate_section(&self, request: &SectionGenerationRequest) -> PortResult<String> {
        let http_request = self.api.authed(
            Method::POST,
            &format!("generation/section/{}", request.section_id),
        )?;
        let response: ContentResponse = self.api.send_json(http_request).await?;
        response.into_content()
    }

    async fn refine_section(&self, request: &SectionRefinementRequest) -> PortResult<String> {
        let http_request = self
            .api
            .authed(
                Method::POST,
                &format!("generation/refine/{}", request.section_id),
            )?
            .json(&RefineRequest {
                prompt: &request.instruction,
            });
        let response: ContentResponse = self.api.send_json(http_request).await?;
        response.into_content()
    }
}
