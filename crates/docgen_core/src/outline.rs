//! crates/docgen_core/src/outline.rs
//!
//! The outline draft: an ordered list of section titles that exists only while a
//! project is being created. Items have no identity; positions become
//! `order_index` values when the draft is materialized.

use tracing::{info, warn};

use crate::domain::{DocumentType, NewSection};
use crate::error::{CoreError, CoreResult};
use crate::ports::GenerationService;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineDraft {
    items: Vec<String>,
}

impl OutlineDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: titles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends one title. Empty and duplicate titles are allowed.
    pub fn append(&mut self, title: impl Into<String>) {
        self.items.push(title.into());
    }

    /// Appends the placeholder title for the document type ("New Section" / "New Slide").
    pub fn append_default(&mut self, document_type: DocumentType) {
        self.append(document_type.default_item_title());
    }

    /// Replaces the title at `index`. Out-of-range indices are rejected and the
    /// draft is left untouched.
    pub fn update(&mut self, index: usize, title: impl Into<String>) -> CoreResult<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        *slot = title.into();
        Ok(())
    }

    /// Removes the title at `index`; later items move down by one.
    pub fn remove(&mut self, index: usize) -> CoreResult<String> {
        if index >= self.items.len() {
            return Err(out_of_range(index, self.items.len()));
        }
        Ok(self.items.remove(index))
    }

    /// Asks the generation service for an outline and, on success, replaces the
    /// whole draft with it. On failure the current draft is kept as it was.
    ///
    /// Titles are trimmed and blank entries dropped; a suggestion with no titles
    /// left counts as a failure.
    pub async fn request_ai_suggestion(
        &mut self,
        generation: &dyn GenerationService,
        topic: &str,
        document_type: DocumentType,
    ) -> CoreResult<()> {
        if topic.trim().is_empty() {
            return Err(CoreError::Validation(
                "a topic is required to suggest an outline".to_string(),
            ));
        }

        let suggestion = generation
            .suggest_outline(topic, document_type)
            .await
            .map_err(|e| {
                warn!("Outline suggestion failed, keeping the current draft: {}", e);
                CoreError::from(e)
            })?;

        let titles: Vec<String> = suggestion
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if titles.is_empty() {
            return Err(CoreError::RemoteService(
                "the outline suggestion contained no titles".to_string(),
            ));
        }

        info!(
            "Replacing outline of {} items with a suggestion of {} {}s",
            self.items.len(),
            titles.len(),
            document_type.unit_noun()
        );
        self.items = titles;
        Ok(())
    }

    /// Converts the draft into section payloads; `order_index` is the current position.
    pub fn to_new_sections(&self) -> Vec<NewSection> {
        self.items
            .iter()
            .enumerate()
            .map(|(order_index, title)| NewSection {
                title: title.clone(),
                order_index,
            })
            .collect()
    }
}

fn out_of_range(index: usize, len: usize) -> CoreError {
    CoreError::Validation(format!(
        "outline index {} is out of range (outline has {} items)",
        index, len
    ))
}
