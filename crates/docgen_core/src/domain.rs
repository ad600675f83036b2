//! crates/docgen_core/src/domain.rs
//!
//! Defines the core data structures for the authoring workflow.
//! The records mirror what the remote authoring service sends over the wire,
//! so they derive `serde` traits, but they carry no transport logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Identifiers
//=========================================================================================

/// Opaque identifier of a project, assigned by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

/// Opaque identifier of a section, assigned on persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub i64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//=========================================================================================
// Document Type
//=========================================================================================

/// The kind of document a project produces. Fixed when the project is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// A word-processor document made of headed sections.
    #[serde(rename = "docx")]
    Doc,
    /// A slide deck made of slides.
    #[serde(rename = "pptx")]
    Deck,
}

impl DocumentType {
    /// The file extension used for exported artifacts.
    pub fn file_extension(self) -> &'static str {
        match self {
            DocumentType::Doc => "docx",
            DocumentType::Deck => "pptx",
        }
    }

    /// What one outline entry is called for this document type.
    pub fn unit_noun(self) -> &'static str {
        match self {
            DocumentType::Doc => "section",
            DocumentType::Deck => "slide",
        }
    }

    /// The title given to a manually added outline entry.
    pub fn default_item_title(self) -> &'static str {
        match self {
            DocumentType::Doc => "New Section",
            DocumentType::Deck => "New Slide",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_extension())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown document type '{0}' (expected docx or pptx)")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" | "doc" => Ok(DocumentType::Doc),
            "pptx" | "deck" | "slides" => Ok(DocumentType::Deck),
            other => Err(UnknownDocumentType(other.to_string())),
        }
    }
}

//=========================================================================================
// Project & Section Records
//=========================================================================================

/// A user's authoring unit, corresponding to one exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub document_type: DocumentType,
    /// Older records were stored without a topic.
    #[serde(default)]
    pub topic: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// The prompt context handed to the generation service.
    pub fn generation_context(&self) -> &str {
        if self.topic.trim().is_empty() {
            &self.title
        } else {
            &self.topic
        }
    }
}

/// One row of the project listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub title: String,
    pub document_type: DocumentType,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            document_type: project.document_type,
            created_at: project.created_at,
        }
    }
}

/// Payload for creating a project remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub document_type: DocumentType,
    pub topic: String,
}

/// One ordered content unit of a project: a heading's body, or a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub project_id: ProjectId,
    pub title: String,
    pub order_index: usize,
    /// `None` means the section has not been generated yet.
    #[serde(default)]
    pub content: Option<String>,
}

impl Section {
    pub fn is_generated(&self) -> bool {
        self.content.is_some()
    }
}

/// Payload for bulk-creating sections against an existing project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSection {
    pub title: String,
    pub order_index: usize,
}

//=========================================================================================
// Generation Requests
//=========================================================================================

/// Everything a generation backend needs to write one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGenerationRequest {
    pub section_id: SectionId,
    pub section_title: String,
    pub topic: String,
    pub document_type: DocumentType,
}

/// Everything a generation backend needs to revise one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRefinementRequest {
    pub section_id: SectionId,
    pub current_content: String,
    pub instruction: String,
}

//=========================================================================================
// Identity
//=========================================================================================

/// The authenticated identity: an opaque bearer credential issued by the auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub access_token: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("access_token", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

//=========================================================================================
// Timestamp (de)serialization
//=========================================================================================

/// The service emits naive UTC timestamps (`2025-01-02T03:04:05.123456`) as well as
/// RFC 3339 ones. Both are accepted; output is always RFC 3339.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}
