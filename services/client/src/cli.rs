//! services/client/src/cli.rs
//!
//! Command line definitions for the `docgen` binary.

use clap::{Args, Parser, Subcommand};
use docgen_core::DocumentType;

#[derive(Debug, Parser)]
#[command(
    name = "docgen",
    version,
    about = "Outline, generate, refine and export AI-written documents and slide decks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and log into it
    Register(CredentialArgs),
    /// Log in and remember the credential
    Login(CredentialArgs),
    /// Forget the stored credential
    Logout,
    /// List your projects
    Projects,
    /// Create a project from a topic and an outline
    New(NewProjectArgs),
    /// Show a project and its sections
    Show {
        project_id: i64,
    },
    /// Generate one section, or every section that has no content yet
    Generate {
        project_id: i64,
        #[arg(long)]
        section: Option<i64>,
    },
    /// Revise a generated section with an instruction
    Refine {
        project_id: i64,
        section_id: i64,
        #[arg(short, long)]
        instruction: String,
    },
    /// Download the rendered .docx / .pptx file
    Export {
        project_id: i64,
    },
}

#[derive(Debug, Args)]
pub struct CredentialArgs {
    pub email: String,
    #[arg(long, env = "DOCGEN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct NewProjectArgs {
    /// docx (document) or pptx (slide deck)
    #[arg(long = "type", value_name = "TYPE")]
    pub document_type: DocumentType,
    /// What the document is about; used as generation context
    #[arg(long)]
    pub topic: String,
    /// Display title; defaults to the topic
    #[arg(long, default_value = "")]
    pub title: String,
    /// Ask the AI for an outline before adding any --section items
    #[arg(long)]
    pub suggest: bool,
    /// An outline item, in order (repeatable)
    #[arg(long = "section", value_name = "TITLE")]
    pub sections: Vec<String>,
    /// Generate every section right after creating the project
    #[arg(long)]
    pub generate: bool,
    /// Finish a project an earlier `new` created but could not save sections for
    #[arg(long, value_name = "PROJECT_ID")]
    pub resume: Option<i64>,
}
