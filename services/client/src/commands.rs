//! services/client/src/commands.rs
//!
//! Runs one CLI command against the remote authoring service. Each command
//! builds the adapters it needs from the configuration and the current session
//! and drives the engine in `docgen_core`.

use docgen_core::{
    AuthSession, CoreResult, ExportTrigger, GenerationOrchestrator, GenerationOutcome,
    ProjectCreationWorkflow, ProjectId, ProjectStore, SectionId,
};
use std::sync::Arc;
use tracing::info;

use crate::adapters::{
    ApiClient, FileCredentialStore, FsDownloadSink, HttpAuthAdapter, HttpExportAdapter,
    HttpGenerationAdapter, HttpProjectsAdapter,
};
use crate::cli::{Cli, Command, CredentialArgs, NewProjectArgs};
use crate::config::Config;
use crate::error::ClientError;

/// The remote adapters, all authenticating as the logged in user.
pub struct Services {
    pub projects: Arc<HttpProjectsAdapter>,
    pub generation: Arc<HttpGenerationAdapter>,
    pub export: Arc<HttpExportAdapter>,
    pub downloads: Arc<FsDownloadSink>,
}

impl Services {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            projects: Arc::new(HttpProjectsAdapter::new(api.clone())),
            generation: Arc::new(HttpGenerationAdapter::new(api.clone())),
            export: Arc::new(HttpExportAdapter::new(api)),
            downloads: Arc::new(FsDownloadSink::new(&config.export_dir)),
        }
    }

    async fn orchestrator(&self, project_id: ProjectId) -> CoreResult<GenerationOrchestrator> {
        let store = ProjectStore::load(self.projects.as_ref(), project_id).await?;
        Ok(GenerationOrchestrator::new(
            self.generation.clone(),
            store.into_shared(),
        ))
    }
}

pub async fn run(cli: Cli, config: &Config) -> Result<(), ClientError> {
    let api = ApiClient::from_config(config)?;
    let mut session = AuthSession::restore(
        Arc::new(HttpAuthAdapter::new(api.clone())),
        Arc::new(FileCredentialStore::new(&config.credentials_path)),
    )
    .await?;

    match cli.command {
        Command::Register(CredentialArgs { email, password }) => {
            session.register(&email, &password).await?;
            println!("Registered and logged in as {}", email.trim());
        }
        Command::Login(CredentialArgs { email, password }) => {
            session.login(&email, &password).await?;
            println!("Logged in as {}", email.trim());
        }
        Command::Logout => {
            session.logout().await?;
            println!("Logged out");
        }
        Command::Projects => list_projects(&authenticated(&session, api, config)?).await?,
        Command::New(args) => new_project(&authenticated(&session, api, config)?, args).await?,
        Command::Show { project_id } => {
            show_project(&authenticated(&session, api, config)?, ProjectId(project_id)).await?
        }
        Command::Generate {
            project_id,
            section,
        } => {
            let services = authenticated(&session, api, config)?;
            generate(&services, ProjectId(project_id), section.map(SectionId)).await?
        }
        Command::Refine {
            project_id,
            section_id,
            instruction,
        } => {
            let services = authenticated(&session, api, config)?;
            let orchestrator = services.orchestrator(ProjectId(project_id)).await?;
            let outcome = orchestrator
                .refine(SectionId(section_id), &instruction)
                .await;
            report(SectionId(section_id), outcome)?;
        }
        Command::Export { project_id } => {
            let services = authenticated(&session, api, config)?;
            let trigger = ExportTrigger::new(
                services.projects.clone(),
                services.export.clone(),
                services.downloads.clone(),
            );
            let file = trigger.export_project(ProjectId(project_id)).await?;
            println!("Saved {} ({} bytes) to {}", file.file_name, file.size, file.location);
        }
    }
    Ok(())
}

fn authenticated(
    session: &AuthSession,
    api: ApiClient,
    config: &Config,
) -> Result<Services, ClientError> {
    let identity = session.identity()?.clone();
    Ok(Services::new(api.with_identity(identity), config))
}

pub async fn list_projects(services: &Services) -> Result<(), ClientError> {
    use docgen_core::ProjectService;

    let projects = services.projects.list_projects().await?;
    if projects.is_empty() {
        println!("No projects yet. Create one with `docgen new`.");
        return Ok(());
    }
    for project in projects {
        println!(
            "{:>6}  {}  {}  {}",
            project.id.0,
            project.document_type,
            project.created_at.format("%Y-%m-%d"),
            project.title
        );
    }
    Ok(())
}

/// Walks the creation workflow non-interactively from the command arguments.
pub async fn new_project(services: &Services, args: NewProjectArgs) -> Result<(), ClientError> {
    let mut workflow = ProjectCreationWorkflow::new();
    workflow.select_document_type(args.document_type)?;
    workflow.capture_topic(&args.title, &args.topic)?;
    if let Some(project_id) = args.resume {
        workflow.resume_project(ProjectId(project_id))?;
    }

    if args.suggest {
        workflow.suggest_outline(services.generation.as_ref()).await?;
    }
    {
        let outline = workflow.outline_mut()?;
        for title in &args.sections {
            outline.append(title.as_str());
        }
    }
    for (position, title) in workflow.outline()?.items().iter().enumerate() {
        println!("{:>3}. {}", position + 1, title);
    }

    let project_id = match workflow.materialize(services.projects.as_ref()).await {
        Ok(project_id) => project_id,
        Err(e) => {
            if let Some(orphan) = workflow.draft().ok().and_then(|d| d.orphaned_project()) {
                eprintln!(
                    "Project {} was created but its sections were not saved. Run the same \
                     command again with `--resume {}` to finish it without creating another \
                     project.",
                    orphan, orphan
                );
            }
            return Err(e.into());
        }
    };
    println!("Saved project {}", project_id);

    if args.generate {
        generate(services, project_id, None).await?;
    }
    Ok(())
}

pub async fn show_project(services: &Services, project_id: ProjectId) -> Result<(), ClientError> {
    let store = ProjectStore::load(services.projects.as_ref(), project_id).await?;
    let project = store.project();
    println!(
        "{} [{}] {}",
        project.id, project.document_type, project.title
    );
    if !project.topic.is_empty() && project.topic != project.title {
        println!("Topic: {}", project.topic);
    }
    for section in store.sections() {
        println!();
        println!(
            "{}. {} (section {})",
            section.order_index + 1,
            section.title,
            section.id
        );
        match &section.content {
            Some(content) => println!("{}", content),
            None => println!("(not generated yet)"),
        }
    }
    Ok(())
}

/// Generates one section, or every section still missing content.
pub async fn generate(
    services: &Services,
    project_id: ProjectId,
    section: Option<SectionId>,
) -> Result<(), ClientError> {
    let orchestrator = services.orchestrator(project_id).await?;
    match section {
        Some(section_id) => Ok(report(section_id, orchestrator.generate(section_id).await)?),
        None => {
            let results = orchestrator.generate_missing().await;
            if results.is_empty() {
                println!("Every section already has content.");
                return Ok(());
            }
            let total = results.len();
            let mut failures = 0;
            for (section_id, outcome) in results {
                if let Err(e) = report(section_id, outcome) {
                    eprintln!("Section {}: {}", section_id, e);
                    failures += 1;
                }
            }
            info!("{} of {} sections generated", total - failures, total);
            if failures > 0 {
                return Err(ClientError::Internal(format!(
                    "{} of {} sections failed to generate",
                    failures, total
                )));
            }
            Ok(())
        }
    }
}

fn report(section_id: SectionId, outcome: CoreResult<GenerationOutcome>) -> CoreResult<()> {
    match outcome? {
        GenerationOutcome::Applied(content) => {
            println!("--- section {} ---", section_id);
            println!("{}", content);
        }
        GenerationOutcome::Discarded => println!("Section {}: result discarded", section_id),
    }
    Ok(())
}
