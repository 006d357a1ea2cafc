use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tailor::models::{DecodeError, DraftRequest, SectionUpdate, SuggestionRequest, TargetRequest};
use tailor::presentation::{present, present_as, ContentView, ResultView};
use tailor::render::{
    builtin_templates, is_known_template, render, render_gallery, sample_content, to_html,
    Document,
};
use tailor::{
    Config, HttpJobService, JobService, Orchestrator, OrchestratorError, PipelineState, SourceFile,
    Stage,
};

#[derive(Parser)]
#[command(name = "tailor", version, about = "Tailor a resume to a job description and preview it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a resume, submit a job description, and wait for the tailored result
    Run(RunArgs),
    /// List the backend's templates
    Templates,
    /// Render the built-in sample resume offline
    Preview {
        /// Template to render; all built-in templates when omitted
        #[arg(long)]
        template: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Ask the writing assistant for suggestions on one section
    Suggest {
        #[arg(long)]
        section: String,
        #[arg(long)]
        role: String,
        #[arg(long, default_value = "Mid-level")]
        level: String,
        #[arg(long, default_value = "Technology")]
        industry: String,
        /// Current text of the section
        #[arg(long)]
        current: Option<String>,
    },
    /// Start a resume from scratch and fill sections one at a time
    Draft(DraftArgs),
}

#[derive(Args)]
struct DraftArgs {
    #[arg(long)]
    role: String,
    #[arg(long, default_value = "Junior")]
    level: String,
    #[arg(long, default_value = "Technology")]
    industry: String,
    #[arg(long, default_value = "minimal-pro")]
    template: String,
    /// Section to write, as `name=value`; the value is read as JSON when it parses
    #[arg(long = "set", value_name = "SECTION=VALUE", value_parser = parse_section)]
    sections: Vec<SectionUpdate>,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

fn parse_section(raw: &str) -> Result<SectionUpdate, String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SECTION=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("section name is empty".to_string());
    }
    let content = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok(SectionUpdate {
        section_name: name.to_string(),
        content,
    })
}

#[derive(Args)]
struct RunArgs {
    /// Resume document to upload
    #[arg(long)]
    file: PathBuf,
    /// Text file holding the job description
    #[arg(long)]
    target: PathBuf,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    company: Option<String>,
    /// Render with this template instead of the one the job was generated for
    #[arg(long)]
    template: Option<String>,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Run(args) => run(&config, make_service(&config)?, args).await,
        Command::Templates => templates(make_service(&config)?.as_ref()).await,
        Command::Preview { template, format } => preview(template, format).await,
        Command::Suggest {
            section,
            role,
            level,
            industry,
            current,
        } => {
            let request = SuggestionRequest {
                section_name: section,
                current_content: current.map(Value::String),
                job_role: role,
                experience_level: level,
                industry,
            };
            suggest(make_service(&config)?.as_ref(), &request).await
        }
        Command::Draft(args) => draft(make_service(&config)?.as_ref(), args).await,
    }
}

fn make_service(config: &Config) -> Result<Arc<dyn JobService>> {
    let service = HttpJobService::new(
        config.api_url.clone(),
        config.credentials.clone(),
        config.request_timeout,
    )
    .context("Failed to build HTTP client")?;
    info!("Using backend at {}", service.base_url());
    Ok(Arc::new(service))
}

// ────────────────────────────────────────────────────────────────────────────
// run
// ────────────────────────────────────────────────────────────────────────────

async fn run(config: &Config, service: Arc<dyn JobService>, args: RunArgs) -> Result<()> {
    let file = SourceFile::from_path(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let text = tokio::fs::read_to_string(&args.target)
        .await
        .with_context(|| format!("Failed to read {}", args.target.display()))?;

    let mut request = TargetRequest::new(text);
    if let Some(position) = args.position {
        request = request.with_position(position);
    }
    if let Some(company) = args.company {
        request = request.with_organization(company);
    }

    let orchestrator = Orchestrator::new(service, config.poll_policy());
    info!("Pipeline run {}", orchestrator.run_id());

    let mut updates = orchestrator.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last = Stage::Idle;
        while updates.changed().await.is_ok() {
            let (stage, progress) = {
                let state = updates.borrow_and_update();
                (state.stage, state.progress)
            };
            if stage != last {
                eprintln!("[{stage}] {progress}%");
                last = stage;
            }
        }
    });

    let result = tokio::select! {
        result = drive(&orchestrator, file, request) => result,
        _ = tokio::signal::ctrl_c() => {
            orchestrator.dispose();
            reporter.abort();
            bail!("Interrupted; pipeline disposed");
        }
    };
    reporter.abort();

    let state = match result {
        Ok(state) => state,
        Err(OrchestratorError::Service(_)) => orchestrator.snapshot(),
        Err(e) => return Err(e.into()),
    };

    match (state.stage, &state.outcome, &state.failure) {
        (Stage::Completed, Some(outcome), _) => {
            let view = match &args.template {
                Some(template) => present_as(outcome, template),
                None => present(outcome, &config.template),
            };
            print_view(&view, args.format)
        }
        (_, _, Some(failure)) => bail!("{failure}"),
        (stage, _, _) => bail!("Pipeline stopped in stage {stage}"),
    }
}

async fn drive(
    orchestrator: &Orchestrator,
    file: SourceFile,
    request: TargetRequest,
) -> Result<PipelineState, OrchestratorError> {
    orchestrator.upload(file).await?;
    orchestrator.submit_target(request).await?;
    orchestrator.start_generation().await?;
    orchestrator.wait_for_terminal().await
}

fn print_view(view: &ResultView, format: OutputFormat) -> Result<()> {
    match (format, &view.content) {
        (OutputFormat::Json, _) => println!("{}", serde_json::to_string_pretty(view)?),
        (OutputFormat::Html, ContentView::Rendered { document }) => print!("{}", to_html(document)),
        (OutputFormat::Html, _) => {
            warn!("Generated content could not be laid out; printing text instead");
            print!("{view}");
        }
        (OutputFormat::Text, _) => print!("{view}"),
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// templates / preview / suggest
// ────────────────────────────────────────────────────────────────────────────

async fn templates(service: &dyn JobService) -> Result<()> {
    let templates = service.list_templates().await?;
    for template in &templates {
        let layout = if is_known_template(&template.id) {
            "built-in layout"
        } else {
            "default layout"
        };
        println!(
            "{:<18} {:<22} {:<14} {}",
            template.id, template.display_name, template.category, layout
        );
    }

    match service.template_metadata().await {
        Ok(metadata) => {
            if !metadata.experience_levels.is_empty() {
                println!("\nExperience levels: {}", metadata.experience_levels.join(", "));
            }
            if !metadata.industries.is_empty() {
                println!("Industries: {}", metadata.industries.join(", "));
            }
        }
        Err(e) => warn!("Template metadata unavailable: {e}"),
    }
    Ok(())
}

async fn preview(template: Option<String>, format: OutputFormat) -> Result<()> {
    let content = sample_content();
    let Some(template) = template else {
        let previews = render_gallery(Arc::new(content), &builtin_templates())
            .await
            .context("Gallery render task failed")?;
        if let OutputFormat::Json = format {
            println!("{}", serde_json::to_string_pretty(&previews)?);
            return Ok(());
        }
        for preview in &previews {
            println!(
                "── {} ({}, ~{} lines) ──",
                preview.display_name,
                preview.template_id,
                preview.document.estimated_lines()
            );
            print_document(&preview.document, format)?;
            println!();
        }
        return Ok(());
    };
    print_document(&render(&content, &template), format)
}

fn print_document(document: &Document, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{document}"),
        OutputFormat::Html => print!("{}", to_html(document)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(document)?),
    }
    Ok(())
}

async fn suggest(service: &dyn JobService, request: &SuggestionRequest) -> Result<()> {
    let suggestions = service.section_suggestions(request).await?;
    if !suggestions.suggestions.is_empty() {
        println!("Suggestions:");
        for item in &suggestions.suggestions {
            println!("  - {item}");
        }
    }
    if !suggestions.tips.is_empty() {
        println!("Tips:");
        for tip in &suggestions.tips {
            println!("  - {tip}");
        }
    }
    if let Some(improved) = &suggestions.improved_content {
        println!("Improved content:\n{improved}");
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// draft
// ────────────────────────────────────────────────────────────────────────────

async fn draft(service: &dyn JobService, args: DraftArgs) -> Result<()> {
    let request = DraftRequest {
        job_role: args.role,
        experience_level: args.level,
        industry: args.industry,
        template_id: args.template,
    };
    let mut artifact = service.create_draft(&request).await?;
    info!("Created draft {} with template {}", artifact.id, request.template_id);

    for update in &args.sections {
        artifact = service
            .update_section(artifact.id, update)
            .await
            .with_context(|| format!("Failed to update section `{}`", update.section_name))?;
        info!("Updated section {}", update.section_name);
    }

    let template = artifact
        .template_id
        .clone()
        .unwrap_or(request.template_id);
    match artifact.content() {
        Ok(content) => print_document(&render(&content, &template), args.format),
        Err(DecodeError::NoContent) => {
            println!("Draft {} created; no sections written yet.", artifact.id);
            Ok(())
        }
        Err(e) => {
            warn!("Draft {} cannot be laid out yet: {e}", artifact.id);
            println!("{}", serde_json::to_string_pretty(&artifact.extracted)?);
            Ok(())
        }
    }
}
