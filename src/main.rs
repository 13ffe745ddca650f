use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agent_composer::actions::ActionRegistry;
use agent_composer::app::App;
use agent_composer::config::Config;
use agent_composer::editor::{
    serializer, AuthoringMode, AutomationEditor, BuilderDraft, EditorError, PendingAutomation,
    StepCollection,
};
use agent_composer::locale::Catalog;
use agent_composer::logging;
use agent_composer::submit::{BackendClient, Submitter};

#[derive(Parser)]
#[command(name = "composer")]
#[command(about = "Compose automation agents as JSON or with a step builder")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered action types and their fields
    Types,

    /// Validate raw automation steps ("-" reads stdin)
    Check {
        file: PathBuf,
    },

    /// Replay a builder draft and print the canonical automation steps
    Build {
        file: PathBuf,
    },

    /// Create an agent on the backend
    Submit {
        /// Agent name
        #[arg(long)]
        name: String,

        /// What the agent is for
        #[arg(long)]
        purpose: String,

        /// Raw automation steps file
        #[arg(long, conflicts_with = "draft", required_unless_present = "draft")]
        file: Option<PathBuf>,

        /// Builder draft file
        #[arg(long)]
        draft: Option<PathBuf>,

        /// Print the submission instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the build status of an agent
    Status {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // Determine if we're running in TUI mode (no subcommand)
    let is_tui_mode = cli.command.is_none();

    // Initialize logging (file-based for TUI, stderr for CLI)
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    let registry = Arc::new(ActionRegistry::load(&config.action_types_path())?);
    let catalog = Catalog::new(config.locale.language);

    match cli.command {
        Some(Commands::Types) => cmd_types(&registry),
        Some(Commands::Check { file }) => cmd_check(&registry, &catalog, &file)?,
        Some(Commands::Build { file }) => cmd_build(&registry, &catalog, &file)?,
        Some(Commands::Submit {
            name,
            purpose,
            file,
            draft,
            dry_run,
        }) => {
            let source = match (file, draft) {
                (_, Some(draft)) => StepsSource::Draft(draft),
                (Some(file), None) => StepsSource::Raw(file),
                (None, None) => anyhow::bail!("either --file or --draft is required"),
            };
            cmd_submit(&config, registry, &catalog, name, purpose, source, dry_run).await?;
        }
        Some(Commands::Status { id }) => cmd_status(&config, id).await?,
        None => {
            let client = BackendClient::from_config(&config.backend)?;
            let mut app = App::new(config, registry, Arc::new(client));
            let result = app.run().await;

            if let Some(log_path) = logging_handle.log_file() {
                eprintln!("Session log: {}", log_path.display());
            }
            result?;
        }
    }

    Ok(())
}

enum StepsSource {
    Raw(PathBuf),
    Draft(PathBuf),
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Localized message first, technical detail after
fn editor_failure(catalog: &Catalog, error: EditorError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", catalog.error_message(&error), error)
}

fn cmd_types(registry: &ActionRegistry) {
    println!("Action types ({})", registry.len());
    println!("{}", "─".repeat(60));
    for definition in registry.definitions() {
        println!("{:<14} {}", definition.action_type, definition.description);
        for field in &definition.fields {
            println!("    {:<12} {:?}", field.name, field.kind);
        }
    }
}

fn cmd_check(registry: &ActionRegistry, catalog: &Catalog, file: &Path) -> Result<()> {
    let text = read_input(file)?;
    let canonical = PendingAutomation::RawText(&text)
        .canonical(registry)
        .map_err(|e| editor_failure(catalog, e))?;
    let value = serializer::parse_raw(&canonical).map_err(|e| editor_failure(catalog, e))?;

    match value.as_array() {
        Some(steps) => println!("Valid: {} steps", steps.len()),
        None => println!("Valid JSON (not a list of steps)"),
    }
    Ok(())
}

fn cmd_build(registry: &Arc<ActionRegistry>, catalog: &Catalog, file: &Path) -> Result<()> {
    let draft = BuilderDraft::load(file)?;
    let mut steps = StepCollection::new(Arc::clone(registry));
    draft
        .apply(&mut steps)
        .map_err(|e| editor_failure(catalog, e))?;

    let canonical = PendingAutomation::StructuredSteps(&steps)
        .canonical(registry)
        .map_err(|e| editor_failure(catalog, e))?;
    println!("{}", canonical);
    Ok(())
}

async fn cmd_submit(
    config: &Config,
    registry: Arc<ActionRegistry>,
    catalog: &Catalog,
    name: String,
    purpose: String,
    source: StepsSource,
    dry_run: bool,
) -> Result<()> {
    let mut editor = AutomationEditor::new(registry);
    editor.name = name;
    editor.purpose = purpose;

    match source {
        StepsSource::Raw(path) => editor.set_raw_text(read_input(&path)?),
        StepsSource::Draft(path) => {
            let draft = BuilderDraft::load(&path)?;
            editor.switch_mode(AuthoringMode::Builder);
            // Replace the seeded empty step with the draft
            editor.steps_mut().clear();
            draft
                .apply(editor.steps_mut())
                .map_err(|e| editor_failure(catalog, e))?;
        }
    }

    let submission = editor
        .submit()
        .map_err(|e| editor_failure(catalog, e))?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&submission)?);
        return Ok(());
    }

    let client = BackendClient::from_config(&config.backend)?;
    match client.create_agent(&submission).await {
        Ok(response) => {
            println!("{}", catalog.text("agent_creation_success"));
            println!("  ID:     {}", response.agent_id);
            println!("  Status: {}", response.status);
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context(catalog.text("agent_creation_error").to_string())),
    }
}

async fn cmd_status(config: &Config, id: i64) -> Result<()> {
    let client = BackendClient::from_config(&config.backend)?;
    let status = client.agent_status(id).await?;

    println!("Agent {}", status.id);
    println!("  Name:    {}", status.name);
    println!("  Purpose: {}", status.purpose);
    println!("  Status:  {}", status.status);
    println!("  Created: {}", status.created_at);
    if !status.is_finished() {
        println!("Still building; check again later");
    }
    Ok(())
}
