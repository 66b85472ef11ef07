// dataplan - command line entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dataplan::datasets::load_dataset;
use dataplan::{AnalysisService, AppConfig, ConfigService, SettingsUpdate};
use dataplan_core::DatasetProfile;
use dataplan_tools::builtin_specs;

/// dataplan - plan and run dataset analyses with a local model
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.dataplan/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Model server URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Artifacts directory override
    #[arg(long, global = true)]
    artifacts_dir: Option<PathBuf>,

    /// Do not write plan logs for this invocation
    #[arg(long, global = true)]
    no_plan_log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the tool specification shown to the model
    Tools,

    /// Print the profile of a dataset
    Profile {
        /// CSV, JSON or spreadsheet file
        data: PathBuf,
    },

    /// Ask the model for a plan and print the steps
    Plan {
        data: PathBuf,
        question: String,
    },

    /// Plan and execute, then print the report
    Analyze {
        data: PathBuf,
        question: String,
    },

    /// Execute a saved model response or step array without the model
    Execute {
        data: PathBuf,
        /// File holding the plan text
        plan_file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dataplan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(run(&cli));
    // A tool abandoned by the run timeout may still occupy a blocking thread
    runtime.shutdown_background();
    result
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Tools => {
            println!("{}", builtin_specs().schema_block());
        }
        Commands::Profile { data } => {
            let dataset = load(data)?;
            println!("{}", DatasetProfile::from_dataset(&dataset).to_pretty_json());
        }
        Commands::Plan { data, question } => {
            let service = AnalysisService::from_config(load_config(cli)?)?;
            let dataset = load(data)?;
            let profile = DatasetProfile::from_dataset(&dataset);
            let steps = service.plan(&profile, question).await?;
            println!("{}", serde_json::to_string_pretty(&steps)?);
        }
        Commands::Analyze { data, question } => {
            let service = AnalysisService::from_config(load_config(cli)?)?;
            let report = service.analyze(Arc::new(load(data)?), question).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Execute { data, plan_file } => {
            let plan_text = std::fs::read_to_string(plan_file)
                .with_context(|| format!("Failed to read plan file {}", plan_file.display()))?;
            let service = AnalysisService::from_config(load_config(cli)?)?;
            let report = service
                .execute_plan_text(Arc::new(load(data)?), &plan_text)
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<dataplan_core::Dataset> {
    load_dataset(path).with_context(|| format!("Failed to load dataset {}", path.display()))
}

/// Stored config with this invocation's flag overrides applied.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("Failed to open config")?;

    let update = SettingsUpdate {
        model_name: cli.model.clone(),
        model_base_url: cli.base_url.clone(),
        artifacts_dir: cli.artifacts_dir.clone(),
        plan_logging_enabled: cli.no_plan_log.then_some(false),
        ..Default::default()
    };
    Ok(service.with_overrides(update)?)
}
