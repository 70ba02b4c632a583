//! Software Development Crew command line.
//!
//! ```bash
//! crew_ai_sandbox run
//! crew_ai_sandbox train 3 trained_agents.json
//! crew_ai_sandbox replay system_architecture
//! crew_ai_sandbox test 2 gpt-4o
//! ```
//!
//! Settings come from the environment (`MODEL`, `OPENAI_API_KEY`,
//! `OPENAI_API_BASE`, `CREW_CONFIG_DIR`, `CREW_OUTPUT_DIR`, `CREW_PROCESS`,
//! ...); `RUST_LOG` sets the log filter (default: "info").

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crew_ai_sandbox::cli::{self, CliCommand};
use crew_ai_sandbox::engine::LocalEngine;
use crew_ai_sandbox::process::Process;
use crew_ai_sandbox::project::{CrewBase, SoftwareDevelopmentCrew};
use crew_ai_sandbox::utilities::config::Settings;

/// Six role-played agents producing software project documentation
#[derive(Parser)]
#[command(name = "crew_ai_sandbox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Operation to perform (defaults to `run`)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding agents.yaml and tasks.yaml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Directory the task output files are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Execution process (sequential, hierarchical)
    #[arg(long, global = true)]
    process: Option<Process>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the crew once
    Run,

    /// Train the crew
    Train {
        /// Number of training iterations
        n_iterations: String,

        /// File the trained agent data is saved to
        filename: String,
    },

    /// Replay the crew from a task of the latest run
    Replay {
        /// Task name or task id
        task_id: String,
    },

    /// Test the crew and score every task
    Test {
        /// Number of test iterations
        n_iterations: String,

        /// Model used to score the task outputs
        eval_model: String,
    },
}

impl Commands {
    fn kind(&self) -> CliCommand {
        match self {
            Self::Run => CliCommand::Run,
            Self::Train { .. } => CliCommand::Train,
            Self::Replay { .. } => CliCommand::Replay,
            Self::Test { .. } => CliCommand::Test,
        }
    }
}

fn load_settings(
    config_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    process: Option<Process>,
) -> Result<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(dir) = config_dir {
        settings.config_dir = dir;
    }
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }
    if let Some(process) = process {
        settings.process = process;
    }
    Ok(settings)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let Cli {
        command,
        config_dir,
        output_dir,
        process,
    } = Cli::parse();
    let command = command.unwrap_or(Commands::Run);
    let kind = command.kind();

    let settings =
        load_settings(config_dir, output_dir, process).with_context(|| cli::error_context(kind))?;
    let base = CrewBase::load(&settings.config_dir).with_context(|| cli::error_context(kind))?;
    let project = SoftwareDevelopmentCrew::new(base).with_process(settings.process);
    let engine = LocalEngine::from_settings(&settings);

    tracing::info!(
        command = %kind,
        model = %engine.default_model(),
        output_dir = %engine.output_dir().display(),
        storage_dir = %engine.storage_dir().display(),
        "Starting crew"
    );

    match command {
        Commands::Run => {
            cli::run(&project, &engine)?;
        }
        Commands::Train {
            n_iterations,
            filename,
        } => cli::train(&project, &engine, &n_iterations, &filename)?,
        Commands::Replay { task_id } => cli::replay(&project, &engine, &task_id)?,
        Commands::Test {
            n_iterations,
            eval_model,
        } => cli::test(&project, &engine, &n_iterations, &eval_model)?,
    }

    Ok(())
}
