//! The command line interface for the planner.
use crate::ledger::LotLedger;
use crate::log;
use crate::model::Model;
use crate::output::{OUTPUT_DIRECTORY_ROOT, create_output_directory, get_output_dir, write_schedule};
use crate::planning::{self, PlanOutcome};
use crate::settings::Settings;
use crate::units::Tonnes;
use ::log::info;
use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the bundled demo models.
pub const DEMOS_DIR: Dir = include_dir!("demos");

/// The command line interface for the planner.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run a planning model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Directory for output files.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Validate a model without solving it.
    Validate {
        /// Path to the model directory.
        model_dir: PathBuf,
    },
    /// Manage demo models.
    Demo {
        /// The available subcommands for managing demo models.
        #[command(subcommand)]
        subcommand: DemoSubcommands,
    },
}

/// The available subcommands for managing demo models.
#[derive(Subcommand)]
enum DemoSubcommands {
    /// List available demos.
    List,
    /// Run a demo.
    Run {
        /// The name of the demo to run.
        name: String,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run {
                model_dir,
                output_dir,
            } => handle_run_command(&model_dir, output_dir.as_deref()),
            Self::Validate { model_dir } => handle_validate_command(&model_dir),
            Self::Demo { subcommand } => match subcommand {
                DemoSubcommands::List => handle_demo_list_command(),
                DemoSubcommands::Run { name } => handle_demo_run_command(&name),
            },
        }
    }
}

/// Parse CLI arguments and start the planner.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ alohplan --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    match cli.command {
        Some(command) => command.execute(),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Handle the `run` command.
pub fn handle_run_command(model_dir: &Path, output_dir: Option<&Path>) -> Result<()> {
    let settings = Settings::from_path(model_dir)?;
    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_output_dir(model_dir)?,
    };
    create_output_directory(&output_dir).context("Failed to create output directory.")?;
    if !log::is_logger_initialised() {
        log::init(settings.log_level.as_deref(), Some(&output_dir))
            .context("Failed to initialise logging.")?;
    }

    let model = Model::from_path(model_dir).context("Failed to load model.")?;
    info!("Model loaded successfully.");

    match planning::run(&model)? {
        PlanOutcome::Optimal(schedule) => {
            let total_production: Tonnes =
                schedule.production.iter().map(|row| row.quantity).sum();
            let total_shipped: Tonnes = schedule.shipments.iter().map(|row| row.quantity).sum();
            info!(
                "Total production: {} t; total shipped: {} t; objective value: {}",
                total_production.value(),
                total_shipped.value(),
                schedule.objective_value.value()
            );

            write_schedule(&output_dir, &schedule)?;
            info!("Results written to {}", output_dir.display());
            Ok(())
        }
        PlanOutcome::Infeasible => bail!("The solver reported the model infeasible"),
        PlanOutcome::Unbounded => bail!("The solver reported the objective unbounded"),
        PlanOutcome::SolverError(message) => bail!("Solver error: {message}"),
    }
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_dir: &Path) -> Result<()> {
    let model = Model::from_path(model_dir).context("Failed to load model.")?;
    LotLedger::from_model(&model)?;
    println!("Model is valid.");
    Ok(())
}

/// Handle the `demo list` command.
pub fn handle_demo_list_command() -> Result<()> {
    for entry in DEMOS_DIR.dirs() {
        println!("{}", entry.path().display());
    }
    Ok(())
}

/// Handle the `demo run` command.
pub fn handle_demo_run_command(name: &str) -> Result<()> {
    let sub_dir = DEMOS_DIR.get_dir(name).context("Demo not found.")?;

    // Copy the demo's files into a temporary model directory
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    for entry in sub_dir.entries() {
        match entry {
            DirEntry::File(f) => {
                let file_name = f.path().file_name().unwrap();
                fs::write(temp_dir.path().join(file_name), f.contents())?;
            }
            DirEntry::Dir(_) => bail!("Nested directories are not supported."),
        }
    }

    let output_dir = Path::new(OUTPUT_DIRECTORY_ROOT).join(name);
    handle_run_command(temp_dir.path(), Some(&output_dir))
}
