use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use parcel_eligibility::config::AppConfig;
use parcel_eligibility::error::AppError;
use parcel_eligibility::telemetry;
use tracing::debug;

use crate::evaluate::{run_evaluate, EvaluateArgs};
use crate::programs::{run_programs, ProgramsCommand};

#[derive(Parser, Debug)]
#[command(
    name = "parcel-eligibility",
    about = "Screen, score and rank land parcels against conservation program requirements",
    version
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Override the configured program configuration file
    #[arg(long, global = true)]
    pub(crate) store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage program definitions in the configuration file
    Programs {
        #[command(subcommand)]
        command: ProgramsCommand,
    },
    /// Evaluate a parcel file against one program and print the ranked candidates
    Evaluate(EvaluateArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(store) = cli.global.store {
        config.store.path = store;
    }

    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, store = %config.store.path.display(), "configuration loaded");

    match cli.command {
        Command::Programs { command } => run_programs(&config, command),
        Command::Evaluate(args) => run_evaluate(&config, args),
    }
}
