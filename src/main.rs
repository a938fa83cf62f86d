//! CLI entry point for bookfetch.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod app_config;
mod cli;
mod commands;
mod runtime;
mod terminal;

use app_config::load_default_file_config;
use cli::{Cli, Command, ConfigCommand};
use runtime::EffectiveConfig;

/// Process outcome mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        match outcome {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse before tracing so --help and usage errors print without log noise.
    let cli = Cli::parse();

    match run(cli).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ProcessExit> {
    let loaded_config = load_default_file_config()?;
    let effective = EffectiveConfig::resolve(&cli, loaded_config.config.as_ref());

    // RUST_LOG > --quiet > -v > config verbosity > info
    let no_color = terminal::no_color_env_requested() || terminal::is_dumb_terminal();
    terminal::init_tracing(effective.verbosity.log_level(), no_color);
    debug!(?cli, config_path = ?loaded_config.path, "CLI arguments parsed");

    match &cli.command {
        Command::Resolve(args) => commands::run_resolve_command(args, &effective),
        Command::Fetch(args) => commands::run_fetch_command(args, &effective).await,
        Command::Extract(args) => commands::run_extract_command(args, &effective).await,
        Command::Config {
            command: ConfigCommand::Show,
        } => {
            commands::run_config_show_command(&loaded_config, &effective)?;
            Ok(ProcessExit::Success)
        }
    }
}
