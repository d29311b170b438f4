//! `pri-overview`: normalize a PRI Organisation Overview export.

use std::process::ExitCode;

use clap::Parser;
use pri_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_overview, run_rules};
use crate::summary::print_summary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: cannot initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    // Diagnostics never affect the exit status; only aborted runs do.
    let outcome = match &cli.command {
        Command::Run(args) => run_overview(args).map(|result| print_summary(&result)),
        Command::Rules(args) => run_rules(args),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
