//! # API Deploy CLI
//!
//! This is the binary entry point for the `api-deploy` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments and environment variables using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Reporting the outcome the way CI pipelines expect: a workflow `::error::`
//!   command and exit status 1 on any failure.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;

use api_deploy::output::error_annotation;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_annotation(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}
