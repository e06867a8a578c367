//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// API Deploy - Bundle an API Connect product and publish it to a catalog
#[derive(Parser, Debug)]
#[command(name = "api-deploy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        env = "API_DEPLOY_LOG"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a product's API references and write the upload bundle
    Bundle(commands::bundle::BundleArgs),

    /// Bundle a product and publish it to an API manager catalog
    Publish(commands::publish::PublishArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Bundle(args) => commands::bundle::execute(args, &self.color),
            Commands::Publish(args) => commands::publish::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Install the stderr logger. Unknown levels fall back to `info`.
fn init_logging(level: &str) {
    let filter = level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Info);
    // A second initialization (e.g. in tests) is harmless
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format_target(false)
        .try_init();
}
