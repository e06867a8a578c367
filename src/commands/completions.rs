//! Shell completions for `api-deploy`.
//!
//! Prints a completion script to stdout, or writes it to `--output` so a CI
//! image can bake it in at build time:
//!
//! ```bash
//! api-deploy completions bash --output /etc/bash_completion.d/api-deploy
//! ```

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::Cli;

const BIN_NAME: &str = "api-deploy";

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Render the completion script for `shell` into `out`
pub fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            render(args.shell, &mut file);
            log::info!("Wrote {} completions to {}", args.shell, path.display());
        }
        None => render(args.shell, &mut io::stdout()),
    }
    Ok(())
}
