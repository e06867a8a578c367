//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `api-deploy` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`, with environment variable fallbacks for CI use.
//! - An `execute` function that takes the parsed `Args`, builds the library's
//!   configuration structs and calls into the `api_deploy` library.

pub mod bundle;
pub mod completions;
pub mod publish;

use clap::ValueEnum;

use api_deploy::defaults::API_DOCUMENT_EXTENSION;
use api_deploy::reference::ReferenceNaming;

/// How `$ref` values are mapped to API file names
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RefNaming {
    /// Drop everything from the first underscore and append `.yaml`
    StripSuffix,
    /// Use references exactly as written
    Verbatim,
}

impl From<RefNaming> for ReferenceNaming {
    fn from(naming: RefNaming) -> Self {
        match naming {
            RefNaming::StripSuffix => ReferenceNaming::StripSuffix {
                extension: API_DOCUMENT_EXTENSION.to_string(),
            },
            RefNaming::Verbatim => ReferenceNaming::Verbatim,
        }
    }
}
