//! # Error Handling
//!
//! This module defines the centralized error type for `api-deploy`. It uses
//! the `thiserror` library to describe every failure the bundle assembly and
//! publish steps can hit, with enough context (paths, entry keys, URLs) for a
//! pipeline log to point at the offending input.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failure modes. The first four variants are
//!   the assembly taxonomy (missing files, malformed YAML, incomplete API
//!   documents, unsupported entry forms); the rest cover the product shape,
//!   the remote manager and wrapped library errors.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every error is fatal. Nothing in the library retries or recovers locally;
//! errors propagate unchanged to the command that started the run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for api-deploy operations
#[derive(Error, Debug)]
pub enum Error {
    /// A product, API or WSDL file does not exist or cannot be read.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A product or API document is not well-formed YAML.
    #[error("Document parse error in {}: {message}", path.display())]
    DocumentParse { path: PathBuf, message: String },

    /// An API document lacks the fields needed to identify it.
    #[error("Invalid API document {}: {message}", path.display())]
    InvalidApiDocument { path: PathBuf, message: String },

    /// An API entry was authored with `name:` instead of `$ref:`.
    ///
    /// Looking APIs up by name is not supported; the entry is rejected
    /// rather than skipped.
    #[error("Unsupported API entry format for '{entry}': name '{name}' given, only $ref entries are supported")]
    UnsupportedEntryFormat { entry: String, name: String },

    /// The product document itself has the wrong shape.
    #[error("Invalid product document {}: {message}", path.display())]
    InvalidProduct { path: PathBuf, message: String },

    /// The API manager rejected the login request.
    #[error("Authentication failed against {url}: {message}")]
    Authentication { url: String, message: String },

    /// The API manager rejected the publish or status request.
    #[error("Publish failed at {url} (HTTP {status}): {message}")]
    Publish {
        url: String,
        status: u16,
        message: String,
    },

    /// The API manager could not be reached or answered with garbage.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML serialization error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
