//! # API Deploy Library
//!
//! This library bundles an API Connect product with the API definitions it
//! references and publishes the bundle to a catalog. It is used by the
//! `api-deploy` command-line tool, typically as one step of a CI pipeline.
//!
//! ## Quick Example
//!
//! ```
//! use api_deploy::bundle::assemble;
//! use api_deploy::config::AssembleOptions;
//! use api_deploy::filesystem::MemoryFS;
//! use api_deploy::manifest::PartKind;
//! use std::path::Path;
//!
//! let mut fs = MemoryFS::new();
//! fs.add_file_string(
//!     "product.yaml",
//!     "info:\n  name: banking\n  version: 1.0.0\napis:\n  accounts:\n    $ref: accounts_v2.yaml\n",
//! );
//! fs.add_file_string("accounts.yaml", "info:\n  name: accounts\n  version: 1.0.0\n");
//!
//! let manifest = assemble(&mut fs, Path::new("product.yaml"), &AssembleOptions::default()).unwrap();
//! assert_eq!(manifest.len(), 2);
//! assert_eq!(manifest.parts()[1].kind, PartKind::Product);
//! ```
//!
//! ## Core Concepts
//!
//! - **Documents (`document`)**: The product descriptor and the API documents
//!   its `apis` entries point at via `$ref`.
//! - **Reference Resolution (`reference`)**: Maps a `$ref` to a file, loads it
//!   and derives the API's `name:version` identifier.
//! - **Bundle Assembly (`bundle`)**: Resolves every entry in place and builds
//!   the ordered upload manifest, ending with the reference-free product.
//! - **Publishing (`publish`)**: Uploads the manifest to the API manager.
//!
//! ## Execution Flow
//!
//! 1.  **Load**: Parse the product document.
//! 2.  **Resolve**: Replace each `$ref` entry with `name: <name>:<version>`
//!     and collect the API and WSDL files.
//! 3.  **Write**: Serialize the resolved product to its output path.
//! 4.  **Publish**: Log in to the manager, upload all parts, read back the
//!     product.

pub mod bundle;
pub mod config;
pub mod defaults;
pub mod document;
pub mod error;
pub mod filesystem;
pub mod manifest;
pub mod output;
pub mod publish;
pub mod reference;

#[cfg(test)]
mod reference_proptest;
