//! Reference resolution
//!
//! Turns a `$ref` entry of a product into its `name:version` identifier and
//! collects the files that must be uploaded with it.
//!
//! Reference values are first mapped to a file name by a [`ReferenceNaming`]
//! policy. The default policy strips everything after the first underscore,
//! so environment-specific names such as `accounts_v2.yaml` or
//! `accounts_pre.yaml` both load `accounts.yaml`.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::defaults::API_DOCUMENT_EXTENSION;
use crate::document::ApiDocument;
use crate::error::Result;
use crate::filesystem::Filesystem;
use crate::manifest::Attachment;

/// How a `$ref` value maps to the file name that is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceNaming {
    /// Keep the part before the first `_` and append `extension`
    StripSuffix { extension: String },
    /// Use the reference as written
    Verbatim,
}

impl Default for ReferenceNaming {
    fn default() -> Self {
        ReferenceNaming::StripSuffix {
            extension: API_DOCUMENT_EXTENSION.to_string(),
        }
    }
}

impl ReferenceNaming {
    /// Apply the policy to a reference value.
    ///
    /// With `StripSuffix` the extension is always appended, so a reference
    /// without an underscore is written without its extension (`accounts`).
    pub fn clean(&self, reference: &str) -> String {
        match self {
            ReferenceNaming::Verbatim => reference.to_string(),
            ReferenceNaming::StripSuffix { extension } => {
                let stem = reference.split('_').next().unwrap_or(reference);
                format!("{}{}", stem, extension)
            }
        }
    }
}

/// A reference after resolution
#[derive(Debug)]
pub struct Resolved {
    /// The `name:version` identifier written back into the product
    pub identifier: String,
    /// The API file, followed by its WSDL file when there is one
    pub attachments: Vec<Attachment>,
}

/// Resolves `$ref` entries relative to the product's directory
pub struct ReferenceResolver<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    naming: &'a ReferenceNaming,
    base_dir: PathBuf,
}

impl<'a, F: Filesystem + ?Sized> ReferenceResolver<'a, F> {
    /// Create a resolver for references found in the product at `product_path`
    pub fn new(fs: &'a F, naming: &'a ReferenceNaming, product_path: &Path) -> Self {
        let base_dir = product_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            fs,
            naming,
            base_dir,
        }
    }

    /// Path of the API document a reference points at
    pub fn api_path(&self, reference: &str) -> PathBuf {
        self.base_dir.join(self.naming.clean(reference))
    }

    /// Load the referenced API document and build its attachments.
    ///
    /// Attachment order is the API file first, then the WSDL file.
    pub fn resolve(&self, reference: &str) -> Result<Resolved> {
        let api_path = self.api_path(reference);
        debug!("Resolving {} -> {}", reference, api_path.display());

        let api_content = self.fs.read(&api_path)?;
        let api = ApiDocument::from_bytes(&api_path, &api_content)?;
        let identifier = api.identifier(&api_path)?;

        let mut attachments = vec![Attachment::api(&api_path, api_content)];

        match api.wsdl_path() {
            Some(wsdl) => {
                let wsdl_path = self.base_dir.join(wsdl);
                let wsdl_content = self.fs.read(&wsdl_path)?;
                attachments.push(Attachment::wsdl(&wsdl_path, wsdl_content));
            }
            None if api.is_wsdl() => {
                warn!(
                    "API {} is of type wsdl but has no wsdl-definition.wsdl; uploading without WSDL",
                    identifier
                );
            }
            None => {}
        }

        debug!("Resolved {} to {}", reference, identifier);
        Ok(Resolved {
            identifier,
            attachments,
        })
    }
}
