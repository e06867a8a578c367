//! # Bundle Assembly
//!
//! This module turns a product document into the ordered upload manifest the
//! API manager expects.
//!
//! ## Steps
//!
//! 1.  **Load**: Parse the product document.
//! 2.  **Resolve**: Walk `apis` in document order. Every `$ref` entry is
//!     resolved and rewritten in place to `name: <name>:<version>`, and its
//!     API file (plus WSDL file, if any) is appended to the manifest. An entry
//!     authored as `name:` aborts the run with `Error::UnsupportedEntryFormat`.
//! 3.  **Write**: Serialize the now reference-free product to the configured
//!     output path and append it as the final `product` part.
//!
//! Assembly is all-or-nothing. Any error aborts the run before the product
//! file is written, and no partial manifest is returned.

use log::{debug, info, warn};
use std::path::Path;

use crate::config::AssembleOptions;
use crate::document::{ApiEntry, ProductDocument, ProductInfo};
use crate::error::{Error, Result};
use crate::filesystem::Filesystem;
use crate::manifest::{Attachment, UploadManifest};
use crate::reference::ReferenceResolver;

/// A fully assembled product
#[derive(Debug)]
pub struct Bundle {
    /// Product name and version
    pub info: ProductInfo,
    /// The product after resolution, every entry in `name:` form
    pub product: ProductDocument,
    pub manifest: UploadManifest,
}

/// Assemble the upload manifest for the product at `product_path`
pub fn assemble<F: Filesystem + ?Sized>(
    fs: &mut F,
    product_path: &Path,
    options: &AssembleOptions,
) -> Result<UploadManifest> {
    assemble_bundle(fs, product_path, options).map(|bundle| bundle.manifest)
}

/// Assemble the product at `product_path`, keeping the resolved document
pub fn assemble_bundle<F: Filesystem + ?Sized>(
    fs: &mut F,
    product_path: &Path,
    options: &AssembleOptions,
) -> Result<Bundle> {
    let mut product = ProductDocument::load(&*fs, product_path)?;
    let product_info = product.info()?;
    info!(
        "Assembling product {}:{} from {}",
        product_info.name,
        product_info.version,
        product_path.display()
    );

    let attachments = resolve_entries(&*fs, &mut product, options)?;

    let yaml = product.to_yaml()?;
    fs.write(&options.product_output, yaml.as_bytes())?;
    debug!("Wrote resolved product to {}", options.product_output.display());

    let manifest = UploadManifest::new(
        attachments,
        Attachment::product(&options.product_output, yaml.into_bytes()),
    );
    info!(
        "Assembled {} parts ({} bytes) for {}:{}",
        manifest.len(),
        manifest.total_size(),
        product_info.name,
        product_info.version
    );

    Ok(Bundle {
        info: product_info,
        product,
        manifest,
    })
}

/// Resolve every entry of `product` in place, returning the attachments in
/// upload order
fn resolve_entries<F: Filesystem + ?Sized>(
    fs: &F,
    product: &mut ProductDocument,
    options: &AssembleOptions,
) -> Result<Vec<Attachment>> {
    let keys = product.entry_keys()?;
    if keys.is_empty() {
        warn!(
            "Product {} lists no APIs; only the product will be uploaded",
            product.path().display()
        );
    }

    let product_path = product.path().to_path_buf();
    let resolver = ReferenceResolver::new(fs, &options.naming, &product_path);
    let mut attachments = Vec::new();

    for key in keys {
        match product.entry(&key)? {
            ApiEntry::ByName { name } => {
                return Err(Error::UnsupportedEntryFormat { entry: key, name });
            }
            ApiEntry::ByReference { reference } => {
                let resolved = resolver.resolve(&reference)?;
                product.set_resolved(&key, &resolved.identifier)?;
                attachments.extend(resolved.attachments);
            }
        }
    }

    Ok(attachments)
}
