//! Default values for api-deploy.
//!
//! Centralized constants and defaults used by the library and the CLI.

use std::path::PathBuf;

/// Extension appended to cleaned `$ref` values
pub const API_DOCUMENT_EXTENSION: &str = ".yaml";

/// File name of the serialized, reference-free product
pub const PRODUCT_OUTPUT_FILE: &str = "api-deploy-product.yaml";

/// Returns where the serialized product is written.
///
/// This is a fixed path in the working directory, so two runs sharing a
/// working directory overwrite each other's file. It can be overridden by
/// the `--product-output` flag or the `PRODUCT_OUTPUT` environment variable.
pub fn default_product_output() -> PathBuf {
    PathBuf::from(PRODUCT_OUTPUT_FILE)
}
