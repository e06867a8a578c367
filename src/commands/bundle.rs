//! # Bundle Command Implementation
//!
//! This module implements the `bundle` subcommand. It resolves every `$ref`
//! entry of a product document, writes the reference-free product and lists
//! the parts that `publish` would upload, in upload order.
//!
//! This command never contacts the API manager, which makes it a safe way to
//! check a product before publishing it.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use api_deploy::bundle::assemble_bundle;
use api_deploy::config::AssembleOptions;
use api_deploy::defaults::PRODUCT_OUTPUT_FILE;
use api_deploy::filesystem::DiskFS;
use api_deploy::manifest::UploadManifest;
use api_deploy::output::{emoji, OutputConfig};

use super::RefNaming;

/// Options shared by every command that assembles a bundle
#[derive(Args, Debug, Clone)]
pub struct AssembleArgs {
    /// Path to the product document.
    #[arg(short, long, value_name = "FILE", env = "PRODUCT_FILE")]
    pub product_file: PathBuf,

    /// Where to write the resolved product.
    ///
    /// Runs sharing a working directory share this file, so give concurrent
    /// runs distinct paths.
    #[arg(
        long,
        value_name = "FILE",
        env = "PRODUCT_OUTPUT",
        default_value = PRODUCT_OUTPUT_FILE
    )]
    pub product_output: PathBuf,

    /// How `$ref` values map to API file names.
    #[arg(
        long,
        value_enum,
        value_name = "POLICY",
        env = "REF_NAMING",
        default_value_t = RefNaming::StripSuffix
    )]
    pub ref_naming: RefNaming,
}

impl AssembleArgs {
    /// Convert into the library's assembly options
    pub fn options(&self) -> AssembleOptions {
        AssembleOptions {
            naming: self.ref_naming.into(),
            product_output: self.product_output.clone(),
        }
    }
}

/// Resolve a product's API references and write the upload bundle
#[derive(Args, Debug)]
pub struct BundleArgs {
    #[command(flatten)]
    pub assemble: AssembleArgs,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Print the manifest parts in upload order
pub fn print_manifest(manifest: &UploadManifest) {
    for (idx, part) in manifest.parts().iter().enumerate() {
        println!(
            "   {}. {:<8} {} ({}, {} bytes)",
            idx + 1,
            part.kind.field_name(),
            part.path.display(),
            part.media_type,
            part.content.len()
        );
    }
}

/// Execute the `bundle` command.
pub fn execute(args: BundleArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let options = args.assemble.options();
    let product_file = &args.assemble.product_file;

    if !args.quiet {
        println!(
            "{} Bundling product: {}",
            emoji(&out, "📦", "[BUNDLE]"),
            product_file.display()
        );
    }

    let bundle = assemble_bundle(&mut DiskFS, product_file, &options)?;

    if !args.quiet {
        println!(
            "{} Bundled {}:{} into {} parts",
            emoji(&out, "✅", "[OK]"),
            bundle.info.name,
            bundle.info.version,
            bundle.manifest.len()
        );
        print_manifest(&bundle.manifest);
        println!(
            "   Resolved product written to: {}",
            options.product_output.display()
        );
    }

    Ok(())
}
