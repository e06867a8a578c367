//! # Publish Command Implementation
//!
//! This module implements the `publish` subcommand, the step a CI pipeline
//! runs to deploy a product:
//!
//! 1. Assemble the bundle (no network access; any error stops here).
//! 2. Log in to the API manager.
//! 3. Upload the bundle to the catalog (or a space inside it).
//! 4. Read the product back and report its state.
//!
//! On success the command prints `::set-output name=result::published`.
//! Every option can be supplied through the environment.

use anyhow::Result;
use clap::Args;

use api_deploy::config::{DeployConfig, ManagerConfig};
use api_deploy::filesystem::DiskFS;
use api_deploy::output::{emoji, set_output, OutputConfig};
use api_deploy::publish::{deploy, ApiConnectClient};

use super::bundle::{print_manifest, AssembleArgs};

/// Bundle a product and publish it to an API manager catalog
#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub assemble: AssembleArgs,

    /// Provider organization that owns the catalog.
    #[arg(long, value_name = "ORG", env = "ORGANIZATION")]
    pub organization: String,

    /// Catalog to publish into.
    #[arg(long, value_name = "CATALOG", env = "CATALOG")]
    pub catalog: String,

    /// Space inside the catalog, when the catalog has spaces enabled.
    #[arg(long, value_name = "SPACE", env = "SPACE")]
    pub space: Option<String>,

    /// API manager host name or URL.
    #[arg(long, value_name = "HOST", env = "MANAGER_HOST")]
    pub manager_host: String,

    /// User to log in as.
    #[arg(long, value_name = "USER", env = "MANAGER_USRNAME")]
    pub username: String,

    /// Password for the user.
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "MANAGER_PASSWORD",
        hide_env_values = true
    )]
    pub password: String,

    /// Identity provider realm.
    #[arg(
        long,
        value_name = "REALM",
        env = "MANAGER_REALM",
        default_value = "provider/default-idp-2"
    )]
    pub realm: String,

    /// OAuth client id registered with the manager.
    #[arg(long, value_name = "ID", env = "MANAGER_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret registered with the manager.
    #[arg(
        long,
        value_name = "SECRET",
        env = "MANAGER_CLIENT_SECRET",
        hide_env_values = true
    )]
    pub client_secret: String,

    /// Skip TLS certificate verification.
    #[arg(long, env = "MANAGER_INSECURE")]
    pub insecure: bool,

    /// Suppress all output except errors and the result signal
    #[arg(short, long)]
    pub quiet: bool,
}

impl PublishArgs {
    fn manager_config(&self) -> Result<ManagerConfig> {
        let mut config = ManagerConfig::new(
            &self.manager_host,
            self.username.as_str(),
            self.password.as_str(),
            self.realm.as_str(),
            self.client_id.as_str(),
            self.client_secret.as_str(),
        )?;
        config.accept_invalid_certs = self.insecure;
        Ok(config)
    }

    fn deploy_config(&self) -> DeployConfig {
        DeployConfig {
            product_file: self.assemble.product_file.clone(),
            organization: self.organization.clone(),
            catalog: self.catalog.clone(),
            space: self.space.clone(),
            assemble: self.assemble.options(),
        }
    }
}

/// Execute the `publish` command.
pub fn execute(args: PublishArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let manager = args.manager_config()?;
    let config = args.deploy_config();

    if !args.quiet {
        println!(
            "{} Bundling product: {}",
            emoji(&out, "📦", "[BUNDLE]"),
            config.product_file.display()
        );
    }
    let product = deploy(&mut DiskFS, &config, |bundle| {
        if !args.quiet {
            print_manifest(&bundle.manifest);
            println!(
                "{} Publishing {}:{} to {} / {}",
                emoji(&out, "🚀", "[PUBLISH]"),
                bundle.info.name,
                bundle.info.version,
                config.organization,
                config.catalog
            );
        }
        ApiConnectClient::login(&manager)
    })?;

    if !args.quiet {
        println!(
            "{} Published {}:{} ({})",
            emoji(&out, "✅", "[OK]"),
            product.name,
            product.version,
            product.state.as_deref().unwrap_or("state unknown")
        );
    }
    println!("{}", set_output("result", "published"));

    Ok(())
}
