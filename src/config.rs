//! # Run Configuration
//!
//! Plain configuration structs passed into the library. The CLI builds them
//! from flags and environment variables; the library itself never reads the
//! environment.
//!
//! - **`AssembleOptions`**: How references are named and where the resolved
//!   product is written.
//! - **`ManagerConfig`**: Where the API manager lives and how to log in.
//! - **`DeployConfig`**: One complete publish run.

use std::fmt;
use std::path::PathBuf;
use url::Url;

use crate::defaults::default_product_output;
use crate::error::{Error, Result};
use crate::reference::ReferenceNaming;

/// Options for bundle assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Mapping from `$ref` values to file names
    pub naming: ReferenceNaming,
    /// Where the reference-free product is written
    pub product_output: PathBuf,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            naming: ReferenceNaming::default(),
            product_output: default_product_output(),
        }
    }
}

/// Connection and login settings for the API manager
#[derive(Clone)]
pub struct ManagerConfig {
    /// Base URL of the manager, e.g. `https://manager.example.com`
    pub host: Url,
    pub username: String,
    pub password: String,
    /// Identity provider realm, e.g. `provider/default-idp-2`
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl ManagerConfig {
    /// Build a config from a host string.
    ///
    /// A bare host name is treated as `https://<host>`.
    pub fn new(
        host: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            host: parse_host(host)?,
            username: username.into(),
            password: password.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            accept_invalid_certs: false,
        })
    }
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("host", &self.host.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

fn parse_host(host: &str) -> Result<Url> {
    let host = host.trim();
    let url = if host.contains("://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("https://{}", host))?
    };
    match url.host_str() {
        Some(name) if !name.is_empty() => Ok(url),
        _ => Err(Error::UrlParse(url::ParseError::EmptyHost)),
    }
}

/// Everything one publish run needs
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub product_file: PathBuf,
    pub organization: String,
    pub catalog: String,
    /// Optional space inside the catalog
    pub space: Option<String>,
    pub assemble: AssembleOptions,
}
