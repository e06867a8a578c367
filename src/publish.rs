//! # Publishing to the API Manager
//!
//! This module sends an assembled [`UploadManifest`] to an API Connect
//! manager and confirms the resulting product exists.
//!
//! ## Design
//!
//! The library only depends on the [`Publisher`] trait. The production
//! implementation, [`ApiConnectClient`], logs in with the password grant on
//! construction and then talks to the manager's REST API with a blocking
//! `reqwest` client. Tests substitute a recording publisher.
//!
//! ## Endpoints
//!
//! - `POST {host}/api/token`: obtain a bearer token.
//! - `POST {host}/api/catalogs/{org}/{catalog}/publish`, or
//!   `{host}/api/spaces/{org}/{catalog}/{space}/publish`: multipart upload of
//!   the manifest parts, in order.
//! - `GET` on the product `url` returned by the publish call, or
//!   `{host}/api/catalogs/{org}/{catalog}/products/{name}/{version}` when
//!   none was returned: read back the published product.

use log::{debug, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::bundle::{assemble_bundle, Bundle};
use crate::config::{DeployConfig, ManagerConfig};
use crate::error::{Error, Result};
use crate::filesystem::Filesystem;
use crate::manifest::{Attachment, UploadManifest};

/// A product as reported by the API manager
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishedProduct {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub version: String,
    /// Lifecycle state, e.g. `published` or `staged`
    #[serde(default)]
    pub state: Option<String>,
    /// Canonical URL of the product resource
    #[serde(default)]
    pub url: Option<String>,
}

/// Something that can publish a manifest to a catalog
pub trait Publisher {
    /// Upload the manifest as one publish operation
    fn publish(
        &self,
        organization: &str,
        catalog: &str,
        manifest: UploadManifest,
        space: Option<&str>,
    ) -> Result<PublishedProduct>;

    /// Read back a product that `publish` just reported
    fn product(
        &self,
        organization: &str,
        catalog: &str,
        published: &PublishedProduct,
    ) -> Result<PublishedProduct>;
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn publish(
        &self,
        organization: &str,
        catalog: &str,
        manifest: UploadManifest,
        space: Option<&str>,
    ) -> Result<PublishedProduct> {
        (**self).publish(organization, catalog, manifest, space)
    }

    fn product(
        &self,
        organization: &str,
        catalog: &str,
        published: &PublishedProduct,
    ) -> Result<PublishedProduct> {
        (**self).product(organization, catalog, published)
    }
}

/// Assemble the configured product and publish it.
///
/// `connect` runs only once the whole bundle has assembled, so a broken
/// product never reaches the manager, not even for a login.
pub fn deploy<F, P, C>(fs: &mut F, config: &DeployConfig, connect: C) -> Result<PublishedProduct>
where
    F: Filesystem + ?Sized,
    P: Publisher,
    C: FnOnce(&Bundle) -> Result<P>,
{
    let bundle = assemble_bundle(fs, &config.product_file, &config.assemble)?;
    let publisher = connect(&bundle)?;
    publish_bundle(&publisher, config, bundle)
}

/// Publish an assembled bundle, then read the product back once to report
/// its state.
pub fn publish_bundle<P>(
    publisher: &P,
    config: &DeployConfig,
    bundle: Bundle,
) -> Result<PublishedProduct>
where
    P: Publisher + ?Sized,
{
    let info = bundle.info;
    info!(
        "Publishing {}:{} to {}/{}{}",
        info.name,
        info.version,
        config.organization,
        config.catalog,
        config
            .space
            .as_deref()
            .map(|s| format!("/{}", s))
            .unwrap_or_default()
    );
    let published = publisher.publish(
        &config.organization,
        &config.catalog,
        bundle.manifest,
        config.space.as_deref(),
    )?;

    let current = publisher.product(&config.organization, &config.catalog, &published)?;
    info!(
        "Product {}:{} is {}",
        current.name,
        current.version,
        current.state.as_deref().unwrap_or("in an unknown state")
    );
    Ok(current)
}

/// Append path segments to the manager's base URL
fn endpoint(host: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = host.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Network {
            url: host.to_string(),
            message: "manager host cannot be used as a base URL".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Login endpoint
pub fn token_url(host: &Url) -> Result<Url> {
    endpoint(host, &["api", "token"])
}

/// Publish endpoint for a catalog, or for a space inside it
pub fn publish_url(
    host: &Url,
    organization: &str,
    catalog: &str,
    space: Option<&str>,
) -> Result<Url> {
    match space {
        Some(space) => endpoint(
            host,
            &["api", "spaces", organization, catalog, space, "publish"],
        ),
        None => endpoint(host, &["api", "catalogs", organization, catalog, "publish"]),
    }
}

/// Where to read back a published product: the `url` the manager
/// returned, or the catalog product resource when it returned none
pub fn status_url(
    host: &Url,
    organization: &str,
    catalog: &str,
    published: &PublishedProduct,
) -> Result<Url> {
    match published.url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => Ok(host.join(url.trim())?),
        None => product_url(
            host,
            organization,
            catalog,
            &published.name,
            &published.version,
        ),
    }
}

/// Product resource in a catalog
pub fn product_url(
    host: &Url,
    organization: &str,
    catalog: &str,
    name: &str,
    version: &str,
) -> Result<Url> {
    endpoint(
        host,
        &["api", "catalogs", organization, catalog, "products", name, version],
    )
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
    realm: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Vec<String>,
}

/// Best-effort error message from a failed response body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) if !parsed.message.is_empty() => parsed.message.join("; "),
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().chars().take(500).collect(),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(name)) => name.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
        Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

fn network_error(url: &Url, e: reqwest::Error) -> Error {
    Error::Network {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Fail on non-success statuses with the manager's own message
fn check_status(response: Response, url: &Url) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(Error::Publish {
        url: url.to_string(),
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Headers of one multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    /// Form field name: `openapi`, `wsdl` or `product`
    pub field: &'static str,
    pub file_name: String,
    pub mime: &'static str,
}

impl FormPart {
    fn for_attachment(attachment: &Attachment) -> Self {
        Self {
            field: attachment.kind.field_name(),
            file_name: attachment.file_name(),
            mime: attachment.media_type.as_str(),
        }
    }
}

/// The multipart parts a manifest is sent as, in wire order
pub fn form_parts(manifest: &UploadManifest) -> Vec<FormPart> {
    manifest.parts().iter().map(FormPart::for_attachment).collect()
}

/// Build the multipart body, one part per manifest entry in order
fn build_form(manifest: UploadManifest) -> std::result::Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for attachment in manifest.into_parts() {
        let plan = FormPart::for_attachment(&attachment);
        let part = Part::bytes(attachment.content)
            .file_name(plan.file_name)
            .mime_str(plan.mime)?;
        form = form.part(plan.field, part);
    }
    Ok(form)
}

/// An authenticated API Connect manager session
pub struct ApiConnectClient {
    host: Url,
    http: Client,
    token: String,
}

impl ApiConnectClient {
    /// Connect to the manager and log in
    pub fn login(config: &ManagerConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("api-deploy/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        // A manager on this machine is never behind the CI proxy
        if is_loopback(&config.host) {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| network_error(&config.host, e))?;

        let url = token_url(&config.host)?;
        debug!("Logging in to {} as {}", url, config.username);
        let request = TokenRequest {
            username: &config.username,
            password: &config.password,
            realm: &config.realm,
            client_id: &config.client_id,
            client_secret: &config.client_secret,
            grant_type: "password",
        };
        let response = http
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .map_err(|e| network_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Authentication {
                url: url.to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), error_message(&body)),
            });
        }
        let token: TokenResponse = response.json().map_err(|e| network_error(&url, e))?;
        info!("Logged in to {}", config.host);

        Ok(Self {
            host: config.host.clone(),
            http,
            token: token.access_token,
        })
    }
}

impl Publisher for ApiConnectClient {
    fn publish(
        &self,
        organization: &str,
        catalog: &str,
        manifest: UploadManifest,
        space: Option<&str>,
    ) -> Result<PublishedProduct> {
        let url = publish_url(&self.host, organization, catalog, space)?;
        debug!("Uploading {} parts to {}", manifest.len(), url);
        let form = build_form(manifest).map_err(|e| network_error(&url, e))?;

        let response = self
            .http
            .post(url.clone())
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .map_err(|e| network_error(&url, e))?;
        let response = check_status(response, &url)?;
        response.json().map_err(|e| network_error(&url, e))
    }

    fn product(
        &self,
        organization: &str,
        catalog: &str,
        published: &PublishedProduct,
    ) -> Result<PublishedProduct> {
        let url = status_url(&self.host, organization, catalog, published)?;
        debug!("Checking product state at {}", url);
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| network_error(&url, e))?;
        let response = check_status(response, &url)?;
        response.json().map_err(|e| network_error(&url, e))
    }
}
