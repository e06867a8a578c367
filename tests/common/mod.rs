//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and YAML snippets
//! to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_banking_product();
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::documents;
    pub use super::TestFixture;
}

/// Product and API documents used across tests.
#[allow(dead_code)]
pub mod documents {
    /// Product with one REST API and one SOAP API, both by reference.
    pub const BANKING_PRODUCT: &str = r#"product: 1.0.0
info:
  name: banking
  title: Banking
  version: 1.0.0
apis:
  accounts:
    $ref: accounts_1.0.0.yaml
  payments:
    $ref: payments_1.0.0.yaml
plans:
  default:
    title: Default Plan
"#;

    /// REST API definition.
    pub const ACCOUNTS_API: &str = r#"swagger: '2.0'
info:
  title: Accounts
  x-ibm-name: accounts
  version: 1.0.0
x-ibm-configuration:
  type: rest
paths: {}
"#;

    /// SOAP API definition pointing at a WSDL archive.
    pub const PAYMENTS_API: &str = r#"swagger: '2.0'
info:
  title: Payments
  x-ibm-name: payments
  version: 2.1.0
x-ibm-configuration:
  type: wsdl
  wsdl-definition:
    wsdl: payments.zip
paths: {}
"#;

    /// Placeholder bytes for the WSDL archive.
    pub const PAYMENTS_WSDL: &[u8] = b"PK\x03\x04payments";

    /// Product that names its API directly.
    pub const NAMED_ENTRY_PRODUCT: &str = r#"product: 1.0.0
info:
  name: banking
  version: 1.0.0
apis:
  accounts:
    name: accounts:1.0.0
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "info: [unclosed";
}

/// A test fixture that provides a temporary directory holding a product
/// and its API files.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_banking_product();
///
/// fixture
///     .command()
///     .arg("bundle")
///     .arg("--product-file")
///     .arg(fixture.product_path())
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `product.yaml` with the given content.
    pub fn with_product(self, content: &str) -> Self {
        self.with_file("product.yaml", content)
    }

    /// Add the banking product together with every file it references.
    pub fn with_banking_product(self) -> Self {
        self.with_product(documents::BANKING_PRODUCT)
            .with_file("accounts.yaml", documents::ACCOUNTS_API)
            .with_file("payments.yaml", documents::PAYMENTS_API)
            .with_binary_file("payments.zip", documents::PAYMENTS_WSDL)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file with the given path and content.
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the product document.
    pub fn product_path(&self) -> PathBuf {
        self.temp_dir.path().join("product.yaml")
    }

    /// Get the path the resolved product is written to.
    #[allow(dead_code)]
    pub fn output_path(&self) -> PathBuf {
        self.temp_dir.path().join("api-deploy-product.yaml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Variables the CLI reads are cleared so the host environment cannot
    /// leak into a test.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("api-deploy");
        cmd.current_dir(self.path());
        for var in [
            "PRODUCT_FILE",
            "PRODUCT_OUTPUT",
            "REF_NAMING",
            "ORGANIZATION",
            "CATALOG",
            "SPACE",
            "MANAGER_HOST",
            "MANAGER_USRNAME",
            "MANAGER_PASSWORD",
            "MANAGER_REALM",
            "MANAGER_CLIENT_ID",
            "MANAGER_CLIENT_SECRET",
            "MANAGER_INSECURE",
            "API_DEPLOY_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_banking_product() {
        let fixture = TestFixture::new().with_banking_product();
        assert!(fixture.product_path().exists());
        assert!(fixture.path().join("payments.zip").exists());
    }

    #[test]
    fn test_documents_are_valid_yaml() {
        let docs = [
            documents::BANKING_PRODUCT,
            documents::ACCOUNTS_API,
            documents::PAYMENTS_API,
            documents::NAMED_ENTRY_PRODUCT,
        ];

        for doc in docs {
            serde_yaml::from_str::<serde_yaml::Value>(doc).expect("Document should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(documents::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
