//! # Product and API Documents
//!
//! This module is the document loader. It parses the YAML files that make up
//! a product bundle and exposes them as typed values.
//!
//! ## Key Components
//!
//! - **`ProductDocument`**: The product descriptor. It keeps the parsed YAML
//!   mapping as-is so that, once every entry is resolved, it serializes back
//!   with the same keys in the same order. Entries under `apis` are read and
//!   rewritten through [`ApiEntry`].
//!
//! - **`ApiEntry`**: The two authored forms of an entry, `$ref: <file>` and
//!   `name: <name>:<version>`.
//!
//! - **`ApiDocument`**: The subset of an API definition needed to identify it
//!   and find its WSDL attachment.
//!
//! Parsing is all-or-nothing: malformed YAML fails with
//! `Error::DocumentParse` and an unreadable file with `Error::FileNotFound`.

use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::filesystem::Filesystem;

const REF_KEY: &str = "$ref";
const NAME_KEY: &str = "name";
const APIS_KEY: &str = "apis";
const INFO_KEY: &str = "info";

/// Configuration type that marks an API as backed by a WSDL
pub const WSDL_TYPE: &str = "wsdl";

/// Read and parse a YAML file into a generic value
fn load_value<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> Result<Value> {
    if !fs.exists(path) {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs.read(path)?;
    serde_yaml::from_slice(&content).map_err(|e| Error::DocumentParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Render a YAML scalar as a string, if it is one
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize an optional scalar field (string or number) into a string
fn optional_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_to_string(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a string or number")),
    }
}

/// Trimmed, non-empty value of an optional string
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Identifying fields of a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    /// Product name
    pub name: String,
    /// Product version
    pub version: String,
}

/// One entry of a product's `apis` mapping, as authored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEntry {
    /// `$ref: <file>` pointing at an external API document
    ByReference { reference: String },
    /// `name: <name>:<version>`, either authored or produced by resolution
    ByName { name: String },
}

impl ApiEntry {
    fn from_value(key: &str, value: &Value, product_path: &Path) -> Result<Self> {
        let invalid = |message: String| Error::InvalidProduct {
            path: product_path.to_path_buf(),
            message,
        };

        let map = value
            .as_mapping()
            .ok_or_else(|| invalid(format!("API entry '{}' is not a mapping", key)))?;
        let reference = map.get(REF_KEY).and_then(Value::as_str);
        let name = map.get(NAME_KEY).and_then(scalar_to_string);

        match (reference, name) {
            (Some(reference), None) => Ok(ApiEntry::ByReference {
                reference: reference.to_string(),
            }),
            (None, Some(name)) => Ok(ApiEntry::ByName { name }),
            (Some(_), Some(_)) => Err(invalid(format!(
                "API entry '{}' has both '{}' and '{}'",
                key, REF_KEY, NAME_KEY
            ))),
            (None, None) => Err(invalid(format!(
                "API entry '{}' has neither '{}' nor '{}'",
                key, REF_KEY, NAME_KEY
            ))),
        }
    }
}

/// A product descriptor, loaded once per run and resolved in place
#[derive(Debug, Clone)]
pub struct ProductDocument {
    path: PathBuf,
    root: Mapping,
}

impl ProductDocument {
    /// Load a product document from `path`
    pub fn load<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> Result<Self> {
        let value = load_value(fs, path)?;
        Self::from_value(path, value)
    }

    /// Parse a product document from a YAML string
    pub fn parse(path: &Path, yaml: &str) -> Result<Self> {
        let value = serde_yaml::from_str(yaml).map_err(|e| Error::DocumentParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_value(path, value)
    }

    fn from_value(path: &Path, value: Value) -> Result<Self> {
        let root = match value {
            Value::Mapping(root) => root,
            _ => {
                return Err(Error::InvalidProduct {
                    path: path.to_path_buf(),
                    message: "expected a YAML mapping at the document root".to_string(),
                })
            }
        };

        let doc = Self {
            path: path.to_path_buf(),
            root,
        };
        // Fail on a malformed `apis` block or a non-string key at load time
        doc.entry_keys()?;
        Ok(doc)
    }

    /// Path the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative references are resolved against
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::InvalidProduct {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    /// Read `info.name` and `info.version`
    pub fn info(&self) -> Result<ProductInfo> {
        let info = self
            .root
            .get(INFO_KEY)
            .and_then(Value::as_mapping)
            .ok_or_else(|| self.invalid("missing 'info' mapping"))?;
        let field = |key: &str| {
            info.get(key)
                .and_then(scalar_to_string)
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .ok_or_else(|| self.invalid(format!("missing 'info.{}'", key)))
        };
        Ok(ProductInfo {
            name: field("name")?,
            version: field("version")?,
        })
    }

    /// The `apis` mapping; a missing or null block counts as empty
    fn apis(&self) -> Result<Option<&Mapping>> {
        match self.root.get(APIS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Mapping(apis)) => Ok(Some(apis)),
            Some(_) => Err(self.invalid("'apis' must be a mapping")),
        }
    }

    /// Entry keys of `apis`, in document order
    pub fn entry_keys(&self) -> Result<Vec<String>> {
        let Some(apis) = self.apis()? else {
            return Ok(Vec::new());
        };
        apis.keys()
            .map(|key| match key {
                Value::String(key) => Ok(key.clone()),
                other => Err(self.invalid(format!(
                    "API entry key {} must be a string; quote it",
                    serde_yaml::to_string(other)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_else(|_| format!("{:?}", other))
                ))),
            })
            .collect()
    }

    /// Number of entries under `apis`
    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.apis()?.map_or(0, Mapping::len))
    }

    /// Read the entry stored under `key`
    pub fn entry(&self, key: &str) -> Result<ApiEntry> {
        let value = self
            .apis()?
            .and_then(|apis| apis.get(key))
            .ok_or_else(|| self.invalid(format!("no API entry '{}'", key)))?;
        ApiEntry::from_value(key, value, &self.path)
    }

    /// All entries in document order
    pub fn entries(&self) -> Result<Vec<(String, ApiEntry)>> {
        self.entry_keys()?
            .into_iter()
            .map(|key| {
                let entry = self.entry(&key)?;
                Ok((key, entry))
            })
            .collect()
    }

    /// Rewrite the entry under `key` into `name: <identifier>` form.
    ///
    /// The `$ref` key is removed; any other keys on the entry are kept.
    pub fn set_resolved(&mut self, key: &str, identifier: &str) -> Result<()> {
        let path = self.path.clone();
        let entry = self
            .root
            .get_mut(APIS_KEY)
            .and_then(Value::as_mapping_mut)
            .and_then(|apis| apis.get_mut(key))
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| Error::InvalidProduct {
                path,
                message: format!("no API entry '{}'", key),
            })?;
        entry.remove(REF_KEY);
        entry.insert(
            Value::String(NAME_KEY.to_string()),
            Value::String(identifier.to_string()),
        );
        Ok(())
    }

    /// Number of entries still carrying a `$ref`
    pub fn remaining_references(&self) -> Result<usize> {
        Ok(self.apis()?.map_or(0, |apis| {
            apis.values()
                .filter(|v| v.as_mapping().is_some_and(|m| m.contains_key(REF_KEY)))
                .count()
        }))
    }

    /// Serialize the document back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }
}

/// The `wsdl-definition` block of an API configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsdlDefinition {
    /// Path of the WSDL file or archive, relative to the product
    #[serde(default)]
    pub wsdl: Option<String>,
}

/// The API configuration block (`x-ibm-configuration`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfiguration {
    /// API type, e.g. `rest` or `wsdl`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// WSDL location for SOAP APIs
    #[serde(default, rename = "wsdl-definition")]
    pub wsdl_definition: Option<WsdlDefinition>,
}

/// The identifying part of an API's `info` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiInfo {
    /// Canonical name used by the API manager
    #[serde(default, rename = "x-ibm-name", deserialize_with = "optional_scalar")]
    pub x_ibm_name: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub version: Option<String>,
}

/// An API definition referenced from a product
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiDocument {
    #[serde(default)]
    pub info: ApiInfo,
    #[serde(default, rename = "x-ibm-configuration", alias = "configuration")]
    pub configuration: Option<ApiConfiguration>,
}

impl ApiDocument {
    /// Load an API document from `path`
    pub fn load<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> Result<Self> {
        let value = load_value(fs, path)?;
        Self::from_value(path, value)
    }

    /// Parse an API document already read from `path`
    pub fn from_bytes(path: &Path, content: &[u8]) -> Result<Self> {
        let value = serde_yaml::from_slice(content).map_err(|e| Error::DocumentParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_value(path, value)
    }

    fn from_value(path: &Path, value: Value) -> Result<Self> {
        serde_yaml::from_value(value).map_err(|e| Error::InvalidApiDocument {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The `<name>:<version>` identifier of this API.
    ///
    /// `x-ibm-name` wins over `name` when both are present.
    pub fn identifier(&self, path: &Path) -> Result<String> {
        let invalid = |message: &str| Error::InvalidApiDocument {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        let name = non_empty(self.info.x_ibm_name.as_deref())
            .or_else(|| non_empty(self.info.name.as_deref()))
            .ok_or_else(|| invalid("missing 'info.x-ibm-name' or 'info.name'"))?;
        let version = non_empty(self.info.version.as_deref())
            .ok_or_else(|| invalid("missing 'info.version'"))?;
        Ok(format!("{}:{}", name, version))
    }

    /// Whether the configuration declares a WSDL-backed API
    pub fn is_wsdl(&self) -> bool {
        self.configuration
            .as_ref()
            .and_then(|c| c.kind.as_deref())
            .is_some_and(|kind| kind == WSDL_TYPE)
    }

    /// The WSDL attachment path, present only for WSDL-typed APIs
    pub fn wsdl_path(&self) -> Option<&str> {
        if !self.is_wsdl() {
            return None;
        }
        self.configuration
            .as_ref()
            .and_then(|c| c.wsdl_definition.as_ref())
            .and_then(|d| non_empty(d.wsdl.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFS;

    const PRODUCT: &str = r#"
product: 1.0.0
info:
  name: banking
  version: 2.1.0
  title: Banking
apis:
  accounts:
    $ref: accounts_v2.yaml
  payments:
    $ref: payments_v1.yaml
plans:
  default-plan:
    title: Default Plan
"#;

    #[test]
    fn test_parse_product_entries_in_order() {
        let doc = ProductDocument::parse(Path::new("product.yaml"), PRODUCT).unwrap();
        assert_eq!(doc.entry_keys().unwrap(), vec!["accounts", "payments"]);
        assert_eq!(
            doc.entry("accounts").unwrap(),
            ApiEntry::ByReference {
                reference: "accounts_v2.yaml".to_string()
            }
        );
        assert_eq!(doc.entry_count().unwrap(), 2);
        assert_eq!(doc.remaining_references().unwrap(), 2);
    }

    #[test]
    fn test_product_info() {
        let doc = ProductDocument::parse(Path::new("product.yaml"), PRODUCT).unwrap();
        let info = doc.info().unwrap();
        assert_eq!(info.name, "banking");
        assert_eq!(info.version, "2.1.0");
    }

    #[test]
    fn test_product_info_numeric_version() {
        let doc = ProductDocument::parse(
            Path::new("product.yaml"),
            "info:\n  name: banking\n  version: 2\n",
        )
        .unwrap();
        assert_eq!(doc.info().unwrap().version, "2");
    }

    #[test]
    fn test_product_missing_apis_is_empty() {
        let doc = ProductDocument::parse(
            Path::new("product.yaml"),
            "info:\n  name: banking\n  version: 1.0.0\n",
        )
        .unwrap();
        assert!(doc.entry_keys().unwrap().is_empty());
        assert_eq!(doc.entry_count().unwrap(), 0);
    }

    #[test]
    fn test_product_apis_must_be_mapping() {
        let result = ProductDocument::parse(Path::new("product.yaml"), "apis:\n  - accounts\n");
        assert!(matches!(result, Err(Error::InvalidProduct { .. })));
    }

    #[test]
    fn test_product_non_string_entry_key_is_rejected_at_load() {
        let result = ProductDocument::parse(
            Path::new("product.yaml"),
            "apis:\n  1:\n    $ref: accounts_v1.yaml\n",
        );
        match result {
            Err(Error::InvalidProduct { message, .. }) => {
                assert!(message.contains("key 1 must be a string"), "{}", message);
            }
            other => panic!("Expected InvalidProduct, got {:?}", other),
        }
    }

    #[test]
    fn test_product_quoted_numeric_key_is_accepted() {
        let doc = ProductDocument::parse(
            Path::new("product.yaml"),
            "apis:\n  '1':\n    $ref: accounts_v1.yaml\n",
        )
        .unwrap();
        assert_eq!(doc.entry_keys().unwrap(), vec!["1"]);
        assert!(matches!(doc.entry("1"), Ok(ApiEntry::ByReference { .. })));
    }

    #[test]
    fn test_product_root_must_be_mapping() {
        let result = ProductDocument::parse(Path::new("product.yaml"), "- just\n- a list\n");
        assert!(matches!(result, Err(Error::InvalidProduct { .. })));
    }

    #[test]
    fn test_product_malformed_yaml() {
        let result = ProductDocument::parse(Path::new("product.yaml"), "info: [unclosed\n");
        match result {
            Err(Error::DocumentParse { path, .. }) => assert_eq!(path, Path::new("product.yaml")),
            other => panic!("Expected DocumentParse, got {:?}", other),
        }
    }

    #[test]
    fn test_load_product_missing_file() {
        let fs = MemoryFS::new();
        let result = ProductDocument::load(&fs, Path::new("product.yaml"));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_entry_by_name() {
        let doc = ProductDocument::parse(
            Path::new("product.yaml"),
            "apis:\n  accounts:\n    name: accounts:1.0.0\n",
        )
        .unwrap();
        assert_eq!(
            doc.entry("accounts").unwrap(),
            ApiEntry::ByName {
                name: "accounts:1.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_entry_with_both_forms_is_invalid() {
        let doc = ProductDocument::parse(
            Path::new("product.yaml"),
            "apis:\n  accounts:\n    $ref: accounts.yaml\n    name: accounts:1.0.0\n",
        )
        .unwrap();
        assert!(matches!(
            doc.entry("accounts"),
            Err(Error::InvalidProduct { .. })
        ));
    }

    #[test]
    fn test_set_resolved_replaces_ref() {
        let mut doc = ProductDocument::parse(Path::new("product.yaml"), PRODUCT).unwrap();
        doc.set_resolved("accounts", "accounts:2.0.0").unwrap();
        assert_eq!(
            doc.entry("accounts").unwrap(),
            ApiEntry::ByName {
                name: "accounts:2.0.0".to_string()
            }
        );
        assert_eq!(doc.remaining_references().unwrap(), 1);
        assert!(doc.set_resolved("missing", "x:1").is_err());
    }

    #[test]
    fn test_serialized_product_keeps_key_order() {
        let mut doc = ProductDocument::parse(Path::new("product.yaml"), PRODUCT).unwrap();
        doc.set_resolved("accounts", "accounts:2.0.0").unwrap();
        doc.set_resolved("payments", "payments:1.0.0").unwrap();
        let yaml = doc.to_yaml().unwrap();

        let product = yaml.find("product:").unwrap();
        let info = yaml.find("info:").unwrap();
        let apis = yaml.find("apis:").unwrap();
        let plans = yaml.find("plans:").unwrap();
        assert!(product < info && info < apis && apis < plans);
        assert!(!yaml.contains("$ref"));
    }

    #[test]
    fn test_api_identifier_prefers_x_ibm_name() {
        let mut fs = MemoryFS::new();
        fs.add_file_string(
            "accounts.yaml",
            "info:\n  title: Accounts\n  x-ibm-name: accounts\n  name: ignored\n  version: 1.0.0\n",
        );
        let api = ApiDocument::load(&fs, Path::new("accounts.yaml")).unwrap();
        assert_eq!(
            api.identifier(Path::new("accounts.yaml")).unwrap(),
            "accounts:1.0.0"
        );
    }

    #[test]
    fn test_api_identifier_trims_whitespace() {
        let api = ApiDocument {
            info: ApiInfo {
                x_ibm_name: None,
                name: Some("  accounts ".to_string()),
                version: Some(" 1.0.0".to_string()),
            },
            configuration: None,
        };
        assert_eq!(api.identifier(Path::new("a.yaml")).unwrap(), "accounts:1.0.0");
    }

    #[test]
    fn test_api_identifier_missing_version() {
        let mut fs = MemoryFS::new();
        fs.add_file_string("accounts.yaml", "info:\n  name: accounts\n");
        let api = ApiDocument::load(&fs, Path::new("accounts.yaml")).unwrap();
        assert!(matches!(
            api.identifier(Path::new("accounts.yaml")),
            Err(Error::InvalidApiDocument { .. })
        ));
    }

    #[test]
    fn test_api_identifier_empty_name() {
        let mut fs = MemoryFS::new();
        fs.add_file_string("accounts.yaml", "info:\n  name: ''\n  version: 1.0.0\n");
        let api = ApiDocument::load(&fs, Path::new("accounts.yaml")).unwrap();
        assert!(api.identifier(Path::new("accounts.yaml")).is_err());
    }

    #[test]
    fn test_api_wsdl_path() {
        let mut fs = MemoryFS::new();
        fs.add_file_string(
            "soap.yaml",
            r#"
info:
  x-ibm-name: soap
  version: 1.0.0
x-ibm-configuration:
  type: wsdl
  wsdl-definition:
    wsdl: wsdl/soap.zip
"#,
        );
        let api = ApiDocument::load(&fs, Path::new("soap.yaml")).unwrap();
        assert!(api.is_wsdl());
        assert_eq!(api.wsdl_path(), Some("wsdl/soap.zip"));
    }

    #[test]
    fn test_api_configuration_alias() {
        let mut fs = MemoryFS::new();
        fs.add_file_string(
            "soap.yaml",
            "info:\n  name: soap\n  version: 1\nconfiguration:\n  type: wsdl\n  wsdl-definition:\n    wsdl: soap.wsdl\n",
        );
        let api = ApiDocument::load(&fs, Path::new("soap.yaml")).unwrap();
        assert_eq!(api.wsdl_path(), Some("soap.wsdl"));
    }

    #[test]
    fn test_api_rest_type_ignores_wsdl_definition() {
        let mut fs = MemoryFS::new();
        fs.add_file_string(
            "rest.yaml",
            "info:\n  name: rest\n  version: 1.0.0\nx-ibm-configuration:\n  type: rest\n  wsdl-definition:\n    wsdl: stray.wsdl\n",
        );
        let api = ApiDocument::load(&fs, Path::new("rest.yaml")).unwrap();
        assert!(!api.is_wsdl());
        assert_eq!(api.wsdl_path(), None);
    }

    #[test]
    fn test_api_document_wrong_shape() {
        let mut fs = MemoryFS::new();
        fs.add_file_string("bad.yaml", "info:\n  - not\n  - a mapping\n");
        let result = ApiDocument::load(&fs, Path::new("bad.yaml"));
        assert!(matches!(result, Err(Error::InvalidApiDocument { .. })));
    }
}
