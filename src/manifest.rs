//! Upload manifest
//!
//! The ordered list of parts sent to the API manager in one publish request:
//! every API file (each followed by its WSDL file, if any) and then exactly
//! one `product` part. Parts own their content, so dropping the manifest
//! releases everything it holds.

use std::fmt;
use std::path::{Path, PathBuf};

/// What a part carries, which also decides its multipart field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Api,
    Wsdl,
    Product,
}

impl PartKind {
    /// Multipart field name expected by the API manager
    pub fn field_name(self) -> &'static str {
        match self {
            PartKind::Api => "openapi",
            PartKind::Wsdl => "wsdl",
            PartKind::Product => "product",
        }
    }
}

/// Content type of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// API definition or product YAML
    Yaml,
    /// Zipped WSDL bundle
    WsdlArchive,
    /// Single WSDL document
    Wsdl,
}

impl MediaType {
    /// The MIME string sent with the part
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Yaml => "application/yaml",
            MediaType::WsdlArchive => "application/zip",
            MediaType::Wsdl => "application/wsdl+xml",
        }
    }

    /// Media type of a WSDL attachment, chosen by file extension
    pub fn for_wsdl(path: &Path) -> Self {
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if is_zip {
            MediaType::WsdlArchive
        } else {
            MediaType::Wsdl
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of the upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: PartKind,
    /// Where the content was read from (or written to, for the product)
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub media_type: MediaType,
}

impl Attachment {
    /// An API definition file
    pub fn api(path: &Path, content: Vec<u8>) -> Self {
        Self {
            kind: PartKind::Api,
            path: path.to_path_buf(),
            content,
            media_type: MediaType::Yaml,
        }
    }

    /// A WSDL file or archive
    pub fn wsdl(path: &Path, content: Vec<u8>) -> Self {
        Self {
            kind: PartKind::Wsdl,
            path: path.to_path_buf(),
            media_type: MediaType::for_wsdl(path),
            content,
        }
    }

    /// The serialized product
    pub fn product(path: &Path, content: Vec<u8>) -> Self {
        Self {
            kind: PartKind::Product,
            path: path.to_path_buf(),
            content,
            media_type: MediaType::Yaml,
        }
    }

    /// File name sent with the part
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.kind.field_name().to_string())
    }
}

/// The complete, ordered upload for one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadManifest {
    parts: Vec<Attachment>,
}

impl UploadManifest {
    /// Build a manifest from the API attachments and the product part
    pub(crate) fn new(mut attachments: Vec<Attachment>, product: Attachment) -> Self {
        attachments.push(product);
        Self { parts: attachments }
    }

    /// All parts in upload order
    pub fn parts(&self) -> &[Attachment] {
        &self.parts
    }

    /// The final `product` part
    pub fn product(&self) -> Option<&Attachment> {
        self.parts.last().filter(|p| p.kind == PartKind::Product)
    }

    /// Parts carrying API or WSDL files
    pub fn attachments(&self) -> &[Attachment] {
        match self.parts.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total bytes to upload
    pub fn total_size(&self) -> usize {
        self.parts.iter().map(|p| p.content.len()).sum()
    }

    /// Consume the manifest, yielding its parts in order
    pub fn into_parts(self) -> Vec<Attachment> {
        self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_is_last() {
        let manifest = UploadManifest::new(
            vec![
                Attachment::api(Path::new("a.yaml"), b"a".to_vec()),
                Attachment::wsdl(Path::new("a.zip"), b"z".to_vec()),
            ],
            Attachment::product(Path::new("product.yaml"), b"p".to_vec()),
        );
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.product().unwrap().kind, PartKind::Product);
        assert_eq!(manifest.attachments().len(), 2);
        assert_eq!(manifest.total_size(), 3);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(PartKind::Api.field_name(), "openapi");
        assert_eq!(PartKind::Wsdl.field_name(), "wsdl");
        assert_eq!(PartKind::Product.field_name(), "product");
    }

    #[test]
    fn test_wsdl_media_type_by_extension() {
        assert_eq!(
            MediaType::for_wsdl(Path::new("svc/service.ZIP")),
            MediaType::WsdlArchive
        );
        assert_eq!(
            MediaType::for_wsdl(Path::new("svc/service.wsdl")),
            MediaType::Wsdl
        );
        assert_eq!(MediaType::Wsdl.to_string(), "application/wsdl+xml");
    }

    #[test]
    fn test_file_name() {
        let part = Attachment::api(Path::new("deploy/apis/accounts.yaml"), Vec::new());
        assert_eq!(part.file_name(), "accounts.yaml");
    }
}
