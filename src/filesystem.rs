//! Filesystem access for the bundle assembler
//!
//! The assembler never touches `std::fs` directly. It reads product, API and
//! WSDL files and writes the temporary product file through the
//! [`Filesystem`] trait, so the same code runs against the real disk
//! ([`DiskFS`]) or an in-memory tree ([`MemoryFS`]) for dry runs and tests.

use crate::error::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The narrow set of file operations the core needs
pub trait Filesystem {
    /// Read a file fully.
    ///
    /// Returns `Error::FileNotFound` when the path does not exist or cannot
    /// be read.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Check whether a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Create or replace a file with the given content
    fn write(&mut self, path: &Path, content: &[u8]) -> Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFS;

impl Filesystem for DiskFS {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let not_found = || Error::FileNotFound {
            path: path.to_path_buf(),
        };
        // Directories and other non-files are as unusable as a missing path
        if !self.exists(path) {
            return Err(not_found());
        }
        fs::read(path).map_err(|e| {
            debug!("Reading {} failed: {}", path.display(), e);
            not_found()
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn write(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }
}

/// In-memory filesystem keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) {
        self.files
            .insert(path.as_ref().to_path_buf(), content.as_bytes().to_vec());
    }

    /// Add or replace a file with binary content
    pub fn add_file_content<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) {
        self.files.insert(path.as_ref().to_path_buf(), content);
    }

    /// Get a file's content by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Filesystem for MemoryFS {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::FileNotFound {
                path: path.to_path_buf(),
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn write(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        self.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }
}
