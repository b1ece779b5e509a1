//! Resource loading utilities
//!
//! This module reads NXDL definition documents and instance documents from
//! disk, enforcing the configured size limits.

use crate::documents::Document;
use crate::error::{Error, Result};
use crate::limits::Limits;
use std::fs;
use std::path::Path;

/// Resource loader for definitions and instance documents
#[derive(Debug, Clone)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load an NXDL document and parse it
    pub fn load_definition(&self, path: &Path) -> Result<Document> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read definition '{}': {}", path.display(), e))
        })?;

        self.limits.check_schema_size(content.len())?;
        tracing::trace!(path = %path.display(), bytes = content.len(), "read definition");

        Document::from_string(&content)
    }

    /// Load an instance document as a string
    pub fn load_instance(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;

        self.limits.check_instance_size(content.len())?;
        tracing::trace!(path = %path.display(), bytes = content.len(), "read instance");

        Ok(content)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_definition_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"<definition name="NXsample"/>"#).unwrap();

        let loader = Loader::new();
        let doc = loader.load_definition(file.path()).unwrap();

        assert_eq!(doc.root().unwrap().get_attribute("name"), Some("NXsample"));
    }

    #[test]
    fn test_load_missing_file() {
        let loader = Loader::new();
        let result = loader.load_instance(Path::new("/nonexistent/file.json"));

        assert!(matches!(result, Err(Error::Resource(_))));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(2 * 1024 * 1024); // 2 MB
        write!(file, "{}", large_content).unwrap();

        let loader = Loader::new().with_limits(Limits::strict());
        let result = loader.load_definition(file.path());

        // Strict limits (1 MB max) should reject a 2 MB definition
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }
}
