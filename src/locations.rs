//! Definition location resolution
//!
//! This module maps class and application names onto NXDL files inside a
//! definitions directory laid out as in the NeXus definitions repository:
//!
//! ```text
//! definitions/
//!     base_classes/NXentry.nxdl.xml
//!     applications/NXmx.nxdl.xml
//!     contributed_definitions/NXfoo.nxdl.xml
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the definitions directory
pub const DEFINITIONS_ENV: &str = "NXVALIDATE_DEFINITIONS";

/// Directory used when neither an explicit path nor the environment is set
pub const DEFAULT_DEFINITIONS_DIR: &str = "definitions";

/// File suffix of NXDL documents
pub const NXDL_SUFFIX: &str = ".nxdl.xml";

/// Subdirectory holding base classes
pub const BASE_CLASSES_DIR: &str = "base_classes";

/// Subdirectories searched, in order, for application definitions
pub const APPLICATION_DIRS: [&str; 2] = ["applications", "contributed_definitions"];

/// Root of an NXDL definitions tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definitions {
    root: PathBuf,
}

impl Definitions {
    /// Create a location rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the definitions directory
    ///
    /// An explicit directory wins, then [`DEFINITIONS_ENV`], then
    /// `./definitions`. The chosen directory must exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(DEFINITIONS_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEFINITIONS_DIR)),
        };

        if !root.is_dir() {
            return Err(Error::Resource(format!(
                "Definitions directory '{}' does not exist",
                root.display()
            )));
        }

        Ok(Self::new(root))
    }

    /// Get the definitions root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where the base class `class_name` would be defined
    pub fn base_class_path(&self, class_name: &str) -> PathBuf {
        self.root
            .join(BASE_CLASSES_DIR)
            .join(format!("{}{}", class_name, NXDL_SUFFIX))
    }

    /// Locate an application definition
    ///
    /// `name` may be a path to an existing NXDL file; otherwise the
    /// application directories are searched in order.
    pub fn application_path(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Some(direct.to_path_buf());
        }

        APPLICATION_DIRS
            .iter()
            .map(|dir| self.root.join(dir).join(format!("{}{}", name, NXDL_SUFFIX)))
            .find(|path| path.is_file())
    }
}
