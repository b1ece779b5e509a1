//! # nxvalidate
//!
//! Validation of NeXus data files against NXDL definitions.
//!
//! An instance file is a tree of groups, each tagged with a base class, and
//! fields holding typed values. This crate checks such a tree against the
//! base-class definitions of a definitions directory, and checks entries
//! against application definitions (including their `extends` chains).
//!
//! ## Features
//!
//! - Base-class validation of every group and field in a file
//! - Application definition validation with inheritance resolution
//! - Severity-filtered diagnostics with per-node units
//! - JSON instance trees via [`readers::JsonTreeReader`]
//! - Base class inspection
//!
//! ## Example
//!
//! ```rust,ignore
//! use nxvalidate::{Definitions, FileValidator, JsonTreeReader, SchemaStore, Settings, TreeReader};
//!
//! let store = SchemaStore::new(Definitions::resolve(None)?);
//! let settings = Settings::default();
//! let tree = JsonTreeReader::new().read("scan.json".as_ref())?;
//!
//! let report = FileValidator::new(&store, &settings).validate(&tree, None)?;
//! println!("{} errors", report.errors());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod locations;
pub mod names;
pub mod settings;

// Resource loading
pub mod documents;
pub mod loaders;

// Instance trees
pub mod readers;
pub mod tree;

// Validators
pub mod validators;

// Reporting
pub mod output;

// Re-exports for convenience
pub use error::{Error, Result};
pub use limits::Limits;
pub use locations::Definitions;
pub use output::Output;
pub use readers::{JsonTreeReader, TreeReader};
pub use settings::{FieldPolicy, Settings};
pub use tree::{DataType, FieldNode, GroupNode, Node, Value};
pub use validators::{
    inspect_base_class, validate_application, ApplicationValidator, FileValidator, Report,
    SchemaStore, Severity,
};

/// Version of the nxvalidate library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
