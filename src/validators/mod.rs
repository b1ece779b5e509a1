//! NXDL validators
//!
//! This module contains the validation engine: definition models and their
//! loading, inheritance of application definitions, and the validators for
//! groups, fields, whole files and application entries.

// Definition models
pub mod builtins;
pub mod models;
pub mod parsing;

// Loading and inheritance
pub mod inheritance;
pub mod store;

// Validation
pub mod applications;
pub mod diagnostics;
pub mod fields;
pub mod files;
pub mod groups;
pub mod inspect;

// Re-exports
pub use applications::{validate_application, ApplicationValidator};
pub use diagnostics::{Diagnostic, Diagnostics, Report, Severity};
pub use fields::FieldValidator;
pub use files::FileValidator;
pub use groups::GroupValidator;
pub use inheritance::{merge_content, merge_models, InheritanceResolver};
pub use inspect::{dump_base_class, inspect_base_class};
pub use models::{
    AttributeConstraint, ConstraintModel, Content, Dimensions, FieldConstraint, GroupConstraint,
    ModelStatus, NxType, Occurs, Optionality,
};
pub use store::SchemaStore;
