//! Validation settings
//!
//! [`Settings`] bundles everything a validation run can be tuned with. All
//! setters follow the builder style used by [`Limits`] and the loaders.

use crate::limits::Limits;
use crate::validators::diagnostics::Severity;
use indexmap::IndexSet;

/// Classes that accept arbitrary fields unless configured otherwise
pub const DEFAULT_OPEN_CLASSES: [&str; 4] = ["NXcollection", "NXdata", "NXprocess", "NXparameters"];

/// Default output line width
pub const DEFAULT_WIDTH: usize = 100;

/// Treatment of fields that a base class does not declare
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPolicy {
    open_classes: IndexSet<String>,
    undeclared: Severity,
}

impl FieldPolicy {
    /// Policy with no open classes
    pub fn closed() -> Self {
        Self {
            open_classes: IndexSet::new(),
            undeclared: Severity::Warning,
        }
    }

    /// Mark a class as open
    pub fn with_open_class(mut self, class: impl Into<String>) -> Self {
        self.open_classes.insert(class.into());
        self
    }

    /// Severity for undeclared fields in classes that are not open
    pub fn with_undeclared_severity(mut self, severity: Severity) -> Self {
        self.undeclared = severity;
        self
    }

    /// Whether `class` accepts any field
    pub fn is_open(&self, class: &str) -> bool {
        self.open_classes.contains(class)
    }

    /// Open classes, in insertion order
    pub fn open_classes(&self) -> impl Iterator<Item = &str> {
        self.open_classes.iter().map(String::as_str)
    }

    /// Severity for undeclared fields
    pub fn undeclared_severity(&self) -> Severity {
        self.undeclared
    }
}

impl Default for FieldPolicy {
    fn default() -> Self {
        DEFAULT_OPEN_CLASSES
            .iter()
            .fold(Self::closed(), |policy, class| policy.with_open_class(*class))
    }
}

/// Settings of a validation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Minimum severity a unit needs to be shown
    pub threshold: Severity,
    /// Undeclared field handling
    pub field_policy: FieldPolicy,
    /// Resource limits
    pub limits: Limits,
    /// Output line width
    pub width: usize,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the threshold
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the field policy
    pub fn with_field_policy(mut self, policy: FieldPolicy) -> Self {
        self.field_policy = policy;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the output width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: Severity::Warning,
            field_policy: FieldPolicy::default(),
            limits: Limits::default(),
            width: DEFAULT_WIDTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = FieldPolicy::default();
        assert!(policy.is_open("NXdata"));
        assert!(policy.is_open("NXcollection"));
        assert!(!policy.is_open("NXentry"));
        assert_eq!(policy.undeclared_severity(), Severity::Warning);
    }

    #[test]
    fn test_closed_policy() {
        let policy = FieldPolicy::closed()
            .with_open_class("NXnote")
            .with_undeclared_severity(Severity::Error);
        assert!(!policy.is_open("NXdata"));
        assert!(policy.is_open("NXnote"));
        assert_eq!(policy.open_classes().collect::<Vec<_>>(), vec!["NXnote"]);
    }

    #[test]
    fn test_settings_builder() {
        let settings = Settings::new()
            .with_threshold(Severity::Info)
            .with_width(80)
            .with_limits(Limits::strict());
        assert_eq!(settings.threshold, Severity::Info);
        assert_eq!(settings.width, 80);
        assert_eq!(settings.limits, Limits::strict());
    }
}
