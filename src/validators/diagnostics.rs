//! Validation diagnostics
//!
//! Every validator returns a [`Diagnostics`] unit. A unit is either kept as a
//! whole or dropped as a whole: it survives a threshold when at least one of
//! its non-header messages reaches that severity. Header lines of a surviving
//! unit are always shown; the remaining lines are filtered by severity.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Severity of a diagnostic, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Confirmation or tolerated deviation
    Info,
    /// Questionable but legal content
    #[default]
    Warning,
    /// Violation of a definition
    Error,
}

impl Severity {
    fn slot(self) -> usize {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }

    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!("Unknown severity '{}'", other)),
        }
    }
}

/// A single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Message text
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Indentation level for display
    pub depth: usize,
    /// Structural header identifying the node the unit is about
    pub header: bool,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new(message: impl Into<String>, severity: Severity, depth: usize) -> Self {
        Self {
            message: message.into(),
            severity,
            depth,
            header: false,
        }
    }

    /// Create a header line
    pub fn header(message: impl Into<String>, depth: usize) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
            depth,
            header: true,
        }
    }

    /// Whether the line is shown at `threshold` once its unit is kept
    pub fn is_visible(&self, threshold: Severity) -> bool {
        self.header || self.severity >= threshold
    }
}

/// An ordered unit of diagnostics produced by one validator call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    // Messages of absorbed units that did not survive, by severity
    dropped: [usize; 3],
}

impl Diagnostics {
    /// Create an empty unit
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Append a header line
    pub fn header(&mut self, message: impl Into<String>, depth: usize) {
        self.push(Diagnostic::header(message, depth));
    }

    /// Append an info message
    pub fn info(&mut self, message: impl Into<String>, depth: usize) {
        self.push(Diagnostic::new(message, Severity::Info, depth));
    }

    /// Append a warning
    pub fn warning(&mut self, message: impl Into<String>, depth: usize) {
        self.push(Diagnostic::new(message, Severity::Warning, depth));
    }

    /// Append an error
    pub fn error(&mut self, message: impl Into<String>, depth: usize) {
        self.push(Diagnostic::new(message, Severity::Error, depth));
    }

    /// Append a message at the given severity
    pub fn report(&mut self, severity: Severity, message: impl Into<String>, depth: usize) {
        self.push(Diagnostic::new(message, severity, depth));
    }

    /// Whether the unit survives `threshold`
    pub fn passes(&self, threshold: Severity) -> bool {
        threshold == Severity::Info
            || self
                .items
                .iter()
                .any(|d| !d.header && d.severity >= threshold)
    }

    /// Append `child` to this unit if the child survives `threshold`
    pub fn absorb(&mut self, child: Diagnostics, threshold: Severity) {
        if child.passes(threshold) {
            self.extend(child);
        } else {
            for severity in [Severity::Info, Severity::Warning, Severity::Error] {
                self.dropped[severity.slot()] += child.count(severity);
            }
        }
    }

    /// Append every line of `other` unconditionally
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
        for (mine, theirs) in self.dropped.iter_mut().zip(other.dropped) {
            *mine += theirs;
        }
    }

    /// Lines shown at `threshold`, or nothing if the unit is dropped
    pub fn visible(&self, threshold: Severity) -> Vec<&Diagnostic> {
        if !self.passes(threshold) {
            return Vec::new();
        }
        self.items.iter().filter(|d| d.is_visible(threshold)).collect()
    }

    /// Count non-header lines of a severity, including those of dropped units
    pub fn count(&self, severity: Severity) -> usize {
        self.items
            .iter()
            .filter(|d| !d.header && d.severity == severity)
            .count()
            + self.dropped[severity.slot()]
    }

    /// Whether any error was recorded
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Iterate over all lines
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the unit is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// The filtered result of a validation run
///
/// Counts cover every diagnostic produced, shown or not, so the outcome of a
/// run does not depend on the verbosity it was displayed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    threshold: Severity,
    lines: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
    infos: usize,
}

impl Report {
    /// Create an empty report filtering at `threshold`
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold,
            lines: Vec::new(),
            errors: 0,
            warnings: 0,
            infos: 0,
        }
    }

    /// Record a unit
    pub fn emit(&mut self, unit: Diagnostics) {
        self.errors += unit.count(Severity::Error);
        self.warnings += unit.count(Severity::Warning);
        self.infos += unit.count(Severity::Info);

        if unit.passes(self.threshold) {
            let threshold = self.threshold;
            self.lines
                .extend(unit.into_iter().filter(|d| d.is_visible(threshold)));
        }
    }

    /// Display threshold
    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Lines that survived filtering, in traversal order
    pub fn lines(&self) -> &[Diagnostic] {
        &self.lines
    }

    /// Number of errors produced
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Number of warnings produced
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Number of info messages produced
    pub fn infos(&self) -> usize {
        self.infos
    }

    /// Whether the run produced an error
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}
