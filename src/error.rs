//! Error types for nxvalidate
//!
//! Only conditions that make a validation call meaningless are errors here:
//! unreadable inputs, malformed schema documents and missing application
//! definitions. Structural problems in an instance file are reported as
//! diagnostics instead (see [`crate::validators::diagnostics`]).

use std::fmt;
use thiserror::Error;

/// Result type alias using nxvalidate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nxvalidate operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema document parsing error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A required application definition (or one of its ancestors) is absent
    #[error("missing application definition: {0}")]
    MissingApplication(String),

    /// A definition document exists but is structurally unusable
    #[error("definition error: {0}")]
    Definition(String),

    /// The instance tree cannot be validated as requested
    #[error("instance error: {0}")]
    Instance(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON instance decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schema document parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location of the offending document
    pub location: Option<String>,
    /// Element that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Unexpected root element 'schema'")
            .with_location("base_classes/NXsample.nxdl.xml")
            .with_source("<schema/>");

        let msg = format!("{}", err);
        assert!(msg.contains("Unexpected root element"));
        assert!(msg.contains("Location:"));
        assert!(msg.contains("Source:"));
    }

    #[test]
    fn test_error_conversion() {
        let parse_err = ParseError::new("test");
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_missing_application_display() {
        let err = Error::MissingApplication("NXmissing".to_string());
        assert_eq!(
            err.to_string(),
            "missing application definition: NXmissing"
        );
    }
}
