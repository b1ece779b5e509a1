//! Object name validation and utilities
//!
//! Group, field and attribute names in a NeXus tree are restricted to
//! ASCII letters, digits, underscores and (inside the name) periods.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]([A-Za-z0-9_.]*[A-Za-z0-9_])?$").unwrap()
});

static AXIS_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,:; ]").unwrap());

/// Placeholder used in `@axes` for a dimension without an axis field
pub const AXIS_PLACEHOLDER: &str = ".";

/// Check if a string is a valid object name
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Split the text form of an `@axes` attribute into axis names
///
/// Names may be separated by commas, colons, semicolons or spaces, and the
/// whole list may be wrapped in brackets or parentheses. Runs of separators
/// such as `", "` count as one.
pub fn split_axes(axes: &str) -> Vec<String> {
    let stripped = axes
        .trim_matches(|c| matches!(c, '[' | ']' | '(' | ')'))
        .replace("][", ":");
    AXIS_SEPARATOR
        .split(&stripped)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
