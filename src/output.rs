//! Diagnostic output
//!
//! Renders diagnostics as indented text, four spaces per depth level, with
//! lines longer than the configured width cut short and marked with `...`.
//! Warnings and errors carry a level prefix so they stand out from the
//! confirmations around them.

use crate::settings::DEFAULT_WIDTH;
use crate::validators::diagnostics::{Diagnostic, Diagnostics, Report, Severity};
use std::io::{self, Write};

/// Spaces per depth level
pub const INDENT: usize = 4;

/// Text sink for diagnostics
#[derive(Debug)]
pub struct Output<W: Write> {
    writer: W,
    width: usize,
}

impl<W: Write> Output<W> {
    /// Create a sink with the default width
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            width: DEFAULT_WIDTH,
        }
    }

    /// Set the line width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Write the kept lines of a report followed by its summary
    pub fn write_report(&mut self, report: &Report) -> io::Result<()> {
        for diagnostic in report.lines() {
            self.write_diagnostic(diagnostic)?;
        }
        self.write_summary(report)
    }

    /// Write the lines of a unit shown at `threshold`
    pub fn write_unit(&mut self, unit: &Diagnostics, threshold: Severity) -> io::Result<()> {
        for diagnostic in unit.visible(threshold) {
            self.write_diagnostic(diagnostic)?;
        }
        Ok(())
    }

    /// Write one line
    pub fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let line = format_line(diagnostic, self.width);
        writeln!(self.writer, "{}", line)
    }

    /// Write the error and warning counts
    pub fn write_summary(&mut self, report: &Report) -> io::Result<()> {
        writeln!(
            self.writer,
            "{} error(s), {} warning(s)",
            report.errors(),
            report.warnings()
        )
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Render one diagnostic as a line of at most `width` characters
pub fn format_line(diagnostic: &Diagnostic, width: usize) -> String {
    let indent = INDENT * diagnostic.depth;
    let message = match diagnostic.severity {
        Severity::Warning | Severity::Error if !diagnostic.header => {
            format!("{}: {}", diagnostic.severity.as_str().to_uppercase(), diagnostic.message)
        }
        _ => diagnostic.message.clone(),
    };

    let length = message.chars().count();
    let message = if length + indent > width {
        let keep = width.saturating_sub(indent + 3);
        let mut cut: String = message.chars().take(keep).collect();
        cut.push_str("...");
        cut
    } else {
        message
    };

    format!("{}{}", " ".repeat(indent), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_and_prefix() {
        let header = Diagnostic::header("NXentry: /entry", 1);
        let error = Diagnostic::new("bad", Severity::Error, 2);
        let info = Diagnostic::new("fine", Severity::Info, 2);

        assert_eq!(format_line(&header, 100), "    NXentry: /entry");
        assert_eq!(format_line(&error, 100), "        ERROR: bad");
        assert_eq!(format_line(&info, 100), "        fine");
    }

    #[test]
    fn test_truncation() {
        let long = Diagnostic::new("x".repeat(50), Severity::Info, 1);
        let line = format_line(&long, 20);

        assert_eq!(line.chars().count(), 20);
        assert!(line.starts_with("    xxxx"));
        assert!(line.ends_with("..."));
    }

    #[test]
    fn test_write_report() {
        let mut unit = Diagnostics::new();
        unit.header("NXentry: /entry", 0);
        unit.warning("odd", 1);
        let mut report = Report::new(Severity::Warning);
        report.emit(unit);

        let mut output = Output::new(Vec::new());
        output.write_report(&report).unwrap();
        let text = String::from_utf8(output.into_inner()).unwrap();

        assert_eq!(
            text,
            "NXentry: /entry\n    WARNING: odd\n0 error(s), 1 warning(s)\n"
        );
    }
}
