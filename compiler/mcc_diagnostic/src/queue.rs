//! Diagnostic accumulation.

use std::fmt;
use std::io::{self, Write};

use mcc_ast::SrcSpan;

use crate::{Diagnostic, Severity};

/// Collects diagnostics during one compilation.
///
/// Semantic errors set the sticky `error` flag and the walk continues
/// where possible, so one pass reports as much as it can. Warnings only
/// bump the counter. The compilation is successful iff the error flag
/// is clear at the end.
#[derive(Clone, Debug, Default)]
pub struct DiagQueue {
    diags: Vec<Diagnostic>,
    warning_count: u32,
    error: bool,
}

impl DiagQueue {
    pub fn new() -> Self {
        DiagQueue::default()
    }

    /// Report a semantic error.
    pub fn error(&mut self, span: SrcSpan, message: impl Into<String>) {
        self.error = true;
        self.diags.push(Diagnostic::error(span, message));
    }

    /// Report a warning.
    pub fn warn(&mut self, span: SrcSpan, message: impl Into<String>) {
        self.warning_count += 1;
        self.diags.push(Diagnostic::warning(span, message));
    }

    /// Whether any error was reported.
    pub fn has_errors(&self) -> bool {
        self.error
    }

    /// Number of warnings reported.
    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    /// All diagnostics, in report order.
    pub fn diags(&self) -> &[Diagnostic] {
        &self.diags
    }

    /// Messages of all diagnostics, in report order. Test convenience.
    pub fn messages(&self) -> Vec<&str> {
        self.diags.iter().map(|d| d.message.as_str()).collect()
    }

    /// Messages of warnings only, in report order. Test convenience.
    pub fn warning_messages(&self) -> Vec<&str> {
        self.diags
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| d.message.as_str())
            .collect()
    }

    /// Render every diagnostic, one line each, to the given stream.
    pub fn render_to(&self, out: &mut dyn Write) -> io::Result<()> {
        for d in &self.diags {
            writeln!(out, "{d}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DiagQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.diags {
            writeln!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_ast::{SrcPos, SrcSpan};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn span(line: u32, col: u32) -> SrcSpan {
        SrcSpan::point(Arc::from("t.c"), SrcPos::new(line, col))
    }

    #[test]
    fn counters_track_severities() {
        let mut q = DiagQueue::new();
        assert!(!q.has_errors());
        q.warn(span(1, 1), "Unused variable 'x'.");
        q.warn(span(2, 1), "Unused variable 'y'.");
        assert_eq!(q.warning_count(), 2);
        assert!(!q.has_errors());
        q.error(span(3, 1), "Undeclared identifier 'z'.");
        assert!(q.has_errors());
        assert_eq!(q.warning_count(), 2);
    }

    #[test]
    fn renders_one_line_per_diagnostic() {
        let mut q = DiagQueue::new();
        q.error(span(1, 2), "Lvalue required.");
        q.warn(span(3, 4), "Gratuitous nested block.");
        assert_eq!(
            format!("{q}"),
            "t.c:1:2: Lvalue required.\nt.c:3:4: Warning: Gratuitous nested block.\n"
        );
    }

    #[test]
    fn render_to_matches_display() {
        let mut q = DiagQueue::new();
        q.warn(span(5, 1), "Unused label 'out'.");
        let mut buf = Vec::new();
        let Ok(()) = q.render_to(&mut buf) else {
            panic!("render_to failed");
        };
        assert_eq!(String::from_utf8_lossy(&buf), format!("{q}"));
    }
}
