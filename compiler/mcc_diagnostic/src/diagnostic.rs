//! Diagnostic values.

use std::fmt;

use mcc_ast::SrcSpan;

/// Severity of a diagnostic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

/// One reported problem: a severity, the offending source range, and a
/// human-readable message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: SrcSpan,
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(span: SrcSpan, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(span: SrcSpan, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.span)?;
        if self.severity == Severity::Warning {
            f.write_str("Warning: ")?;
        }
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_ast::{SrcPos, SrcSpan};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn span() -> SrcSpan {
        SrcSpan::new(Arc::from("t.c"), SrcPos::new(2, 5), SrcPos::new(2, 5))
    }

    #[test]
    fn error_renders_without_prefix() {
        let d = Diagnostic::error(span(), "Undeclared identifier 'x'.");
        assert_eq!(format!("{d}"), "t.c:2:5: Undeclared identifier 'x'.");
    }

    #[test]
    fn warning_renders_with_prefix() {
        let d = Diagnostic::warning(span(), "Unused variable 'x'.");
        assert_eq!(format!("{d}"), "t.c:2:5: Warning: Unused variable 'x'.");
    }

    #[test]
    fn range_span_renders_both_ends() {
        let s = SrcSpan::new(Arc::from("t.c"), SrcPos::new(2, 5), SrcPos::new(2, 9));
        let d = Diagnostic::warning(s, "Computed expression value is not used");
        assert_eq!(
            format!("{d}"),
            "t.c:2:5-2:9: Warning: Computed expression value is not used"
        );
    }
}
