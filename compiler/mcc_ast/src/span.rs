//! Source locations.
//!
//! Positions are 1-based line/column pairs; a span names a contiguous
//! source range within one file. Diagnostics render spans in the
//! `<file>:<line>:<col>[-<line>:<col>]` form.

use std::fmt;
use std::sync::Arc;

/// A 1-based line/column position.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SrcPos {
    pub line: u32,
    pub col: u32,
}

impl SrcPos {
    /// Create a new position.
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        SrcPos { line, col }
    }
}

impl fmt::Display for SrcPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A source range within one file.
///
/// The file name is shared (`Arc<str>`) because every token of a
/// translation unit points at the same file in the common case.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SrcSpan {
    pub file: Arc<str>,
    pub start: SrcPos,
    pub end: SrcPos,
}

impl SrcSpan {
    /// Create a new span.
    pub fn new(file: Arc<str>, start: SrcPos, end: SrcPos) -> Self {
        SrcSpan { file, start, end }
    }

    /// Single-position span.
    pub fn point(file: Arc<str>, pos: SrcPos) -> Self {
        SrcSpan {
            file,
            start: pos,
            end: pos,
        }
    }

    /// Span for generated constructs with no source counterpart.
    pub fn synth() -> Self {
        SrcSpan {
            file: Arc::from("<none>"),
            start: SrcPos::new(0, 0),
            end: SrcPos::new(0, 0),
        }
    }

    /// Merge two spans to create one covering both.
    ///
    /// The file of `self` wins; spans from different files do not arise
    /// within one AST node.
    #[must_use]
    pub fn merge(&self, other: &SrcSpan) -> SrcSpan {
        SrcSpan {
            file: Arc::clone(&self.file),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for SrcSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.start)?;
        if self.end != self.start {
            write!(f, "-{}", self.end)?;
        }
        Ok(())
    }
}
