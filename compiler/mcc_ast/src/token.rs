//! Lexical tokens as the code generator sees them.
//!
//! The core never re-lexes: a token carries its spelling and its source
//! range, nothing else. Spellings are read only to compare identifiers
//! and to parse numeric, character, and string literals.

use crate::span::SrcSpan;

/// One lexical token.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    /// The spelling, exactly as written (literals keep their quotes and
    /// prefixes).
    pub text: String,
    /// Source range of the spelling.
    pub span: SrcSpan,
}

impl Token {
    /// Create a token.
    pub fn new(text: impl Into<String>, span: SrcSpan) -> Self {
        Token {
            text: text.into(),
            span,
        }
    }

    /// Token for generated constructs with no source counterpart.
    pub fn synth(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            span: SrcSpan::synth(),
        }
    }
}
