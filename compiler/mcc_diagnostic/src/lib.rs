//! Diagnostic reporting for the mcc compiler.
//!
//! Semantic errors and warnings are accumulated in a [`DiagQueue`]
//! during code generation and rendered afterwards. Errors set a sticky
//! flag (the compilation failed), warnings bump a counter; both carry a
//! source span and a message. The rendered form is
//! `<file>:<line>:<col>[-<line>:<col>]: [Warning: ]<message>` with a
//! terminating newline, and is part of the compiler's observable
//! interface.

mod diagnostic;
mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use queue::DiagQueue;
