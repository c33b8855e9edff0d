//! Semantic analysis and IR code generation for the mcc compiler.
//!
//! The crate walks a fully parsed translation unit, maintains the
//! symbol and type environment, performs type checking with C's usual
//! arithmetic conversions, reports diagnostics, and emits a
//! three-address IR module.
//!
//! [`compile`] is the whole-unit entry point; the per-layer walkers
//! (declarations, statements, expressions) are public for embedders
//! that drive compilation piecemeal.

#[cfg(test)]
pub(crate) mod testutil;

pub mod context;
pub mod conv;
pub mod decl;
pub mod dspec;
pub mod eres;
pub mod expr;
pub mod func;
pub mod init;
pub mod lit;
pub mod module;
pub mod stmt;
pub mod uac;

pub use context::{Abandoned, CgResult, Cgen, ProcCtx};
pub use eres::{ExprRes, Konst, ValueSlot};
pub use module::{compile, CompileOutput};
