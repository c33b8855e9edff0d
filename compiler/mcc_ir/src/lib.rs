//! Three-address intermediate representation for the mcc compiler.
//!
//! The code generator builds one [`Module`] per translation unit out of
//! procedures, variables with data images, and record layouts.
//! Instructions carry a kind, a width in bits, up to one destination and
//! two source operands, and an optional type expression. Every node
//! renders to a stable text form via `Display`.

pub mod block;
pub mod data;
pub mod instr;
pub mod module;
pub mod texpr;

pub use block::{BlockEntry, LabeledBlock};
pub use data::{DataBlock, DataEntry};
pub use instr::{Instr, InstrKind, Oper};
pub use module::{Decl, Module, Proc, ProcArg, ProcAttr, ProcVar, Record, RecordElem, Var};
pub use texpr::TypeExpr;
