//! IR type expressions.
//!
//! These are the machine-level shapes the backend needs for sizing and
//! addressing: integers and pointers of a given bit width, references to
//! named records, and arrays.

use std::fmt;

/// A machine-level type expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeExpr {
    /// Integer of the given bit width.
    Int(u32),
    /// Pointer of the given bit width.
    Ptr(u32),
    /// Reference to a named record declaration.
    Ident(String),
    /// Array of a fixed element count.
    Array(Box<TypeExpr>, u64),
}

impl TypeExpr {
    /// Named-record type expression.
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Ident(name.into())
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Int(w) => write!(f, "int.{w}"),
            TypeExpr::Ptr(w) => write!(f, "ptr.{w}"),
            TypeExpr::Ident(name) => f.write_str(name),
            TypeExpr::Array(elem, n) => write!(f, "{elem}[{n}]"),
        }
    }
}
