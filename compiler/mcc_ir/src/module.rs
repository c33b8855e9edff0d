//! Modules and top-level declarations.
//!
//! A module owns its declarations in emission order: variables with
//! their data images, procedures with their argument lists, local slots
//! and bodies, and record layouts. A procedure without a body is an
//! external declaration.

use std::fmt;

use smallvec::SmallVec;

use crate::block::LabeledBlock;
use crate::data::DataBlock;
use crate::texpr::TypeExpr;

/// Procedure attributes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ProcAttr {
    /// User service routine calling convention.
    Usr,
}

impl fmt::Display for ProcAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcAttr::Usr => f.write_str("usr"),
        }
    }
}

/// One procedure argument slot.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ProcArg {
    /// Argument value name (`%<ident>`).
    pub ident: String,
    pub texpr: TypeExpr,
}

impl ProcArg {
    pub fn new(ident: impl Into<String>, texpr: TypeExpr) -> Self {
        ProcArg {
            ident: ident.into(),
            texpr,
        }
    }
}

/// One procedure-local variable slot.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ProcVar {
    /// Slot name (`%<ident>` or `%<k>@<ident>`).
    pub ident: String,
    pub texpr: TypeExpr,
}

impl ProcVar {
    pub fn new(ident: impl Into<String>, texpr: TypeExpr) -> Self {
        ProcVar {
            ident: ident.into(),
            texpr,
        }
    }
}

/// A procedure declaration or definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Proc {
    /// Global name (`@<ident>`).
    pub ident: String,
    pub args: SmallVec<[ProcArg; 4]>,
    /// Return value type; `None` for void.
    pub rtype: Option<TypeExpr>,
    pub attrs: SmallVec<[ProcAttr; 1]>,
    pub lvars: Vec<ProcVar>,
    /// `None` makes this an external declaration.
    pub body: Option<LabeledBlock>,
}

impl Proc {
    /// New empty procedure definition.
    pub fn new(ident: impl Into<String>) -> Self {
        Proc {
            ident: ident.into(),
            args: SmallVec::new(),
            rtype: None,
            attrs: SmallVec::new(),
            lvars: Vec::new(),
            body: Some(LabeledBlock::new()),
        }
    }

    /// New external procedure declaration.
    pub fn extern_decl(ident: impl Into<String>) -> Self {
        Proc {
            ident: ident.into(),
            args: SmallVec::new(),
            rtype: None,
            attrs: SmallVec::new(),
            lvars: Vec::new(),
            body: None,
        }
    }

    pub fn is_extern(&self) -> bool {
        self.body.is_none()
    }
}

impl fmt::Display for Proc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_extern() {
            f.write_str("extern ")?;
        }
        write!(f, "proc {}(", self.ident)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} : {}", arg.ident, arg.texpr)?;
        }
        f.write_str(")")?;
        if let Some(rtype) = &self.rtype {
            write!(f, " : {rtype}")?;
        }
        for attr in &self.attrs {
            write!(f, " [{attr}]")?;
        }
        let Some(body) = &self.body else {
            return writeln!(f, ";");
        };
        writeln!(f)?;
        writeln!(f, "{{")?;
        for lvar in &self.lvars {
            writeln!(f, "\tlvar {} : {}", lvar.ident, lvar.texpr)?;
        }
        write!(f, "{body}")?;
        writeln!(f, "}}")
    }
}

/// A module-level variable with its initial image.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Var {
    /// Global name (`@<ident>`).
    pub ident: String,
    pub data: DataBlock,
}

impl Var {
    pub fn new(ident: impl Into<String>, data: DataBlock) -> Self {
        Var {
            ident: ident.into(),
            data,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "var {} = {};", self.ident, self.data)
    }
}

/// One element of a record layout.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RecordElem {
    pub ident: String,
    pub texpr: TypeExpr,
}

/// A record layout declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Record {
    /// Record tag name (`@@<ident>`).
    pub ident: String,
    /// `true` for unions: all elements at offset zero.
    pub union: bool,
    pub elems: Vec<RecordElem>,
}

impl Record {
    pub fn new(ident: impl Into<String>, union: bool) -> Self {
        Record {
            ident: ident.into(),
            union,
            elems: Vec::new(),
        }
    }

    /// Append an element.
    pub fn append(&mut self, ident: impl Into<String>, texpr: TypeExpr) {
        self.elems.push(RecordElem {
            ident: ident.into(),
            texpr,
        });
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kw = if self.union { "union" } else { "record" };
        writeln!(f, "{kw} {} {{", self.ident)?;
        for elem in &self.elems {
            writeln!(f, "\t{} : {},", elem.ident, elem.texpr)?;
        }
        writeln!(f, "}}")
    }
}

/// A top-level declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Decl {
    Var(Var),
    Proc(Proc),
    Record(Record),
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Var(v) => v.fmt(f),
            Decl::Proc(p) => p.fmt(f),
            Decl::Record(r) => r.fmt(f),
        }
    }
}

/// One translation unit's worth of IR.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Module {
    pub ident: String,
    pub decls: Vec<Decl>,
}

impl Module {
    /// Create an empty module.
    pub fn new(ident: impl Into<String>) -> Self {
        Module {
            ident: ident.into(),
            decls: Vec::new(),
        }
    }

    /// Append a declaration.
    pub fn append(&mut self, decl: Decl) {
        self.decls.push(decl);
    }

    /// Find a procedure by its global name.
    pub fn find_proc(&self, ident: &str) -> Option<&Proc> {
        self.decls.iter().find_map(|d| match d {
            Decl::Proc(p) if p.ident == ident => Some(p),
            _ => None,
        })
    }

    /// Find a variable by its global name.
    pub fn find_var(&self, ident: &str) -> Option<&Var> {
        self.decls.iter().find_map(|d| match d {
            Decl::Var(v) if v.ident == ident => Some(v),
            _ => None,
        })
    }

    /// Find a record by its tag name.
    pub fn find_record(&self, ident: &str) -> Option<&Record> {
        self.decls.iter().find_map(|d| match d {
            Decl::Record(r) if r.ident == ident => Some(r),
            _ => None,
        })
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {}", self.ident)?;
        for decl in &self.decls {
            writeln!(f)?;
            write!(f, "{decl}")?;
        }
        Ok(())
    }
}
