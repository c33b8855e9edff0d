//! Instructions and operands.
//!
//! An instruction carries its kind, a width in bits, up to one
//! destination operand, up to two source operands, and an optional type
//! expression (pointer arithmetic and record access need one).

use std::fmt;

use crate::texpr::TypeExpr;

/// The instruction alphabet.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InstrKind {
    /// Load immediate value.
    Imm,
    /// Address of a global variable or procedure.
    VarPtr,
    /// Address of a procedure-local variable slot.
    LVarPtr,
    /// Load from address.
    Read,
    /// Store to address.
    Write,
    /// Copy a whole record between two addresses.
    RecCopy,
    /// Address of a record member.
    RecMbr,
    Add,
    Sub,
    Mul,
    /// Shift left.
    Shl,
    /// Shift right arithmetic.
    Shra,
    /// Shift right logical.
    Shrl,
    And,
    Or,
    Xor,
    Neg,
    /// Bitwise NOT.
    BNot,
    /// Truncate to a narrower width.
    Trunc,
    /// Sign-extend to a wider width.
    SgnExt,
    /// Zero-extend to a wider width.
    ZrExt,
    Eq,
    NEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Unsigned comparisons.
    LtU,
    LtEqU,
    GtU,
    GtEqU,
    /// Scaled pointer indexing.
    PtrIdx,
    Nop,
    Call,
    Jmp,
    /// Jump if zero.
    Jz,
    /// Jump if not zero.
    Jnz,
    Ret,
    /// Return a value.
    RetV,
}

impl InstrKind {
    /// Mnemonic used by the text rendering.
    pub fn mnemonic(self) -> &'static str {
        match self {
            InstrKind::Imm => "imm",
            InstrKind::VarPtr => "varptr",
            InstrKind::LVarPtr => "lvarptr",
            InstrKind::Read => "read",
            InstrKind::Write => "write",
            InstrKind::RecCopy => "reccopy",
            InstrKind::RecMbr => "recmbr",
            InstrKind::Add => "add",
            InstrKind::Sub => "sub",
            InstrKind::Mul => "mul",
            InstrKind::Shl => "shl",
            InstrKind::Shra => "shra",
            InstrKind::Shrl => "shrl",
            InstrKind::And => "and",
            InstrKind::Or => "or",
            InstrKind::Xor => "xor",
            InstrKind::Neg => "neg",
            InstrKind::BNot => "bnot",
            InstrKind::Trunc => "trunc",
            InstrKind::SgnExt => "sgnext",
            InstrKind::ZrExt => "zrext",
            InstrKind::Eq => "eq",
            InstrKind::NEq => "neq",
            InstrKind::Lt => "lt",
            InstrKind::LtEq => "lteq",
            InstrKind::Gt => "gt",
            InstrKind::GtEq => "gteq",
            InstrKind::LtU => "ltu",
            InstrKind::LtEqU => "lteu",
            InstrKind::GtU => "gtu",
            InstrKind::GtEqU => "gteu",
            InstrKind::PtrIdx => "ptridx",
            InstrKind::Nop => "nop",
            InstrKind::Call => "call",
            InstrKind::Jmp => "jmp",
            InstrKind::Jz => "jz",
            InstrKind::Jnz => "jnz",
            InstrKind::Ret => "ret",
            InstrKind::RetV => "retv",
        }
    }
}

impl fmt::Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// An instruction operand.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Oper {
    /// A named value: virtual register, variable, or label.
    Var(String),
    /// An immediate integer.
    Imm(i64),
    /// An operand list (call arguments).
    List(Vec<Oper>),
}

impl Oper {
    /// Named-value operand.
    pub fn var(name: impl Into<String>) -> Self {
        Oper::Var(name.into())
    }
}

impl fmt::Display for Oper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Oper::Var(name) => f.write_str(name),
            Oper::Imm(v) => write!(f, "{v}"),
            Oper::List(elems) => {
                f.write_str("(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// One three-address instruction.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Instr {
    pub kind: InstrKind,
    /// Operation width in bits; 0 when the width is not meaningful
    /// (`nop`, `jmp`, `ret`, …).
    pub width: u32,
    pub dest: Option<Oper>,
    pub op1: Option<Oper>,
    pub op2: Option<Oper>,
    /// Element or record type for `ptridx`, `recmbr`, and `reccopy`.
    pub texpr: Option<TypeExpr>,
}

impl Instr {
    /// Instruction with no operands.
    pub fn nullary(kind: InstrKind) -> Self {
        Instr {
            kind,
            width: 0,
            dest: None,
            op1: None,
            op2: None,
            texpr: None,
        }
    }

    /// Instruction with a destination and one source.
    pub fn unary(kind: InstrKind, width: u32, dest: Oper, op1: Oper) -> Self {
        Instr {
            kind,
            width,
            dest: Some(dest),
            op1: Some(op1),
            op2: None,
            texpr: None,
        }
    }

    /// Instruction with a destination and two sources.
    pub fn binary(kind: InstrKind, width: u32, dest: Oper, op1: Oper, op2: Oper) -> Self {
        Instr {
            kind,
            width,
            dest: Some(dest),
            op1: Some(op1),
            op2: Some(op2),
            texpr: None,
        }
    }

    /// Attach a type expression.
    #[must_use]
    pub fn with_texpr(mut self, texpr: TypeExpr) -> Self {
        self.texpr = Some(texpr);
        self
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dest) = &self.dest {
            write!(f, "{dest} = ")?;
        }
        write!(f, "{}", self.kind)?;
        if self.width != 0 {
            write!(f, ".{}", self.width)?;
        }
        let mut sep = " ";
        for op in [&self.op1, &self.op2].into_iter().flatten() {
            write!(f, "{sep}{op}")?;
            sep = ", ";
        }
        if let Some(texpr) = &self.texpr {
            write!(f, "{sep}{{{texpr}}}")?;
        }
        Ok(())
    }
}
