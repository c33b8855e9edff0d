//! Expression results.
//!
//! Every expression walk produces an [`ExprRes`]: how the value is
//! materialized in IR (nothing, an r-value register, or an l-value
//! address), its C type, an optional translation-time constant, the
//! `used` flag feeding the unused-computed-value rule, and the token
//! range for diagnostics.

use mcc_ast::SrcSpan;
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, SymbolId};

use crate::context::ProcCtx;

/// How an expression's value is materialized.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ValueSlot {
    /// Pure void result; there is no value.
    None,
    /// The named register holds the value itself.
    Rvalue(String),
    /// The named register holds the pointer-width address of storage
    /// holding the value.
    Lvalue(String),
}

impl ValueSlot {
    /// The register name, if a value exists.
    pub fn vreg(&self) -> Option<&str> {
        match self {
            ValueSlot::None => None,
            ValueSlot::Rvalue(v) | ValueSlot::Lvalue(v) => Some(v),
        }
    }
}

/// A translation-time constant: `value`, or `&base + value` when a
/// symbol base is present.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Konst {
    pub value: i64,
    pub base: Option<SymbolId>,
}

impl Konst {
    /// Plain integer constant.
    pub fn int(value: i64) -> Self {
        Konst { value, base: None }
    }

    /// Address constant `&base + value`.
    pub fn addr(base: SymbolId, value: i64) -> Self {
        Konst {
            value,
            base: Some(base),
        }
    }
}

/// The result of evaluating one expression.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ExprRes {
    pub slot: ValueSlot,
    pub ty: CType,
    /// Present when the value in the slot is a translation-time
    /// constant.
    pub konst: Option<Konst>,
    /// Set for intrinsically side-effecting expressions (assignment,
    /// `++`/`--`, calls of non-void functions, casts to void); clear
    /// results trigger the unused-computed-value warning when
    /// discarded.
    pub used: bool,
    pub span: SrcSpan,
}

impl ExprRes {
    /// R-value result.
    pub fn rvalue(vreg: String, ty: CType, span: SrcSpan) -> Self {
        ExprRes {
            slot: ValueSlot::Rvalue(vreg),
            ty,
            konst: None,
            used: false,
            span,
        }
    }

    /// L-value result.
    pub fn lvalue(vreg: String, ty: CType, span: SrcSpan) -> Self {
        ExprRes {
            slot: ValueSlot::Lvalue(vreg),
            ty,
            konst: None,
            used: false,
            span,
        }
    }

    /// Pure void result.
    pub fn void(span: SrcSpan) -> Self {
        ExprRes {
            slot: ValueSlot::None,
            ty: CType::Basic(mcc_types::Elmtype::Void),
            konst: None,
            used: false,
            span,
        }
    }

    /// Attach a constant.
    #[must_use]
    pub fn with_konst(mut self, konst: Konst) -> Self {
        self.konst = Some(konst);
        self
    }

    /// Mark intrinsically side-effecting.
    #[must_use]
    pub fn with_used(mut self) -> Self {
        self.used = true;
        self
    }

    /// Whether this is an l-value.
    pub fn is_lvalue(&self) -> bool {
        matches!(self.slot, ValueSlot::Lvalue(_))
    }

    /// Plain integer constant value, when known and symbol-free.
    pub fn const_int(&self) -> Option<i64> {
        match &self.konst {
            Some(k) if k.base.is_none() => Some(k.value),
            _ => None,
        }
    }

    /// Convert to an r-value.
    ///
    /// Scalar l-values are read from memory (the constant, if any, is
    /// dropped: the storage contents are not a translation-time
    /// constant even when the address is). Record and array results
    /// stay addresses; their register is reinterpreted as the r-value,
    /// and a constant address survives.
    pub fn to_rvalue(self, pcx: &mut ProcCtx, block: &mut LabeledBlock) -> ExprRes {
        let ExprRes {
            slot,
            ty,
            konst,
            used,
            span,
        } = self;
        let addr = match slot {
            ValueSlot::None | ValueSlot::Rvalue(_) => {
                return ExprRes {
                    slot,
                    ty,
                    konst,
                    used,
                    span,
                };
            }
            ValueSlot::Lvalue(addr) => addr,
        };
        if matches!(ty, CType::Record(_) | CType::Array(_) | CType::Func(_)) {
            return ExprRes {
                slot: ValueSlot::Rvalue(addr),
                ty,
                konst,
                used,
                span,
            };
        }
        let dest = pcx.new_vreg();
        block.append(Instr::unary(
            InstrKind::Read,
            ty.scalar_width(),
            Oper::var(dest.clone()),
            Oper::var(addr),
        ));
        ExprRes {
            slot: ValueSlot::Rvalue(dest),
            ty,
            konst: None,
            used,
            span,
        }
    }
}
