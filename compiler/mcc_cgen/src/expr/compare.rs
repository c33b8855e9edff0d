//! Relational and equality operators.
//!
//! Two arms: pointer/pointer comparison at pointer width, and
//! integral/integral comparison through the usual arithmetic
//! conversions, with the signed or unsigned comparison chosen by the
//! UAC result type. The result type is always the truth type.

use mcc_ast::{BinOp, BinaryExpr, SrcSpan};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, Elmtype, PTR_WIDTH};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst, ValueSlot};
use crate::uac::{usual_arith_conv, UacFlags};

use super::cgen_expr_rvalue;

/// Pick the comparison instruction: signed family, or unsigned family
/// when `unsigned_cmp` holds.
fn compare_kind(op: BinOp, unsigned_cmp: bool) -> InstrKind {
    match (op, unsigned_cmp) {
        (BinOp::Eq, _) => InstrKind::Eq,
        (BinOp::NotEq, _) => InstrKind::NEq,
        (BinOp::Lt, false) => InstrKind::Lt,
        (BinOp::LtEq, false) => InstrKind::LtEq,
        (BinOp::Gt, false) => InstrKind::Gt,
        (BinOp::GtEq, false) => InstrKind::GtEq,
        (BinOp::Lt, true) => InstrKind::LtU,
        (BinOp::LtEq, true) => InstrKind::LtEqU,
        (BinOp::Gt, true) => InstrKind::GtU,
        (BinOp::GtEq, true) => InstrKind::GtEqU,
        _ => InstrKind::Eq,
    }
}

/// Fold a constant comparison to 0 or 1.
fn fold_compare(op: BinOp, unsigned_cmp: bool, a: i64, b: i64) -> i64 {
    let ordered = if unsigned_cmp {
        (a as u64).cmp(&(b as u64))
    } else {
        a.cmp(&b)
    };
    let holds = match op {
        BinOp::Eq => ordered.is_eq(),
        BinOp::NotEq => ordered.is_ne(),
        BinOp::Lt => ordered.is_lt(),
        BinOp::LtEq => ordered.is_le(),
        BinOp::Gt => ordered.is_gt(),
        BinOp::GtEq => ordered.is_ge(),
        _ => false,
    };
    i64::from(holds)
}

/// `<`, `<=`, `>`, `>=`, `==`, `!=`.
pub(crate) fn cgen_compare(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &BinaryExpr,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let lhs = cgen_expr_rvalue(cg, pcx, block, &e.lhs)?;
    let rhs = cgen_expr_rvalue(cg, pcx, block, &e.rhs)?;

    let lhs_ptr = matches!(lhs.ty, CType::Pointer(_) | CType::Array(_));
    let rhs_ptr = matches!(rhs.ty, CType::Pointer(_) | CType::Array(_));
    if lhs_ptr || rhs_ptr {
        if !(lhs_ptr && rhs_ptr) {
            return cg.error(span, "Comparison of pointer and non-pointer.");
        }
        return compare_pointers(cg, pcx, block, e.op, lhs, rhs, span);
    }

    // One truth value against a non-truth operand is suspicious; two
    // truth values compare fine.
    if lhs.ty.is_logic() != rhs.ty.is_logic() {
        cg.diags.warn(
            span.clone(),
            "Comparison of truth value and non-truth value.",
        );
    }

    let uac = usual_arith_conv(cg, pcx, block, lhs, rhs)?;
    if uac.flags.contains(UacFlags::ENUM_INC) {
        cg.diags
            .warn(span.clone(), "Comparison of distinct enum types.");
    }
    if uac.flags.contains(UacFlags::ENUM_MIX) {
        cg.diags.warn(span.clone(), "Comparison of enum and non-enum.");
    }
    if uac.flags.contains(UacFlags::NEG2U) {
        cg.diags.warn(
            span.clone(),
            "Comparison of negative number with unsigned value.",
        );
    }
    if uac.flags.contains(UacFlags::MIX2U) {
        cg.diags
            .warn(span.clone(), "Unsigned comparison of mixed-sign integers.");
    }

    let elm = uac.ty.elmtype().unwrap_or(Elmtype::Int);
    let unsigned_cmp = !elm.is_signed();
    let kind = compare_kind(e.op, unsigned_cmp);
    let konst = match (uac.lhs.const_int(), uac.rhs.const_int()) {
        (Some(a), Some(b)) => Some(Konst::int(fold_compare(e.op, unsigned_cmp, a, b))),
        _ => None,
    };

    let dest = pcx.new_vreg();
    if let (Some(a), Some(b)) = (uac.lhs.slot.vreg(), uac.rhs.slot.vreg()) {
        block.append(Instr::binary(
            kind,
            elm.width(),
            Oper::var(dest.clone()),
            Oper::var(a.to_string()),
            Oper::var(b.to_string()),
        ));
    }
    Ok(ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: CType::logic(),
        konst,
        used: false,
        span,
    })
}

/// Pointer comparison at pointer width, always unsigned.
fn compare_pointers(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    op: BinOp,
    lhs: ExprRes,
    rhs: ExprRes,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let target = |ty: &CType| -> CType {
        match ty {
            CType::Pointer(t) => (**t).clone(),
            CType::Array(a) => (*a.elem).clone(),
            other => other.clone(),
        }
    };
    if !target(&lhs.ty).compatible(&target(&rhs.ty)) {
        cg.diags
            .warn(span.clone(), "Comparison of incompatible pointer types.");
    }

    // Constant pointers fold only when they share a base.
    let konst = match (&lhs.konst, &rhs.konst) {
        (Some(a), Some(b)) if a.base == b.base => {
            Some(Konst::int(fold_compare(op, true, a.value, b.value)))
        }
        _ => None,
    };
    if cg.cexpr && konst.is_none() {
        return cg.error(span, "Comparison of pointers is not constant.");
    }

    let kind = compare_kind(op, true);
    let dest = pcx.new_vreg();
    if let (Some(a), Some(b)) = (lhs.slot.vreg(), rhs.slot.vreg()) {
        block.append(Instr::binary(
            kind,
            PTR_WIDTH,
            Oper::var(dest.clone()),
            Oper::var(a.to_string()),
            Oper::var(b.to_string()),
        ));
    }
    Ok(ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: CType::logic(),
        konst,
        used: false,
        span,
    })
}
