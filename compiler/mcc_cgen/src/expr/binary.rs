//! Binary arithmetic, shifts, and bitwise operators.
//!
//! Addition and subtraction each have two arms: the integer arm runs
//! the usual arithmetic conversions, the pointer arm scales through
//! `ptridx`. The shared value-level entry points are reused by
//! subscripting and by the compound assignments.

use mcc_ast::{BinOp, BinaryExpr, SrcSpan};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, Elmtype, EnumId, PTR_WIDTH};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst, ValueSlot};
use crate::lit::mask_to;
use crate::uac::{usual_arith_conv, UacFlags, UacResult};

use super::unary::lower_int_operand;
use super::{cgen_expr, cgen_expr_rvalue, compare, logical};

/// Binary operator dispatch.
pub(crate) fn cgen_binary(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &BinaryExpr,
) -> CgResult<ExprRes> {
    let span = e.lhs.tfirst().span.merge(&e.rhs.tlast().span);
    match e.op {
        BinOp::Add | BinOp::Sub => {
            let lhs = cgen_expr(cg, pcx, block, &e.lhs)?;
            let rhs = cgen_expr_rvalue(cg, pcx, block, &e.rhs)?;
            if e.op == BinOp::Add {
                cgen_add_values(cg, pcx, block, lhs, rhs, span)
            } else {
                cgen_sub_values(cg, pcx, block, lhs, rhs, span)
            }
        }
        BinOp::Mul | BinOp::Shl | BinOp::Shr | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
            let lhs = cgen_expr_rvalue(cg, pcx, block, &e.lhs)?;
            let rhs = cgen_expr_rvalue(cg, pcx, block, &e.rhs)?;
            cgen_binop_values(cg, pcx, block, e.op, lhs, rhs, span)
        }
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq | BinOp::Eq | BinOp::NotEq => {
            compare::cgen_compare(cg, pcx, block, e, span)
        }
        BinOp::LogAnd | BinOp::LogOr => logical::cgen_logical(cg, pcx, block, e, span),
    }
}

fn is_ptr_like(ty: &CType) -> bool {
    matches!(ty, CType::Pointer(_) | CType::Array(_))
}

/// Warnings common to the integer arithmetic arms.
fn warn_arith_flags(cg: &mut Cgen, span: &SrcSpan, uac: &UacResult, both_enum_warns: bool) {
    if uac.flags.contains(UacFlags::TRUTH) {
        cg.diags
            .warn(span.clone(), "Truth value used as an integer.");
    }
    if uac.flags.contains(UacFlags::ENUM_INC) {
        cg.diags
            .warn(span.clone(), "Enum arithmetic mixes distinct enums.");
    }
    if both_enum_warns
        && uac.flags.contains(UacFlags::ENUM)
        && !uac.flags.contains(UacFlags::ENUM_MIX)
        && !uac.flags.contains(UacFlags::ENUM_INC)
    {
        if let Some(eid) = uac.enum_id {
            if cg.enums.get(eid).is_strict() {
                cg.diags.warn(span.clone(), "Arithmetic on enum values.");
            }
        }
    }
}

/// Fold a constant arithmetic operation, flagging signed results whose
/// mathematically-exact value falls outside the representable range.
fn fold_arith(
    cg: &mut Cgen,
    span: &SrcSpan,
    elm: Elmtype,
    lhs: i64,
    rhs: i64,
    exact: impl FnOnce(i128, i128) -> i128,
) -> Konst {
    let wide = exact(i128::from(lhs), i128::from(rhs));
    let masked = mask_to(wide as i64, elm);
    if elm.is_signed() && i128::from(masked) != wide {
        cg.diags.warn(span.clone(), "Integer arithmetic overflow.");
    }
    Konst::int(masked)
}

/// Narrow an integer result back to an enum when enum operands
/// participated and agreed.
fn narrow_to_enum(res: ExprRes, enum_id: Option<EnumId>) -> ExprRes {
    match enum_id {
        Some(eid) => ExprRes {
            ty: CType::Enum(eid),
            ..res
        },
        None => res,
    }
}

/// Value-level addition: integer + integer, pointer/array + integer,
/// and the style-warned integer + pointer. Also the subscript engine.
pub(crate) fn cgen_add_values(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    lhs: ExprRes,
    rhs: ExprRes,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let (lhs, rhs) = if is_ptr_like(&rhs.ty) && !is_ptr_like(&lhs.ty) {
        cg.diags
            .warn(span.clone(), "Pointer should be the left operand of addition.");
        (rhs, lhs)
    } else {
        (lhs, rhs)
    };

    if is_ptr_like(&lhs.ty) {
        if is_ptr_like(&rhs.ty) {
            return cg.error(span, "Cannot add two pointers.");
        }
        return ptr_index(cg, pcx, block, lhs, rhs, span, false);
    }

    let uac = usual_arith_conv(cg, pcx, block, lhs, rhs)?;
    warn_arith_flags(cg, &span, &uac, true);
    let elm = uac.ty.elmtype().unwrap_or(Elmtype::Int);
    let konst = match (uac.lhs.const_int(), uac.rhs.const_int()) {
        (Some(a), Some(b)) => Some(fold_arith(cg, &span, elm, a, b, |x, y| x + y)),
        _ => None,
    };
    let res = emit_binop(pcx, block, InstrKind::Add, elm.width(), &uac, span, konst);
    Ok(narrow_to_enum(res, uac.enum_id))
}

/// Value-level subtraction.
pub(crate) fn cgen_sub_values(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    lhs: ExprRes,
    rhs: ExprRes,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    if is_ptr_like(&lhs.ty) && is_ptr_like(&rhs.ty) {
        return cg.error(span, "Pointer subtraction is not implemented.");
    }
    if is_ptr_like(&rhs.ty) {
        return cg.error(span, "Pointer must be the left operand of subtraction.");
    }
    if is_ptr_like(&lhs.ty) {
        return ptr_index(cg, pcx, block, lhs, rhs, span, true);
    }

    let uac = usual_arith_conv(cg, pcx, block, lhs, rhs)?;
    warn_arith_flags(cg, &span, &uac, true);
    let elm = uac.ty.elmtype().unwrap_or(Elmtype::Int);
    let konst = match (uac.lhs.const_int(), uac.rhs.const_int()) {
        (Some(a), Some(b)) => Some(fold_arith(cg, &span, elm, a, b, |x, y| x - y)),
        _ => None,
    };
    let res = emit_binop(pcx, block, InstrKind::Sub, elm.width(), &uac, span, konst);
    Ok(narrow_to_enum(res, uac.enum_id))
}

/// Pointer/array plus (or minus) an integer index, via `ptridx`.
fn ptr_index(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    base: ExprRes,
    index: ExprRes,
    span: SrcSpan,
    negate: bool,
) -> CgResult<ExprRes> {
    // Constant array subscripts are range-checked before decay.
    if let CType::Array(a) = &base.ty {
        if let Some(size) = a.size {
            if let Some(idx) = index.const_int() {
                let effective = if negate { -idx } else { idx };
                if effective < 0 {
                    cg.diags.warn(span.clone(), "Array index is negative.");
                } else if effective as u64 >= size {
                    cg.diags.warn(span.clone(), "Array index is out of bounds.");
                }
            }
        }
    }

    let elem = match &base.ty {
        CType::Array(a) => (*a.elem).clone(),
        CType::Pointer(target) => (**target).clone(),
        _ => return cg.error(span, "Subscripted value is neither pointer nor array."),
    };
    let Some(elem_size) = elem.sized(&cg.records) else {
        return cg.error(span, "Pointer arithmetic on an incomplete type.");
    };

    // The index must be integral; enums index through their integer
    // value.
    let index = match &index.ty {
        CType::Enum(_) => ExprRes {
            ty: CType::Basic(Elmtype::Int),
            ..index
        },
        CType::Basic(e) if e.is_integer() => index,
        _ => return cg.error(index.span.clone(), "Subscript index is not an integer."),
    };
    // Bring the index to pointer width.
    let index = crate::uac::adjust_int(pcx, block, index, Elmtype::Int);
    let index = if negate {
        let dest = pcx.new_vreg();
        let konst = index.const_int().map(|v| Konst::int(mask_to(-v, Elmtype::Int)));
        if let Some(src) = index.slot.vreg() {
            block.append(Instr::unary(
                InstrKind::Neg,
                PTR_WIDTH,
                Oper::var(dest.clone()),
                Oper::var(src.to_string()),
            ));
        }
        ExprRes {
            slot: ValueSlot::Rvalue(dest),
            konst,
            ..index
        }
    } else {
        index
    };

    let base = base.to_rvalue(pcx, block);
    let base_konst = base.konst.clone();
    let Some(base_vreg) = base.slot.vreg() else {
        return cg.error(span, "Subscripted value is neither pointer nor array.");
    };

    let dest = pcx.new_vreg();
    block.append(
        Instr::binary(
            InstrKind::PtrIdx,
            PTR_WIDTH,
            Oper::var(dest.clone()),
            Oper::var(base_vreg.to_string()),
            Oper::var(index.slot.vreg().unwrap_or_default().to_string()),
        )
        .with_texpr(cg.texpr(&elem)),
    );

    let konst = match (base_konst, index.const_int()) {
        (Some(k), Some(idx)) => Some(Konst {
            value: k.value + idx * elem_size as i64,
            base: k.base,
        }),
        _ => None,
    };

    Ok(ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: CType::pointer(elem),
        konst,
        used: false,
        span,
    })
}

/// Value-level dispatch for the purely integral operators
/// (multiplication, shifts, bitwise); reused by compound assignment.
pub(crate) fn cgen_binop_values(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    op: BinOp,
    lhs: ExprRes,
    rhs: ExprRes,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    match op {
        BinOp::Add => cgen_add_values(cg, pcx, block, lhs, rhs, span),
        BinOp::Sub => cgen_sub_values(cg, pcx, block, lhs, rhs, span),
        BinOp::Mul => cgen_mul_values(cg, pcx, block, lhs, rhs, span),
        BinOp::Shl | BinOp::Shr => cgen_shift_values(cg, pcx, block, op, lhs, rhs, span),
        BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
            cgen_bitwise_values(cg, pcx, block, op, lhs, rhs, span)
        }
        _ => cg.error(span, "Invalid operator."),
    }
}

/// Multiplication.
fn cgen_mul_values(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    lhs: ExprRes,
    rhs: ExprRes,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let uac = usual_arith_conv(cg, pcx, block, lhs, rhs)?;
    if uac.flags.contains(UacFlags::TRUTH) {
        cg.diags
            .warn(span.clone(), "Truth value used as an integer.");
    }
    if uac.flags.contains(UacFlags::ENUM) {
        cg.diags.warn(span.clone(), "Arithmetic on enum values.");
    }
    let elm = uac.ty.elmtype().unwrap_or(Elmtype::Int);
    let konst = match (uac.lhs.const_int(), uac.rhs.const_int()) {
        (Some(a), Some(b)) => Some(fold_arith(cg, &span, elm, a, b, |x, y| x * y)),
        _ => None,
    };
    Ok(emit_binop(
        pcx,
        block,
        InstrKind::Mul,
        elm.width(),
        &uac,
        span,
        konst,
    ))
}

/// `<<` and `>>`: the operands are promoted independently; the result
/// has the promoted left operand's type.
fn cgen_shift_values(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    op: BinOp,
    lhs: ExprRes,
    rhs: ExprRes,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let lhs = lower_int_operand(cg, pcx, block, lhs)?;
    let rhs = lower_int_operand(cg, pcx, block, rhs)?;

    let elm = lhs.ty.elmtype().unwrap_or(Elmtype::Int);
    if let Some(amount) = rhs.const_int() {
        if amount < 0 {
            cg.diags.warn(span.clone(), "Shift amount is negative.");
        } else if amount as u64 >= u64::from(elm.width()) {
            cg.diags
                .warn(span.clone(), "Shift amount exceeds operand width.");
        }
    }

    let kind = match op {
        BinOp::Shl => InstrKind::Shl,
        _ if elm.is_signed() => InstrKind::Shra,
        _ => InstrKind::Shrl,
    };

    let konst = match (lhs.const_int(), rhs.const_int()) {
        (Some(v), Some(s)) if (0..64).contains(&s) => {
            let shifted = match kind {
                InstrKind::Shl => v.wrapping_shl(s as u32),
                InstrKind::Shra => v.wrapping_shr(s as u32),
                _ => ((mask_to(v, elm) as u64 & width_mask(elm)) >> (s as u32)) as i64,
            };
            Some(Konst::int(mask_to(shifted, elm)))
        }
        _ => None,
    };

    let dest = pcx.new_vreg();
    if let (Some(a), Some(b)) = (lhs.slot.vreg(), rhs.slot.vreg()) {
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
        ty: lhs.ty.clone(),
        konst,
        used: false,
        span,
    })
}

fn width_mask(elm: Elmtype) -> u64 {
    let w = elm.width();
    if w >= 64 {
        u64::MAX
    } else {
        (1u64 << w) - 1
    }
}

/// `&`, `|`, `^`.
fn cgen_bitwise_values(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    op: BinOp,
    lhs: ExprRes,
    rhs: ExprRes,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let uac = usual_arith_conv(cg, pcx, block, lhs, rhs)?;

    if uac.flags.contains(UacFlags::TRUTH) {
        cg.diags
            .warn(span.clone(), "Truth value used as an integer.");
    }
    if uac.flags.contains(UacFlags::ENUM_INC) {
        cg.diags
            .warn(span.clone(), "Bitwise operation mixes distinct enums.");
    }
    if uac.flags.contains(UacFlags::ENUM_MIX) {
        cg.diags
            .warn(span.clone(), "Bitwise operation on enum and non-enum.");
    }
    if !uac.flags.contains(UacFlags::ENUM) {
        if uac.flags.contains(UacFlags::SIGNED) {
            cg.diags
                .warn(span.clone(), "Bitwise operation on signed integers.");
        }
        if uac.flags.contains(UacFlags::NEGATIVE) {
            cg.diags
                .warn(span.clone(), "Bitwise operation on negative numbers.");
        }
    }

    let kind = match op {
        BinOp::BitAnd => InstrKind::And,
        BinOp::BitOr => InstrKind::Or,
        _ => InstrKind::Xor,
    };
    let elm = uac.ty.elmtype().unwrap_or(Elmtype::Int);
    let konst = match (uac.lhs.const_int(), uac.rhs.const_int()) {
        (Some(a), Some(b)) => {
            let v = match kind {
                InstrKind::And => a & b,
                InstrKind::Or => a | b,
                _ => a ^ b,
            };
            Some(Konst::int(mask_to(v, elm)))
        }
        _ => None,
    };
    // Only a same-enum pair narrows back; a lone enum operand does
    // not make the bitwise result an enum.
    let both_same_enum = uac.flags.contains(UacFlags::ENUM)
        && !uac.flags.contains(UacFlags::ENUM_MIX)
        && !uac.flags.contains(UacFlags::ENUM_INC);
    let res = emit_binop(pcx, block, kind, elm.width(), &uac, span, konst);
    Ok(narrow_to_enum(
        res,
        if both_same_enum { uac.enum_id } else { None },
    ))
}

/// Emit a two-source arithmetic instruction over a UAC result.
fn emit_binop(
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    kind: InstrKind,
    width: u32,
    uac: &UacResult,
    span: SrcSpan,
    konst: Option<Konst>,
) -> ExprRes {
    let dest = pcx.new_vreg();
    if let (Some(a), Some(b)) = (uac.lhs.slot.vreg(), uac.rhs.slot.vreg()) {
        block.append(Instr::binary(
            kind,
            width,
            Oper::var(dest.clone()),
            Oper::var(a.to_string()),
            Oper::var(b.to_string()),
        ));
    }
    ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: uac.ty.clone(),
        konst,
        used: false,
        span,
    }
}
