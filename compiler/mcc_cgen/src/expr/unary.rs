//! Unary `+`, `-`, `~`, and `sizeof`.

use mcc_ast::{Expr, SizeofArg, SizeofExpr, UnOp, UnaryExpr};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, Elmtype, ScopeMemberKind};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst, ValueSlot};
use crate::lit::mask_to;
use crate::uac::{enum2int, promote};

use super::literals::cgen_imm;
use super::{cgen_expr, cgen_expr_rvalue, logical};

/// Lower an operand for unary arithmetic and shifts: enums drop to
/// int (warning when strict), truth values warn, then integer
/// promotion applies.
pub(crate) fn lower_int_operand(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    res: ExprRes,
) -> CgResult<ExprRes> {
    let res = if res.ty.is_logic() {
        cg.diags
            .warn(res.span.clone(), "Truth value used as an integer.");
        ExprRes {
            ty: CType::Basic(Elmtype::Int),
            ..res
        }
    } else {
        res
    };
    let (res, eid) = enum2int(res);
    if let Some(eid) = eid {
        if cg.enums.get(eid).is_strict() {
            cg.diags
                .warn(res.span.clone(), "Arithmetic on strict enum drops enum type.");
        }
    }
    if !res.ty.is_integer() {
        return cg.error(res.span.clone(), "Scalar type required.");
    }
    Ok(promote(pcx, block, res))
}

/// Unary operator dispatch.
pub(crate) fn cgen_unary(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &UnaryExpr,
) -> CgResult<ExprRes> {
    let span = e.tok.span.merge(&e.arg.tlast().span);
    match e.op {
        UnOp::Plus => {
            let arg = cgen_expr_rvalue(cg, pcx, block, &e.arg)?;
            let mut res = lower_int_operand(cg, pcx, block, arg)?;
            res.span = span;
            Ok(res)
        }
        UnOp::Minus => {
            let arg = cgen_expr_rvalue(cg, pcx, block, &e.arg)?;
            let arg = lower_int_operand(cg, pcx, block, arg)?;
            let elm = arg.ty.elmtype().unwrap_or(Elmtype::Int);
            let konst = match arg.const_int() {
                Some(v) => {
                    let negated = v.checked_neg().unwrap_or(i64::MIN);
                    if elm.is_signed() && mask_to(negated, elm) != negated {
                        cg.diags
                            .warn(span.clone(), "Integer arithmetic overflow.");
                    }
                    Some(Konst::int(mask_to(negated, elm)))
                }
                None => None,
            };
            let dest = pcx.new_vreg();
            if let Some(src) = arg.slot.vreg() {
                block.append(Instr::unary(
                    InstrKind::Neg,
                    elm.width(),
                    Oper::var(dest.clone()),
                    Oper::var(src.to_string()),
                ));
            }
            Ok(ExprRes {
                slot: ValueSlot::Rvalue(dest),
                ty: arg.ty,
                konst,
                used: false,
                span,
            })
        }
        UnOp::BitNot => {
            let arg = cgen_expr_rvalue(cg, pcx, block, &e.arg)?;
            let arg = lower_int_operand(cg, pcx, block, arg)?;
            let elm = arg.ty.elmtype().unwrap_or(Elmtype::Int);
            if elm.is_signed() {
                cg.diags
                    .warn(span.clone(), "Bitwise operation on signed integers.");
            }
            if arg.const_int().is_some_and(|v| v < 0) {
                cg.diags
                    .warn(span.clone(), "Bitwise operation on negative numbers.");
            }
            let konst = arg.const_int().map(|v| Konst::int(mask_to(!v, elm)));
            let dest = pcx.new_vreg();
            if let Some(src) = arg.slot.vreg() {
                block.append(Instr::unary(
                    InstrKind::BNot,
                    elm.width(),
                    Oper::var(dest.clone()),
                    Oper::var(src.to_string()),
                ));
            }
            Ok(ExprRes {
                slot: ValueSlot::Rvalue(dest),
                ty: arg.ty,
                konst,
                used: false,
                span,
            })
        }
        UnOp::LogNot => logical::cgen_lognot(cg, pcx, block, e, span),
    }
}

/// `sizeof`: the operand is walked only to determine its type; IR goes
/// to a throwaway block and is discarded.
pub(crate) fn cgen_sizeof(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &SizeofExpr,
) -> CgResult<ExprRes> {
    let span = match &e.arg {
        SizeofArg::Type { rparen, .. } => e.tok.span.merge(&rparen.span),
        SizeofArg::Expr(arg) => e.tok.span.merge(&arg.tlast().span),
    };
    let ty = match &e.arg {
        SizeofArg::Type { tname, .. } => crate::decl::cgen_typename(cg, pcx, tname)?,
        SizeofArg::Expr(arg) => match sizeof_typedef_operand(cg, arg) {
            Some(ty) => ty,
            None => {
                let mut scratch = LabeledBlock::new();
                let res = cgen_expr(cg, pcx, &mut scratch, arg)?;
                res.ty
            }
        },
    };
    let Some(size) = ty.sized(&cg.records) else {
        return cg.error(span, "Cannot take size of an incomplete type.");
    };
    Ok(cgen_imm(
        pcx,
        block,
        size as i64,
        CType::Basic(Elmtype::UInt),
        span,
    ))
}

/// The parser cannot distinguish `sizeof (T)` from `sizeof (expr)`
/// when the operand is a lone parenthesized identifier; if that
/// identifier resolves to a typedef, it is a type name.
fn sizeof_typedef_operand(cg: &mut Cgen, arg: &Expr) -> Option<CType> {
    let Expr::Paren(p) = arg else {
        return None;
    };
    let Expr::Ident(tok) = &*p.inner else {
        return None;
    };
    let is_typedef = matches!(
        cg.scopes.lookup(&tok.text),
        Some(member) if matches!(member.kind, ScopeMemberKind::Typedef)
    );
    if !is_typedef {
        return None;
    }
    cg.scopes.lookup_mut(&tok.text).map(|member| {
        member.used = true;
        member.ty.clone()
    })
}
