//! Dereference, address-of, member access, and subscripting.

use mcc_ast::{AddrExpr, DerefExpr, IndexExpr, MemberExpr};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, RecordId};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst, ValueSlot};

use super::{cgen_add_values, cgen_expr, cgen_expr_rvalue};

/// `*e`: the operand must be a pointer; the result is an l-value of
/// the pointee type.
pub(crate) fn cgen_deref(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &DerefExpr,
) -> CgResult<ExprRes> {
    let span = e.tok.span.merge(&e.arg.tlast().span);
    let arg = cgen_expr_rvalue(cg, pcx, block, &e.arg)?;
    deref_result(cg, arg, span)
}

/// Turn a pointer r-value into an l-value of the pointee.
pub(crate) fn deref_result(
    cg: &mut Cgen,
    arg: ExprRes,
    span: mcc_ast::SrcSpan,
) -> CgResult<ExprRes> {
    let CType::Pointer(target) = &arg.ty else {
        return cg.error(span, "Dereference of a non-pointer.");
    };
    let target = (**target).clone();
    let Some(vreg) = arg.slot.vreg() else {
        return cg.error(span, "Dereference of a non-pointer.");
    };
    Ok(ExprRes {
        slot: ValueSlot::Lvalue(vreg.to_string()),
        ty: target,
        konst: arg.konst,
        used: false,
        span,
    })
}

/// `&e`: the operand must be an l-value; the result is an r-value of
/// pointer type. A constant address propagates.
pub(crate) fn cgen_addr(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &AddrExpr,
) -> CgResult<ExprRes> {
    let span = e.tok.span.merge(&e.arg.tlast().span);
    let arg = cgen_expr(cg, pcx, block, &e.arg)?;
    let ValueSlot::Lvalue(addr) = arg.slot else {
        return cg.error(span, "Lvalue required.");
    };
    Ok(ExprRes {
        slot: ValueSlot::Rvalue(addr),
        ty: CType::pointer(arg.ty),
        konst: arg.konst,
        used: false,
        span,
    })
}

/// `e.m` / `e->m`.
pub(crate) fn cgen_member(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &MemberExpr,
) -> CgResult<ExprRes> {
    let span = e.base.tfirst().span.merge(&e.member.span);
    let base = cgen_expr(cg, pcx, block, &e.base)?;

    let (rid, addr, base_konst) = if e.arrow {
        let base = base.to_rvalue(pcx, block);
        let CType::Pointer(target) = &base.ty else {
            return cg.error(span, "'->' requires a pointer to a struct or union.");
        };
        let CType::Record(rid) = &**target else {
            return cg.error(span, "'->' requires a pointer to a struct or union.");
        };
        let rid = *rid;
        let Some(vreg) = base.slot.vreg() else {
            return cg.error(span, "'->' requires a pointer to a struct or union.");
        };
        (rid, vreg.to_string(), base.konst)
    } else {
        let CType::Record(rid) = &base.ty else {
            return cg.error(span, "'.' requires a struct or union.");
        };
        let rid = *rid;
        // Record results are always addresses, l-value or not.
        let Some(vreg) = base.slot.vreg() else {
            return cg.error(span, "'.' requires a struct or union.");
        };
        (rid, vreg.to_string(), base.konst)
    };

    member_access(cg, pcx, block, rid, &addr, base_konst, &e.member.text, span)
}

/// Common member-address emission for `.` and `->`.
#[allow(clippy::too_many_arguments)]
fn member_access(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    rid: RecordId,
    addr: &str,
    base_konst: Option<Konst>,
    member: &str,
    span: mcc_ast::SrcSpan,
) -> CgResult<ExprRes> {
    let def = cg.records.get(rid);
    if !def.defined {
        return cg.error(span, "Access to member of incomplete type.");
    }
    let irident = def.irident.clone();
    let Some((index, elem)) = def.find_elem(member) else {
        let shown = CType::Record(rid);
        let message = format!(
            "'{member}' is not a member of '{}'.",
            shown.display(&cg.records, &cg.enums)
        );
        return cg.error(span, message);
    };
    let member_ty = elem.ty.clone();

    let dest = pcx.new_vreg();
    block.append(
        Instr::binary(
            InstrKind::RecMbr,
            mcc_types::PTR_WIDTH,
            Oper::var(dest.clone()),
            Oper::var(addr.to_string()),
            Oper::var(member.to_string()),
        )
        .with_texpr(mcc_ir::TypeExpr::ident(irident)),
    );

    // A constant base address propagates through the member offset.
    let konst = match (base_konst, cg.records.elem_offset(rid, index)) {
        (Some(k), Some(offset)) => Some(Konst {
            value: k.value + offset as i64,
            base: k.base,
        }),
        _ => None,
    };

    Ok(ExprRes {
        slot: ValueSlot::Lvalue(dest),
        ty: member_ty,
        konst,
        used: false,
        span,
    })
}

/// `a[b]` is `*(a + b)`, with the same pointer/array index semantics
/// as addition.
pub(crate) fn cgen_index(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &IndexExpr,
) -> CgResult<ExprRes> {
    let span = e.base.tfirst().span.merge(&e.rbracket.span);
    let base = cgen_expr(cg, pcx, block, &e.base)?;
    match &base.ty {
        CType::Pointer(_) | CType::Array(_) => {}
        _ => {
            return cg.error(span, "Subscripted value is neither pointer nor array.");
        }
    }
    let index = cgen_expr_rvalue(cg, pcx, block, &e.index)?;
    match &index.ty {
        CType::Basic(elm) if elm.is_integer() => {}
        CType::Enum(_) => {}
        _ => {
            return cg.error(index.span.clone(), "Subscript index is not an integer.");
        }
    }
    let sum = cgen_add_values(cg, pcx, block, base, index, span.clone())?;
    deref_result(cg, sum, span)
}
