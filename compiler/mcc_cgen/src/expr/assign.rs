//! Assignment, compound assignment, increment and decrement.

use mcc_ast::{AssignExpr, Fixity, IncDecExpr, IncDecOp, SrcSpan};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::CType;

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::conv::convert_implicit;
use crate::eres::{ExprRes, ValueSlot};

use super::binary::{cgen_add_values, cgen_sub_values};
use super::literals::cgen_imm;
use super::{binary, cgen_expr, cgen_expr_rvalue};

/// Store a converted r-value into the storage behind `addr`.
///
/// Records copy whole (`reccopy`); scalars store through `write`.
pub(crate) fn emit_store(
    cg: &Cgen,
    block: &mut LabeledBlock,
    ty: &CType,
    addr: &str,
    value: &ExprRes,
) {
    let Some(src) = value.slot.vreg() else {
        return;
    };
    if let CType::Record(rid) = ty {
        block.append(
            Instr {
                kind: InstrKind::RecCopy,
                width: 0,
                dest: None,
                op1: Some(Oper::var(addr.to_string())),
                op2: Some(Oper::var(src.to_string())),
                texpr: Some(mcc_ir::TypeExpr::ident(cg.records.get(*rid).irident.clone())),
            },
        );
    } else {
        block.append(Instr {
            kind: InstrKind::Write,
            width: ty.scalar_width(),
            dest: None,
            op1: Some(Oper::var(addr.to_string())),
            op2: Some(Oper::var(src.to_string())),
            texpr: None,
        });
    }
}

/// Check the assignment target and produce its address register.
fn assign_target(cg: &mut Cgen, lhs: &ExprRes, span: &SrcSpan) -> CgResult<String> {
    if let CType::Array(_) = lhs.ty {
        return cg.error(span.clone(), "Cannot assign to an array.");
    }
    match &lhs.slot {
        ValueSlot::Lvalue(addr) => Ok(addr.clone()),
        _ => cg.error(span.clone(), "Lvalue required."),
    }
}

/// `=` and the compound assignments.
pub(crate) fn cgen_assign(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &AssignExpr,
) -> CgResult<ExprRes> {
    let span = e.lhs.tfirst().span.merge(&e.rhs.tlast().span);
    let lhs = cgen_expr(cg, pcx, block, &e.lhs)?;
    let addr = assign_target(cg, &lhs, &span)?;
    let rhs = cgen_expr_rvalue(cg, pcx, block, &e.rhs)?;

    let value = match e.op.binop() {
        None => convert_implicit(cg, pcx, block, rhs, &lhs.ty)?,
        Some(op) => {
            // Compound form: read, apply, convert back, store.
            let current = lhs.clone().to_rvalue(pcx, block);
            let combined =
                binary::cgen_binop_values(cg, pcx, block, op, current, rhs, span.clone())?;
            convert_implicit(cg, pcx, block, combined, &lhs.ty)?
        }
    };

    emit_store(cg, block, &lhs.ty, &addr, &value);
    Ok(ExprRes {
        ty: lhs.ty,
        used: true,
        span,
        ..value
    })
}

/// `++e`, `--e`, `e++`, `e--`.
pub(crate) fn cgen_incdec(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &IncDecExpr,
) -> CgResult<ExprRes> {
    let span = match e.fixity {
        Fixity::Pre => e.tok.span.merge(&e.arg.tlast().span),
        Fixity::Post => e.arg.tfirst().span.merge(&e.tok.span),
    };
    let lhs = cgen_expr(cg, pcx, block, &e.arg)?;
    let addr = assign_target(cg, &lhs, &span)?;

    let original = lhs.clone().to_rvalue(pcx, block);
    let one = cgen_imm(pcx, block, 1, CType::int(), span.clone());
    let stepped = match e.op {
        IncDecOp::Inc => cgen_add_values(cg, pcx, block, original.clone(), one, span.clone())?,
        IncDecOp::Dec => cgen_sub_values(cg, pcx, block, original.clone(), one, span.clone())?,
    };
    let updated = convert_implicit(cg, pcx, block, stepped, &lhs.ty)?;
    emit_store(cg, block, &lhs.ty, &addr, &updated);

    let result = match e.fixity {
        Fixity::Pre => updated,
        Fixity::Post => original,
    };
    Ok(ExprRes {
        ty: lhs.ty,
        used: true,
        span,
        ..result
    })
}
