//! Short-circuit logical operators.
//!
//! `&&`, `||`, and `!` produce truth-type results through a label
//! sequence around immediate 0 / immediate 1 loads. The destination
//! register is deliberately reused across both branches; the IR layer
//! tolerates the multiple writers.

use mcc_ast::{BinOp, BinaryExpr, SrcSpan, UnaryExpr};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, Elmtype, LOGIC_WIDTH};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst, ValueSlot};

use super::cgen_expr_rvalue;

/// Require a scalar r-value usable as a truth operand.
fn scalar_operand(cg: &mut Cgen, res: ExprRes) -> CgResult<ExprRes> {
    match &res.ty {
        CType::Basic(Elmtype::Void) => cg.error(res.span.clone(), "Use of void value."),
        CType::Basic(_) | CType::Pointer(_) | CType::Enum(_) => Ok(res),
        _ => cg.error(res.span.clone(), "Scalar type required."),
    }
}

/// Append a conditional jump on an operand register.
fn cond_jump(block: &mut LabeledBlock, kind: InstrKind, res: &ExprRes, label: &str) {
    if let Some(vreg) = res.slot.vreg() {
        block.append(Instr {
            kind,
            width: res.ty.scalar_width(),
            dest: None,
            op1: Some(Oper::var(vreg.to_string())),
            op2: Some(Oper::var(label.to_string())),
            texpr: None,
        });
    }
}

/// Load an immediate into an existing destination register.
fn load_imm(block: &mut LabeledBlock, dest: &str, value: i64, label: Option<&str>) {
    let instr = Instr::unary(
        InstrKind::Imm,
        LOGIC_WIDTH,
        Oper::var(dest.to_string()),
        Oper::Imm(value),
    );
    match label {
        Some(l) => block.append_labeled(l, instr),
        None => block.append(instr),
    }
}

/// `&&` and `||`.
pub(crate) fn cgen_logical(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &BinaryExpr,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let and = e.op == BinOp::LogAnd;
    let dest = pcx.new_vreg();
    let (shortcut, end) = if and {
        (pcx.new_label("false_and"), pcx.new_label("end_and"))
    } else {
        (pcx.new_label("true_or"), pcx.new_label("end_or"))
    };
    // On `&&` any false operand decides; on `||` any true operand.
    let jump_kind = if and { InstrKind::Jz } else { InstrKind::Jnz };

    let lhs = cgen_expr_rvalue(cg, pcx, block, &e.lhs)?;
    let lhs = scalar_operand(cg, lhs)?;
    cond_jump(block, jump_kind, &lhs, &shortcut);

    let rhs = cgen_expr_rvalue(cg, pcx, block, &e.rhs)?;
    let rhs = scalar_operand(cg, rhs)?;
    cond_jump(block, jump_kind, &rhs, &shortcut);

    // Fell through both: the non-shortcut value.
    load_imm(block, &dest, i64::from(and), None);
    block.append(Instr {
        kind: InstrKind::Jmp,
        width: 0,
        dest: None,
        op1: Some(Oper::var(end.clone())),
        op2: None,
        texpr: None,
    });
    load_imm(block, &dest, i64::from(!and), Some(&shortcut));
    block.append_label(&end);

    // Constant folding honors short-circuiting: a deciding left
    // operand fixes the result without the right one being known.
    let truth = |k: i64| i64::from(k != 0);
    let konst = match lhs.const_int() {
        Some(l) if (l != 0) != and => Some(Konst::int(i64::from(!and))),
        Some(_) => rhs.const_int().map(|r| Konst::int(truth(r))),
        None => None,
    };

    Ok(ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: CType::logic(),
        konst,
        used: false,
        span,
    })
}

/// `!e`.
pub(crate) fn cgen_lognot(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &UnaryExpr,
    span: SrcSpan,
) -> CgResult<ExprRes> {
    let arg = cgen_expr_rvalue(cg, pcx, block, &e.arg)?;
    let arg = scalar_operand(cg, arg)?;

    let dest = pcx.new_vreg();
    let nonzero = pcx.new_label("false_not");
    let end = pcx.new_label("end_not");

    cond_jump(block, InstrKind::Jnz, &arg, &nonzero);
    load_imm(block, &dest, 1, None);
    block.append(Instr {
        kind: InstrKind::Jmp,
        width: 0,
        dest: None,
        op1: Some(Oper::var(end.clone())),
        op2: None,
        texpr: None,
    });
    load_imm(block, &dest, 0, Some(&nonzero));
    block.append_label(&end);

    let konst = arg.const_int().map(|v| Konst::int(i64::from(v == 0)));
    Ok(ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: CType::logic(),
        konst,
        used: false,
        span,
    })
}
