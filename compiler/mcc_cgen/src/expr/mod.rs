//! Expression code generation.
//!
//! Each node kind has its walker; the dispatcher lives here together
//! with the helpers shared by statement and declaration processing:
//! r-value evaluation, condition jumps, constant-expression
//! evaluation, and the unused-computed-value check.

mod access;
mod assign;
mod binary;
mod call;
mod compare;
mod identifiers;
mod literals;
mod logical;
mod unary;

use mcc_ast::Expr;
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::CType;
use tracing::trace;

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::conv::{convert, ConvKind};
use crate::eres::ExprRes;

pub(crate) use assign::emit_store;
pub(crate) use binary::cgen_add_values;

/// Evaluate one expression; the result may be an l-value.
pub fn cgen_expr(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    expr: &Expr,
) -> CgResult<ExprRes> {
    trace!("cgen_expr");
    match expr {
        Expr::IntLit(tok) => literals::cgen_int_lit(cg, pcx, block, tok),
        Expr::CharLit(tok) => literals::cgen_char_lit(cg, pcx, block, tok),
        Expr::StrLit(tok) => literals::cgen_str_lit(cg, tok),
        Expr::Ident(tok) => identifiers::cgen_ident(cg, pcx, block, tok),
        Expr::Paren(e) => {
            let mut res = cgen_expr(cg, pcx, block, &e.inner)?;
            res.span = expr.span();
            Ok(res)
        }
        Expr::Binary(e) => binary::cgen_binary(cg, pcx, block, e),
        Expr::Comma(e) => {
            let lhs = cgen_expr_rvalue(cg, pcx, block, &e.lhs)?;
            check_unused(cg, &lhs);
            cgen_expr(cg, pcx, block, &e.rhs)
        }
        Expr::Assign(e) => assign::cgen_assign(cg, pcx, block, e),
        Expr::Unary(e) => unary::cgen_unary(cg, pcx, block, e),
        Expr::Deref(e) => access::cgen_deref(cg, pcx, block, e),
        Expr::Addr(e) => access::cgen_addr(cg, pcx, block, e),
        Expr::Index(e) => access::cgen_index(cg, pcx, block, e),
        Expr::Member(e) => access::cgen_member(cg, pcx, block, e),
        Expr::Call(e) => call::cgen_call(cg, pcx, block, e),
        Expr::Cast(e) => {
            let dest = crate::decl::cgen_typename(cg, pcx, &e.tname)?;
            let arg = cgen_expr(cg, pcx, block, &e.arg)?;
            let mut res = convert(cg, pcx, block, arg, &dest, ConvKind::Explicit)?;
            res.span = expr.span();
            Ok(res)
        }
        Expr::Sizeof(e) => unary::cgen_sizeof(cg, pcx, block, e),
        Expr::IncDec(e) => assign::cgen_incdec(cg, pcx, block, e),
    }
}

/// Evaluate an expression and convert the result to an r-value.
pub fn cgen_expr_rvalue(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    expr: &Expr,
) -> CgResult<ExprRes> {
    let res = cgen_expr(cg, pcx, block, expr)?;
    Ok(res.to_rvalue(pcx, block))
}

/// Evaluate a condition r-value: any scalar type (integer, enum,
/// pointer, truth value) is accepted.
fn cgen_cond_rvalue(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    expr: &Expr,
) -> CgResult<ExprRes> {
    let res = cgen_expr_rvalue(cg, pcx, block, expr)?;
    match &res.ty {
        CType::Basic(e) if e.is_integer() => Ok(res),
        CType::Basic(mcc_types::Elmtype::Logic) | CType::Pointer(_) | CType::Enum(_) => Ok(res),
        _ => cg.error(res.span.clone(), "Scalar type required."),
    }
}

/// Evaluate a condition and jump to `label` when it is false (zero).
pub fn cgen_cond_jmp_false(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    expr: &Expr,
    label: &str,
) -> CgResult<()> {
    let res = cgen_cond_rvalue(cg, pcx, block, expr)?;
    if let Some(vreg) = res.slot.vreg() {
        block.append(Instr {
            kind: InstrKind::Jz,
            width: res.ty.scalar_width(),
            dest: None,
            op1: Some(Oper::var(vreg.to_string())),
            op2: Some(Oper::var(label.to_string())),
            texpr: None,
        });
    }
    Ok(())
}

/// Evaluate a condition and jump to `label` when it is true (nonzero).
pub fn cgen_cond_jmp_true(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    expr: &Expr,
    label: &str,
) -> CgResult<()> {
    let res = cgen_cond_rvalue(cg, pcx, block, expr)?;
    if let Some(vreg) = res.slot.vreg() {
        block.append(Instr {
            kind: InstrKind::Jnz,
            width: res.ty.scalar_width(),
            dest: None,
            op1: Some(Oper::var(vreg.to_string())),
            op2: Some(Oper::var(label.to_string())),
            texpr: None,
        });
    }
    Ok(())
}

/// Evaluate a constant expression to its result, running the walker in
/// constant-expression mode with IR routed to a throwaway block.
pub fn cgen_const_expr(cg: &mut Cgen, pcx: &mut ProcCtx, expr: &Expr) -> CgResult<ExprRes> {
    let mut scratch = LabeledBlock::new();
    let saved = cg.cexpr;
    cg.cexpr = true;
    let result = cgen_expr_rvalue(cg, pcx, &mut scratch, expr);
    cg.cexpr = saved;
    let res = result?;
    if res.konst.is_none() {
        return cg.error(res.span.clone(), "Constant expression required.");
    }
    Ok(res)
}

/// Evaluate a constant integer expression (array sizes, case labels,
/// enum values). Symbol-relative constants are rejected.
pub fn cgen_const_int(cg: &mut Cgen, pcx: &mut ProcCtx, expr: &Expr) -> CgResult<(i64, CType)> {
    let res = cgen_const_expr(cg, pcx, expr)?;
    match res.const_int() {
        Some(v) => Ok((v, res.ty)),
        None => cg.error(res.span.clone(), "Constant expression required."),
    }
}

/// The unused-computed-value rule: when a result is discarded and it
/// was not intrinsically side-effecting, warn.
pub fn check_unused(cg: &mut Cgen, res: &ExprRes) {
    if !res.used {
        cg.diags
            .warn(res.span.clone(), "Computed expression value is not used");
    }
}
