//! Function calls.

use mcc_ast::{CallExpr, Expr};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, SymKind};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::conv::convert_implicit;
use crate::eres::{ExprRes, ValueSlot};

use super::cgen_expr_rvalue;

/// A function call. The callee must be a plain identifier naming a
/// symbol of function type; each argument is implicitly converted to
/// its parameter type.
pub(crate) fn cgen_call(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    e: &CallExpr,
) -> CgResult<ExprRes> {
    let span = e.callee.tfirst().span.merge(&e.rparen.span);
    let Expr::Ident(callee) = &*e.callee else {
        return cg.error(span, "Function call requires an identifier.");
    };

    if let Some(member) = cg.scopes.lookup_mut(&callee.text) {
        member.used = true;
    }
    let Some(sid) = cg.symbols.lookup(&callee.text) else {
        let message = format!("Undeclared identifier '{}'.", callee.text);
        return cg.error(callee.span.clone(), message);
    };
    let sym = cg.symbols.get(sid);
    if sym.kind != SymKind::Func {
        let message = format!("'{}' is not a function.", callee.text);
        return cg.error(callee.span.clone(), message);
    }
    let CType::Func(ftype) = sym.ty.clone() else {
        let message = format!("'{}' is not a function.", callee.text);
        return cg.error(callee.span.clone(), message);
    };
    let irident = sym.irident.clone();

    // Evaluate and convert the arguments left to right.
    let mut arg_opers = Vec::with_capacity(e.args.len());
    match &ftype.params {
        Some(params) => {
            if e.args.len() < params.len() {
                let message = format!("Too few arguments to function '{}'.", callee.text);
                return cg.error(span, message);
            }
            if e.args.len() > params.len() {
                let message = format!("Too many arguments to function '{}'.", callee.text);
                return cg.error(span, message);
            }
            for (arg, param_ty) in e.args.iter().zip(params.iter()) {
                let value = cgen_expr_rvalue(cg, pcx, block, arg)?;
                warn_short_array_argument(cg, &value, param_ty);
                let param_ty = decay_param(param_ty);
                let value = convert_implicit(cg, pcx, block, value, &param_ty)?;
                if let Some(vreg) = value.slot.vreg() {
                    arg_opers.push(Oper::var(vreg.to_string()));
                }
            }
        }
        None => {
            // Unspecified parameter list: arguments pass through
            // unconverted beyond their own evaluation.
            for arg in &e.args {
                let value = cgen_expr_rvalue(cg, pcx, block, arg)?;
                if let Some(vreg) = value.slot.vreg() {
                    arg_opers.push(Oper::var(vreg.to_string()));
                }
            }
        }
    }

    let rtype = (*ftype.ret).clone();
    if rtype.is_void() {
        block.append(Instr {
            kind: InstrKind::Call,
            width: 0,
            dest: None,
            op1: Some(Oper::var(irident)),
            op2: Some(Oper::List(arg_opers)),
            texpr: None,
        });
        // A void call cannot leave an unused value behind.
        let mut res = ExprRes::void(span);
        res.used = true;
        return Ok(res);
    }

    let dest = pcx.new_vreg();
    block.append(Instr {
        kind: InstrKind::Call,
        width: rtype.scalar_width(),
        dest: Some(Oper::var(dest.clone())),
        op1: Some(Oper::var(irident)),
        op2: Some(Oper::List(arg_opers)),
        texpr: None,
    });
    // `used` stays clear so a discarded non-void result warns.
    Ok(ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: rtype,
        konst: None,
        used: false,
        span,
    })
}

/// A declared formal array parameter really takes a pointer.
fn decay_param(param_ty: &CType) -> CType {
    match param_ty {
        CType::Array(a) => CType::pointer((*a.elem).clone()),
        other => other.clone(),
    }
}

/// Passing an array with smaller extent than the declared formal array
/// is suspicious.
fn warn_short_array_argument(cg: &mut Cgen, value: &ExprRes, param_ty: &CType) {
    let (CType::Array(formal), CType::Array(actual)) = (param_ty, &value.ty) else {
        return;
    };
    if let (Some(want), Some(have)) = (formal.size, actual.size) {
        if have < want {
            cg.diags.warn(
                value.span.clone(),
                "Array argument is smaller than the declared parameter.",
            );
        }
    }
}
