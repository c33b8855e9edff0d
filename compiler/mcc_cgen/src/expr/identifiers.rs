//! Identifier expressions.

use mcc_ast::Token;
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, ScopeMemberKind};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst};

use super::literals::cgen_imm;

/// An identifier in expression position.
///
/// Global symbols and local variables yield addresses (l-values);
/// arguments are passed by value and yield their virtual register;
/// enum constants yield immediates.
pub(crate) fn cgen_ident(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    tok: &Token,
) -> CgResult<ExprRes> {
    let (ty, kind) = match cg.scopes.lookup_mut(&tok.text) {
        Some(member) => {
            member.used = true;
            (member.ty.clone(), member.kind.clone())
        }
        None => {
            let message = format!("Undeclared identifier '{}'.", tok.text);
            return cg.error(tok.span.clone(), message);
        }
    };

    match kind {
        ScopeMemberKind::GlobalSym(sid) => {
            let irident = cg.symbols.get(sid).irident.clone();
            let dest = pcx.new_vreg();
            block.append(Instr::unary(
                InstrKind::VarPtr,
                mcc_types::PTR_WIDTH,
                Oper::var(dest.clone()),
                Oper::var(irident),
            ));
            Ok(ExprRes::lvalue(dest, ty, tok.span.clone()).with_konst(Konst::addr(sid, 0)))
        }
        ScopeMemberKind::Arg { vident } => Ok(ExprRes::rvalue(vident, ty, tok.span.clone())),
        ScopeMemberKind::LocalVar { vident } => {
            let dest = pcx.new_vreg();
            block.append(Instr::unary(
                InstrKind::LVarPtr,
                mcc_types::PTR_WIDTH,
                Oper::var(dest.clone()),
                Oper::var(vident),
            ));
            Ok(ExprRes::lvalue(dest, ty, tok.span.clone()))
        }
        ScopeMemberKind::EnumElem { eid, index } => {
            let value = cg.enums.get(eid).elems[index].value;
            Ok(cgen_imm(pcx, block, value, CType::Enum(eid), tok.span.clone()))
        }
        ScopeMemberKind::Typedef => {
            let message = format!("Type name '{}' used as an expression.", tok.text);
            cg.error(tok.span.clone(), message)
        }
    }
}
