//! Integer, character, and string literal expressions.

use mcc_ast::Token;
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, Elmtype};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst};
use crate::lit;

/// Emit an immediate load and wrap it as a constant r-value.
pub(crate) fn cgen_imm(
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    value: i64,
    ty: CType,
    span: mcc_ast::SrcSpan,
) -> ExprRes {
    let dest = pcx.new_vreg();
    block.append(Instr::unary(
        InstrKind::Imm,
        ty.scalar_width(),
        Oper::var(dest.clone()),
        Oper::Imm(value),
    ));
    ExprRes::rvalue(dest, ty, span).with_konst(Konst::int(value))
}

/// Integer literal.
pub(crate) fn cgen_int_lit(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    tok: &Token,
) -> CgResult<ExprRes> {
    let Some(parsed) = lit::parse_int(&tok.text) else {
        return cg.error(tok.span.clone(), "Invalid integer literal.");
    };
    if parsed.overflow {
        return cg.error(tok.span.clone(), "Number is too large.");
    }
    if parsed.too_large {
        cg.diags
            .warn(tok.span.clone(), "Number is too large for its type.");
    }
    Ok(cgen_imm(
        pcx,
        block,
        parsed.value,
        CType::Basic(parsed.elm),
        tok.span.clone(),
    ))
}

/// Character literal; `L'…'` has type `int`, otherwise `char`.
pub(crate) fn cgen_char_lit(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    tok: &Token,
) -> CgResult<ExprRes> {
    let Some(parsed) = lit::parse_char(&tok.text) else {
        return cg.error(tok.span.clone(), "Invalid character literal.");
    };
    if parsed.too_large {
        cg.diags
            .warn(tok.span.clone(), "Character is too large for its type.");
    }
    let elm = if parsed.wide {
        Elmtype::Int
    } else {
        Elmtype::Char
    };
    Ok(cgen_imm(
        pcx,
        block,
        parsed.value,
        CType::Basic(elm),
        tok.span.clone(),
    ))
}

/// String literals appear only in initializers; in expression position
/// they are diagnosed.
pub(crate) fn cgen_str_lit(cg: &mut Cgen, tok: &Token) -> CgResult<ExprRes> {
    cg.error(
        tok.span.clone(),
        "String literals are only supported in initializers.",
    )
}
