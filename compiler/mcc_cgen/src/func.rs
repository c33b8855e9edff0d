//! Function definitions.

use mcc_ast::{GlobalDecl, Token};
use mcc_ir::{Decl, Instr, InstrKind, LabeledBlock, Proc, ProcArg};
use mcc_types::{CType, CallConv, FuncType, ScopeMember, ScopeMemberKind, SymKind};
use tracing::debug;

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::decl::{apply_usr, cgen_declarator_full, declare_symbol};
use crate::dspec::{cgen_dspecs, DeclCtx, Sc};
use crate::stmt::cgen_block;

/// One function definition: compose the symbol, open a procedure,
/// build the argument scope, walk the body, and run the label and
/// unused passes.
pub fn cgen_fundef(cg: &mut Cgen, gdecl: &GlobalDecl) -> CgResult<()> {
    let mut spcx = ProcCtx::scratch();
    let out = cgen_dspecs(cg, &mut spcx, &gdecl.specs, DeclCtx::empty())?;
    if out.sc == Sc::Typedef {
        let span = gdecl
            .specs
            .tfirst()
            .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
        return cg.error(span, "Typedef with a function body.");
    }

    let [idecl] = gdecl.decls.as_slice() else {
        let span = gdecl
            .specs
            .tfirst()
            .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
        return cg.error(span, "Invalid function definition.");
    };
    if idecl.init.is_some() {
        let span = gdecl
            .specs
            .tfirst()
            .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
        return cg.error(span, "Function declared with an initializer.");
    }

    let dout = cgen_declarator_full(cg, &mut spcx, &out.ty, &idecl.decl, DeclCtx::empty())?;
    let Some(ident) = dout.ident else {
        let span = gdecl
            .specs
            .tfirst()
            .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
        return cg.error(span, "Invalid function definition.");
    };
    let mut ty = dout.ty;
    if out.usr {
        apply_usr(cg, &mut ty, Some(&ident))?;
    }
    let CType::Func(ftype) = ty.clone() else {
        return cg.error(ident.span.clone(), "Invalid function definition.");
    };
    debug!(name = %ident.text, "cgen_fundef");

    if matches!(*ftype.ret, CType::Array(_)) {
        return cg.error(ident.span.clone(), "Function cannot return an array.");
    }
    if !ftype.ret.is_void() && !ftype.ret.is_complete(&cg.records, &cg.enums) {
        return cg.error(ident.span.clone(), "Function returns an incomplete type.");
    }

    let sid = declare_symbol(cg, &ident, SymKind::Func, ty, true)?;
    if cg.symbols.get(sid).defined {
        let message = format!("Redefinition of '{}'.", ident.text);
        return cg.error(ident.span.clone(), message);
    }
    cg.symbols.get_mut(sid).defined = true;
    let irident = cg.symbols.get(sid).irident.clone();

    let mut pcx = ProcCtx::new((*ftype.ret).clone());
    let mut proc = Proc::new(irident);
    if !ftype.ret.is_void() {
        proc.rtype = Some(cg.texpr(&ftype.ret));
    }
    if ftype.cconv == CallConv::Usr {
        proc.attrs.push(mcc_ir::ProcAttr::Usr);
    }
    let mut body = LabeledBlock::new();

    // Argument scope; popped on every exit path after the unused pass.
    cg.scopes.push();
    let walked = fundef_body(cg, &mut pcx, &mut proc, &mut body, &ftype, &dout.param_names, gdecl);
    cg.unused_pass();
    cg.scopes.pop();
    walked?;

    // Control cannot fall off the end.
    body.append(Instr::nullary(InstrKind::Ret));

    // Label checks: every use needs a definition; every definition
    // wants a use.
    for entry in pcx.labels.iter() {
        if entry.used && !entry.defined {
            let message = format!("Undefined label '{}'.", entry.ident.text);
            cg.diags.error(entry.ident.span.clone(), message);
        } else if entry.defined && !entry.used {
            let message = format!("Unused label '{}'.", entry.ident.text);
            cg.diags.warn(entry.ident.span.clone(), message);
        }
    }

    proc.lvars = pcx.lvars;
    proc.body = Some(body);
    cg.module.append(Decl::Proc(proc));
    Ok(())
}

/// Insert the arguments and walk the body inside the argument scope.
fn fundef_body(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    proc: &mut Proc,
    body: &mut LabeledBlock,
    ftype: &FuncType,
    param_names: &[Option<Token>],
    gdecl: &GlobalDecl,
) -> CgResult<()> {
    let params = ftype.params.as_deref().unwrap_or(&[]);
    for (index, ty) in params.iter().enumerate() {
        let Some(Some(name)) = param_names.get(index) else {
            let span = gdecl
                .specs
                .tfirst()
                .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
            return cg.error(span, "Unnamed parameter in function definition.");
        };
        // Arrays are passed as pointer to element.
        let effective = match ty {
            CType::Array(a) => CType::pointer((*a.elem).clone()),
            other => other.clone(),
        };
        if !effective.is_complete(&cg.records, &cg.enums) {
            let message = format!("Parameter '{}' has incomplete type.", name.text);
            return cg.error(name.span.clone(), message);
        }
        let vident = pcx.mangle_lvar(&name.text);
        let inserted = cg.scopes.insert(ScopeMember {
            ident: name.clone(),
            ty: effective.clone(),
            used: false,
            kind: ScopeMemberKind::Arg {
                vident: vident.clone(),
            },
        });
        if inserted.is_err() {
            let message = format!("Redefinition of '{}'.", name.text);
            return cg.error(name.span.clone(), message);
        }
        proc.args.push(ProcArg::new(vident, cg.texpr(&effective)));
    }

    let Some(ast_body) = &gdecl.body else {
        return Ok(());
    };
    cgen_block(cg, pcx, body, ast_body)
}

#[cfg(test)]
mod tests;
