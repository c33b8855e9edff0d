//! The module driver.
//!
//! Walks the top-level declarations of one translation unit in source
//! order, then synthesizes IR declarations for every symbol that was
//! referenced but not defined locally, so the produced module is
//! self-describing.

use mcc_ast::TranslationUnit;
use mcc_diagnostic::DiagQueue;
use mcc_ir::{Decl, Module, Proc, ProcArg, Var};
use mcc_types::{CType, CallConv, SymKind, SymbolId};
use tracing::debug;

use crate::context::Cgen;
use crate::init::cgen_zero_image;

/// Result of compiling one translation unit.
#[derive(Debug)]
pub struct CompileOutput {
    pub module: Module,
    pub diags: DiagQueue,
}

impl CompileOutput {
    /// The compilation succeeded iff no error was reported.
    pub fn success(&self) -> bool {
        !self.diags.has_errors()
    }
}

/// Compile a translation unit into an IR module plus diagnostics.
pub fn compile(module_name: &str, tunit: &TranslationUnit) -> CompileOutput {
    let mut cg = Cgen::new(module_name);
    cgen_module(&mut cg, tunit);
    CompileOutput {
        module: cg.module,
        diags: cg.diags,
    }
}

/// Walk one translation unit into the context's module.
pub fn cgen_module(cg: &mut Cgen, tunit: &TranslationUnit) {
    debug!(decls = tunit.decls.len(), "cgen_module");
    for gdecl in &tunit.decls {
        // A diagnosed subtree is abandoned; the walk resumes at the
        // next top-level declaration.
        let _ = crate::decl::cgen_global_decl(cg, gdecl);
    }
    close_module(cg);
}

/// Emit declarations for every symbol that was referenced but never
/// defined: extern procedures, and zero-filled variable images.
fn close_module(cg: &mut Cgen) {
    let pending: Vec<SymbolId> = cg
        .symbols
        .iter()
        .filter(|(_, sym)| !sym.defined)
        .map(|(sid, _)| sid)
        .collect();

    for sid in pending {
        let sym = cg.symbols.get(sid).clone();
        match sym.kind {
            SymKind::Func => {
                let mut proc = Proc::extern_decl(sym.irident.clone());
                if let CType::Func(ftype) = &sym.ty {
                    if !ftype.ret.is_void() {
                        proc.rtype = Some(cg.texpr(&ftype.ret));
                    }
                    if ftype.cconv == CallConv::Usr {
                        proc.attrs.push(mcc_ir::ProcAttr::Usr);
                    }
                    for (index, param) in ftype.params.as_deref().unwrap_or(&[]).iter().enumerate()
                    {
                        let effective = match param {
                            CType::Array(a) => CType::pointer((*a.elem).clone()),
                            other => other.clone(),
                        };
                        proc.args
                            .push(ProcArg::new(format!("%{index}"), cg.texpr(&effective)));
                    }
                }
                cg.module.append(Decl::Proc(proc));
            }
            SymKind::Var => {
                if !sym.ty.is_complete(&cg.records, &cg.enums) {
                    let message = format!("Variable '{}' has incomplete type.", sym.ident.text);
                    cg.diags.error(sym.ident.span.clone(), message);
                    continue;
                }
                if let Ok(data) = cgen_zero_image(cg, &sym.ty, &sym.ident.span) {
                    cg.module.append(Decl::Var(Var::new(sym.irident.clone(), data)));
                }
            }
        }
    }
}
