//! Declarator evaluation and declaration processing.
//!
//! Declarators compose type constructors onto the specifier base type
//! outside-in. Declarations then dispatch on typedef vs. object vs.
//! function, and on file scope vs. function body.

use mcc_ast::{DeclStmt, Declarator, GlobalDecl, Init, ParamDecl, Token, TypeName};
use mcc_ir::{Decl, LabeledBlock, ProcVar, Var};
use mcc_types::{
    CType, FuncType, ScopeMember, ScopeMemberKind, SymKind, SymbolId,
};
use smallvec::SmallVec;
use tracing::trace;

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::conv::convert_implicit;
use crate::dspec::{cgen_dspecs, DeclCtx, DspecFlags, Sc};
use crate::expr::{cgen_const_int, cgen_expr_rvalue, emit_store};

/// Result of evaluating one declarator over a base type.
#[derive(Clone, Debug)]
pub struct DeclaratorOut {
    pub ty: CType,
    pub ident: Option<Token>,
    /// Parameter name tokens of the declarator's own function part,
    /// when there is one (used by function definitions).
    pub param_names: Vec<Option<Token>>,
}

/// Evaluate a declarator, composing pointer, array, and function
/// constructors onto `base`.
pub fn cgen_declarator(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    base: &CType,
    decl: &Declarator,
    dctx: DeclCtx,
) -> CgResult<(CType, Option<Token>)> {
    let out = cgen_declarator_full(cg, pcx, base, decl, dctx)?;
    Ok((out.ty, out.ident))
}

/// Evaluate a declarator, also keeping the parameter names of its
/// function part.
pub fn cgen_declarator_full(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    base: &CType,
    decl: &Declarator,
    dctx: DeclCtx,
) -> CgResult<DeclaratorOut> {
    match decl {
        Declarator::Ident(tok) => Ok(DeclaratorOut {
            ty: base.clone(),
            ident: Some(tok.clone()),
            param_names: Vec::new(),
        }),
        Declarator::Anon => Ok(DeclaratorOut {
            ty: base.clone(),
            ident: None,
            param_names: Vec::new(),
        }),
        Declarator::Ptr(d) => {
            let base = CType::pointer(base.clone());
            cgen_declarator_full(cg, pcx, &base, &d.inner, dctx)
        }
        Declarator::Array(d) => {
            if !base.is_complete(&cg.records, &cg.enums) {
                return cg.error(d.lbracket.span.clone(), "Array element has incomplete type.");
            }
            let size = match &d.size {
                Some(expr) => {
                    let (value, _) = cgen_const_int(cg, pcx, expr)?;
                    if value < 0 {
                        return cg.error(expr.span(), "Array size is negative.");
                    }
                    Some(value as u64)
                }
                None => None,
            };
            let base = CType::array(base.clone(), size);
            cgen_declarator_full(cg, pcx, &base, &d.inner, dctx)
        }
        Declarator::Fun(d) => {
            // The signature is extracted in a fresh argument scope
            // that is discarded afterwards.
            cg.scopes.push();
            let result = cgen_param_list(cg, pcx, &d.params, dctx);
            cg.scopes.pop();
            let (params, names) = result?;
            let base = CType::Func(Box::new(FuncType {
                ret: Box::new(base.clone()),
                params: Some(params),
                cconv: mcc_types::CallConv::Normal,
            }));
            let mut out = cgen_declarator_full(cg, pcx, &base, &d.inner, dctx)?;
            out.param_names = names;
            Ok(out)
        }
    }
}

/// Process a function declarator's parameter list inside the already
/// pushed argument scope.
#[allow(clippy::type_complexity)]
fn cgen_param_list(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    params: &[ParamDecl],
    dctx: DeclCtx,
) -> CgResult<(SmallVec<[CType; 4]>, Vec<Option<Token>>)> {
    let mut types: SmallVec<[CType; 4]> = SmallVec::new();
    let mut names: Vec<Option<Token>> = Vec::new();
    let mut named = 0u32;
    let mut unnamed = 0u32;

    // `f(void)` declares zero parameters.
    if let [only] = params {
        let out = cgen_dspecs(cg, pcx, &only.specs, dctx | DeclCtx::IN_PARAMS)?;
        if out.ty.is_void() && only.decl.is_bare_anon() {
            return Ok((types, names));
        }
        let (ty, ident) = cgen_declarator(cg, pcx, &out.ty, &only.decl, dctx | DeclCtx::IN_PARAMS)?;
        push_param(cg, &mut types, &mut names, ty, ident, &mut named, &mut unnamed)?;
        return Ok((types, names));
    }

    for param in params {
        let out = cgen_dspecs(cg, pcx, &param.specs, dctx | DeclCtx::IN_PARAMS)?;
        let (ty, ident) =
            cgen_declarator(cg, pcx, &out.ty, &param.decl, dctx | DeclCtx::IN_PARAMS)?;
        push_param(cg, &mut types, &mut names, ty, ident, &mut named, &mut unnamed)?;
    }
    if named > 0 && unnamed > 0 {
        if let Some(tok) = names.iter().flatten().next() {
            cg.diags
                .warn(tok.span.clone(), "Mixing named and unnamed parameters.");
        }
    }
    Ok((types, names))
}

fn push_param(
    cg: &mut Cgen,
    types: &mut SmallVec<[CType; 4]>,
    names: &mut Vec<Option<Token>>,
    ty: CType,
    ident: Option<Token>,
    named: &mut u32,
    unnamed: &mut u32,
) -> CgResult<()> {
    if ty.is_void() {
        let span = ident
            .as_ref()
            .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
        return cg.error(span, "Parameter has incomplete type.");
    }
    match &ident {
        Some(tok) => {
            *named += 1;
            let inserted = cg.scopes.insert(ScopeMember {
                ident: tok.clone(),
                ty: ty.clone(),
                used: true,
                kind: ScopeMemberKind::Arg {
                    vident: format!("%{}", tok.text),
                },
            });
            if inserted.is_err() {
                let message = format!("Redefinition of '{}'.", tok.text);
                return cg.error(tok.span.clone(), message);
            }
        }
        None => *unnamed += 1,
    }
    types.push(ty);
    names.push(ident);
    Ok(())
}

/// Evaluate an abstract type name (casts, `sizeof`).
pub fn cgen_typename(cg: &mut Cgen, pcx: &mut ProcCtx, tname: &TypeName) -> CgResult<CType> {
    let out = cgen_dspecs(cg, pcx, &tname.specs, DeclCtx::empty())?;
    let (ty, _) = cgen_declarator(cg, pcx, &out.ty, &tname.decl, DeclCtx::empty())?;
    Ok(ty)
}

/// Insert a new symbol or compose with an existing declaration.
pub fn declare_symbol(
    cg: &mut Cgen,
    ident: &Token,
    kind: SymKind,
    ty: CType,
    is_definition: bool,
) -> CgResult<SymbolId> {
    if let Some(sid) = cg.symbols.lookup(&ident.text) {
        let sym = cg.symbols.get(sid);
        if sym.kind != kind {
            let message = format!("Conflicting type for '{}'.", ident.text);
            return cg.error(ident.span.clone(), message);
        }
        let composed = match sym.ty.compose(&ty) {
            Ok(composed) => composed,
            Err(_) => {
                let message = format!("Conflicting type for '{}'.", ident.text);
                return cg.error(ident.span.clone(), message);
            }
        };
        cg.symbols.get_mut(sid).ty = composed;
        if !is_definition {
            let message = format!("Multiple declarations of '{}'.", ident.text);
            cg.diags.warn(ident.span.clone(), message);
        }
        return Ok(sid);
    }

    let sid = match cg.symbols.insert(ident.clone(), kind, ty.clone()) {
        Ok(sid) => sid,
        Err(_) => {
            let message = format!("Redefinition of '{}'.", ident.text);
            return cg.error(ident.span.clone(), message);
        }
    };
    let inserted = cg.scopes.insert(ScopeMember {
        ident: ident.clone(),
        ty,
        used: false,
        kind: ScopeMemberKind::GlobalSym(sid),
    });
    if inserted.is_err() {
        let message = format!("Redefinition of '{}'.", ident.text);
        return cg.error(ident.span.clone(), message);
    }
    Ok(sid)
}

/// A typedef or variable declaration of an enum type makes an
/// anonymous tag effectively named; strict-enum checking then applies.
fn mark_enum_named(cg: &mut Cgen, ty: &CType) {
    if let CType::Enum(eid) = ty {
        cg.enums.get_mut(*eid).named = true;
    }
}

/// Register a typedef name in the current scope.
fn register_typedef(cg: &mut Cgen, ident: &Token, ty: CType) -> CgResult<()> {
    if !cg.scopes.is_global() {
        cg.diags
            .warn(ident.span.clone(), "Typedef in a non-global scope.");
    }
    mark_enum_named(cg, &ty);
    let inserted = cg.scopes.insert(ScopeMember {
        ident: ident.clone(),
        ty,
        used: false,
        kind: ScopeMemberKind::Typedef,
    });
    if inserted.is_err() {
        let message = format!("Redefinition of '{}'.", ident.text);
        return cg.error(ident.span.clone(), message);
    }
    Ok(())
}

/// One file-scope declaration without a body.
pub fn cgen_global_decl(cg: &mut Cgen, gdecl: &GlobalDecl) -> CgResult<()> {
    trace!("cgen_global_decl");
    if gdecl.body.is_some() {
        return crate::func::cgen_fundef(cg, gdecl);
    }

    let mut pcx = ProcCtx::scratch();
    let out = cgen_dspecs(cg, &mut pcx, &gdecl.specs, DeclCtx::empty())?;

    if gdecl.decls.is_empty() {
        if !out.flags.intersects(DspecFlags::IDENT | DspecFlags::DEFINED) {
            let span = gdecl
                .specs
                .tfirst()
                .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
            cg.diags.warn(span, "Useless type in empty declaration.");
        }
        return Ok(());
    }

    for idecl in &gdecl.decls {
        let (mut ty, ident) =
            cgen_declarator(cg, &mut pcx, &out.ty, &idecl.decl, DeclCtx::empty())?;
        if out.usr {
            apply_usr(cg, &mut ty, ident.as_ref())?;
        }
        let Some(ident) = ident else {
            if !out.flags.intersects(DspecFlags::IDENT | DspecFlags::DEFINED) {
                let span = gdecl
                    .specs
                    .tfirst()
                    .map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
                cg.diags.warn(span, "Useless type in empty declaration.");
            }
            continue;
        };

        match out.sc {
            Sc::Typedef => {
                if idecl.init.is_some() {
                    return cg.error(ident.span.clone(), "Typedef with an initializer.");
                }
                register_typedef(cg, &ident, ty)?;
            }
            Sc::None => {
                if let CType::Func(_) = ty {
                    if idecl.init.is_some() {
                        return cg
                            .error(ident.span.clone(), "Function declared with an initializer.");
                    }
                    declare_symbol(cg, &ident, SymKind::Func, ty, false)?;
                } else {
                    cgen_global_object(cg, &mut pcx, &ident, ty, idecl.init.as_ref())?;
                }
            }
        }
    }
    Ok(())
}

/// Mark a function type as a user service routine; `usr` rejects
/// parameters and non-function declarators.
pub fn apply_usr(cg: &mut Cgen, ty: &mut CType, ident: Option<&Token>) -> CgResult<()> {
    let span = ident.map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
    match ty {
        CType::Func(ftype) => {
            if ftype.params.as_ref().is_some_and(|p| !p.is_empty()) {
                return cg.error(span, "User service routine cannot have parameters.");
            }
            ftype.cconv = mcc_types::CallConv::Usr;
            Ok(())
        }
        _ => {
            cg.diags.warn(span, "Attribute 'usr' ignored.");
            Ok(())
        }
    }
}

/// A file-scope object declaration or definition.
fn cgen_global_object(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    ident: &Token,
    ty: CType,
    init: Option<&Init>,
) -> CgResult<()> {
    mark_enum_named(cg, &ty);
    let sid = declare_symbol(cg, ident, SymKind::Var, ty, init.is_some())?;
    let Some(init) = init else {
        // Tentative: the module driver emits the zero image at close.
        return Ok(());
    };
    if cg.symbols.get(sid).defined {
        let message = format!("Redefinition of '{}'.", ident.text);
        return cg.error(ident.span.clone(), message);
    }
    let declared = cg.symbols.get(sid).ty.clone();
    let (pinned, data) = crate::init::cgen_init_data(cg, pcx, &declared, Some(init))?;
    let sym = cg.symbols.get_mut(sid);
    sym.ty = pinned;
    sym.defined = true;
    let irident = sym.irident.clone();
    cg.module.append(Decl::Var(Var::new(irident, data)));
    Ok(())
}

/// A declaration statement inside a function body: typedefs or local
/// variables.
pub fn cgen_local_decl(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    stmt: &DeclStmt,
) -> CgResult<()> {
    trace!("cgen_local_decl");
    let out = cgen_dspecs(cg, pcx, &stmt.specs, DeclCtx::empty())?;

    if stmt.decls.is_empty() {
        if !out.flags.intersects(DspecFlags::IDENT | DspecFlags::DEFINED) {
            cg.diags
                .warn(stmt.semi.span.clone(), "Useless type in empty declaration.");
        }
        return Ok(());
    }

    for idecl in &stmt.decls {
        let (ty, ident) = cgen_declarator(cg, pcx, &out.ty, &idecl.decl, DeclCtx::empty())?;
        let Some(ident) = ident else {
            if !out.flags.intersects(DspecFlags::IDENT | DspecFlags::DEFINED) {
                cg.diags
                    .warn(stmt.semi.span.clone(), "Useless type in empty declaration.");
            }
            continue;
        };

        if out.sc == Sc::Typedef {
            if idecl.init.is_some() {
                return cg.error(ident.span.clone(), "Typedef with an initializer.");
            }
            register_typedef(cg, &ident, ty)?;
            continue;
        }

        if let CType::Func(_) = ty {
            return cg.error(
                ident.span.clone(),
                "Nested function declarations are not supported.",
            );
        }
        if !ty.is_complete(&cg.records, &cg.enums) {
            let message = format!("Variable '{}' has incomplete type.", ident.text);
            return cg.error(ident.span.clone(), message);
        }
        if cg.scopes.lookup_outer(&ident.text).is_some() {
            let message = format!(
                "Declaration of '{}' shadows a wider-scope declaration.",
                ident.text
            );
            cg.diags.warn(ident.span.clone(), message);
        }

        mark_enum_named(cg, &ty);
        let vident = pcx.mangle_lvar(&ident.text);
        pcx.lvars.push(ProcVar::new(vident.clone(), cg.texpr(&ty)));
        let inserted = cg.scopes.insert(ScopeMember {
            ident: ident.clone(),
            ty: ty.clone(),
            used: false,
            kind: ScopeMemberKind::LocalVar {
                vident: vident.clone(),
            },
        });
        if inserted.is_err() {
            let message = format!("Redefinition of '{}'.", ident.text);
            return cg.error(ident.span.clone(), message);
        }

        if let Some(init) = &idecl.init {
            let Init::Expr(expr) = init else {
                return cg.error(
                    init.tfirst().span.clone(),
                    "Compound initializers are not supported for local variables.",
                );
            };
            let value = cgen_expr_rvalue(cg, pcx, block, expr)?;
            let value = convert_implicit(cg, pcx, block, value, &ty)?;
            let addr = pcx.new_vreg();
            block.append(mcc_ir::Instr::unary(
                mcc_ir::InstrKind::LVarPtr,
                mcc_types::PTR_WIDTH,
                mcc_ir::Oper::var(addr.clone()),
                mcc_ir::Oper::var(vident),
            ));
            emit_store(cg, block, &ty, &addr, &value);
        }
    }
    Ok(())
}
