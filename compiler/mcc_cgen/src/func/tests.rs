use super::*;
use mcc_ast::{Dspec, Stmt};
use mcc_ir::InstrKind;
use pretty_assertions::assert_eq;

use crate::context::Cgen;
use crate::testutil::{
    block, d_array, d_fun, d_ident, expr_stmt, fundef, harness, ident, int, param, ret, specs,
    specs_int, specs_void, tok, ts_int, unit, void_params,
};

fn compile_unit(decls: Vec<mcc_ast::GlobalDecl>) -> Cgen {
    let (mut cg, _, _) = harness();
    crate::module::cgen_module(&mut cg, &unit(decls));
    cg
}

#[test]
fn simple_definition_emits_a_procedure() {
    let cg = compile_unit(vec![fundef(
        specs_int(),
        d_fun(d_ident("main"), void_params()),
        block(vec![ret(Some(int(0)))]),
    )]);
    assert!(!cg.diags.has_errors());
    let Some(proc) = cg.module.find_proc("@main") else {
        panic!("proc emitted");
    };
    assert!(!proc.is_extern());
    assert_eq!(proc.rtype, Some(mcc_ir::TypeExpr::Int(16)));
    let Some(body) = &proc.body else {
        panic!("body present");
    };
    let kinds: Vec<_> = body.instrs().map(|i| i.kind).collect();
    // imm, retv, then the trailing ret that keeps control from
    // falling off the end.
    assert_eq!(
        kinds,
        vec![InstrKind::Imm, InstrKind::RetV, InstrKind::Ret]
    );
}

#[test]
fn unused_parameter_warns() {
    let cg = compile_unit(vec![fundef(
        specs_void(),
        d_fun(d_ident("f"), vec![param(specs_int(), d_ident("x"))]),
        block(vec![]),
    )]);
    assert!(!cg.diags.has_errors());
    assert_eq!(cg.diags.messages(), vec!["Unused parameter 'x'."]);
}

#[test]
fn used_parameter_does_not_warn() {
    let cg = compile_unit(vec![fundef(
        specs_int(),
        d_fun(d_ident("f"), vec![param(specs_int(), d_ident("x"))]),
        block(vec![ret(Some(ident("x")))]),
    )]);
    assert!(!cg.diags.has_errors());
    assert_eq!(cg.diags.warning_count(), 0);
}

#[test]
fn array_parameter_is_passed_as_pointer() {
    let cg = compile_unit(vec![fundef(
        specs_void(),
        d_fun(
            d_ident("f"),
            vec![param(specs_int(), d_array(d_ident("a"), Some(int(4))))],
        ),
        block(vec![expr_stmt(crate::testutil::assign(
            crate::testutil::index(ident("a"), int(0)),
            int(1),
        ))]),
    )]);
    assert!(!cg.diags.has_errors());
    let Some(proc) = cg.module.find_proc("@f") else {
        panic!("proc emitted");
    };
    assert_eq!(proc.args.len(), 1);
    assert_eq!(proc.args[0].texpr, mcc_ir::TypeExpr::Ptr(16));
}

#[test]
fn redefinition_is_an_error() {
    let make = || {
        fundef(
            specs_int(),
            d_fun(d_ident("f"), void_params()),
            block(vec![ret(Some(int(0)))]),
        )
    };
    let cg = compile_unit(vec![make(), make()]);
    assert!(cg.diags.has_errors());
    assert!(cg.diags.messages().contains(&"Redefinition of 'f'."));
}

#[test]
fn declaration_then_definition_composes() {
    let decl = crate::testutil::gdecl(
        specs_int(),
        vec![crate::testutil::init_decl(
            d_fun(d_ident("f"), void_params()),
            None,
        )],
    );
    let def = fundef(
        specs_int(),
        d_fun(d_ident("f"), void_params()),
        block(vec![ret(Some(int(1)))]),
    );
    let cg = compile_unit(vec![decl, def]);
    assert!(!cg.diags.has_errors());
    assert_eq!(cg.diags.warning_count(), 0);
    // One defined proc, no extern duplicate at close.
    let count = cg
        .module
        .decls
        .iter()
        .filter(|d| matches!(d, mcc_ir::Decl::Proc(_)))
        .count();
    assert_eq!(count, 1);
}

#[test]
fn function_returning_array_is_an_error() {
    // int f(void)[3] cannot be written in C, but the declarator shape
    // can: array of function is rejected through the return check.
    let cg = compile_unit(vec![fundef(
        specs_int(),
        d_fun(d_array(d_ident("f"), Some(int(3))), void_params()),
        block(vec![]),
    )]);
    assert!(cg.diags.has_errors());
}

#[test]
fn usr_attribute_sets_the_calling_convention() {
    let cg = compile_unit(vec![fundef(
        specs(vec![Dspec::Attr(tok("usr")), ts_int()]),
        d_fun(d_ident("svc"), void_params()),
        block(vec![ret(Some(int(0)))]),
    )]);
    assert!(!cg.diags.has_errors());
    let Some(proc) = cg.module.find_proc("@svc") else {
        panic!("proc emitted");
    };
    assert_eq!(proc.attrs.as_slice(), &[mcc_ir::ProcAttr::Usr]);
}

#[test]
fn usr_with_parameters_is_an_error() {
    let cg = compile_unit(vec![fundef(
        specs(vec![Dspec::Attr(tok("usr")), ts_int()]),
        d_fun(d_ident("svc"), vec![param(specs_int(), d_ident("x"))]),
        block(vec![]),
    )]);
    assert!(cg.diags.has_errors());
    assert!(cg
        .diags
        .messages()
        .contains(&"User service routine cannot have parameters."));
}

#[test]
fn undefined_label_is_an_error_unused_label_warns() {
    let body = block(vec![
        Stmt::Goto(mcc_ast::GotoStmt {
            tok: tok("goto"),
            label: tok("missing"),
            semi: tok(";"),
        }),
        Stmt::Label(mcc_ast::LabelStmt {
            label: tok("orphan"),
            colon: tok(":"),
        }),
    ]);
    let cg = compile_unit(vec![fundef(
        specs_void(),
        d_fun(d_ident("f"), void_params()),
        body,
    )]);
    assert!(cg.diags.has_errors());
    assert!(cg.diags.messages().contains(&"Undefined label 'missing'."));
    assert!(cg.diags.messages().contains(&"Unused label 'orphan'."));
}

#[test]
fn goto_jumps_to_the_reserved_label() {
    let body = block(vec![
        Stmt::Label(mcc_ast::LabelStmt {
            label: tok("again"),
            colon: tok(":"),
        }),
        Stmt::Goto(mcc_ast::GotoStmt {
            tok: tok("goto"),
            label: tok("again"),
            semi: tok(";"),
        }),
    ]);
    let cg = compile_unit(vec![fundef(
        specs_void(),
        d_fun(d_ident("f"), void_params()),
        body,
    )]);
    assert!(!cg.diags.has_errors());
    let Some(proc) = cg.module.find_proc("@f") else {
        panic!("proc emitted");
    };
    let Some(body) = &proc.body else {
        panic!("body present");
    };
    assert!(body.labels().any(|l| l == "%_again"));
}
