//! AST construction helpers for the unit tests.
//!
//! The parser is upstream of this crate, so tests build the trees the
//! parser would produce. Tokens are synthetic; diagnostics still
//! render, just without useful positions.

#![allow(dead_code)]

use mcc_ast::{
    ArrayDecl, AssignExpr, AssignOp, BinOp, BinaryExpr, Block, CaseStmt, DeclSpecs, DeclStmt,
    Declarator, DefaultStmt, Dspec, EnumElemDecl, EnumSpec, Expr, ExprStmt, FunDecl, GlobalDecl,
    Init, InitDecl, MemberDecl, MemberExpr, ParamDecl, PtrDecl, RecordKw, RecordSpec, ReturnStmt,
    Stmt, SwitchStmt, Token, TranslationUnit, TypeSpec, UnOp, UnaryExpr,
};
use mcc_ir::LabeledBlock;

use crate::context::{Cgen, ProcCtx};

pub(crate) fn tok(text: &str) -> Token {
    Token::synth(text)
}

// --- Expressions ---

pub(crate) fn int(value: i64) -> Expr {
    Expr::IntLit(tok(&value.to_string()))
}

pub(crate) fn ident(name: &str) -> Expr {
    Expr::Ident(tok(name))
}

pub(crate) fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        tok: tok("op"),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub(crate) fn un(op: UnOp, arg: Expr) -> Expr {
    Expr::Unary(UnaryExpr {
        op,
        tok: tok("op"),
        arg: Box::new(arg),
    })
}

pub(crate) fn assign(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Assign(AssignExpr {
        op: AssignOp::Plain,
        tok: tok("="),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub(crate) fn index(base: Expr, idx: Expr) -> Expr {
    Expr::Index(mcc_ast::IndexExpr {
        base: Box::new(base),
        lbracket: tok("["),
        index: Box::new(idx),
        rbracket: tok("]"),
    })
}

pub(crate) fn arrow(base: Expr, member: &str) -> Expr {
    Expr::Member(MemberExpr {
        base: Box::new(base),
        arrow: true,
        tok: tok("->"),
        member: tok(member),
    })
}

pub(crate) fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(mcc_ast::CallExpr {
        callee: Box::new(ident(name)),
        lparen: tok("("),
        args,
        rparen: tok(")"),
    })
}

// --- Declaration specifiers ---

pub(crate) fn specs(list: Vec<Dspec>) -> DeclSpecs {
    DeclSpecs::new(list)
}

pub(crate) fn ts_int() -> Dspec {
    Dspec::TypeSpec(TypeSpec::Int(tok("int")))
}

pub(crate) fn ts_char() -> Dspec {
    Dspec::TypeSpec(TypeSpec::Char(tok("char")))
}

pub(crate) fn ts_void() -> Dspec {
    Dspec::TypeSpec(TypeSpec::Void(tok("void")))
}

pub(crate) fn ts_unsigned() -> Dspec {
    Dspec::TypeSpec(TypeSpec::Unsigned(tok("unsigned")))
}

pub(crate) fn specs_int() -> DeclSpecs {
    specs(vec![ts_int()])
}

pub(crate) fn specs_void() -> DeclSpecs {
    specs(vec![ts_void()])
}

/// `struct <name> { <members> }` or a bare `struct <name>` reference.
pub(crate) fn record_spec(
    name: Option<&str>,
    members: Option<Vec<(DeclSpecs, Vec<Declarator>)>>,
) -> Dspec {
    let members = members.map(|list| {
        list.into_iter()
            .map(|(specs, declarators)| MemberDecl {
                specs,
                declarators,
                semi: tok(";"),
            })
            .collect()
    });
    let has_members = members.is_some();
    Dspec::TypeSpec(TypeSpec::Record(RecordSpec {
        kw: tok("struct"),
        kind: RecordKw::Struct,
        ident: name.map(tok),
        members,
        rbrace: has_members.then(|| tok("}")),
    }))
}

/// `enum <name> { a = v, b, … }` or a bare `enum <name>` reference.
pub(crate) fn enum_spec(name: Option<&str>, elems: Option<Vec<(&str, Option<Expr>)>>) -> Dspec {
    let elems = elems.map(|list| {
        list.into_iter()
            .map(|(elem_name, value)| EnumElemDecl {
                ident: tok(elem_name),
                value,
            })
            .collect()
    });
    let has_elems = elems.is_some();
    Dspec::TypeSpec(TypeSpec::Enum(EnumSpec {
        kw: tok("enum"),
        ident: name.map(tok),
        elems,
        rbrace: has_elems.then(|| tok("}")),
    }))
}

// --- Declarators ---

pub(crate) fn d_ident(name: &str) -> Declarator {
    Declarator::Ident(tok(name))
}

pub(crate) fn d_ptr(inner: Declarator) -> Declarator {
    Declarator::Ptr(PtrDecl {
        tok: tok("*"),
        inner: Box::new(inner),
    })
}

pub(crate) fn d_array(inner: Declarator, size: Option<Expr>) -> Declarator {
    Declarator::Array(ArrayDecl {
        inner: Box::new(inner),
        lbracket: tok("["),
        size,
        rbracket: tok("]"),
    })
}

pub(crate) fn d_fun(inner: Declarator, params: Vec<ParamDecl>) -> Declarator {
    Declarator::Fun(FunDecl {
        inner: Box::new(inner),
        lparen: tok("("),
        params,
        rparen: tok(")"),
    })
}

pub(crate) fn param(specs: DeclSpecs, decl: Declarator) -> ParamDecl {
    ParamDecl { specs, decl }
}

/// `(void)` parameter list.
pub(crate) fn void_params() -> Vec<ParamDecl> {
    vec![param(specs_void(), Declarator::Anon)]
}

// --- Statements ---

pub(crate) fn block(stmts: Vec<Stmt>) -> Block {
    Block {
        lbrace: tok("{"),
        stmts,
        rbrace: tok("}"),
    }
}

pub(crate) fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt {
        expr,
        semi: tok(";"),
    })
}

pub(crate) fn ret(expr: Option<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt {
        tok: tok("return"),
        expr,
        semi: tok(";"),
    })
}

pub(crate) fn decl_stmt(specs: DeclSpecs, decls: Vec<InitDecl>) -> Stmt {
    Stmt::Decl(DeclStmt {
        specs,
        decls,
        semi: tok(";"),
    })
}

pub(crate) fn init_decl(decl: Declarator, init: Option<Init>) -> InitDecl {
    InitDecl { decl, init }
}

pub(crate) fn case(expr: Expr) -> Stmt {
    Stmt::Case(CaseStmt {
        tok: tok("case"),
        expr,
        colon: tok(":"),
    })
}

pub(crate) fn default() -> Stmt {
    Stmt::Default(DefaultStmt {
        tok: tok("default"),
        colon: tok(":"),
    })
}

pub(crate) fn switch(expr: Expr, body: Block) -> Stmt {
    Stmt::Switch(SwitchStmt {
        tok: tok("switch"),
        expr,
        body,
    })
}

// --- Top level ---

pub(crate) fn gdecl(specs: DeclSpecs, decls: Vec<InitDecl>) -> GlobalDecl {
    GlobalDecl {
        specs,
        decls,
        body: None,
        semi: Some(tok(";")),
    }
}

pub(crate) fn fundef(specs: DeclSpecs, decl: Declarator, body: Block) -> GlobalDecl {
    GlobalDecl {
        specs,
        decls: vec![init_decl(decl, None)],
        body: Some(body),
        semi: None,
    }
}

pub(crate) fn unit(decls: Vec<GlobalDecl>) -> TranslationUnit {
    TranslationUnit { decls }
}

// --- Harness ---

/// Fresh context, scratch procedure state, and an empty block.
pub(crate) fn harness() -> (Cgen, ProcCtx, LabeledBlock) {
    (Cgen::new("test"), ProcCtx::scratch(), LabeledBlock::new())
}
