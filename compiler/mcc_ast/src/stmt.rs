//! Statement and block nodes.

use crate::decl::{DeclSpecs, InitDecl};
use crate::expr::Expr;
use crate::token::Token;

/// A braced block of statements.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Block {
    pub lbrace: Token,
    pub stmts: Vec<Stmt>,
    pub rbrace: Token,
}

/// One `else if` arm.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ElseIf {
    pub tok: Token,
    pub cond: Expr,
    pub body: Block,
}

/// A statement.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stmt {
    /// Expression statement `e;`.
    Expr(ExprStmt),
    /// Declaration statement (local variables or typedefs).
    Decl(DeclStmt),
    /// Nested block.
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Do(DoStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    /// `case e:` — valid only inside a switch body.
    Case(CaseStmt),
    /// `default:` — valid only inside a switch body.
    Default(DefaultStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Goto(GotoStmt),
    Return(ReturnStmt),
    /// `label:`.
    Label(LabelStmt),
    /// `;`.
    Null(NullStmt),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExprStmt {
    pub expr: Expr,
    pub semi: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclStmt {
    pub specs: DeclSpecs,
    pub decls: Vec<InitDecl>,
    pub semi: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IfStmt {
    pub tok: Token,
    pub cond: Expr,
    pub then: Block,
    pub elseifs: Vec<ElseIf>,
    pub else_body: Option<Block>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct WhileStmt {
    pub tok: Token,
    pub cond: Expr,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DoStmt {
    pub tok: Token,
    pub body: Block,
    pub while_tok: Token,
    pub cond: Expr,
    pub semi: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ForStmt {
    pub tok: Token,
    pub init: Option<Expr>,
    pub cond: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SwitchStmt {
    pub tok: Token,
    pub expr: Expr,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CaseStmt {
    pub tok: Token,
    pub expr: Expr,
    pub colon: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DefaultStmt {
    pub tok: Token,
    pub colon: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BreakStmt {
    pub tok: Token,
    pub semi: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ContinueStmt {
    pub tok: Token,
    pub semi: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GotoStmt {
    pub tok: Token,
    pub label: Token,
    pub semi: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ReturnStmt {
    pub tok: Token,
    pub expr: Option<Expr>,
    pub semi: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LabelStmt {
    pub label: Token,
    pub colon: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NullStmt {
    pub semi: Token,
}
