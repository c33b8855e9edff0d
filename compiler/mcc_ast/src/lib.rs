//! AST and token definitions for the mcc compiler.
//!
//! The upstream lexer and parser produce these types; the code
//! generator consumes them. Leaf tokens keep their spelling and source
//! range, which is all the later phases ever need: ranges feed
//! diagnostics, and spellings are re-read only for identifiers and
//! literals.

pub mod decl;
pub mod expr;
pub mod module;
pub mod span;
pub mod stmt;
pub mod token;

pub use decl::{
    ArrayDecl, DeclSpecs, Declarator, Dspec, EnumElemDecl, EnumSpec, FunDecl, Init, InitDecl,
    InitList, MemberDecl, ParamDecl, PtrDecl, RecordKw, RecordSpec, StorageClass, TypeName,
    TypeQual, TypeSpec,
};
pub use expr::{
    AddrExpr, AssignExpr, AssignOp, BinOp, BinaryExpr, CallExpr, CastExpr, CommaExpr, DerefExpr,
    Expr, Fixity, IncDecExpr, IncDecOp, IndexExpr, MemberExpr, ParenExpr, SizeofArg, SizeofExpr,
    UnOp, UnaryExpr,
};
pub use module::{GlobalDecl, TranslationUnit};
pub use span::{SrcPos, SrcSpan};
pub use stmt::{
    Block, BreakStmt, CaseStmt, ContinueStmt, DeclStmt, DefaultStmt, DoStmt, ElseIf, ExprStmt,
    ForStmt, GotoStmt, IfStmt, LabelStmt, NullStmt, ReturnStmt, Stmt, SwitchStmt, WhileStmt,
};
pub use token::Token;
