//! Expression nodes.
//!
//! Every node can produce its first and last token; the code generator
//! uses those for diagnostic ranges and never stores positions itself.

use crate::decl::TypeName;
use crate::span::SrcSpan;
use crate::token::Token;

/// Binary operators (excluding assignment and comma, which have their
/// own node kinds).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    BitAnd,
    BitXor,
    BitOr,
    LogAnd,
    LogOr,
}

/// Assignment operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Plain,
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    BitAnd,
    BitXor,
    BitOr,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, if any.
    pub fn binop(self) -> Option<BinOp> {
        match self {
            AssignOp::Plain => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Shl => Some(BinOp::Shl),
            AssignOp::Shr => Some(BinOp::Shr),
            AssignOp::BitAnd => Some(BinOp::BitAnd),
            AssignOp::BitXor => Some(BinOp::BitXor),
            AssignOp::BitOr => Some(BinOp::BitOr),
        }
    }
}

/// Unary prefix operators other than `*` and `&`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnOp {
    Plus,
    Minus,
    LogNot,
    BitNot,
}

/// Increment or decrement.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IncDecOp {
    Inc,
    Dec,
}

/// Prefix or postfix placement of `++`/`--`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Fixity {
    Pre,
    Post,
}

/// An expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Expr {
    /// Integer literal (decimal, octal, or hex, with optional suffixes).
    IntLit(Token),
    /// Character literal, narrow or wide (`L'…'`).
    CharLit(Token),
    /// String literal, narrow or wide (`L"…"`).
    StrLit(Token),
    /// Plain identifier.
    Ident(Token),
    /// Parenthesized expression.
    Paren(ParenExpr),
    /// Binary operator application.
    Binary(BinaryExpr),
    /// Comma operator.
    Comma(CommaExpr),
    /// Assignment (plain or compound).
    Assign(AssignExpr),
    /// Unary `+`, `-`, `!`, `~`.
    Unary(UnaryExpr),
    /// Pointer dereference `*e`.
    Deref(DerefExpr),
    /// Address-of `&e`.
    Addr(AddrExpr),
    /// Array subscript `a[b]`.
    Index(IndexExpr),
    /// Member access `e.m` or `e->m`.
    Member(MemberExpr),
    /// Function call.
    Call(CallExpr),
    /// Cast `(T)e`.
    Cast(CastExpr),
    /// `sizeof(T)` or `sizeof e`.
    Sizeof(SizeofExpr),
    /// `++e`, `--e`, `e++`, `e--`.
    IncDec(IncDecExpr),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParenExpr {
    pub lparen: Token,
    pub inner: Box<Expr>,
    pub rparen: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BinaryExpr {
    pub op: BinOp,
    /// The operator token.
    pub tok: Token,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CommaExpr {
    pub tok: Token,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AssignExpr {
    pub op: AssignOp,
    pub tok: Token,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub tok: Token,
    pub arg: Box<Expr>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DerefExpr {
    pub tok: Token,
    pub arg: Box<Expr>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AddrExpr {
    pub tok: Token,
    pub arg: Box<Expr>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub lbracket: Token,
    pub index: Box<Expr>,
    pub rbracket: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemberExpr {
    pub base: Box<Expr>,
    /// True for `->`, false for `.`.
    pub arrow: bool,
    /// The `.` or `->` token.
    pub tok: Token,
    pub member: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub lparen: Token,
    pub args: Vec<Expr>,
    pub rparen: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CastExpr {
    pub lparen: Token,
    pub tname: TypeName,
    pub rparen: Token,
    pub arg: Box<Expr>,
}

/// The operand of `sizeof`.
///
/// The parser cannot always distinguish `sizeof (T)` from
/// `sizeof (expr)`; a parenthesized lone identifier arrives as an
/// expression and the code generator disambiguates via typedef lookup.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SizeofArg {
    Type {
        lparen: Token,
        tname: TypeName,
        rparen: Token,
    },
    Expr(Box<Expr>),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SizeofExpr {
    pub tok: Token,
    pub arg: SizeofArg,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IncDecExpr {
    pub op: IncDecOp,
    pub fixity: Fixity,
    pub tok: Token,
    pub arg: Box<Expr>,
}

impl Expr {
    /// First token of the expression.
    pub fn tfirst(&self) -> &Token {
        match self {
            Expr::IntLit(t) | Expr::CharLit(t) | Expr::StrLit(t) | Expr::Ident(t) => t,
            Expr::Paren(e) => &e.lparen,
            Expr::Binary(e) => e.lhs.tfirst(),
            Expr::Comma(e) => e.lhs.tfirst(),
            Expr::Assign(e) => e.lhs.tfirst(),
            Expr::Unary(e) => &e.tok,
            Expr::Deref(e) => &e.tok,
            Expr::Addr(e) => &e.tok,
            Expr::Index(e) => e.base.tfirst(),
            Expr::Member(e) => e.base.tfirst(),
            Expr::Call(e) => e.callee.tfirst(),
            Expr::Cast(e) => &e.lparen,
            Expr::Sizeof(e) => &e.tok,
            Expr::IncDec(e) => match e.fixity {
                Fixity::Pre => &e.tok,
                Fixity::Post => e.arg.tfirst(),
            },
        }
    }

    /// Last token of the expression.
    pub fn tlast(&self) -> &Token {
        match self {
            Expr::IntLit(t) | Expr::CharLit(t) | Expr::StrLit(t) | Expr::Ident(t) => t,
            Expr::Paren(e) => &e.rparen,
            Expr::Binary(e) => e.rhs.tlast(),
            Expr::Comma(e) => e.rhs.tlast(),
            Expr::Assign(e) => e.rhs.tlast(),
            Expr::Unary(e) => e.arg.tlast(),
            Expr::Deref(e) => e.arg.tlast(),
            Expr::Addr(e) => e.arg.tlast(),
            Expr::Index(e) => &e.rbracket,
            Expr::Member(e) => &e.member,
            Expr::Call(e) => &e.rparen,
            Expr::Cast(e) => e.arg.tlast(),
            Expr::Sizeof(e) => match &e.arg {
                SizeofArg::Type { rparen, .. } => rparen,
                SizeofArg::Expr(arg) => arg.tlast(),
            },
            Expr::IncDec(e) => match e.fixity {
                Fixity::Pre => e.arg.tlast(),
                Fixity::Post => &e.tok,
            },
        }
    }

    /// Source range from the first to the last token.
    pub fn span(&self) -> SrcSpan {
        self.tfirst().span.merge(&self.tlast().span)
    }
}
