//! Declaration specifiers, declarators, and initializers.
//!
//! These follow C grammar shapes: a declaration is a specifier sequence
//! followed by a list of init-declarators; an abstract type name (for
//! casts and `sizeof`) is a specifier sequence plus an abstract
//! declarator.

use crate::expr::Expr;
use crate::token::Token;

/// Storage-class specifiers.
///
/// Only `typedef` changes code generation; the others are recognized so
/// the specifier checker can reject or ignore them in one place.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StorageClass {
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

/// Type qualifiers. Parsed and order-checked, otherwise ignored.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeQual {
    Const,
    Volatile,
    Restrict,
}

/// `struct` or `union`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RecordKw {
    Struct,
    Union,
}

/// One member declaration inside a struct/union definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemberDecl {
    pub specs: DeclSpecs,
    pub declarators: Vec<Declarator>,
    pub semi: Token,
}

/// A struct/union specifier: reference, forward declaration, or
/// definition (when `members` is present).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RecordSpec {
    pub kw: Token,
    pub kind: RecordKw,
    pub ident: Option<Token>,
    pub members: Option<Vec<MemberDecl>>,
    pub rbrace: Option<Token>,
}

/// One enumerator, with an optional explicit value expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumElemDecl {
    pub ident: Token,
    pub value: Option<Expr>,
}

/// An enum specifier: reference or definition (when `elems` is present).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumSpec {
    pub kw: Token,
    pub ident: Option<Token>,
    pub elems: Option<Vec<EnumElemDecl>>,
    pub rbrace: Option<Token>,
}

/// Type specifiers.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeSpec {
    Void(Token),
    Char(Token),
    Short(Token),
    Int(Token),
    Long(Token),
    Signed(Token),
    Unsigned(Token),
    /// A typedef name.
    TypeName(Token),
    Record(RecordSpec),
    Enum(EnumSpec),
}

impl TypeSpec {
    /// First token of the specifier.
    pub fn tfirst(&self) -> &Token {
        match self {
            TypeSpec::Void(t)
            | TypeSpec::Char(t)
            | TypeSpec::Short(t)
            | TypeSpec::Int(t)
            | TypeSpec::Long(t)
            | TypeSpec::Signed(t)
            | TypeSpec::Unsigned(t)
            | TypeSpec::TypeName(t) => t,
            TypeSpec::Record(r) => &r.kw,
            TypeSpec::Enum(e) => &e.kw,
        }
    }
}

/// One declaration specifier, in source order.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Dspec {
    Storage(StorageClass, Token),
    Qual(TypeQual, Token),
    /// `inline`.
    FuncSpec(Token),
    /// Attribute such as `usr`; the token is the attribute name.
    Attr(Token),
    TypeSpec(TypeSpec),
}

impl Dspec {
    /// First token of the specifier.
    pub fn tfirst(&self) -> &Token {
        match self {
            Dspec::Storage(_, t) | Dspec::Qual(_, t) | Dspec::FuncSpec(t) | Dspec::Attr(t) => t,
            Dspec::TypeSpec(ts) => ts.tfirst(),
        }
    }
}

/// Declaration specifier sequence, in source order.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclSpecs {
    pub specs: Vec<Dspec>,
}

impl DeclSpecs {
    pub fn new(specs: Vec<Dspec>) -> Self {
        DeclSpecs { specs }
    }

    /// First token, if any specifier is present.
    pub fn tfirst(&self) -> Option<&Token> {
        self.specs.first().map(Dspec::tfirst)
    }
}

/// One parameter declaration in a function declarator.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParamDecl {
    pub specs: DeclSpecs,
    pub decl: Declarator,
}

/// A declarator, composed outside-in onto the specifier base type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Declarator {
    /// Named declarator leaf.
    Ident(Token),
    /// Abstract declarator leaf (no identifier).
    Anon,
    /// `* inner`.
    Ptr(PtrDecl),
    /// `inner [size?]`.
    Array(ArrayDecl),
    /// `inner (params)`.
    Fun(FunDecl),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PtrDecl {
    pub tok: Token,
    pub inner: Box<Declarator>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayDecl {
    pub inner: Box<Declarator>,
    pub lbracket: Token,
    pub size: Option<Expr>,
    pub rbracket: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunDecl {
    pub inner: Box<Declarator>,
    pub lparen: Token,
    pub params: Vec<ParamDecl>,
    pub rparen: Token,
}

impl Declarator {
    /// The declared identifier, if the declarator names one.
    pub fn ident(&self) -> Option<&Token> {
        match self {
            Declarator::Ident(t) => Some(t),
            Declarator::Anon => None,
            Declarator::Ptr(d) => d.inner.ident(),
            Declarator::Array(d) => d.inner.ident(),
            Declarator::Fun(d) => d.inner.ident(),
        }
    }

    /// Whether this is the bare anonymous leaf (an empty declarator).
    pub fn is_bare_anon(&self) -> bool {
        matches!(self, Declarator::Anon)
    }
}

/// An abstract type name, as written in casts and `sizeof`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeName {
    pub specs: DeclSpecs,
    pub decl: Box<Declarator>,
}

/// An initializer: a single expression or a braced list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Init {
    Expr(Expr),
    List(InitList),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InitList {
    pub lbrace: Token,
    pub inits: Vec<Init>,
    pub rbrace: Token,
}

impl Init {
    /// First token of the initializer.
    pub fn tfirst(&self) -> &Token {
        match self {
            Init::Expr(e) => e.tfirst(),
            Init::List(l) => &l.lbrace,
        }
    }

    /// Last token of the initializer.
    pub fn tlast(&self) -> &Token {
        match self {
            Init::Expr(e) => e.tlast(),
            Init::List(l) => &l.rbrace,
        }
    }
}

/// Declarator plus optional initializer.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InitDecl {
    pub decl: Declarator,
    pub init: Option<Init>,
}
