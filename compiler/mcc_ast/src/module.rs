//! Translation-unit nodes.

use crate::decl::{DeclSpecs, InitDecl};
use crate::stmt::Block;
use crate::token::Token;

/// One top-level declaration: specifiers, init-declarators, and an
/// optional function body.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GlobalDecl {
    pub specs: DeclSpecs,
    pub decls: Vec<InitDecl>,
    pub body: Option<Block>,
    /// Terminating `;` for non-definitions.
    pub semi: Option<Token>,
}

/// A parsed translation unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TranslationUnit {
    pub decls: Vec<GlobalDecl>,
}
