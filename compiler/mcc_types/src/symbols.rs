//! The module-level symbol directory.
//!
//! A flat table of top-level symbols keyed by C identifier. Each entry
//! records whether the symbol was defined or merely declared; the
//! module driver uses that at close to synthesize declarations for
//! everything referenced but not defined locally.

use mcc_ast::Token;
use rustc_hash::FxHashMap;

use crate::ctype::CType;
use crate::scope::AlreadyExists;

/// Stable handle of a symbol.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Symbol kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymKind {
    Var,
    Func,
}

/// One top-level symbol.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Symbol {
    /// The declaring token (first declaration wins).
    pub ident: Token,
    pub kind: SymKind,
    pub ty: CType,
    /// Set by a definition; clear for forward declarations.
    pub defined: bool,
    /// IR-level name (`@<ident>`).
    pub irident: String,
}

/// Directory of every top-level symbol in one module.
#[derive(Clone, Debug, Default)]
pub struct SymbolStore {
    syms: Vec<Symbol>,
    by_name: FxHashMap<String, SymbolId>,
}

#[cold]
#[inline(never)]
fn panic_bad_handle(index: usize, len: usize) -> ! {
    panic!("symbol handle {index} out of range (directory has {len} entries)")
}

impl SymbolStore {
    pub fn new() -> Self {
        SymbolStore::default()
    }

    /// Insert a new symbol; the identifier must be unique.
    pub fn insert(
        &mut self,
        ident: Token,
        kind: SymKind,
        ty: CType,
    ) -> Result<SymbolId, AlreadyExists> {
        let name = ident.text.clone();
        if self.by_name.contains_key(&name) {
            return Err(AlreadyExists);
        }
        let id = SymbolId(self.syms.len() as u32);
        let irident = format!("@{name}");
        self.by_name.insert(name, id);
        self.syms.push(Symbol {
            ident,
            kind,
            ty,
            defined: false,
            irident,
        });
        Ok(id)
    }

    /// Look up a symbol by C identifier.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        match self.syms.get(id.index()) {
            Some(sym) => sym,
            None => panic_bad_handle(id.index(), self.syms.len()),
        }
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        let len = self.syms.len();
        match self.syms.get_mut(id.index()) {
            Some(sym) => sym,
            None => panic_bad_handle(id.index(), len),
        }
    }

    /// Iterate all symbols in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.syms
            .iter()
            .enumerate()
            .map(|(i, sym)| (SymbolId(i as u32), sym))
    }
}
