//! Struct and union registry.
//!
//! One `RecordStore` per compilation owns every struct/union
//! definition, keyed by a synthesized IR-level tag identifier. Types
//! refer to entries through [`RecordId`] handles that stay stable for
//! the whole compilation.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::ctype::CType;

/// Stable handle of a record definition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RecordId(u32);

impl RecordId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// `struct` or `union`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RecordKind {
    Struct,
    Union,
}

/// One record member, in declaration order.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RecordElem {
    pub name: String,
    pub ty: CType,
}

/// A struct/union definition, possibly incomplete.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RecordDef {
    /// Synthesized IR-level tag identifier (`@@S`, `@@anon3`).
    pub irident: String,
    /// The C tag, when the record has one.
    pub cident: Option<String>,
    pub kind: RecordKind,
    pub elems: Vec<RecordElem>,
    /// Whether the member list has been filled in.
    pub defined: bool,
    /// Set while the definition's members are being processed, to
    /// detect nested redefinition.
    pub being_defined: bool,
}

impl RecordDef {
    /// Find a member by name.
    pub fn find_elem(&self, name: &str) -> Option<(usize, &RecordElem)> {
        self.elems
            .iter()
            .enumerate()
            .find(|(_, e)| e.name == name)
    }
}

/// A member with this name already exists.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DuplicateElem;

impl fmt::Display for DuplicateElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("duplicate element name")
    }
}

impl std::error::Error for DuplicateElem {}

/// Registry of every struct/union in one compilation.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    defs: Vec<RecordDef>,
    by_irident: FxHashMap<String, RecordId>,
}

#[cold]
#[inline(never)]
fn panic_bad_handle(index: usize, len: usize) -> ! {
    panic!("record handle {index} out of range (registry has {len} entries)")
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore::default()
    }

    /// Create a new, initially undefined record.
    pub fn create(
        &mut self,
        kind: RecordKind,
        cident: Option<String>,
        irident: String,
    ) -> RecordId {
        let id = RecordId(self.defs.len() as u32);
        self.by_irident.insert(irident.clone(), id);
        self.defs.push(RecordDef {
            irident,
            cident,
            kind,
            elems: Vec::new(),
            defined: false,
            being_defined: false,
        });
        id
    }

    pub fn get(&self, id: RecordId) -> &RecordDef {
        match self.defs.get(id.index()) {
            Some(def) => def,
            None => panic_bad_handle(id.index(), self.defs.len()),
        }
    }

    pub fn get_mut(&mut self, id: RecordId) -> &mut RecordDef {
        let len = self.defs.len();
        match self.defs.get_mut(id.index()) {
            Some(def) => def,
            None => panic_bad_handle(id.index(), len),
        }
    }

    /// Look up a record by its IR tag identifier.
    pub fn find_by_irident(&self, irident: &str) -> Option<RecordId> {
        self.by_irident.get(irident).copied()
    }

    /// Append a member to a definition in progress.
    pub fn append_elem(
        &mut self,
        id: RecordId,
        name: String,
        ty: CType,
    ) -> Result<(), DuplicateElem> {
        let def = self.get_mut(id);
        if def.elems.iter().any(|e| e.name == name) {
            return Err(DuplicateElem);
        }
        def.elems.push(RecordElem { name, ty });
        Ok(())
    }

    /// Byte offset of the member at `index`: the sum of the sizes of
    /// the preceding elements for a struct, 0 for a union. `None` when
    /// a preceding member's size is unknown.
    pub fn elem_offset(&self, id: RecordId, index: usize) -> Option<u64> {
        let def = self.get(id);
        match def.kind {
            RecordKind::Union => Some(0),
            RecordKind::Struct => {
                let mut offset = 0u64;
                for elem in def.elems.iter().take(index) {
                    offset += elem.ty.sized(self)?;
                }
                Some(offset)
            }
        }
    }

    /// Iterate all definitions in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &RecordDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (RecordId(i as u32), def))
    }
}

#[cfg(test)]
mod tests;
