//! Enum registry.
//!
//! One `EnumStore` per compilation owns every enum definition. The
//! registry remembers each enum's *next implicit value*, used when
//! successive enumerators omit `=`.

use std::fmt;

use rustc_hash::FxHashMap;

/// Stable handle of an enum definition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumId(u32);

impl EnumId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One enumerator, in declaration order.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumElem {
    pub name: String,
    pub value: i64,
}

/// An enum definition, possibly incomplete.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumDef {
    /// Synthesized IR-level tag identifier.
    pub irident: String,
    /// The C tag, when the enum has one.
    pub cident: Option<String>,
    pub elems: Vec<EnumElem>,
    /// Whether the enumerator list has been filled in.
    pub defined: bool,
    /// Whether the enum is effectively named: it has a tag, or a
    /// typedef or variable declaration gave the anonymous tag a name.
    /// Strict-enum diagnostics apply only to named enums.
    pub named: bool,
    /// Value assigned to the next enumerator that omits `=`.
    pub next_value: i64,
}

impl EnumDef {
    /// Find an enumerator by name.
    pub fn find_elem(&self, name: &str) -> Option<(usize, &EnumElem)> {
        self.elems
            .iter()
            .enumerate()
            .find(|(_, e)| e.name == name)
    }

    /// Whether strict-enum checking applies.
    pub fn is_strict(&self) -> bool {
        self.named
    }
}

/// An enumerator with this name already exists.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DuplicateEnumElem;

impl fmt::Display for DuplicateEnumElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("duplicate enumerator name")
    }
}

impl std::error::Error for DuplicateEnumElem {}

/// Registry of every enum in one compilation.
#[derive(Clone, Debug, Default)]
pub struct EnumStore {
    defs: Vec<EnumDef>,
    by_irident: FxHashMap<String, EnumId>,
}

#[cold]
#[inline(never)]
fn panic_bad_handle(index: usize, len: usize) -> ! {
    panic!("enum handle {index} out of range (registry has {len} entries)")
}

impl EnumStore {
    pub fn new() -> Self {
        EnumStore::default()
    }

    /// Create a new, initially undefined enum.
    pub fn create(&mut self, cident: Option<String>, irident: String) -> EnumId {
        let id = EnumId(self.defs.len() as u32);
        let named = cident.is_some();
        self.by_irident.insert(irident.clone(), id);
        self.defs.push(EnumDef {
            irident,
            cident,
            elems: Vec::new(),
            defined: false,
            named,
            next_value: 0,
        });
        id
    }

    pub fn get(&self, id: EnumId) -> &EnumDef {
        match self.defs.get(id.index()) {
            Some(def) => def,
            None => panic_bad_handle(id.index(), self.defs.len()),
        }
    }

    pub fn get_mut(&mut self, id: EnumId) -> &mut EnumDef {
        let len = self.defs.len();
        match self.defs.get_mut(id.index()) {
            Some(def) => def,
            None => panic_bad_handle(id.index(), len),
        }
    }

    /// Append an enumerator with an explicit value; advances the
    /// implicit counter past it.
    pub fn append_elem(
        &mut self,
        id: EnumId,
        name: String,
        value: i64,
    ) -> Result<usize, DuplicateEnumElem> {
        let def = self.get_mut(id);
        if def.elems.iter().any(|e| e.name == name) {
            return Err(DuplicateEnumElem);
        }
        def.elems.push(EnumElem { name, value });
        def.next_value = value.wrapping_add(1);
        Ok(def.elems.len() - 1)
    }

    /// Iterate all definitions in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (EnumId, &EnumDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (EnumId(i as u32), def))
    }
}
