//! Nested scopes.
//!
//! A scope holds two namespaces: ordinary identifiers (variables,
//! function names, typedefs, enum constants, function arguments) and
//! tags (struct/union/enum). Scopes form a stack from module scope
//! inward; lookups walk outward and an inner entry shadows any
//! outer-scope entry of the same name.

use std::fmt;

use mcc_ast::Token;
use rustc_hash::FxHashMap;

use crate::ctype::CType;
use crate::enums::EnumId;
use crate::records::{RecordId, RecordKind};
use crate::symbols::SymbolId;

/// Payload of an ordinary-identifier entry.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ScopeMemberKind {
    /// Module-level symbol (variable or function).
    GlobalSym(SymbolId),
    /// Function argument; carries the IR argument value name.
    Arg { vident: String },
    /// Local variable; carries the IR slot name.
    LocalVar { vident: String },
    Typedef,
    /// Enum constant; carries the owning enum and the element index.
    EnumElem { eid: EnumId, index: usize },
}

/// One ordinary-identifier entry.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ScopeMember {
    pub ident: Token,
    pub ty: CType,
    /// Referenced at least once; feeds the unused-identifier pass.
    pub used: bool,
    pub kind: ScopeMemberKind,
}

/// Payload of a tag-namespace entry.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum TagMemberKind {
    Record { rid: RecordId, kind: RecordKind },
    Enum { eid: EnumId },
}

/// One tag-namespace entry.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TagMember {
    pub ident: Token,
    pub kind: TagMemberKind,
}

/// The name already exists in the same namespace of the same scope.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct AlreadyExists;

impl fmt::Display for AlreadyExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("name already declared in this scope")
    }
}

impl std::error::Error for AlreadyExists {}

/// One scope frame: both namespaces, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct ScopeFrame {
    members: Vec<ScopeMember>,
    by_name: FxHashMap<String, usize>,
    tags: Vec<TagMember>,
    tags_by_name: FxHashMap<String, usize>,
}

impl ScopeFrame {
    /// Ordinary members in insertion order (for the unused pass).
    pub fn members(&self) -> &[ScopeMember] {
        &self.members
    }
}

#[cold]
#[inline(never)]
fn panic_module_scope_popped() -> ! {
    panic!("attempted to pop the module scope")
}

/// The scope stack. Created with the module scope already in place.
#[derive(Clone, Debug)]
pub struct Scopes {
    frames: Vec<ScopeFrame>,
}

impl Scopes {
    /// New stack holding only the module scope.
    pub fn new() -> Self {
        Scopes {
            frames: vec![ScopeFrame::default()],
        }
    }

    /// Enter a nested scope.
    pub fn push(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    /// Leave the innermost scope. The module scope cannot be popped.
    pub fn pop(&mut self) -> ScopeFrame {
        if self.frames.len() == 1 {
            panic_module_scope_popped();
        }
        // Length checked above.
        self.frames.pop().unwrap_or_default()
    }

    /// Whether the innermost scope is the module scope.
    pub fn is_global(&self) -> bool {
        self.frames.len() == 1
    }

    /// Number of open scopes including the module scope.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The innermost frame.
    pub fn current(&self) -> &ScopeFrame {
        // A frame always exists; the module scope cannot be popped.
        match self.frames.last() {
            Some(frame) => frame,
            None => panic_module_scope_popped(),
        }
    }

    /// Insert an ordinary identifier into the innermost scope.
    pub fn insert(&mut self, member: ScopeMember) -> Result<(), AlreadyExists> {
        let frame = match self.frames.last_mut() {
            Some(frame) => frame,
            None => panic_module_scope_popped(),
        };
        let name = member.ident.text.clone();
        if frame.by_name.contains_key(&name) {
            return Err(AlreadyExists);
        }
        frame.by_name.insert(name, frame.members.len());
        frame.members.push(member);
        Ok(())
    }

    /// Insert a tag into the innermost scope.
    pub fn insert_tag(&mut self, tag: TagMember) -> Result<(), AlreadyExists> {
        let frame = match self.frames.last_mut() {
            Some(frame) => frame,
            None => panic_module_scope_popped(),
        };
        let name = tag.ident.text.clone();
        if frame.tags_by_name.contains_key(&name) {
            return Err(AlreadyExists);
        }
        frame.tags_by_name.insert(name, frame.tags.len());
        frame.tags.push(tag);
        Ok(())
    }

    /// Look up an ordinary identifier, walking outward.
    pub fn lookup(&self, name: &str) -> Option<&ScopeMember> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.by_name.get(name).map(|&i| &f.members[i]))
    }

    /// Mutable lookup, walking outward (to mark the member used).
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut ScopeMember> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|f| f.by_name.get(name).copied().map(|i| &mut f.members[i]))
    }

    /// Look up an ordinary identifier in the innermost scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&ScopeMember> {
        let frame = self.current();
        frame.by_name.get(name).map(|&i| &frame.members[i])
    }

    /// Look up an ordinary identifier in the enclosing scopes only
    /// (everything but the innermost). Feeds shadowing diagnostics.
    pub fn lookup_outer(&self, name: &str) -> Option<&ScopeMember> {
        self.frames
            .iter()
            .rev()
            .skip(1)
            .find_map(|f| f.by_name.get(name).map(|&i| &f.members[i]))
    }

    /// Look up a tag, walking outward.
    pub fn lookup_tag(&self, name: &str) -> Option<&TagMember> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.tags_by_name.get(name).map(|&i| &f.tags[i]))
    }

    /// Look up a tag in the innermost scope only.
    pub fn lookup_tag_local(&self, name: &str) -> Option<&TagMember> {
        let frame = self.current();
        frame.tags_by_name.get(name).map(|&i| &frame.tags[i])
    }

    /// Look up a tag in the enclosing scopes only.
    pub fn lookup_tag_outer(&self, name: &str) -> Option<&TagMember> {
        self.frames
            .iter()
            .rev()
            .skip(1)
            .find_map(|f| f.tags_by_name.get(name).map(|&i| &f.tags[i]))
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Scopes::new()
    }
}
