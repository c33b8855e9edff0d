//! C type model, tag registries, and symbol tables for the mcc
//! compiler.
//!
//! Types are values: cloned freely, compared structurally. Struct,
//! union, and enum definitions live in per-compilation registries
//! (`RecordStore`, `EnumStore`) that own the storage; types refer to
//! them through stable index handles. Scopes, the symbol directory,
//! and the goto label table complete the environment the code
//! generator maintains.

pub mod ctype;
pub mod enums;
pub mod labels;
pub mod records;
pub mod scope;
pub mod symbols;

pub use ctype::{
    ArrayType, CType, CTypeDisplay, CallConv, Elmtype, FuncType, IntRank, Incompatible,
    ENUM_WIDTH, LOGIC_WIDTH, PTR_WIDTH,
};
pub use enums::{DuplicateEnumElem, EnumDef, EnumElem, EnumId, EnumStore};
pub use labels::{LabelEntry, LabelTable};
pub use records::{DuplicateElem, RecordDef, RecordElem, RecordId, RecordKind, RecordStore};
pub use scope::{
    AlreadyExists, ScopeFrame, ScopeMember, ScopeMemberKind, Scopes, TagMember, TagMemberKind,
};
pub use symbols::{SymKind, Symbol, SymbolId, SymbolStore};
