//! The C type model.
//!
//! A [`CType`] is a value: it is cloned into expression results, symbol
//! table entries, and IR type expressions. Record and enum variants
//! carry non-owning handles into the registries, which outlive every
//! type for the whole compilation.
//!
//! Widths are fixed (not a target parameter): char 8, short/int/logic
//! 16, long 32, long long 64, pointer 16, enum 16.

use std::fmt;

use smallvec::SmallVec;

use crate::enums::{EnumId, EnumStore};
use crate::records::{RecordId, RecordKind, RecordStore};

/// Pointer width in bits.
pub const PTR_WIDTH: u32 = 16;

/// Enum width in bits.
pub const ENUM_WIDTH: u32 = 16;

/// Truth-value width in bits.
pub const LOGIC_WIDTH: u32 = 16;

/// Elementary types.
///
/// `Logic` is the internal truth-value type produced by relational,
/// equality, and logical operators; it is never user-nameable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Elmtype {
    Void,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Logic,
}

/// Integer conversion rank, ordered.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum IntRank {
    Char,
    Short,
    Int,
    Long,
    LongLong,
}

impl Elmtype {
    /// Width in bits; 0 for `void`.
    pub fn width(self) -> u32 {
        match self {
            Elmtype::Void => 0,
            Elmtype::Char | Elmtype::UChar => 8,
            Elmtype::Short | Elmtype::UShort | Elmtype::Int | Elmtype::UInt | Elmtype::Logic => 16,
            Elmtype::Long | Elmtype::ULong => 32,
            Elmtype::LongLong | Elmtype::ULongLong => 64,
        }
    }

    /// Whether the type is signed. `Logic` counts as unsigned.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Elmtype::Char | Elmtype::Short | Elmtype::Int | Elmtype::Long | Elmtype::LongLong
        )
    }

    /// Integer conversion rank; `None` for `void` and `logic`.
    pub fn rank(self) -> Option<IntRank> {
        match self {
            Elmtype::Void | Elmtype::Logic => None,
            Elmtype::Char | Elmtype::UChar => Some(IntRank::Char),
            Elmtype::Short | Elmtype::UShort => Some(IntRank::Short),
            Elmtype::Int | Elmtype::UInt => Some(IntRank::Int),
            Elmtype::Long | Elmtype::ULong => Some(IntRank::Long),
            Elmtype::LongLong | Elmtype::ULongLong => Some(IntRank::LongLong),
        }
    }

    /// Whether this is an integer type (`logic` and `void` are not).
    pub fn is_integer(self) -> bool {
        self.rank().is_some()
    }

    /// The integer elementary type with the given signedness and rank.
    pub fn int_by(signed: bool, rank: IntRank) -> Elmtype {
        match (signed, rank) {
            (true, IntRank::Char) => Elmtype::Char,
            (false, IntRank::Char) => Elmtype::UChar,
            (true, IntRank::Short) => Elmtype::Short,
            (false, IntRank::Short) => Elmtype::UShort,
            (true, IntRank::Int) => Elmtype::Int,
            (false, IntRank::Int) => Elmtype::UInt,
            (true, IntRank::Long) => Elmtype::Long,
            (false, IntRank::Long) => Elmtype::ULong,
            (true, IntRank::LongLong) => Elmtype::LongLong,
            (false, IntRank::LongLong) => Elmtype::ULongLong,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Elmtype::Void => "void",
            Elmtype::Char => "char",
            Elmtype::UChar => "unsigned char",
            Elmtype::Short => "short",
            Elmtype::UShort => "unsigned short",
            Elmtype::Int => "int",
            Elmtype::UInt => "unsigned int",
            Elmtype::Long => "long",
            Elmtype::ULong => "unsigned long",
            Elmtype::LongLong => "long long",
            Elmtype::ULongLong => "unsigned long long",
            Elmtype::Logic => "logic",
        }
    }
}

/// Calling conventions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CallConv {
    #[default]
    Normal,
    /// User service routine (`usr` attribute).
    Usr,
}

/// A function type: return type, parameter list, calling convention.
///
/// `params == None` is an unspecified parameter list (`f()`), which
/// composes with any specified one. An empty `Some` is `f(void)`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FuncType {
    pub ret: Box<CType>,
    pub params: Option<SmallVec<[CType; 4]>>,
    pub cconv: CallConv,
}

/// Array type: element type and optional known length.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayType {
    pub elem: Box<CType>,
    /// `None` represents `T[]` until an initializer pins the length.
    pub size: Option<u64>,
}

/// A C type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CType {
    Basic(Elmtype),
    Pointer(Box<CType>),
    Array(ArrayType),
    Record(RecordId),
    Enum(EnumId),
    Func(Box<FuncType>),
}

/// Two declarations of one entity disagree in a way that is not merely
/// "one is less specific".
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Incompatible;

impl fmt::Display for Incompatible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("incompatible type declarations")
    }
}

impl std::error::Error for Incompatible {}

impl CType {
    /// `int`, the default and most common type.
    pub fn int() -> CType {
        CType::Basic(Elmtype::Int)
    }

    /// The internal truth-value type.
    pub fn logic() -> CType {
        CType::Basic(Elmtype::Logic)
    }

    /// Pointer to the given type.
    pub fn pointer(target: CType) -> CType {
        CType::Pointer(Box::new(target))
    }

    /// Array of the given element type.
    pub fn array(elem: CType, size: Option<u64>) -> CType {
        CType::Array(ArrayType {
            elem: Box::new(elem),
            size,
        })
    }

    /// The elementary type, when this is a basic type.
    pub fn elmtype(&self) -> Option<Elmtype> {
        match self {
            CType::Basic(e) => Some(*e),
            _ => None,
        }
    }

    /// Whether this is an integer type (enums and `logic` are not).
    pub fn is_integer(&self) -> bool {
        matches!(self, CType::Basic(e) if e.is_integer())
    }

    /// Whether this is the truth-value type.
    pub fn is_logic(&self) -> bool {
        matches!(self, CType::Basic(Elmtype::Logic))
    }

    /// Whether this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, CType::Basic(Elmtype::Void))
    }

    /// Whether the type is complete: its size is known.
    pub fn is_complete(&self, records: &RecordStore, enums: &EnumStore) -> bool {
        match self {
            CType::Basic(e) => *e != Elmtype::Void,
            CType::Pointer(_) | CType::Func(_) => true,
            CType::Array(a) => a.size.is_some() && a.elem.is_complete(records, enums),
            CType::Record(rid) => records.get(*rid).defined,
            CType::Enum(eid) => enums.get(*eid).defined,
        }
    }

    /// Size of the type in bytes; `None` when the type is incomplete
    /// or has no size (void, function).
    pub fn sized(&self, records: &RecordStore) -> Option<u64> {
        match self {
            CType::Basic(Elmtype::Void) => None,
            CType::Basic(e) => Some(u64::from(e.width() / 8)),
            CType::Pointer(_) => Some(u64::from(PTR_WIDTH / 8)),
            CType::Enum(_) => Some(u64::from(ENUM_WIDTH / 8)),
            CType::Array(a) => {
                let elem = a.elem.sized(records)?;
                Some(elem * a.size?)
            }
            CType::Record(rid) => {
                let def = records.get(*rid);
                if !def.defined {
                    return None;
                }
                let mut total: u64 = 0;
                for elem in &def.elems {
                    let sz = elem.ty.sized(records)?;
                    match def.kind {
                        RecordKind::Struct => total += sz,
                        RecordKind::Union => total = total.max(sz),
                    }
                }
                Some(total)
            }
            CType::Func(_) => None,
        }
    }

    /// Width in bits of a scalar value of this type; pointer width for
    /// pointers and arrays (which are handled by address).
    pub fn scalar_width(&self) -> u32 {
        match self {
            CType::Basic(e) => e.width(),
            CType::Pointer(_) | CType::Array(_) | CType::Record(_) | CType::Func(_) => PTR_WIDTH,
            CType::Enum(_) => ENUM_WIDTH,
        }
    }

    /// Compose two declarations of the same entity into one type that
    /// preserves the more complete information.
    pub fn compose(&self, other: &CType) -> Result<CType, Incompatible> {
        match (self, other) {
            (CType::Basic(a), CType::Basic(b)) if a == b => Ok(CType::Basic(*a)),
            (CType::Pointer(a), CType::Pointer(b)) => Ok(CType::pointer(a.compose(b)?)),
            (CType::Array(a), CType::Array(b)) => {
                let elem = a.elem.compose(&b.elem)?;
                let size = match (a.size, b.size) {
                    (None, s) | (s, None) => s,
                    (Some(x), Some(y)) if x == y => Some(x),
                    (Some(_), Some(_)) => return Err(Incompatible),
                };
                Ok(CType::array(elem, size))
            }
            (CType::Record(a), CType::Record(b)) if a == b => Ok(CType::Record(*a)),
            (CType::Enum(a), CType::Enum(b)) if a == b => Ok(CType::Enum(*a)),
            (CType::Func(a), CType::Func(b)) => {
                if a.cconv != b.cconv {
                    return Err(Incompatible);
                }
                let ret = a.ret.compose(&b.ret)?;
                let params = match (&a.params, &b.params) {
                    (None, p) | (p, None) => p.clone(),
                    (Some(x), Some(y)) => {
                        if x.len() != y.len() {
                            return Err(Incompatible);
                        }
                        let mut composed = SmallVec::with_capacity(x.len());
                        for (px, py) in x.iter().zip(y.iter()) {
                            composed.push(px.compose(py)?);
                        }
                        Some(composed)
                    }
                };
                Ok(CType::Func(Box::new(FuncType {
                    ret: Box::new(ret),
                    params,
                    cconv: a.cconv,
                })))
            }
            _ => Err(Incompatible),
        }
    }

    /// Pointer-target compatibility. The model carries no qualifiers,
    /// so this is structural equality with unspecified parameter lists
    /// matching specified ones.
    pub fn compatible(&self, other: &CType) -> bool {
        match (self, other) {
            (CType::Func(a), CType::Func(b)) => {
                a.cconv == b.cconv
                    && a.ret.compatible(&b.ret)
                    && match (&a.params, &b.params) {
                        (None, _) | (_, None) => true,
                        (Some(x), Some(y)) => {
                            x.len() == y.len()
                                && x.iter().zip(y.iter()).all(|(px, py)| px.compatible(py))
                        }
                    }
            }
            (CType::Pointer(a), CType::Pointer(b)) => a.compatible(b),
            (CType::Array(a), CType::Array(b)) => {
                a.elem.compatible(&b.elem)
                    && match (a.size, b.size) {
                        (Some(x), Some(y)) => x == y,
                        _ => true,
                    }
            }
            _ => self == other,
        }
    }

    /// Human-readable form for diagnostics.
    pub fn display<'a>(
        &'a self,
        records: &'a RecordStore,
        enums: &'a EnumStore,
    ) -> CTypeDisplay<'a> {
        CTypeDisplay {
            ty: self,
            records,
            enums,
        }
    }
}

/// Display adapter; tag names come from the registries.
pub struct CTypeDisplay<'a> {
    ty: &'a CType,
    records: &'a RecordStore,
    enums: &'a EnumStore,
}

impl<'a> CTypeDisplay<'a> {
    fn sub(&self, ty: &'a CType) -> CTypeDisplay<'a> {
        CTypeDisplay {
            ty,
            records: self.records,
            enums: self.enums,
        }
    }
}

impl fmt::Display for CTypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            CType::Basic(e) => f.write_str(e.name()),
            CType::Pointer(target) => write!(f, "{} *", self.sub(target)),
            CType::Array(a) => match a.size {
                Some(n) => write!(f, "{} [{n}]", self.sub(&a.elem)),
                None => write!(f, "{} []", self.sub(&a.elem)),
            },
            CType::Record(rid) => {
                let def = self.records.get(*rid);
                let kw = match def.kind {
                    RecordKind::Struct => "struct",
                    RecordKind::Union => "union",
                };
                match &def.cident {
                    Some(name) => write!(f, "{kw} {name}"),
                    None => write!(f, "{kw} <anonymous>"),
                }
            }
            CType::Enum(eid) => {
                let def = self.enums.get(*eid);
                match &def.cident {
                    Some(name) => write!(f, "enum {name}"),
                    None => f.write_str("enum <anonymous>"),
                }
            }
            CType::Func(func) => {
                write!(f, "{} (", self.sub(&func.ret))?;
                match &func.params {
                    None => {}
                    Some(params) if params.is_empty() => f.write_str("void")?,
                    Some(params) => {
                        for (i, p) in params.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{}", self.sub(p))?;
                        }
                    }
                }
                f.write_str(")")
            }
        }
    }
}
