//! Declaration specifier processing.
//!
//! Verifies specifier order against the canonical one, enforces the
//! modifier counts, processes struct/union/enum specifiers (including
//! definitions), and produces the storage class, the base type, and
//! the flags the no-declarator check needs.

use bitflags::bitflags;
use mcc_ast::{DeclSpecs, Dspec, EnumSpec, RecordKw, RecordSpec, StorageClass, Token, TypeSpec};
use mcc_types::{
    CType, Elmtype, EnumId, IntRank, RecordId, RecordKind, ScopeMember, ScopeMemberKind,
    TagMember, TagMemberKind,
};
use tracing::trace;

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::expr::cgen_const_int;
use crate::lit::mask_to;

bitflags! {
    /// What a specifier sequence introduced.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct DspecFlags: u32 {
        /// A new record/enum tag identifier was introduced.
        const IDENT = 1 << 0;
        /// A record/enum was defined.
        const DEFINED = 1 << 1;
    }
}

bitflags! {
    /// Where a declaration appears; some tag diagnostics depend on it.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct DeclCtx: u32 {
        /// Inside a struct/union definition.
        const IN_RECORD = 1 << 0;
        /// Inside a function declarator's parameter list.
        const IN_PARAMS = 1 << 1;
    }
}

/// Storage classes the code generator acts on.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Sc {
    None,
    Typedef,
}

/// Outcome of specifier processing.
#[derive(Clone, Debug)]
pub struct DspecOut {
    pub sc: Sc,
    pub ty: CType,
    pub flags: DspecFlags,
    /// The `usr` attribute was present.
    pub usr: bool,
}

/// Order class of a specifier within the canonical sequence.
fn order_class(spec: &Dspec) -> u32 {
    match spec {
        Dspec::Storage(..) => 0,
        Dspec::Qual(..) => 1,
        Dspec::FuncSpec(_) => 2,
        Dspec::Attr(_) => 3,
        Dspec::TypeSpec(_) => 4,
    }
}

/// Process a declaration specifier sequence.
pub fn cgen_dspecs(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    specs: &DeclSpecs,
    dctx: DeclCtx,
) -> CgResult<DspecOut> {
    trace!("cgen_dspecs");
    let mut sc = Sc::None;
    let mut usr = false;
    let mut flags = DspecFlags::empty();

    let mut short_c = 0u32;
    let mut long_c = 0u32;
    let mut signed_c = 0u32;
    let mut unsigned_c = 0u32;
    let mut int_c = 0u32;
    let mut base: Option<CType> = None;
    let mut base_tok: Option<&Token> = None;
    let mut max_class = 0u32;

    for spec in &specs.specs {
        let class = order_class(spec);
        if class < max_class {
            let message = format!(
                "'{}' should come earlier in declaration specifiers.",
                spec.tfirst().text
            );
            cg.diags.warn(spec.tfirst().span.clone(), message);
        }
        max_class = max_class.max(class);

        match spec {
            Dspec::Storage(StorageClass::Typedef, _) => sc = Sc::Typedef,
            Dspec::Storage(_, tok) => {
                return cg.error(tok.span.clone(), "Storage class not implemented.");
            }
            Dspec::Qual(..) | Dspec::FuncSpec(_) => {}
            Dspec::Attr(tok) => {
                if tok.text == "usr" {
                    usr = true;
                } else {
                    let message = format!("Unknown attribute '{}'.", tok.text);
                    cg.diags.warn(tok.span.clone(), message);
                }
            }
            Dspec::TypeSpec(ts) => match ts {
                TypeSpec::Short(tok) => {
                    short_c += 1;
                    if short_c > 1 {
                        return cg.error(tok.span.clone(), "Multiple 'short' specifiers.");
                    }
                    if long_c > 0 {
                        return cg.error(
                            tok.span.clone(),
                            "Both 'short' and 'long' in declaration specifiers.",
                        );
                    }
                }
                TypeSpec::Long(tok) => {
                    long_c += 1;
                    if long_c > 2 {
                        return cg.error(tok.span.clone(), "More than two 'long' specifiers.");
                    }
                    if short_c > 0 {
                        return cg.error(
                            tok.span.clone(),
                            "Both 'short' and 'long' in declaration specifiers.",
                        );
                    }
                }
                TypeSpec::Signed(tok) => {
                    signed_c += 1;
                    if signed_c > 1 {
                        return cg.error(tok.span.clone(), "Multiple 'signed' specifiers.");
                    }
                    if unsigned_c > 0 {
                        return cg.error(
                            tok.span.clone(),
                            "Both 'signed' and 'unsigned' in declaration specifiers.",
                        );
                    }
                }
                TypeSpec::Unsigned(tok) => {
                    unsigned_c += 1;
                    if unsigned_c > 1 {
                        return cg.error(tok.span.clone(), "Multiple 'unsigned' specifiers.");
                    }
                    if signed_c > 0 {
                        return cg.error(
                            tok.span.clone(),
                            "Both 'signed' and 'unsigned' in declaration specifiers.",
                        );
                    }
                }
                TypeSpec::Char(tok) => {
                    if base.is_some() || int_c > 0 {
                        return cg.error(tok.span.clone(), "Multiple type specifiers.");
                    }
                    if short_c > 0 {
                        return cg.error(
                            tok.span.clone(),
                            "Both 'char' and 'short' in declaration specifiers.",
                        );
                    }
                    if long_c > 0 {
                        return cg.error(
                            tok.span.clone(),
                            "Both 'char' and 'long' in declaration specifiers.",
                        );
                    }
                    base = Some(CType::Basic(Elmtype::Char));
                    base_tok = Some(tok);
                }
                TypeSpec::Int(tok) => {
                    // `int` combines with short/long/signed/unsigned.
                    if base.is_some() || int_c > 0 {
                        return cg.error(tok.span.clone(), "Multiple type specifiers.");
                    }
                    int_c += 1;
                }
                TypeSpec::Void(tok) => {
                    if base.is_some() || int_c > 0 {
                        return cg.error(tok.span.clone(), "Multiple type specifiers.");
                    }
                    base = Some(CType::Basic(Elmtype::Void));
                    base_tok = Some(tok);
                }
                TypeSpec::TypeName(tok) => {
                    if base.is_some() || int_c > 0 {
                        return cg.error(tok.span.clone(), "Multiple type specifiers.");
                    }
                    let ty = match cg.scopes.lookup_mut(&tok.text) {
                        Some(member) if matches!(member.kind, ScopeMemberKind::Typedef) => {
                            member.used = true;
                            member.ty.clone()
                        }
                        _ => {
                            let message = format!("Undeclared type name '{}'.", tok.text);
                            return cg.error(tok.span.clone(), message);
                        }
                    };
                    base = Some(ty);
                    base_tok = Some(tok);
                }
                TypeSpec::Record(rspec) => {
                    if base.is_some() || int_c > 0 {
                        return cg.error(rspec.kw.span.clone(), "Multiple type specifiers.");
                    }
                    let (rid, rflags) = cgen_record_spec(cg, pcx, rspec, dctx)?;
                    flags |= rflags;
                    base = Some(CType::Record(rid));
                    base_tok = Some(&rspec.kw);
                }
                TypeSpec::Enum(espec) => {
                    if base.is_some() || int_c > 0 {
                        return cg.error(espec.kw.span.clone(), "Multiple type specifiers.");
                    }
                    let (eid, eflags) = cgen_enum_spec(cg, pcx, espec, dctx)?;
                    flags |= eflags;
                    base = Some(CType::Enum(eid));
                    base_tok = Some(&espec.kw);
                }
            },
        }
    }

    // Sign and width modifiers only combine with integer bases.
    let width_mods = short_c + long_c > 0;
    let sign_mods = signed_c + unsigned_c > 0;
    let ty = match base {
        // Width modifiers with char were diagnosed at the specifier.
        Some(CType::Basic(Elmtype::Char)) => CType::Basic(if unsigned_c > 0 {
            Elmtype::UChar
        } else {
            Elmtype::Char
        }),
        Some(other) => {
            if width_mods || sign_mods {
                let span = base_tok.map_or_else(mcc_ast::SrcSpan::synth, |t| t.span.clone());
                return cg.error(span, "Invalid type specifier combination.");
            }
            other
        }
        None => {
            let rank = if short_c > 0 {
                IntRank::Short
            } else if long_c == 1 {
                IntRank::Long
            } else if long_c == 2 {
                IntRank::LongLong
            } else {
                IntRank::Int
            };
            CType::Basic(Elmtype::int_by(unsigned_c == 0, rank))
        }
    };

    Ok(DspecOut { sc, ty, flags, usr })
}

/// Process a struct/union specifier: reference, forward declaration,
/// or definition.
fn cgen_record_spec(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    rspec: &RecordSpec,
    dctx: DeclCtx,
) -> CgResult<(RecordId, DspecFlags)> {
    let kind = match rspec.kind {
        RecordKw::Struct => RecordKind::Struct,
        RecordKw::Union => RecordKind::Union,
    };

    let mut flags = DspecFlags::empty();
    let rid = if let Some(ident) = &rspec.ident {
        let existing = if rspec.members.is_some() {
            cg.scopes.lookup_tag_local(&ident.text)
        } else {
            cg.scopes.lookup_tag(&ident.text)
        };
        match existing {
            Some(TagMember {
                kind: TagMemberKind::Record { rid, kind: k },
                ..
            }) => {
                if *k != kind {
                    let message =
                        format!("'{}' redefined as a different kind of tag.", ident.text);
                    return cg.error(ident.span.clone(), message);
                }
                *rid
            }
            Some(_) => {
                let message = format!("'{}' redefined as a different kind of tag.", ident.text);
                return cg.error(ident.span.clone(), message);
            }
            None => {
                flags |= DspecFlags::IDENT;
                new_record_tag(cg, kind, ident)?
            }
        }
    } else {
        // Anonymous record.
        flags |= DspecFlags::IDENT;
        let irident = cg.anon_irident();
        cg.records.create(kind, None, irident)
    };

    if let Some(members) = &rspec.members {
        flags |= DspecFlags::DEFINED;
        define_record(cg, pcx, rspec, rid, members, dctx)?;
    }

    Ok((rid, flags))
}

/// Create a new named record tag in the current scope.
fn new_record_tag(cg: &mut Cgen, kind: RecordKind, ident: &Token) -> CgResult<RecordId> {
    warn_local_tag(cg, ident);
    let irident = format!("@@{}", ident.text);
    let irident = if cg.records.find_by_irident(&irident).is_some() {
        cg.anon_irident()
    } else {
        irident
    };
    let rid = cg.records.create(kind, Some(ident.text.clone()), irident);
    let inserted = cg.scopes.insert_tag(TagMember {
        ident: ident.clone(),
        kind: TagMemberKind::Record { rid, kind },
    });
    if inserted.is_err() {
        let message = format!("Redefinition of '{}'.", ident.text);
        return cg.error(ident.span.clone(), message);
    }
    Ok(rid)
}

/// Non-global tag declarations warn, twice when they shadow.
fn warn_local_tag(cg: &mut Cgen, ident: &Token) {
    if cg.scopes.is_global() {
        return;
    }
    let message = format!("Tag '{}' declared in a non-global scope.", ident.text);
    cg.diags.warn(ident.span.clone(), message);
    if cg.scopes.lookup_tag_outer(&ident.text).is_some() {
        let message = format!("Tag '{}' shadows a wider-scope declaration.", ident.text);
        cg.diags.warn(ident.span.clone(), message);
    }
}

/// Fill in a record definition's member list.
fn define_record(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    rspec: &RecordSpec,
    rid: RecordId,
    members: &[mcc_ast::MemberDecl],
    dctx: DeclCtx,
) -> CgResult<()> {
    {
        let def = cg.records.get(rid);
        if def.defined || def.being_defined {
            let span = rspec
                .ident
                .as_ref()
                .map_or_else(|| rspec.kw.span.clone(), |t| t.span.clone());
            let shown = rspec.ident.as_ref().map_or("<anonymous>", |t| &t.text);
            let message = format!("Redefinition of '{shown}'.");
            return cg.error(span, message);
        }
    }
    if dctx.contains(DeclCtx::IN_RECORD) {
        cg.diags.warn(
            rspec.kw.span.clone(),
            "Struct/union defined inside another struct/union.",
        );
    }
    if dctx.contains(DeclCtx::IN_PARAMS) {
        cg.diags.warn(
            rspec.kw.span.clone(),
            "Struct/union/enum defined inside a parameter list.",
        );
    }

    cg.records.get_mut(rid).being_defined = true;
    let result = define_record_members(cg, pcx, rid, members, dctx);
    let def = cg.records.get_mut(rid);
    def.being_defined = false;
    if result.is_ok() {
        def.defined = true;
        emit_ir_record(cg, rid);
    }
    result
}

fn define_record_members(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    rid: RecordId,
    members: &[mcc_ast::MemberDecl],
    dctx: DeclCtx,
) -> CgResult<()> {
    for member in members {
        let out = cgen_dspecs(cg, pcx, &member.specs, dctx | DeclCtx::IN_RECORD)?;
        for declarator in &member.declarators {
            let (ty, ident) =
                crate::decl::cgen_declarator(cg, pcx, &out.ty, declarator, dctx)?;
            let Some(ident) = ident else {
                cg.diags.warn(
                    member.semi.span.clone(),
                    "Useless type in empty declaration.",
                );
                continue;
            };
            if !ty.is_complete(&cg.records, &cg.enums) {
                let message = format!("Member '{}' has incomplete type.", ident.text);
                return cg.error(ident.span.clone(), message);
            }
            if cg
                .records
                .append_elem(rid, ident.text.clone(), ty)
                .is_err()
            {
                let message = format!("Duplicate member '{}'.", ident.text);
                return cg.error(ident.span.clone(), message);
            }
        }
    }
    Ok(())
}

/// A completed record definition is also declared at the IR level so
/// `recmbr`/`reccopy` type expressions resolve within the module.
fn emit_ir_record(cg: &mut Cgen, rid: RecordId) {
    let def = cg.records.get(rid);
    let mut record = mcc_ir::Record::new(def.irident.clone(), def.kind == RecordKind::Union);
    let elems: Vec<(String, CType)> = def
        .elems
        .iter()
        .map(|e| (e.name.clone(), e.ty.clone()))
        .collect();
    for (name, ty) in elems {
        record.append(name, cg.texpr(&ty));
    }
    cg.module.append(mcc_ir::Decl::Record(record));
}

/// Process an enum specifier: reference or definition.
fn cgen_enum_spec(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    espec: &EnumSpec,
    dctx: DeclCtx,
) -> CgResult<(EnumId, DspecFlags)> {
    let mut flags = DspecFlags::empty();
    let eid = if let Some(ident) = &espec.ident {
        let existing = if espec.elems.is_some() {
            cg.scopes.lookup_tag_local(&ident.text)
        } else {
            cg.scopes.lookup_tag(&ident.text)
        };
        match existing {
            Some(TagMember {
                kind: TagMemberKind::Enum { eid },
                ..
            }) => *eid,
            Some(_) => {
                let message = format!("'{}' redefined as a different kind of tag.", ident.text);
                return cg.error(ident.span.clone(), message);
            }
            None => {
                flags |= DspecFlags::IDENT;
                warn_local_tag(cg, ident);
                let irident = format!("@@{}", ident.text);
                let eid = cg.enums.create(Some(ident.text.clone()), irident);
                let inserted = cg.scopes.insert_tag(TagMember {
                    ident: ident.clone(),
                    kind: TagMemberKind::Enum { eid },
                });
                if inserted.is_err() {
                    let message = format!("Redefinition of '{}'.", ident.text);
                    return cg.error(ident.span.clone(), message);
                }
                eid
            }
        }
    } else {
        flags |= DspecFlags::IDENT;
        let irident = cg.anon_irident();
        cg.enums.create(None, irident)
    };

    if let Some(elems) = &espec.elems {
        flags |= DspecFlags::DEFINED;
        if dctx.contains(DeclCtx::IN_PARAMS) {
            cg.diags.warn(
                espec.kw.span.clone(),
                "Struct/union/enum defined inside a parameter list.",
            );
        }
        define_enum(cg, pcx, espec, eid, elems)?;
    }

    Ok((eid, flags))
}

/// Fill in an enum definition's enumerator list and declare the
/// enumerators in the current scope.
fn define_enum(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    espec: &EnumSpec,
    eid: EnumId,
    elems: &[mcc_ast::EnumElemDecl],
) -> CgResult<()> {
    if cg.enums.get(eid).defined {
        let span = espec
            .ident
            .as_ref()
            .map_or_else(|| espec.kw.span.clone(), |t| t.span.clone());
        let shown = espec.ident.as_ref().map_or("<anonymous>", |t| &t.text);
        let message = format!("Redefinition of '{shown}'.");
        return cg.error(span, message);
    }
    if elems.is_empty() {
        return cg.error(espec.kw.span.clone(), "Empty enum definition.");
    }

    for elem in elems {
        let value = match &elem.value {
            Some(expr) => cgen_const_int(cg, pcx, expr)?.0,
            None => cg.enums.get(eid).next_value,
        };
        if mask_to(value, Elmtype::Int) != value {
            cg.diags
                .warn(elem.ident.span.clone(), "Number is too large for its type.");
        }
        let index = match cg.enums.append_elem(eid, elem.ident.text.clone(), value) {
            Ok(index) => index,
            Err(_) => {
                let message = format!("Duplicate member '{}'.", elem.ident.text);
                return cg.error(elem.ident.span.clone(), message);
            }
        };
        let inserted = cg.scopes.insert(ScopeMember {
            ident: elem.ident.clone(),
            ty: CType::Enum(eid),
            used: false,
            kind: ScopeMemberKind::EnumElem { eid, index },
        });
        if inserted.is_err() {
            let message = format!("Redefinition of '{}'.", elem.ident.text);
            return cg.error(elem.ident.span.clone(), message);
        }
    }
    cg.enums.get_mut(eid).defined = true;
    Ok(())
}
