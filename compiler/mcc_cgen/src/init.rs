//! Initializer processing.
//!
//! Global initializers are translation-time constants rendered into
//! data entries. Compound initializers accept both fully-bracketed and
//! flat forms (the latter with a warning); missing trailing elements
//! zero-fill; string literals initialize character (or, wide, integer)
//! arrays and can pin an unknown array size. The zero-image generator
//! here is also what the module driver uses at close.

use std::iter::Peekable;
use std::slice::Iter;

use mcc_ast::{Expr, Init, InitList, SrcSpan, Token};
use mcc_ir::{DataBlock, DataEntry, LabeledBlock};
use mcc_types::{ArrayType, CType, Elmtype, RecordKind, PTR_WIDTH};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::conv::convert_implicit;
use crate::expr::cgen_const_expr;
use crate::lit;

/// Build the data image for `T x = init` (or, with `init` absent, the
/// all-zero image). Returns the possibly-pinned type alongside.
pub fn cgen_init_data(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    ty: &CType,
    init: Option<&Init>,
) -> CgResult<(CType, DataBlock)> {
    let mut data = DataBlock::new();
    let mut flat_warned = false;
    let span = init.map_or_else(SrcSpan::synth, |i| i.tfirst().span.clone());
    let pinned = match init {
        None => {
            zero_fill(cg, ty, &mut data, &span)?;
            ty.clone()
        }
        Some(Init::Expr(expr)) => match ty {
            CType::Array(a) => {
                if let Expr::StrLit(tok) = expr {
                    fill_string(cg, a, tok, &mut data)?
                } else {
                    return cg.error(expr.span(), "Invalid initializer.");
                }
            }
            _ => {
                data.append(scalar_entry(cg, pcx, ty, expr)?);
                ty.clone()
            }
        },
        Some(Init::List(list)) => match ty {
            CType::Array(_) | CType::Record(_) => {
                fill_aggregate_list(cg, pcx, ty, list, &mut data, &mut flat_warned)?
            }
            _ => {
                cg.diags.warn(
                    list.lbrace.span.clone(),
                    "Excess braces around scalar initializer.",
                );
                if list.inits.len() > 1 {
                    return cg.error(
                        list.lbrace.span.clone(),
                        "Too many initializer elements.",
                    );
                }
                match list.inits.first() {
                    Some(Init::Expr(expr)) => {
                        data.append(scalar_entry(cg, pcx, ty, expr)?);
                    }
                    Some(Init::List(_)) => {
                        return cg
                            .error(list.lbrace.span.clone(), "Invalid initializer.");
                    }
                    None => zero_fill(cg, ty, &mut data, &span)?,
                }
                ty.clone()
            }
        },
    };
    Ok((pinned, data))
}

/// The all-zero image of a complete type (used for tentative
/// definitions at module close).
pub fn cgen_zero_image(cg: &mut Cgen, ty: &CType, span: &SrcSpan) -> CgResult<DataBlock> {
    let mut data = DataBlock::new();
    zero_fill(cg, ty, &mut data, span)?;
    Ok(data)
}

/// One constant scalar initializer entry.
fn scalar_entry(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    ty: &CType,
    expr: &Expr,
) -> CgResult<DataEntry> {
    let res = cgen_const_expr(cg, pcx, expr)?;
    let mut scratch = LabeledBlock::new();
    let res = convert_implicit(cg, pcx, &mut scratch, res, ty)?;
    let Some(konst) = res.konst else {
        return cg.error(res.span.clone(), "Constant expression required.");
    };
    Ok(match konst.base {
        Some(sid) => DataEntry::ptr(
            ty.scalar_width(),
            cg.symbols.get(sid).irident.clone(),
            konst.value,
        ),
        None => DataEntry::int(ty.scalar_width(), konst.value),
    })
}

/// Zero-fill one value of a complete type.
fn zero_fill(cg: &mut Cgen, ty: &CType, data: &mut DataBlock, span: &SrcSpan) -> CgResult<()> {
    match ty {
        CType::Basic(Elmtype::Void) | CType::Func(_) => {
            cg.error(span.clone(), "Invalid initializer.")
        }
        CType::Basic(e) => {
            data.append(DataEntry::int(e.width(), 0));
            Ok(())
        }
        CType::Pointer(_) => {
            data.append(DataEntry::int(PTR_WIDTH, 0));
            Ok(())
        }
        CType::Enum(_) => {
            data.append(DataEntry::int(mcc_types::ENUM_WIDTH, 0));
            Ok(())
        }
        CType::Array(a) => {
            let Some(size) = a.size else {
                return cg.error(span.clone(), "Array has unknown size.");
            };
            let elem = (*a.elem).clone();
            for _ in 0..size {
                zero_fill(cg, &elem, data, span)?;
            }
            Ok(())
        }
        CType::Record(rid) => {
            let def = cg.records.get(*rid);
            if !def.defined {
                return cg.error(span.clone(), "Initializer for an incomplete type.");
            }
            match def.kind {
                RecordKind::Struct => {
                    let elems: Vec<CType> = def.elems.iter().map(|e| e.ty.clone()).collect();
                    for elem in elems {
                        zero_fill(cg, &elem, data, span)?;
                    }
                    Ok(())
                }
                RecordKind::Union => {
                    let Some(size) = ty.sized(&cg.records) else {
                        return cg.error(span.clone(), "Initializer for an incomplete type.");
                    };
                    for _ in 0..size {
                        data.append(DataEntry::int(8, 0));
                    }
                    Ok(())
                }
            }
        }
    }
}

/// Fill an aggregate from its own braced list; leftover items are an
/// error.
fn fill_aggregate_list(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    ty: &CType,
    list: &InitList,
    data: &mut DataBlock,
    flat_warned: &mut bool,
) -> CgResult<CType> {
    let mut items = list.inits.iter().peekable();
    let pinned = fill_aggregate(
        cg,
        pcx,
        ty,
        &mut items,
        data,
        &list.lbrace.span,
        flat_warned,
    )?;
    if items.next().is_some() {
        return cg.error(list.lbrace.span.clone(), "Too many initializer elements.");
    }
    Ok(pinned)
}

/// Fill an aggregate, consuming items from the (possibly shared, when
/// flat) item stream. Walk order matches declaration order; unions
/// take only their first member; missing trailing items zero-fill.
fn fill_aggregate(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    ty: &CType,
    items: &mut Peekable<Iter<'_, Init>>,
    data: &mut DataBlock,
    span: &SrcSpan,
    flat_warned: &mut bool,
) -> CgResult<CType> {
    match ty {
        CType::Array(a) => {
            let elem = (*a.elem).clone();
            match a.size {
                Some(size) => {
                    for _ in 0..size {
                        fill_slot(cg, pcx, &elem, items, data, span, flat_warned)?;
                    }
                    Ok(ty.clone())
                }
                None => {
                    // The initializer pins the length.
                    let mut count = 0u64;
                    while items.peek().is_some() {
                        fill_slot(cg, pcx, &elem, items, data, span, flat_warned)?;
                        count += 1;
                    }
                    Ok(CType::array(elem, Some(count)))
                }
            }
        }
        CType::Record(rid) => {
            let def = cg.records.get(*rid);
            if !def.defined {
                return cg.error(span.clone(), "Initializer for an incomplete type.");
            }
            let kind = def.kind;
            let elems: Vec<CType> = def.elems.iter().map(|e| e.ty.clone()).collect();
            match kind {
                RecordKind::Struct => {
                    for elem in &elems {
                        fill_slot(cg, pcx, elem, items, data, span, flat_warned)?;
                    }
                }
                RecordKind::Union => {
                    // Only the first member is initialized; the image
                    // is padded to the union's full size.
                    let Some(total) = ty.sized(&cg.records) else {
                        return cg.error(span.clone(), "Initializer for an incomplete type.");
                    };
                    let first = match elems.first() {
                        Some(first) => first.clone(),
                        None => return Ok(ty.clone()),
                    };
                    let before = data_size_bytes(data);
                    fill_slot(cg, pcx, &first, items, data, span, flat_warned)?;
                    let written = data_size_bytes(data) - before;
                    for _ in written..total {
                        data.append(DataEntry::int(8, 0));
                    }
                }
            }
            Ok(ty.clone())
        }
        _ => {
            fill_slot(cg, pcx, ty, items, data, span, flat_warned)?;
            Ok(ty.clone())
        }
    }
}

fn data_size_bytes(data: &DataBlock) -> u64 {
    data.entries
        .iter()
        .map(|e| u64::from(e.width / 8))
        .sum()
}

/// Fill one slot of an aggregate from the item stream.
fn fill_slot(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    ty: &CType,
    items: &mut Peekable<Iter<'_, Init>>,
    data: &mut DataBlock,
    span: &SrcSpan,
    flat_warned: &mut bool,
) -> CgResult<()> {
    let aggregate = matches!(ty, CType::Array(_) | CType::Record(_));
    if aggregate {
        match items.peek() {
            Some(Init::List(_)) => {
                if let Some(Init::List(list)) = items.next() {
                    fill_aggregate_list(cg, pcx, ty, list, data, flat_warned)?;
                }
            }
            Some(Init::Expr(Expr::StrLit(_))) => {
                if let (CType::Array(a), Some(Init::Expr(Expr::StrLit(tok)))) = (ty, items.next())
                {
                    fill_string(cg, a, tok, data)?;
                }
            }
            Some(Init::Expr(_)) => {
                if !*flat_warned {
                    cg.diags
                        .warn(span.clone(), "Initializer is not fully bracketed.");
                    *flat_warned = true;
                }
                fill_aggregate(cg, pcx, ty, items, data, span, flat_warned)?;
            }
            None => zero_fill(cg, ty, data, span)?,
        }
        return Ok(());
    }

    match items.next() {
        Some(Init::Expr(expr)) => {
            data.append(scalar_entry(cg, pcx, ty, expr)?);
            Ok(())
        }
        Some(Init::List(list)) => {
            cg.diags.warn(
                list.lbrace.span.clone(),
                "Excess braces around scalar initializer.",
            );
            if list.inits.len() > 1 {
                return cg.error(list.lbrace.span.clone(), "Too many initializer elements.");
            }
            match list.inits.first() {
                Some(Init::Expr(expr)) => {
                    data.append(scalar_entry(cg, pcx, ty, expr)?);
                    Ok(())
                }
                Some(Init::List(_)) => {
                    cg.error(list.lbrace.span.clone(), "Invalid initializer.")
                }
                None => zero_fill(cg, ty, data, span),
            }
        }
        None => zero_fill(cg, ty, data, span),
    }
}

/// Initialize an array from a string literal.
fn fill_string(
    cg: &mut Cgen,
    a: &ArrayType,
    tok: &Token,
    data: &mut DataBlock,
) -> CgResult<CType> {
    let Some(parsed) = lit::parse_str(&tok.text) else {
        return cg.error(tok.span.clone(), "Invalid string literal.");
    };
    let elem_rank = a.elem.elmtype().and_then(Elmtype::rank);
    if parsed.wide {
        if elem_rank != Some(mcc_types::IntRank::Int) {
            return cg.error(
                tok.span.clone(),
                "Wide string initializer requires an integer array.",
            );
        }
    } else if elem_rank != Some(mcc_types::IntRank::Char) {
        return cg.error(
            tok.span.clone(),
            "String initializer requires a character array.",
        );
    }
    if parsed.too_large {
        cg.diags
            .warn(tok.span.clone(), "Character is too large for its type.");
    }

    let width = a.elem.scalar_width();
    let elem = (*a.elem).clone();
    match a.size {
        None => {
            // Pin the size to the character count plus the
            // terminating null.
            for &c in &parsed.chars {
                data.append(DataEntry::int(width, c));
            }
            data.append(DataEntry::int(width, 0));
            Ok(CType::array(elem, Some(parsed.chars.len() as u64 + 1)))
        }
        Some(size) => {
            if parsed.chars.len() as u64 > size {
                return cg.error(tok.span.clone(), "Too many initializer elements.");
            }
            for &c in &parsed.chars {
                data.append(DataEntry::int(width, c));
            }
            for _ in parsed.chars.len() as u64..size {
                data.append(DataEntry::int(width, 0));
            }
            Ok(CType::array(elem, Some(size)))
        }
    }
}
