//! Type conversion.
//!
//! One entry point handles every conversion, explicit (casts) and
//! implicit (assignment, argument passing, return values). The source
//! is brought to an r-value, arrays decay to pointers, and the rest
//! dispatches on the (source, destination) category pair. Constant
//! values are recomputed by masking to the destination width and
//! sign-extending when the destination is signed.

use mcc_ir::LabeledBlock;
use mcc_types::{CType, Elmtype, PTR_WIDTH};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst};
use crate::lit::mask_to;
use crate::uac::adjust_int;

/// Whether a conversion was written by the user or synthesized.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ConvKind {
    Implicit,
    Explicit,
}

/// Convert `arg` to `dest`, reporting conversion diagnostics at
/// `arg`'s range.
pub fn convert(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    arg: ExprRes,
    dest: &CType,
    kind: ConvKind,
) -> CgResult<ExprRes> {
    // Destination void: synthesize a void result. An explicit cast to
    // void marks the value used.
    if dest.is_void() {
        let mut res = ExprRes::void(arg.span.clone());
        res.used = arg.used || kind == ConvKind::Explicit;
        return Ok(res);
    }

    if let CType::Array(_) = dest {
        return cg.error(arg.span.clone(), "Cannot cast to an array type.");
    }

    // Array source: decay to pointer-to-element, then recurse.
    if let CType::Array(a) = &arg.ty {
        let elem = (*a.elem).clone();
        let arg = arg.to_rvalue(pcx, block);
        let decayed = ExprRes {
            ty: CType::pointer(elem),
            ..arg
        };
        return convert(cg, pcx, block, decayed, dest, kind);
    }

    let arg = arg.to_rvalue(pcx, block);

    match (&arg.ty, dest) {
        // Identical elementary types pass through.
        (CType::Basic(s), CType::Basic(d)) if s == d => Ok(arg),

        // Truth value to integer: the value is already 0 or 1, only
        // the width may change. The truth-as-integer warning belongs
        // to the arithmetic operators, which see the UAC flag.
        (CType::Basic(Elmtype::Logic), CType::Basic(d)) if d.is_integer() => {
            let lowered = ExprRes {
                ty: CType::Basic(Elmtype::Int),
                ..arg
            };
            Ok(adjust_int(pcx, block, lowered, *d))
        }

        // Integer to integer.
        (CType::Basic(s), CType::Basic(d)) if s.is_integer() && d.is_integer() => {
            if kind == ConvKind::Implicit {
                if s.width() == d.width() && s.is_signed() != d.is_signed() {
                    cg.diags
                        .warn(arg.span.clone(), "Conversion may change sign of the result.");
                } else if s.width() > d.width() {
                    match arg.const_int() {
                        None => cg.diags.warn(
                            arg.span.clone(),
                            "Conversion may lose significant digits.",
                        ),
                        Some(v) if mask_to(v, *d) != v => cg
                            .diags
                            .warn(arg.span.clone(), "Number changed in conversion."),
                        Some(_) => {}
                    }
                }
            }
            Ok(adjust_int(pcx, block, arg, *d))
        }

        // Pointer to pointer: no IR; incompatible targets warn on
        // implicit conversion.
        (CType::Pointer(s), CType::Pointer(d)) => {
            if kind == ConvKind::Implicit && !s.compatible(d) {
                cg.diags.warn(
                    arg.span.clone(),
                    "Implicit conversion between incompatible pointer types.",
                );
            }
            Ok(ExprRes {
                ty: dest.clone(),
                ..arg
            })
        }

        // Integer to pointer: the value is reinterpreted; no IR.
        (CType::Basic(s), CType::Pointer(_)) if s.is_integer() => {
            if kind == ConvKind::Implicit {
                cg.diags.warn(
                    arg.span.clone(),
                    "Implicit conversion from integer to pointer.",
                );
            }
            if s.width() != PTR_WIDTH {
                cg.diags
                    .warn(arg.span.clone(), "Conversion changes pointer width.");
            }
            let konst = arg.konst.clone();
            Ok(ExprRes {
                ty: dest.clone(),
                konst,
                ..arg
            })
        }

        // Record to record: identity required.
        (CType::Record(s), CType::Record(d)) => {
            if s == d {
                Ok(arg)
            } else {
                cg.error(arg.span.clone(), "Invalid type conversion.")
            }
        }

        // Enum to enum.
        (CType::Enum(s), CType::Enum(d)) => {
            if s == d {
                Ok(arg)
            } else {
                if kind == ConvKind::Implicit {
                    cg.diags.warn(
                        arg.span.clone(),
                        "Implicit conversion between distinct enum types.",
                    );
                }
                Ok(ExprRes {
                    ty: dest.clone(),
                    ..arg
                })
            }
        }

        // Enum source to anything else: via int.
        (CType::Enum(_), _) => {
            let lowered = ExprRes {
                ty: CType::Basic(Elmtype::Int),
                ..arg
            };
            convert(cg, pcx, block, lowered, dest, kind)
        }

        // Anything integral to enum: via int, warning when implicit.
        (CType::Basic(s), CType::Enum(_)) if s.is_integer() => {
            if kind == ConvKind::Implicit {
                cg.diags.warn(
                    arg.span.clone(),
                    "Implicit conversion from integer to enum.",
                );
            }
            let adjusted = adjust_int(pcx, block, arg, Elmtype::Int);
            let konst = adjusted
                .konst
                .as_ref()
                .filter(|k| k.base.is_none())
                .map(|k| Konst::int(mask_to(k.value, Elmtype::Int)));
            Ok(ExprRes {
                ty: dest.clone(),
                konst,
                ..adjusted
            })
        }

        // Truth value to enum goes through the integer arm above.
        (CType::Basic(Elmtype::Logic), CType::Enum(_)) => {
            let lowered = ExprRes {
                ty: CType::Basic(Elmtype::Int),
                ..arg
            };
            convert(cg, pcx, block, lowered, dest, kind)
        }

        (CType::Basic(Elmtype::Void), _) => {
            cg.error(arg.span.clone(), "Use of void value.")
        }

        _ => cg.error(arg.span.clone(), "Invalid type conversion."),
    }
}

/// Shorthand for the implicit-conversion call sites (assignment,
/// arguments, returns, initializers).
pub fn convert_implicit(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    arg: ExprRes,
    dest: &CType,
) -> CgResult<ExprRes> {
    convert(cg, pcx, block, arg, dest, ConvKind::Implicit)
}

#[cfg(test)]
mod tests;
