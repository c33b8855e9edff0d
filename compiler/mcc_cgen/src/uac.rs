//! Integer promotion and the usual arithmetic conversions.
//!
//! Both operands are first dropped from enum to int, then promoted and
//! brought to a common result type by the standard rules. The returned
//! flag word records everything the operator-specific warning logic
//! needs; callers decide which flags matter for their operator.

use bitflags::bitflags;
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, Elmtype, EnumId, IntRank};

use crate::context::{CgResult, Cgen, ProcCtx};
use crate::eres::{ExprRes, Konst, ValueSlot};
use crate::lit::mask_to;

bitflags! {
    /// What happened during a usual-arithmetic-conversion run.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct UacFlags: u32 {
        /// An operand's signedness changed on the way to the result
        /// type.
        const SIGN_CHANGED = 1 << 0;
        /// At least one operand is signed.
        const SIGNED = 1 << 1;
        /// A negative constant operand participated.
        const NEGATIVE = 1 << 2;
        /// A negative constant was converted to an unsigned result.
        const NEG2U = 1 << 3;
        /// Operands of mixed sign met in an unsigned result.
        const MIX2U = 1 << 4;
        /// A truth value participated.
        const TRUTH = 1 << 5;
        /// An enum operand participated.
        const ENUM = 1 << 6;
        /// Exactly one operand was an enum.
        const ENUM_MIX = 1 << 7;
        /// Both operands were enums, but of different enums.
        const ENUM_INC = 1 << 8;
    }
}

/// Outcome of the usual arithmetic conversions.
#[derive(Debug)]
pub struct UacResult {
    pub lhs: ExprRes,
    pub rhs: ExprRes,
    /// The common result type.
    pub ty: CType,
    pub flags: UacFlags,
    /// When enum operands participated and agreed, the enum to narrow
    /// the result back to.
    pub enum_id: Option<EnumId>,
}

/// Drop an enum-typed operand to `int`, recording which enum it was.
/// Non-enum operands pass through.
pub fn enum2int(res: ExprRes) -> (ExprRes, Option<EnumId>) {
    match res.ty {
        CType::Enum(eid) => (
            ExprRes {
                ty: CType::Basic(Elmtype::Int),
                ..res
            },
            Some(eid),
        ),
        _ => (res, None),
    }
}

/// Emit the width adjustment taking `res` (an integer r-value) to the
/// elementary type `to`. Constants are recomputed by masking and
/// sign-extension; no diagnostics are produced here.
pub fn adjust_int(
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    res: ExprRes,
    to: Elmtype,
) -> ExprRes {
    let from = match res.ty.elmtype() {
        Some(e) => e,
        None => return res,
    };
    let konst = res
        .konst
        .as_ref()
        .filter(|k| k.base.is_none())
        .map(|k| Konst::int(mask_to(k.value, to)));
    if from.width() == to.width() {
        return ExprRes {
            ty: CType::Basic(to),
            konst,
            ..res
        };
    }
    let kind = if from.width() > to.width() {
        InstrKind::Trunc
    } else if from.is_signed() {
        InstrKind::SgnExt
    } else {
        InstrKind::ZrExt
    };
    let src = match res.slot.vreg() {
        Some(src) => src.to_string(),
        None => {
            return ExprRes {
                ty: CType::Basic(to),
                konst,
                ..res
            };
        }
    };
    let dest = pcx.new_vreg();
    block.append(Instr::unary(
        kind,
        to.width(),
        Oper::var(dest.clone()),
        Oper::var(src),
    ));
    ExprRes {
        slot: ValueSlot::Rvalue(dest),
        ty: CType::Basic(to),
        konst,
        ..res
    }
}

/// Integer promotion: types strictly narrower than `int` widen to
/// `int`. Truth values and enums must already have been lowered.
pub fn promote(pcx: &mut ProcCtx, block: &mut LabeledBlock, res: ExprRes) -> ExprRes {
    match res.ty.elmtype() {
        Some(e) if e.is_integer() && e.width() < Elmtype::Int.width() => {
            adjust_int(pcx, block, res, Elmtype::Int)
        }
        _ => res,
    }
}

/// Lower a truth-value or enum operand to `int`, collecting flags.
fn lower_operand(res: ExprRes, flags: &mut UacFlags) -> (ExprRes, Option<EnumId>) {
    let res = if res.ty.is_logic() {
        *flags |= UacFlags::TRUTH;
        ExprRes {
            ty: CType::Basic(Elmtype::Int),
            ..res
        }
    } else {
        res
    };
    let (res, eid) = enum2int(res);
    if eid.is_some() {
        *flags |= UacFlags::ENUM;
    }
    (res, eid)
}

/// Run the usual arithmetic conversions over two integer-like
/// operands. Fails (with a diagnostic) when an operand is not of
/// integer, enum, or truth type.
pub fn usual_arith_conv(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    lhs: ExprRes,
    rhs: ExprRes,
) -> CgResult<UacResult> {
    let mut flags = UacFlags::empty();

    let (lhs, leid) = lower_operand(lhs, &mut flags);
    let (rhs, reid) = lower_operand(rhs, &mut flags);
    let enum_id = match (leid, reid) {
        (Some(a), Some(b)) if a == b => Some(a),
        (Some(_), Some(_)) => {
            flags |= UacFlags::ENUM_INC;
            None
        }
        (Some(e), None) | (None, Some(e)) => {
            flags |= UacFlags::ENUM_MIX;
            Some(e)
        }
        (None, None) => None,
    };

    let (Some(le), Some(re)) = (lhs.ty.elmtype(), rhs.ty.elmtype()) else {
        return cg.error(lhs.span.merge(&rhs.span), "Scalar type required.");
    };
    if !le.is_integer() || !re.is_integer() {
        return cg.error(lhs.span.merge(&rhs.span), "Scalar type required.");
    }

    if le.is_signed() || re.is_signed() {
        flags |= UacFlags::SIGNED;
    }
    for res in [&lhs, &rhs] {
        if let Some(v) = res.const_int() {
            if v < 0 {
                flags |= UacFlags::NEGATIVE;
            }
        }
    }

    // Integer promotion, then the standard result-type rules.
    let lhs = promote(pcx, block, lhs);
    let rhs = promote(pcx, block, rhs);
    let (le, re) = match (lhs.ty.elmtype(), rhs.ty.elmtype()) {
        (Some(a), Some(b)) => (a, b),
        _ => return cg.error(lhs.span.merge(&rhs.span), "Scalar type required."),
    };

    let rank = le.rank().max(re.rank()).unwrap_or(IntRank::Int);
    let result = if le.is_signed() == re.is_signed() {
        Elmtype::int_by(le.is_signed(), rank)
    } else {
        let (signed, unsigned) = if le.is_signed() { (le, re) } else { (re, le) };
        if signed.width() > unsigned.width() {
            Elmtype::int_by(true, rank)
        } else {
            Elmtype::int_by(false, rank)
        }
    };

    if !result.is_signed() {
        for (e, res) in [(le, &lhs), (re, &rhs)] {
            if !e.is_signed() {
                continue;
            }
            match res.const_int() {
                Some(v) if v < 0 => flags |= UacFlags::NEG2U,
                Some(_) => {}
                None => flags |= UacFlags::MIX2U,
            }
        }
    }
    if le.is_signed() != result.is_signed() || re.is_signed() != result.is_signed() {
        flags |= UacFlags::SIGN_CHANGED;
    }

    let lhs = adjust_int(pcx, block, lhs, result);
    let rhs = adjust_int(pcx, block, rhs, result);
    Ok(UacResult {
        lhs,
        rhs,
        ty: CType::Basic(result),
        flags,
        enum_id,
    })
}

#[cfg(test)]
mod tests;
