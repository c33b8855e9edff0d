use super::*;
use mcc_ast::SrcSpan;
use mcc_types::{CType, Elmtype};
use pretty_assertions::assert_eq;

use crate::testutil::harness;

fn operand(elm: Elmtype, konst: Option<i64>) -> ExprRes {
    let mut res = ExprRes::rvalue("%in".into(), CType::Basic(elm), SrcSpan::synth());
    if let Some(value) = konst {
        res = res.with_konst(Konst::int(value));
    }
    res
}

fn run(lhs: ExprRes, rhs: ExprRes) -> UacResult {
    let (mut cg, mut pcx, mut block) = harness();
    match usual_arith_conv(&mut cg, &mut pcx, &mut block, lhs, rhs) {
        Ok(uac) => uac,
        Err(_) => panic!("uac succeeds"),
    }
}

#[test]
fn same_signedness_takes_the_larger_rank() {
    let uac = run(operand(Elmtype::Int, None), operand(Elmtype::Long, None));
    assert_eq!(uac.ty, CType::Basic(Elmtype::Long));
    let uac = run(operand(Elmtype::UInt, None), operand(Elmtype::ULong, None));
    assert_eq!(uac.ty, CType::Basic(Elmtype::ULong));
}

#[test]
fn wider_signed_type_wins_over_unsigned() {
    let uac = run(operand(Elmtype::Long, None), operand(Elmtype::UInt, None));
    assert_eq!(uac.ty, CType::Basic(Elmtype::Long));
}

#[test]
fn equal_width_mixed_signs_go_unsigned() {
    let uac = run(operand(Elmtype::UInt, None), operand(Elmtype::Int, None));
    assert_eq!(uac.ty, CType::Basic(Elmtype::UInt));
    assert!(uac.flags.contains(UacFlags::MIX2U));
    assert!(uac.flags.contains(UacFlags::SIGN_CHANGED));
}

#[test]
fn nonnegative_constant_does_not_flag_mixed_sign() {
    let uac = run(operand(Elmtype::UInt, None), operand(Elmtype::Int, Some(3)));
    assert_eq!(uac.ty, CType::Basic(Elmtype::UInt));
    assert!(!uac.flags.contains(UacFlags::MIX2U));
    assert!(!uac.flags.contains(UacFlags::NEG2U));
}

#[test]
fn negative_constant_flags_neg2u() {
    let uac = run(operand(Elmtype::UInt, None), operand(Elmtype::Int, Some(-1)));
    assert!(uac.flags.contains(UacFlags::NEG2U));
    assert!(uac.flags.contains(UacFlags::NEGATIVE));
}

#[test]
fn char_operands_promote_to_int() {
    let uac = run(operand(Elmtype::Char, None), operand(Elmtype::Char, None));
    assert_eq!(uac.ty, CType::int());
}

#[test]
fn truth_values_flag_truth() {
    let uac = run(operand(Elmtype::Logic, None), operand(Elmtype::Int, None));
    assert!(uac.flags.contains(UacFlags::TRUTH));
    assert_eq!(uac.ty, CType::int());
}

#[test]
fn enum_flags_distinguish_mix_and_inc() {
    let (mut cg, mut pcx, mut block) = harness();
    let e1 = cg.enums.create(Some("a".into()), "@@a".into());
    let e2 = cg.enums.create(Some("b".into()), "@@b".into());

    let enum_operand = |eid| {
        ExprRes::rvalue("%in".into(), CType::Enum(eid), SrcSpan::synth())
    };
    let Ok(uac) = usual_arith_conv(
        &mut cg,
        &mut pcx,
        &mut block,
        enum_operand(e1),
        operand(Elmtype::Int, None),
    ) else {
        panic!("uac succeeds");
    };
    assert!(uac.flags.contains(UacFlags::ENUM | UacFlags::ENUM_MIX));
    assert_eq!(uac.enum_id, Some(e1));

    let Ok(uac) = usual_arith_conv(
        &mut cg,
        &mut pcx,
        &mut block,
        enum_operand(e1),
        enum_operand(e2),
    ) else {
        panic!("uac succeeds");
    };
    assert!(uac.flags.contains(UacFlags::ENUM_INC));
    assert_eq!(uac.enum_id, None);

    let Ok(uac) = usual_arith_conv(
        &mut cg,
        &mut pcx,
        &mut block,
        enum_operand(e1),
        enum_operand(e1),
    ) else {
        panic!("uac succeeds");
    };
    assert!(!uac.flags.contains(UacFlags::ENUM_INC));
    assert_eq!(uac.enum_id, Some(e1));
}

#[test]
fn result_type_is_symmetric() {
    let cases = [
        (Elmtype::Char, Elmtype::UInt),
        (Elmtype::Short, Elmtype::Long),
        (Elmtype::UInt, Elmtype::Int),
        (Elmtype::ULong, Elmtype::LongLong),
        (Elmtype::UShort, Elmtype::Short),
    ];
    for (a, b) in cases {
        let forward = run(operand(a, None), operand(b, None));
        let backward = run(operand(b, None), operand(a, None));
        assert_eq!(forward.ty, backward.ty, "{a:?} vs {b:?}");
    }
}

#[test]
fn adjust_int_recomputes_constants() {
    let (_, mut pcx, mut block) = harness();
    let res = operand(Elmtype::Long, Some(0x1_0005));
    let narrowed = adjust_int(&mut pcx, &mut block, res, Elmtype::Int);
    assert_eq!(narrowed.ty, CType::int());
    assert_eq!(narrowed.const_int(), Some(5));
    let kinds: Vec<_> = block.instrs().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![mcc_ir::InstrKind::Trunc]);
}
