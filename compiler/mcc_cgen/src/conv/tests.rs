use super::*;
use mcc_ast::SrcSpan;
use mcc_types::{CType, Elmtype};
use pretty_assertions::assert_eq;

use crate::eres::ExprRes;
use crate::testutil::harness;

fn rv(ty: CType) -> ExprRes {
    ExprRes::rvalue("%in".into(), ty, SrcSpan::synth())
}

fn kv(ty: CType, value: i64) -> ExprRes {
    rv(ty).with_konst(crate::eres::Konst::int(value))
}

#[test]
fn narrowing_warns_unless_constant() {
    let (mut cg, mut pcx, mut block) = harness();
    let long_val = rv(CType::Basic(Elmtype::Long));
    let Ok(out) = convert_implicit(&mut cg, &mut pcx, &mut block, long_val, &CType::int())
    else {
        panic!("converts");
    };
    assert_eq!(out.ty, CType::int());
    assert_eq!(
        cg.diags.messages(),
        vec!["Conversion may lose significant digits."]
    );
}

#[test]
fn narrowing_a_fitting_constant_is_silent() {
    let (mut cg, mut pcx, mut block) = harness();
    let value = kv(CType::Basic(Elmtype::Long), 100);
    let Ok(out) = convert_implicit(&mut cg, &mut pcx, &mut block, value, &CType::int()) else {
        panic!("converts");
    };
    assert_eq!(out.const_int(), Some(100));
    assert!(cg.diags.messages().is_empty());
}

#[test]
fn narrowing_a_changing_constant_warns_number_changed() {
    let (mut cg, mut pcx, mut block) = harness();
    let value = kv(CType::Basic(Elmtype::Long), 0x1_2345);
    let Ok(out) = convert_implicit(&mut cg, &mut pcx, &mut block, value, &CType::int()) else {
        panic!("converts");
    };
    assert_eq!(out.const_int(), Some(0x2345));
    assert_eq!(cg.diags.messages(), vec!["Number changed in conversion."]);
}

#[test]
fn same_width_sign_change_warns() {
    let (mut cg, mut pcx, mut block) = harness();
    let value = rv(CType::int());
    let Ok(_) = convert_implicit(
        &mut cg,
        &mut pcx,
        &mut block,
        value,
        &CType::Basic(Elmtype::UInt),
    ) else {
        panic!("converts");
    };
    assert_eq!(
        cg.diags.messages(),
        vec!["Conversion may change sign of the result."]
    );
}

#[test]
fn widening_is_silent_and_sign_extends_constants() {
    let (mut cg, mut pcx, mut block) = harness();
    let value = kv(CType::int(), -2);
    let Ok(out) = convert_implicit(
        &mut cg,
        &mut pcx,
        &mut block,
        value,
        &CType::Basic(Elmtype::Long),
    ) else {
        panic!("converts");
    };
    assert_eq!(out.const_int(), Some(-2));
    assert!(cg.diags.messages().is_empty());
    let kinds: Vec<_> = block.instrs().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![mcc_ir::InstrKind::SgnExt]);
}

#[test]
fn explicit_casts_do_not_warn_on_narrowing() {
    let (mut cg, mut pcx, mut block) = harness();
    let value = rv(CType::Basic(Elmtype::Long));
    let Ok(_) = convert(
        &mut cg,
        &mut pcx,
        &mut block,
        value,
        &CType::int(),
        ConvKind::Explicit,
    ) else {
        panic!("converts");
    };
    assert!(cg.diags.messages().is_empty());
}

#[test]
fn incompatible_pointers_warn_on_implicit_conversion() {
    let (mut cg, mut pcx, mut block) = harness();
    let from = rv(CType::pointer(CType::int()));
    let to = CType::pointer(CType::Basic(Elmtype::Char));
    let Ok(out) = convert_implicit(&mut cg, &mut pcx, &mut block, from, &to) else {
        panic!("converts");
    };
    assert_eq!(out.ty, to);
    assert_eq!(
        cg.diags.messages(),
        vec!["Implicit conversion between incompatible pointer types."]
    );
}

#[test]
fn integer_to_pointer_warns_twice_on_width_mismatch() {
    let (mut cg, mut pcx, mut block) = harness();
    let from = rv(CType::Basic(Elmtype::Long));
    let to = CType::pointer(CType::int());
    let Ok(_) = convert_implicit(&mut cg, &mut pcx, &mut block, from, &to) else {
        panic!("converts");
    };
    assert_eq!(
        cg.diags.messages(),
        vec![
            "Implicit conversion from integer to pointer.",
            "Conversion changes pointer width.",
        ]
    );
}

#[test]
fn array_decays_before_conversion() {
    let (mut cg, mut pcx, mut block) = harness();
    let arr = ExprRes::lvalue(
        "%a".into(),
        CType::array(CType::int(), Some(5)),
        SrcSpan::synth(),
    );
    let to = CType::pointer(CType::int());
    let Ok(out) = convert_implicit(&mut cg, &mut pcx, &mut block, arr, &to) else {
        panic!("converts");
    };
    assert_eq!(out.ty, to);
    assert!(cg.diags.messages().is_empty());
}

#[test]
fn truth_value_converts_to_integer_silently() {
    // The truth-as-integer warning fires at arithmetic operator
    // sites; plain conversion (returns, assignments) is clean, so
    // `return x < y;` produces only the comparison diagnostics.
    let (mut cg, mut pcx, mut block) = harness();
    let from = rv(CType::logic());
    let Ok(out) = convert_implicit(&mut cg, &mut pcx, &mut block, from, &CType::int()) else {
        panic!("converts");
    };
    assert_eq!(out.ty, CType::int());
    assert!(cg.diags.messages().is_empty());
}

#[test]
fn cast_to_void_marks_the_value_used() {
    let (mut cg, mut pcx, mut block) = harness();
    let from = rv(CType::int());
    let Ok(out) = convert(
        &mut cg,
        &mut pcx,
        &mut block,
        from,
        &CType::Basic(Elmtype::Void),
        ConvKind::Explicit,
    ) else {
        panic!("converts");
    };
    assert!(out.used);
    assert!(out.ty.is_void());
}

#[test]
fn record_conversion_requires_identity() {
    let (mut cg, mut pcx, mut block) = harness();
    let a = cg
        .records
        .create(mcc_types::RecordKind::Struct, Some("a".into()), "@@a".into());
    let b = cg
        .records
        .create(mcc_types::RecordKind::Struct, Some("b".into()), "@@b".into());
    let from = ExprRes::rvalue("%r".into(), CType::Record(a), SrcSpan::synth());
    assert!(convert_implicit(&mut cg, &mut pcx, &mut block, from.clone(), &CType::Record(a)).is_ok());
    assert!(convert_implicit(&mut cg, &mut pcx, &mut block, from, &CType::Record(b)).is_err());
}
