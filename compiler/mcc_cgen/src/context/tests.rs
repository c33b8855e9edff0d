use super::*;
use mcc_types::CType;
use pretty_assertions::assert_eq;

#[test]
fn vregs_count_up_per_procedure() {
    let mut pcx = ProcCtx::new(CType::int());
    assert_eq!(pcx.new_vreg(), "%0");
    assert_eq!(pcx.new_vreg(), "%1");
    let mut other = ProcCtx::new(CType::int());
    assert_eq!(other.new_vreg(), "%0");
}

#[test]
fn labels_take_numbers_from_one_counter() {
    let mut pcx = ProcCtx::new(CType::int());
    assert_eq!(pcx.new_label("while"), "%while0");
    assert_eq!(pcx.new_label("end_while"), "%end_while1");
}

#[test]
fn goto_labels_use_the_reserved_namespace() {
    assert_eq!(ProcCtx::goto_label("out"), "%_out");
}

#[test]
fn repeated_local_names_are_mangled() {
    let mut pcx = ProcCtx::new(CType::int());
    assert_eq!(pcx.mangle_lvar("i"), "%i");
    assert_eq!(pcx.mangle_lvar("i"), "%1@i");
    assert_eq!(pcx.mangle_lvar("i"), "%2@i");
    assert_eq!(pcx.mangle_lvar("j"), "%j");
}

#[test]
fn with_scope_balances_push_and_pop() {
    let mut cg = Cgen::new("t");
    assert_eq!(cg.scopes.depth(), 1);
    cg.with_scope(|cg| {
        assert_eq!(cg.scopes.depth(), 2);
        cg.with_scope(|cg| assert_eq!(cg.scopes.depth(), 3));
        assert_eq!(cg.scopes.depth(), 2);
    });
    assert_eq!(cg.scopes.depth(), 1);
}

#[test]
fn break_binds_to_loop_or_switch_continue_to_loop_only() {
    use crate::eres::ExprRes;
    let mut pcx = ProcCtx::new(CType::int());
    pcx.push_loop("%while0".into(), "%end_while1".into());
    pcx.push_switch(
        SwitchInfo {
            sexpr: ExprRes::rvalue("%0".into(), CType::int(), mcc_ast::SrcSpan::synth()),
            next_cmp: "%switch_cmp2".into(),
            next_body: "%switch_body3".into(),
            default_label: None,
            seen: Vec::new(),
        },
        "%end_switch4".into(),
    );

    // break targets the switch (innermost breakable), continue the
    // loop.
    let brk = pcx.innermost_breakable().map(|b| b.break_label.clone());
    assert_eq!(brk.as_deref(), Some("%end_switch4"));
    let cont = pcx.innermost_loop().map(|l| l.continue_label.clone());
    assert_eq!(cont.as_deref(), Some("%while0"));

    pcx.pop_switch();
    let brk = pcx.innermost_breakable().map(|b| b.break_label.clone());
    assert_eq!(brk.as_deref(), Some("%end_while1"));
    pcx.pop_loop();
    assert!(pcx.innermost_breakable().is_none());
}

#[test]
fn unused_pass_reports_variables_and_parameters_only() {
    use mcc_ast::Token;
    use mcc_types::{ScopeMember, ScopeMemberKind};
    let mut cg = Cgen::new("t");
    cg.scopes.push();
    for (name, kind) in [
        ("v", ScopeMemberKind::LocalVar { vident: "%v".into() }),
        ("p", ScopeMemberKind::Arg { vident: "%p".into() }),
        ("t", ScopeMemberKind::Typedef),
    ] {
        let Ok(()) = cg.scopes.insert(ScopeMember {
            ident: Token::synth(name),
            ty: CType::int(),
            used: false,
            kind,
        }) else {
            panic!("insert {name}");
        };
    }
    cg.unused_pass();
    cg.scopes.pop();
    assert_eq!(
        cg.diags.messages(),
        vec!["Unused variable 'v'.", "Unused parameter 'p'."]
    );
}

#[test]
fn anon_iridents_are_unique() {
    let mut cg = Cgen::new("t");
    let a = cg.anon_irident();
    let b = cg.anon_irident();
    assert_ne!(a, b);
    assert!(a.starts_with("@@anon"));
}
