//! Statement code generation.
//!
//! Owns the current labeled block: inserts labels, jumps, and
//! structured control flow, and threads the loop/switch tracking
//! stacks through the walk.

use mcc_ast::{Block, CaseStmt, DefaultStmt, IfStmt, ReturnStmt, Stmt, SwitchStmt};
use mcc_ir::{Instr, InstrKind, LabeledBlock, Oper};
use mcc_types::{CType, Elmtype};
use tracing::trace;

use crate::context::{CgResult, Cgen, ProcCtx, SwitchInfo};
use crate::conv::convert_implicit;
use crate::expr::{
    cgen_cond_jmp_false, cgen_cond_jmp_true, cgen_const_int, cgen_expr_rvalue, check_unused,
};
use crate::lit::mask_to;

fn jmp(block: &mut LabeledBlock, label: &str) {
    block.append(Instr {
        kind: InstrKind::Jmp,
        width: 0,
        dest: None,
        op1: Some(Oper::var(label.to_string())),
        op2: None,
        texpr: None,
    });
}

/// Walk a block: fresh scope, statements in order, unused pass, pop.
pub fn cgen_block(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    ast: &Block,
) -> CgResult<()> {
    cg.with_scope(|cg| {
        for stmt in &ast.stmts {
            if let Stmt::Block(inner) = stmt {
                cg.diags
                    .warn(inner.lbrace.span.clone(), "Gratuitous nested block.");
                cgen_block(cg, pcx, block, inner)?;
                continue;
            }
            cgen_stmt(cg, pcx, block, stmt)?;
        }
        Ok(())
    })
}

/// Statement dispatch.
pub fn cgen_stmt(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    stmt: &Stmt,
) -> CgResult<()> {
    trace!("cgen_stmt");
    match stmt {
        Stmt::Expr(s) => {
            let res = cgen_expr_rvalue(cg, pcx, block, &s.expr)?;
            check_unused(cg, &res);
            Ok(())
        }
        Stmt::Decl(s) => crate::decl::cgen_local_decl(cg, pcx, block, s),
        Stmt::Block(b) => cgen_block(cg, pcx, block, b),
        Stmt::If(s) => cgen_if(cg, pcx, block, s),
        Stmt::While(s) => {
            let top = pcx.new_label("while");
            let end = pcx.new_label("end_while");
            block.append_label(&top);
            cgen_cond_jmp_false(cg, pcx, block, &s.cond, &end)?;
            pcx.push_loop(top.clone(), end.clone());
            let walked = cgen_block(cg, pcx, block, &s.body);
            pcx.pop_loop();
            walked?;
            jmp(block, &top);
            block.append_label(&end);
            Ok(())
        }
        Stmt::Do(s) => {
            let top = pcx.new_label("do");
            let next = pcx.new_label("next_do");
            let end = pcx.new_label("end_do");
            block.append_label(&top);
            pcx.push_loop(next.clone(), end.clone());
            let walked = cgen_block(cg, pcx, block, &s.body);
            pcx.pop_loop();
            walked?;
            block.append_label(&next);
            cgen_cond_jmp_true(cg, pcx, block, &s.cond, &top)?;
            block.append_label(&end);
            Ok(())
        }
        Stmt::For(s) => {
            if let Some(init) = &s.init {
                let res = cgen_expr_rvalue(cg, pcx, block, init)?;
                check_unused(cg, &res);
            }
            let top = pcx.new_label("for");
            let next = pcx.new_label("next_for");
            let end = pcx.new_label("end_for");
            block.append_label(&top);
            if let Some(cond) = &s.cond {
                cgen_cond_jmp_false(cg, pcx, block, cond, &end)?;
            }
            pcx.push_loop(next.clone(), end.clone());
            let walked = cgen_block(cg, pcx, block, &s.body);
            pcx.pop_loop();
            walked?;
            block.append_label(&next);
            if let Some(step) = &s.step {
                let res = cgen_expr_rvalue(cg, pcx, block, step)?;
                check_unused(cg, &res);
            }
            jmp(block, &top);
            block.append_label(&end);
            Ok(())
        }
        Stmt::Switch(s) => cgen_switch(cg, pcx, block, s),
        Stmt::Case(s) => cgen_case(cg, pcx, block, s),
        Stmt::Default(s) => cgen_default(cg, pcx, block, s),
        Stmt::Break(s) => match pcx.innermost_breakable() {
            Some(info) => {
                let label = info.break_label.clone();
                jmp(block, &label);
                Ok(())
            }
            None => cg.error(
                s.tok.span.clone(),
                "Break statement outside of a loop or switch.",
            ),
        },
        Stmt::Continue(s) => match pcx.innermost_loop() {
            Some(info) => {
                let label = info.continue_label.clone();
                jmp(block, &label);
                Ok(())
            }
            None => cg.error(s.tok.span.clone(), "Continue statement outside of a loop."),
        },
        Stmt::Goto(s) => {
            pcx.labels.use_label(&s.label);
            jmp(block, &ProcCtx::goto_label(&s.label.text));
            Ok(())
        }
        Stmt::Return(s) => cgen_return(cg, pcx, block, s),
        Stmt::Label(s) => {
            if pcx.labels.define_label(&s.label).is_err() {
                let message = format!("Duplicate label '{}'.", s.label.text);
                return cg.error(s.label.span.clone(), message);
            }
            block.append_label(ProcCtx::goto_label(&s.label.text));
            Ok(())
        }
        Stmt::Null(_) => {
            block.append(Instr::nullary(InstrKind::Nop));
            Ok(())
        }
    }
}

/// `if` / `else if` / `else`.
fn cgen_if(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    s: &IfStmt,
) -> CgResult<()> {
    let end = pcx.new_label("end_if");
    let false_if = pcx.new_label("false_if");
    cgen_cond_jmp_false(cg, pcx, block, &s.cond, &false_if)?;
    cgen_block(cg, pcx, block, &s.then)?;
    jmp(block, &end);
    block.append_label(&false_if);

    for arm in &s.elseifs {
        let false_elseif = pcx.new_label("false_elseif");
        cgen_cond_jmp_false(cg, pcx, block, &arm.cond, &false_elseif)?;
        cgen_block(cg, pcx, block, &arm.body)?;
        jmp(block, &end);
        block.append_label(&false_elseif);
    }

    if let Some(else_body) = &s.else_body {
        cgen_block(cg, pcx, block, else_body)?;
    }
    block.append_label(&end);
    Ok(())
}

/// `return`, with and without a value.
fn cgen_return(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    s: &ReturnStmt,
) -> CgResult<()> {
    let rtype = pcx.rtype.clone();
    match &s.expr {
        Some(expr) => {
            if rtype.is_void() {
                cg.diags.warn(
                    s.tok.span.clone(),
                    "Return with a value in a function returning void.",
                );
                cgen_expr_rvalue(cg, pcx, block, expr)?;
                block.append(Instr::nullary(InstrKind::Ret));
                return Ok(());
            }
            let res = cgen_expr_rvalue(cg, pcx, block, expr)?;
            let res = convert_implicit(cg, pcx, block, res, &rtype)?;
            if let Some(vreg) = res.slot.vreg() {
                block.append(Instr {
                    kind: InstrKind::RetV,
                    width: rtype.scalar_width(),
                    dest: None,
                    op1: Some(Oper::var(vreg.to_string())),
                    op2: None,
                    texpr: None,
                });
            }
            Ok(())
        }
        None => {
            if !rtype.is_void() {
                cg.diags.warn(
                    s.tok.span.clone(),
                    "Return without a value in a function returning non-void.",
                );
            }
            block.append(Instr::nullary(InstrKind::Ret));
            Ok(())
        }
    }
}

/// `switch`.
fn cgen_switch(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    s: &SwitchStmt,
) -> CgResult<()> {
    let sexpr = cgen_expr_rvalue(cg, pcx, block, &s.expr)?;
    match &sexpr.ty {
        CType::Basic(e) if e.is_integer() => {}
        CType::Enum(_) => {}
        _ => {
            return cg.error(sexpr.span.clone(), "Switch expression is not an integer.");
        }
    }

    let first_cmp = pcx.new_label("switch_cmp");
    let first_body = pcx.new_label("switch_body");
    let end = pcx.new_label("end_switch");
    jmp(block, &first_cmp);

    pcx.push_switch(
        SwitchInfo {
            sexpr: sexpr.clone(),
            next_cmp: first_cmp,
            next_body: first_body,
            default_label: None,
            seen: Vec::new(),
        },
        end.clone(),
    );
    let walked = cgen_block(cg, pcx, block, &s.body);
    let info = pcx.pop_switch();
    walked?;
    let Some(info) = info else {
        return Ok(());
    };

    // Close the chain: terminate the last body, land the final
    // compare label, fall to the default (or out), then the end.
    jmp(block, &info.next_body);
    block.append_label(&info.next_cmp);
    if let Some(default_label) = &info.default_label {
        jmp(block, default_label);
    }
    block.append_label(&info.next_body);
    block.append_label(&end);

    // Strict enum switches without a default must handle every value.
    if info.default_label.is_none() {
        if let CType::Enum(eid) = &sexpr.ty {
            let def = cg.enums.get(*eid);
            if def.is_strict() && def.defined {
                let missing: Vec<String> = def
                    .elems
                    .iter()
                    .filter(|e| !info.seen.contains(&e.value))
                    .map(|e| e.name.clone())
                    .collect();
                for name in missing {
                    let message =
                        format!("Enumeration value '{name}' not handled in switch.");
                    cg.diags.warn(s.tok.span.clone(), message);
                }
            }
        }
    }
    Ok(())
}

/// `case e:` inside a switch body.
fn cgen_case(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    s: &CaseStmt,
) -> CgResult<()> {
    let (value, _) = cgen_const_int(cg, pcx, &s.expr)?;

    // Validate against the switch record first.
    let (cur_cmp, cur_body, sexpr_vreg, sexpr_elm) = {
        let Some(info) = pcx.innermost_switch() else {
            return cg.error(s.tok.span.clone(), "Case label outside of a switch.");
        };
        let elm = match &info.sexpr.ty {
            CType::Basic(e) => *e,
            CType::Enum(_) => Elmtype::Int,
            _ => Elmtype::Int,
        };
        if info.seen.contains(&value) {
            return cg.error(s.expr.span(), "Duplicate case value.");
        }
        info.seen.push(value);
        let vreg = info.sexpr.slot.vreg().unwrap_or_default().to_string();
        (info.next_cmp.clone(), info.next_body.clone(), vreg, elm)
    };
    if mask_to(value, sexpr_elm) != value {
        cg.diags.warn(
            s.expr.span(),
            "Case value is out of range of the switch expression type.",
        );
    }

    let new_cmp = pcx.new_label("switch_cmp");
    let new_body = pcx.new_label("switch_body");
    if let Some(info) = pcx.innermost_switch() {
        info.next_cmp = new_cmp.clone();
        info.next_body = new_body.clone();
    }

    // Preceding code hops over the compare into this case's body.
    jmp(block, &cur_body);
    block.append_label(&cur_cmp);
    let width = sexpr_elm.width();
    let imm = pcx.new_vreg();
    block.append(Instr::unary(
        InstrKind::Imm,
        width,
        Oper::var(imm.clone()),
        Oper::Imm(value),
    ));
    let cmp = pcx.new_vreg();
    block.append(Instr::binary(
        InstrKind::Eq,
        width,
        Oper::var(cmp.clone()),
        Oper::var(sexpr_vreg),
        Oper::var(imm),
    ));
    block.append(Instr {
        kind: InstrKind::Jz,
        width: mcc_types::LOGIC_WIDTH,
        dest: None,
        op1: Some(Oper::var(cmp)),
        op2: Some(Oper::var(new_cmp)),
        texpr: None,
    });
    block.append_label(&cur_body);
    Ok(())
}

/// `default:` inside a switch body.
fn cgen_default(
    cg: &mut Cgen,
    pcx: &mut ProcCtx,
    block: &mut LabeledBlock,
    s: &DefaultStmt,
) -> CgResult<()> {
    let label = pcx.new_label("default");
    let Some(info) = pcx.innermost_switch() else {
        return cg.error(s.tok.span.clone(), "Default label outside of a switch.");
    };
    if info.default_label.is_some() {
        return cg.error(s.tok.span.clone(), "Multiple default labels in switch.");
    }
    info.default_label = Some(label.clone());
    block.append_label(&label);
    Ok(())
}
