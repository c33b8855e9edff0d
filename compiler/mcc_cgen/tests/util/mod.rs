//! Shared test support: AST builders over the public interface, and a
//! small reference interpreter for the emitted IR so tests can observe
//! runtime values instead of matching instruction sequences.

#![allow(dead_code)]

use std::collections::HashMap;

use mcc_ast::{
    ArrayDecl, AssignExpr, AssignOp, BinOp, BinaryExpr, Block, CaseStmt, DeclSpecs, DeclStmt,
    Declarator, DefaultStmt, Dspec, EnumElemDecl, EnumSpec, Expr, ExprStmt, FunDecl, GlobalDecl,
    IndexExpr, Init, InitDecl, MemberExpr, ParamDecl, PtrDecl, RecordKw, RecordSpec, ReturnStmt,
    Stmt, SwitchStmt, Token, TranslationUnit, TypeSpec, UnOp, UnaryExpr,
};
use mcc_ir::{Decl, InstrKind, Module, Oper, Proc, TypeExpr};

// --- Builders ---

pub fn tok(text: &str) -> Token {
    Token::synth(text)
}

pub fn int(value: i64) -> Expr {
    if value < 0 {
        un(UnOp::Minus, Expr::IntLit(tok(&(-(i128::from(value))).to_string())))
    } else {
        Expr::IntLit(tok(&value.to_string()))
    }
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident(tok(name))
}

pub fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        tok: tok("op"),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn un(op: UnOp, arg: Expr) -> Expr {
    Expr::Unary(UnaryExpr {
        op,
        tok: tok("op"),
        arg: Box::new(arg),
    })
}

pub fn assign(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Assign(AssignExpr {
        op: AssignOp::Plain,
        tok: tok("="),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn index(base: Expr, idx: Expr) -> Expr {
    Expr::Index(IndexExpr {
        base: Box::new(base),
        lbracket: tok("["),
        index: Box::new(idx),
        rbracket: tok("]"),
    })
}

pub fn arrow(base: Expr, member: &str) -> Expr {
    Expr::Member(MemberExpr {
        base: Box::new(base),
        arrow: true,
        tok: tok("->"),
        member: tok(member),
    })
}

pub fn specs(list: Vec<Dspec>) -> DeclSpecs {
    DeclSpecs::new(list)
}

pub fn ts_int() -> Dspec {
    Dspec::TypeSpec(TypeSpec::Int(tok("int")))
}

pub fn ts_void() -> Dspec {
    Dspec::TypeSpec(TypeSpec::Void(tok("void")))
}

pub fn ts_unsigned() -> Dspec {
    Dspec::TypeSpec(TypeSpec::Unsigned(tok("unsigned")))
}

pub fn specs_int() -> DeclSpecs {
    specs(vec![ts_int()])
}

pub fn specs_void() -> DeclSpecs {
    specs(vec![ts_void()])
}

pub fn record_ref(name: &str) -> Dspec {
    Dspec::TypeSpec(TypeSpec::Record(RecordSpec {
        kw: tok("struct"),
        kind: RecordKw::Struct,
        ident: Some(tok(name)),
        members: None,
        rbrace: None,
    }))
}

pub fn enum_def(name: &str, elems: Vec<(&str, Option<Expr>)>) -> Dspec {
    Dspec::TypeSpec(TypeSpec::Enum(EnumSpec {
        kw: tok("enum"),
        ident: Some(tok(name)),
        elems: Some(
            elems
                .into_iter()
                .map(|(elem_name, value)| EnumElemDecl {
                    ident: tok(elem_name),
                    value,
                })
                .collect(),
        ),
        rbrace: Some(tok("}")),
    }))
}

pub fn enum_ref(name: &str) -> Dspec {
    Dspec::TypeSpec(TypeSpec::Enum(EnumSpec {
        kw: tok("enum"),
        ident: Some(tok(name)),
        elems: None,
        rbrace: None,
    }))
}

pub fn d_ident(name: &str) -> Declarator {
    Declarator::Ident(tok(name))
}

pub fn d_ptr(inner: Declarator) -> Declarator {
    Declarator::Ptr(PtrDecl {
        tok: tok("*"),
        inner: Box::new(inner),
    })
}

pub fn d_array(inner: Declarator, size: Option<Expr>) -> Declarator {
    Declarator::Array(ArrayDecl {
        inner: Box::new(inner),
        lbracket: tok("["),
        size,
        rbracket: tok("]"),
    })
}

pub fn d_fun(inner: Declarator, params: Vec<ParamDecl>) -> Declarator {
    Declarator::Fun(FunDecl {
        inner: Box::new(inner),
        lparen: tok("("),
        params,
        rparen: tok(")"),
    })
}

pub fn param(specs: DeclSpecs, decl: Declarator) -> ParamDecl {
    ParamDecl { specs, decl }
}

pub fn void_params() -> Vec<ParamDecl> {
    vec![param(specs_void(), Declarator::Anon)]
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block {
        lbrace: tok("{"),
        stmts,
        rbrace: tok("}"),
    }
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt {
        expr,
        semi: tok(";"),
    })
}

pub fn ret(expr: Option<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt {
        tok: tok("return"),
        expr,
        semi: tok(";"),
    })
}

pub fn decl_stmt(specs: DeclSpecs, decls: Vec<InitDecl>) -> Stmt {
    Stmt::Decl(DeclStmt {
        specs,
        decls,
        semi: tok(";"),
    })
}

pub fn init_decl(decl: Declarator, init: Option<Init>) -> InitDecl {
    InitDecl { decl, init }
}

pub fn case(expr: Expr) -> Stmt {
    Stmt::Case(CaseStmt {
        tok: tok("case"),
        expr,
        colon: tok(":"),
    })
}

pub fn default() -> Stmt {
    Stmt::Default(DefaultStmt {
        tok: tok("default"),
        colon: tok(":"),
    })
}

pub fn switch(expr: Expr, body: Block) -> Stmt {
    Stmt::Switch(SwitchStmt {
        tok: tok("switch"),
        expr,
        body,
    })
}

pub fn gdecl(specs: DeclSpecs, decls: Vec<InitDecl>) -> GlobalDecl {
    GlobalDecl {
        specs,
        decls,
        body: None,
        semi: Some(tok(";")),
    }
}

pub fn fundef(specs: DeclSpecs, decl: Declarator, body: Block) -> GlobalDecl {
    GlobalDecl {
        specs,
        decls: vec![init_decl(decl, None)],
        body: Some(body),
        semi: None,
    }
}

pub fn unit(decls: Vec<GlobalDecl>) -> TranslationUnit {
    TranslationUnit { decls }
}

// --- Reference interpreter ---

/// A runtime value: an integer, or an address expressed as a symbolic
/// base plus a byte offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Addr(String, i64),
}

impl Value {
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::Addr(..) => 1,
        }
    }
}

/// Sign-extend `value` at `width` bits.
fn sext(width: u32, value: i64) -> i64 {
    if width == 0 || width >= 64 {
        return value;
    }
    let masked = (value as u64) & ((1u64 << width) - 1);
    if masked & (1u64 << (width - 1)) != 0 {
        (masked | !((1u64 << width) - 1)) as i64
    } else {
        masked as i64
    }
}

fn zext(width: u32, value: i64) -> u64 {
    if width == 0 || width >= 64 {
        return value as u64;
    }
    (value as u64) & ((1u64 << width) - 1)
}

/// Executes straight-line and branching IR the code generator emits.
/// Enough of the instruction alphabet for the test programs; records
/// are addressed but not block-copied.
pub struct Interp<'a> {
    module: &'a Module,
    mem: HashMap<(String, i64), Value>,
    next_frame: u32,
}

impl<'a> Interp<'a> {
    pub fn new(module: &'a Module) -> Self {
        let mut mem = HashMap::new();
        for decl in &module.decls {
            if let Decl::Var(var) = decl {
                let mut offset = 0i64;
                for entry in &var.data.entries {
                    let value = match &entry.base {
                        Some(base) => Value::Addr(base.clone(), entry.value),
                        None => Value::Int(entry.value),
                    };
                    mem.insert((var.ident.clone(), offset), value);
                    offset += i64::from(entry.width / 8);
                }
            }
        }
        Interp {
            module,
            mem,
            next_frame: 0,
        }
    }

    fn texpr_size(&self, texpr: &TypeExpr) -> i64 {
        match texpr {
            TypeExpr::Int(w) | TypeExpr::Ptr(w) => i64::from(w / 8),
            TypeExpr::Array(elem, n) => self.texpr_size(elem) * (*n as i64),
            TypeExpr::Ident(name) => {
                let Some(record) = self.module.find_record(name) else {
                    panic!("unknown record {name}");
                };
                let sizes = record.elems.iter().map(|e| self.texpr_size(&e.texpr));
                if record.union {
                    sizes.max().unwrap_or(0)
                } else {
                    sizes.sum()
                }
            }
        }
    }

    fn member_offset(&self, record_name: &str, member: &str) -> i64 {
        let Some(record) = self.module.find_record(record_name) else {
            panic!("unknown record {record_name}");
        };
        if record.union {
            return 0;
        }
        let mut offset = 0;
        for elem in &record.elems {
            if elem.ident == member {
                return offset;
            }
            offset += self.texpr_size(&elem.texpr);
        }
        panic!("unknown member {member} of {record_name}");
    }

    /// Run a procedure to completion; `Some` for `retv`, `None` for a
    /// plain `ret`.
    pub fn run(&mut self, proc_name: &str, args: &[Value]) -> Option<Value> {
        let module = self.module;
        let Some(proc) = module.find_proc(proc_name) else {
            panic!("unknown procedure {proc_name}");
        };
        let Some(body) = &proc.body else {
            panic!("procedure {proc_name} is extern");
        };
        let frame = self.next_frame;
        self.next_frame += 1;

        let mut regs: HashMap<String, Value> = HashMap::new();
        for (arg, value) in proc.args.iter().zip(args) {
            regs.insert(arg.ident.clone(), value.clone());
        }

        let local_base =
            |ident: &str| -> String { format!("frame{frame}:{ident}") };
        let labels: HashMap<&str, usize> = body
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.label.as_deref().map(|l| (l, i)))
            .collect();

        let oper_name = |oper: &Option<Oper>| -> String {
            match oper {
                Some(Oper::Var(name)) => name.clone(),
                other => panic!("expected a name operand, got {other:?}"),
            }
        };

        let mut pc = 0usize;
        let mut steps = 0u64;
        while pc < body.entries.len() {
            steps += 1;
            assert!(steps < 1_000_000, "{proc_name} does not terminate");
            let Some(instr) = &body.entries[pc].instr else {
                pc += 1;
                continue;
            };
            let reg = |oper: &Option<Oper>| -> Value {
                match oper {
                    Some(Oper::Var(name)) => match regs.get(name) {
                        Some(value) => value.clone(),
                        None => panic!("read of unset register {name}"),
                    },
                    other => panic!("expected a register operand, got {other:?}"),
                }
            };
            let set = |regs: &mut HashMap<String, Value>, value: Value| {
                regs.insert(oper_name(&instr.dest), value);
            };

            match instr.kind {
                InstrKind::Imm => {
                    let Some(Oper::Imm(v)) = instr.op1 else {
                        panic!("imm without immediate");
                    };
                    set(&mut regs, Value::Int(sext(instr.width, v)));
                }
                InstrKind::VarPtr => {
                    set(&mut regs, Value::Addr(oper_name(&instr.op1), 0));
                }
                InstrKind::LVarPtr => {
                    set(
                        &mut regs,
                        Value::Addr(local_base(&oper_name(&instr.op1)), 0),
                    );
                }
                InstrKind::Read => {
                    let Value::Addr(base, off) = reg(&instr.op1) else {
                        panic!("read through a non-address");
                    };
                    let value = self
                        .mem
                        .get(&(base, off))
                        .cloned()
                        .unwrap_or(Value::Int(0));
                    set(&mut regs, value);
                }
                InstrKind::Write => {
                    let Value::Addr(base, off) = reg(&instr.op1) else {
                        panic!("write through a non-address");
                    };
                    let value = reg(&instr.op2);
                    self.mem.insert((base, off), value);
                }
                InstrKind::RecMbr => {
                    let Value::Addr(base, off) = reg(&instr.op1) else {
                        panic!("recmbr on a non-address");
                    };
                    let member = oper_name(&instr.op2);
                    let Some(TypeExpr::Ident(record_name)) = &instr.texpr else {
                        panic!("recmbr without a record type");
                    };
                    let delta = self.member_offset(record_name, &member);
                    set(&mut regs, Value::Addr(base, off + delta));
                }
                InstrKind::PtrIdx => {
                    let Value::Addr(base, off) = reg(&instr.op1) else {
                        panic!("ptridx on a non-address");
                    };
                    let idx = reg(&instr.op2).as_int();
                    let Some(texpr) = &instr.texpr else {
                        panic!("ptridx without an element type");
                    };
                    let scale = self.texpr_size(texpr);
                    set(&mut regs, Value::Addr(base, off + idx * scale));
                }
                InstrKind::Add
                | InstrKind::Sub
                | InstrKind::Mul
                | InstrKind::And
                | InstrKind::Or
                | InstrKind::Xor
                | InstrKind::Shl
                | InstrKind::Shra
                | InstrKind::Shrl => {
                    let a = reg(&instr.op1).as_int();
                    let b = reg(&instr.op2).as_int();
                    let w = instr.width;
                    let out = match instr.kind {
                        InstrKind::Add => a.wrapping_add(b),
                        InstrKind::Sub => a.wrapping_sub(b),
                        InstrKind::Mul => a.wrapping_mul(b),
                        InstrKind::And => a & b,
                        InstrKind::Or => a | b,
                        InstrKind::Xor => a ^ b,
                        InstrKind::Shl => a.wrapping_shl(b as u32),
                        InstrKind::Shra => a.wrapping_shr(b as u32),
                        _ => (zext(w, a) >> (b as u32 % 64)) as i64,
                    };
                    set(&mut regs, Value::Int(sext(w, out)));
                }
                InstrKind::Neg => {
                    let a = reg(&instr.op1).as_int();
                    set(&mut regs, Value::Int(sext(instr.width, a.wrapping_neg())));
                }
                InstrKind::BNot => {
                    let a = reg(&instr.op1).as_int();
                    set(&mut regs, Value::Int(sext(instr.width, !a)));
                }
                InstrKind::Trunc | InstrKind::SgnExt => {
                    let a = reg(&instr.op1).as_int();
                    set(&mut regs, Value::Int(sext(instr.width, a)));
                }
                InstrKind::ZrExt => {
                    let a = reg(&instr.op1).as_int();
                    set(&mut regs, Value::Int(zext(instr.width, a) as i64));
                }
                InstrKind::Eq
                | InstrKind::NEq
                | InstrKind::Lt
                | InstrKind::LtEq
                | InstrKind::Gt
                | InstrKind::GtEq
                | InstrKind::LtU
                | InstrKind::LtEqU
                | InstrKind::GtU
                | InstrKind::GtEqU => {
                    let lhs = reg(&instr.op1);
                    let rhs = reg(&instr.op2);
                    let w = instr.width;
                    let holds = match instr.kind {
                        InstrKind::Eq => lhs == rhs,
                        InstrKind::NEq => lhs != rhs,
                        InstrKind::Lt => lhs.as_int() < rhs.as_int(),
                        InstrKind::LtEq => lhs.as_int() <= rhs.as_int(),
                        InstrKind::Gt => lhs.as_int() > rhs.as_int(),
                        InstrKind::GtEq => lhs.as_int() >= rhs.as_int(),
                        InstrKind::LtU => zext(w, lhs.as_int()) < zext(w, rhs.as_int()),
                        InstrKind::LtEqU => zext(w, lhs.as_int()) <= zext(w, rhs.as_int()),
                        InstrKind::GtU => zext(w, lhs.as_int()) > zext(w, rhs.as_int()),
                        _ => zext(w, lhs.as_int()) >= zext(w, rhs.as_int()),
                    };
                    set(&mut regs, Value::Int(i64::from(holds)));
                }
                InstrKind::Nop => {}
                InstrKind::Call => {
                    let callee = oper_name(&instr.op1);
                    let arg_values: Vec<Value> = match &instr.op2 {
                        Some(Oper::List(opers)) => opers
                            .iter()
                            .map(|o| match o {
                                Oper::Var(name) => match regs.get(name) {
                                    Some(value) => value.clone(),
                                    None => panic!("unset call argument {name}"),
                                },
                                other => panic!("bad call argument {other:?}"),
                            })
                            .collect(),
                        _ => Vec::new(),
                    };
                    let result = self.run(&callee, &arg_values);
                    if instr.dest.is_some() {
                        let Some(value) = result else {
                            panic!("void call used as a value");
                        };
                        regs.insert(oper_name(&instr.dest), value);
                    }
                }
                InstrKind::Jmp => {
                    let target = oper_name(&instr.op1);
                    pc = *labels
                        .get(target.as_str())
                        .unwrap_or_else(|| panic!("jump to unknown label {target}"));
                    continue;
                }
                InstrKind::Jz | InstrKind::Jnz => {
                    let cond = reg(&instr.op1).as_int();
                    let taken = (cond == 0) == (instr.kind == InstrKind::Jz);
                    if taken {
                        let target = oper_name(&instr.op2);
                        pc = *labels
                            .get(target.as_str())
                            .unwrap_or_else(|| panic!("jump to unknown label {target}"));
                        continue;
                    }
                }
                InstrKind::Ret => return None,
                InstrKind::RetV => return Some(reg(&instr.op1)),
                InstrKind::RecCopy => panic!("reccopy not supported by the test interpreter"),
            }
            pc += 1;
        }
        None
    }
}

/// Compile and run `@main`, returning its integer result.
pub fn run_main(module: &Module) -> i64 {
    let mut interp = Interp::new(module);
    match interp.run("@main", &[]) {
        Some(Value::Int(v)) => v,
        other => panic!("main returned {other:?}"),
    }
}

/// Convenience: the defined (non-extern) procedures of a module.
pub fn defined_procs(module: &Module) -> Vec<&Proc> {
    module
        .decls
        .iter()
        .filter_map(|d| match d {
            Decl::Proc(p) if !p.is_extern() => Some(p),
            _ => None,
        })
        .collect()
}
