//! Code generator context.
//!
//! One [`Cgen`] per translation unit holds the registries, the scope
//! stack, the symbol directory, the diagnostic queue, and the IR module
//! under construction. One [`ProcCtx`] per function definition holds
//! everything procedure-local: the goto label table, the loop/switch
//! tracking stacks, and the virtual-register and label counters.

use mcc_ast::SrcSpan;
use mcc_diagnostic::DiagQueue;
use mcc_ir::{Module, ProcVar, TypeExpr};
use mcc_types::{
    CType, EnumStore, LabelTable, RecordStore, Scopes, SymbolStore, ENUM_WIDTH, PTR_WIDTH,
};
use rustc_hash::FxHashMap;

use crate::eres::ExprRes;

/// A subtree was diagnosed and abandoned.
///
/// This is not a fatal condition: the offending error is already in the
/// diagnostic queue and the caller resumes at the next recovery point
/// (the module driver resumes at the next top-level declaration).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Abandoned;

/// Result of one code-generation step.
pub type CgResult<T> = Result<T, Abandoned>;

/// Translation-unit-wide code generator state.
#[derive(Debug)]
pub struct Cgen {
    pub records: RecordStore,
    pub enums: EnumStore,
    pub scopes: Scopes,
    pub symbols: SymbolStore,
    pub diags: DiagQueue,
    /// IR module under construction.
    pub module: Module,
    /// Constant-expression mode (array sizes, case labels, enum values,
    /// global initializers).
    pub cexpr: bool,
    anon_counter: u32,
}

impl Cgen {
    /// Create the context for one translation unit.
    pub fn new(module_name: &str) -> Self {
        Cgen {
            records: RecordStore::new(),
            enums: EnumStore::new(),
            scopes: Scopes::new(),
            symbols: SymbolStore::new(),
            diags: DiagQueue::new(),
            module: Module::new(module_name),
            cexpr: false,
            anon_counter: 0,
        }
    }

    /// Report a semantic error and abandon the subtree.
    pub fn error<T>(&mut self, span: SrcSpan, message: impl Into<String>) -> CgResult<T> {
        self.diags.error(span, message);
        Err(Abandoned)
    }

    /// Synthesize a fresh IR tag identifier for an anonymous record or
    /// enum.
    pub fn anon_irident(&mut self) -> String {
        self.anon_counter += 1;
        format!("@@anon{}", self.anon_counter)
    }

    /// Machine-level type expression of a C type.
    ///
    /// Only meaningful for object types; function types never reach
    /// data layout.
    pub fn texpr(&self, ty: &CType) -> TypeExpr {
        match ty {
            CType::Basic(e) => TypeExpr::Int(e.width().max(8)),
            CType::Pointer(_) | CType::Func(_) => TypeExpr::Ptr(PTR_WIDTH),
            CType::Enum(_) => TypeExpr::Int(ENUM_WIDTH),
            CType::Array(a) => {
                TypeExpr::Array(Box::new(self.texpr(&a.elem)), a.size.unwrap_or(0))
            }
            CType::Record(rid) => TypeExpr::ident(self.records.get(*rid).irident.clone()),
        }
    }

    /// Run `f` inside a fresh nested scope; the scope is popped on
    /// every exit path, after the unused-identifier pass.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Cgen) -> T) -> T {
        self.scopes.push();
        let result = f(self);
        self.unused_pass();
        self.scopes.pop();
        result
    }

    /// Warn for every unused variable or parameter of the innermost
    /// scope, in declaration order.
    pub fn unused_pass(&mut self) {
        use mcc_types::ScopeMemberKind;
        let mut found = Vec::new();
        for member in self.scopes.current().members() {
            if member.used {
                continue;
            }
            match member.kind {
                ScopeMemberKind::LocalVar { .. } => {
                    found.push((
                        member.ident.span.clone(),
                        format!("Unused variable '{}'.", member.ident.text),
                    ));
                }
                ScopeMemberKind::Arg { .. } => {
                    found.push((
                        member.ident.span.clone(),
                        format!("Unused parameter '{}'.", member.ident.text),
                    ));
                }
                ScopeMemberKind::GlobalSym(_)
                | ScopeMemberKind::Typedef
                | ScopeMemberKind::EnumElem { .. } => {}
            }
        }
        for (span, message) in found {
            self.diags.warn(span, message);
        }
    }
}

/// Tracking record of one enclosing loop.
#[derive(Clone, Debug)]
pub struct LoopInfo {
    /// Target of `continue`.
    pub continue_label: String,
}

/// Tracking record of one enclosing loop or switch.
#[derive(Clone, Debug)]
pub struct BreakInfo {
    /// Target of `break`.
    pub break_label: String,
}

/// Tracking record of one enclosing switch.
#[derive(Clone, Debug)]
pub struct SwitchInfo {
    /// The controlling expression's r-value.
    pub sexpr: ExprRes,
    /// Pending compare label for the next case.
    pub next_cmp: String,
    /// Pending body label for the next case.
    pub next_body: String,
    pub default_label: Option<String>,
    /// Case values already seen.
    pub seen: Vec<i64>,
}

/// Per-procedure code generator state.
#[derive(Debug)]
pub struct ProcCtx {
    /// Declared return type of the procedure.
    pub rtype: CType,
    pub labels: LabelTable,
    /// IR local variable slots, in allocation order.
    pub lvars: Vec<ProcVar>,
    loops: Vec<LoopInfo>,
    breakables: Vec<BreakInfo>,
    switches: Vec<SwitchInfo>,
    lvar_names: FxHashMap<String, u32>,
    next_vreg: u32,
    next_label: u32,
}

impl ProcCtx {
    /// State for a fresh procedure.
    pub fn new(rtype: CType) -> Self {
        ProcCtx {
            rtype,
            labels: LabelTable::new(),
            lvars: Vec::new(),
            loops: Vec::new(),
            breakables: Vec::new(),
            switches: Vec::new(),
            lvar_names: FxHashMap::default(),
            next_vreg: 0,
            next_label: 0,
        }
    }

    /// Scratch state for expression walks outside any procedure
    /// (constant expressions at file scope, `sizeof` operands).
    pub fn scratch() -> Self {
        ProcCtx::new(CType::int())
    }

    /// Allocate a fresh virtual register.
    pub fn new_vreg(&mut self) -> String {
        let n = self.next_vreg;
        self.next_vreg += 1;
        format!("%{n}")
    }

    /// Allocate a fresh label from a stem (`%end_if3`).
    pub fn new_label(&mut self, stem: &str) -> String {
        let n = self.next_label;
        self.next_label += 1;
        format!("%{stem}{n}")
    }

    /// Goto labels live in a reserved namespace derived from the C
    /// identifier; generated labels never start with `_`.
    pub fn goto_label(ident: &str) -> String {
        format!("%_{ident}")
    }

    /// Allocate an IR slot name for a local variable, mangling repeats
    /// of the same C name within one procedure (`%i`, `%1@i`, `%2@i`).
    pub fn mangle_lvar(&mut self, name: &str) -> String {
        let count = self.lvar_names.entry(name.to_string()).or_insert(0);
        let vident = if *count == 0 {
            format!("%{name}")
        } else {
            format!("%{count}@{name}")
        };
        *count += 1;
        vident
    }

    /// Enter a loop: `continue` and `break` targets.
    pub fn push_loop(&mut self, continue_label: String, break_label: String) {
        self.loops.push(LoopInfo { continue_label });
        self.breakables.push(BreakInfo { break_label });
    }

    /// Leave the innermost loop.
    pub fn pop_loop(&mut self) {
        self.loops.pop();
        self.breakables.pop();
    }

    /// Enter a switch: `break` target plus the switch tracking record.
    pub fn push_switch(&mut self, info: SwitchInfo, break_label: String) {
        self.switches.push(info);
        self.breakables.push(BreakInfo { break_label });
    }

    /// Leave the innermost switch, returning its tracking record.
    pub fn pop_switch(&mut self) -> Option<SwitchInfo> {
        self.breakables.pop();
        self.switches.pop()
    }

    /// Innermost loop, if any.
    pub fn innermost_loop(&self) -> Option<&LoopInfo> {
        self.loops.last()
    }

    /// Innermost loop-or-switch, if any.
    pub fn innermost_breakable(&self) -> Option<&BreakInfo> {
        self.breakables.last()
    }

    /// Innermost switch, if any.
    pub fn innermost_switch(&mut self) -> Option<&mut SwitchInfo> {
        self.switches.last_mut()
    }
}

#[cfg(test)]
mod tests;
