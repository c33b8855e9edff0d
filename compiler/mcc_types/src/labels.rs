//! Per-procedure goto label table.

use mcc_ast::Token;
use rustc_hash::FxHashMap;

use crate::scope::AlreadyExists;

/// One goto label.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LabelEntry {
    /// First token that mentioned the label.
    pub ident: Token,
    pub defined: bool,
    pub used: bool,
}

/// Table of the goto labels of one procedure.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    labels: Vec<LabelEntry>,
    by_name: FxHashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        LabelTable::default()
    }

    /// Record a use of the label, inserting it if needed.
    pub fn use_label(&mut self, ident: &Token) {
        if let Some(&i) = self.by_name.get(&ident.text) {
            self.labels[i].used = true;
            return;
        }
        self.by_name.insert(ident.text.clone(), self.labels.len());
        self.labels.push(LabelEntry {
            ident: ident.clone(),
            defined: false,
            used: true,
        });
    }

    /// Record the definition of the label, inserting it if needed.
    /// Fails on a second definition.
    pub fn define_label(&mut self, ident: &Token) -> Result<(), AlreadyExists> {
        if let Some(&i) = self.by_name.get(&ident.text) {
            if self.labels[i].defined {
                return Err(AlreadyExists);
            }
            self.labels[i].defined = true;
            return Ok(());
        }
        self.by_name.insert(ident.text.clone(), self.labels.len());
        self.labels.push(LabelEntry {
            ident: ident.clone(),
            defined: true,
            used: false,
        });
        Ok(())
    }

    /// Iterate the labels in first-mention order.
    pub fn iter(&self) -> impl Iterator<Item = &LabelEntry> {
        self.labels.iter()
    }
}
