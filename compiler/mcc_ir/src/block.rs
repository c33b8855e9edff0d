//! Labeled instruction blocks.
//!
//! A labeled block is an ordered sequence of entries, each holding an
//! optional label and an optional instruction. Labels are branch
//! targets; the emitter inserts a label immediately before the first
//! instruction it targets.

use std::fmt;

use crate::instr::Instr;

/// One entry of a labeled block.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BlockEntry {
    pub label: Option<String>,
    pub instr: Option<Instr>,
}

/// An ordered sequence of optionally-labeled instructions.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct LabeledBlock {
    pub entries: Vec<BlockEntry>,
}

impl LabeledBlock {
    /// Create an empty block.
    pub fn new() -> Self {
        LabeledBlock::default()
    }

    /// Append an instruction.
    pub fn append(&mut self, instr: Instr) {
        self.entries.push(BlockEntry {
            label: None,
            instr: Some(instr),
        });
    }

    /// Append an instruction with a leading label.
    pub fn append_labeled(&mut self, label: impl Into<String>, instr: Instr) {
        self.entries.push(BlockEntry {
            label: Some(label.into()),
            instr: Some(instr),
        });
    }

    /// Append a bare label (the next appended instruction follows it).
    pub fn append_label(&mut self, label: impl Into<String>) {
        self.entries.push(BlockEntry {
            label: Some(label.into()),
            instr: None,
        });
    }

    /// Iterate the instructions in order, ignoring labels.
    pub fn instrs(&self) -> impl Iterator<Item = &Instr> {
        self.entries.iter().filter_map(|e| e.instr.as_ref())
    }

    /// Iterate the labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| e.label.as_deref())
    }

    /// Number of instructions (labels not counted).
    pub fn instr_count(&self) -> usize {
        self.instrs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for LabeledBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            if let Some(label) = &entry.label {
                writeln!(f, "{label}:")?;
            }
            if let Some(instr) = &entry.instr {
                writeln!(f, "\t{instr}")?;
            }
        }
        Ok(())
    }
}
