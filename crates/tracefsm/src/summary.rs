//! Compiler-independent module summaries.
//!
//! A summary is the control/call structure an IR-level exporter records
//! per translation unit: for each defined function, its basic blocks in
//! layout order (entry first), the call events inside each block, the
//! block's successor edges, and whether it returns. External declarations
//! carry no blocks. Summaries round-trip through serde, so an exporter can
//! dump them as JSON for offline analysis.

use serde::{Deserialize, Serialize};

/// A whole translation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Module name, typically the source file stem; callers derive output
    /// file names from it.
    pub name: String,
    pub functions: Vec<FunctionSummary>,
}

impl ModuleSummary {
    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&FunctionSummary> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Whether `name` has a body in this module.
    pub fn defines(&self, name: &str) -> bool {
        self.function(name).is_some_and(|f| !f.blocks.is_empty())
    }
}

/// One function. An empty `blocks` list marks an external declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub name: String,
    /// Basic blocks in layout order; `blocks[0]` is the entry block.
    #[serde(default)]
    pub blocks: Vec<BlockSummary>,
}

/// One basic block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Call events in instruction order.
    #[serde(default)]
    pub events: Vec<CallEvent>,
    /// Indices into the owning function's `blocks`, one per terminator
    /// successor.
    #[serde(default)]
    pub successors: Vec<usize>,
    /// Whether the block ends in a return.
    #[serde(default)]
    pub returns: bool,
}

/// An observation point inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallEvent {
    /// A direct call to a named function.
    Call { callee: String },
    /// A literal `syscall(nr)` invocation.
    Syscall { nr: u64 },
    /// An instrumentation probe, labeled `dummy_syscall(nr)`.
    Probe { nr: u64 },
}
