//! Summary-level probe insertion.

use tracing::debug;

use crate::classify::SyscallTable;
use crate::summary::{CallEvent, ModuleSummary};

/// Insert a [`CallEvent::Probe`] ahead of every call whose callee the
/// table maps to a probe number. Returns whether the module changed.
///
/// This mirrors what the IR-level instrumentation does to the compiled
/// program; running the syscall automaton over an instrumented summary
/// makes libc activity observable as `dummy_syscall(<nr>)` events.
pub fn insert_probes(module: &mut ModuleSummary, table: &SyscallTable) -> bool {
    let mut inserted = 0usize;
    for func in &mut module.functions {
        for block in &mut func.blocks {
            let mut i = 0;
            while i < block.events.len() {
                if let CallEvent::Call { callee } = &block.events[i] {
                    if let Some(nr) = table.lookup(callee) {
                        block.events.insert(i, CallEvent::Probe { nr });
                        inserted += 1;
                        i += 1; // skip the probe we just inserted
                    }
                }
                i += 1;
            }
        }
    }
    debug!(module = %module.name, inserted, "instrumented summary");
    inserted > 0
}
