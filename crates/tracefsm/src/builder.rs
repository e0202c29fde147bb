//! Automaton construction from module summaries.
//!
//! Two flavors share one skeleton: the libc-call automaton observes calls
//! and returns, the syscall automaton observes syscalls and probes only.
//! Both produce an ε-NFA meant to be fed through
//! [`remove_epsilon_transitions`](crate::fsm::remove_epsilon_transitions)
//! and [`merge_equivalent_states`](crate::fsm::merge_equivalent_states).

use std::collections::HashMap;

use tracing::debug;

use crate::classify::{is_exit_call, LibcCalls};
use crate::error::BuildError;
use crate::fsm::{Automaton, NodeId};
use crate::summary::{CallEvent, ModuleSummary};

/// Which events the constructed automaton observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    /// Observe libc and intra-module calls plus returns.
    Calls,
    /// Observe syscalls and instrumentation probes only.
    Syscalls,
}

/// Build the libc-call automaton of a module.
///
/// One node per (function, block) plus a shared exit node per defined
/// function; the start node steps silently into `main`'s entry. Calls to
/// defined functions are labeled `call:<name>` into the callee's entry,
/// with a silent resume edge from the callee's exit; libc externals are
/// labeled `call:<name>` (the successor node is accepting for exit-like
/// calls); other externals are silent. Returning blocks step `ret:<name>`
/// into the function's exit node; `main`'s exit node is accepting.
pub fn libc_call_automaton(
    module: &ModuleSummary,
    libc: &LibcCalls,
) -> Result<Automaton, BuildError> {
    Builder::new(module, libc, Flavor::Calls).build()
}

/// Build the syscall automaton of a module.
///
/// Same skeleton as [`libc_call_automaton`], but only `syscall(<nr>)` and
/// `dummy_syscall(<nr>)` events are observable: every call is a silent
/// step (into the callee's entry when it is defined), returns are silent,
/// and an exit-like libc call ends the trace by marking the program point
/// it is reached at as accepting.
pub fn syscall_automaton(
    module: &ModuleSummary,
    libc: &LibcCalls,
) -> Result<Automaton, BuildError> {
    Builder::new(module, libc, Flavor::Syscalls).build()
}

struct Builder<'a> {
    module: &'a ModuleSummary,
    libc: &'a LibcCalls,
    flavor: Flavor,
    automaton: Automaton,
    /// (function index, block index) -> node.
    block_nodes: HashMap<(usize, usize), NodeId>,
    /// Function index -> shared exit node.
    exit_nodes: HashMap<usize, NodeId>,
    /// Defined function name -> function index.
    defined: HashMap<&'a str, usize>,
}

impl<'a> Builder<'a> {
    fn new(module: &'a ModuleSummary, libc: &'a LibcCalls, flavor: Flavor) -> Self {
        Builder {
            module,
            libc,
            flavor,
            automaton: Automaton::new(),
            block_nodes: HashMap::new(),
            exit_nodes: HashMap::new(),
            defined: HashMap::new(),
        }
    }

    fn build(mut self) -> Result<Automaton, BuildError> {
        let module = self.module;

        // Entry nodes first, then exit nodes; the fixed creation order
        // fixes node ids for a given module.
        for (f, func) in module.functions.iter().enumerate() {
            if func.blocks.is_empty() {
                continue;
            }
            let entry = self.automaton.add_node(false);
            self.block_nodes.insert((f, 0), entry);
            self.defined.insert(func.name.as_str(), f);
        }
        for (f, func) in module.functions.iter().enumerate() {
            if func.blocks.is_empty() {
                continue;
            }
            let exit = self.automaton.add_node(false);
            self.exit_nodes.insert(f, exit);
        }

        let main = *self.defined.get("main").ok_or(BuildError::MissingMain)?;
        self.automaton.set_accepting(self.exit_nodes[&main], true);
        let main_entry = self.block_nodes[&(main, 0)];
        let start = self.automaton.start();
        self.automaton.add_epsilon_transition(start, main_entry);

        for (f, func) in module.functions.iter().enumerate() {
            for (b, block) in func.blocks.iter().enumerate() {
                let last = self.scan_block(f, b);

                if block.returns {
                    let exit = self.exit_nodes[&f];
                    match self.flavor {
                        Flavor::Calls => {
                            let label = format!("ret:{}", func.name);
                            self.automaton.add_transition(last, &label, exit);
                        }
                        Flavor::Syscalls => {
                            self.automaton.add_epsilon_transition(last, exit);
                        }
                    }
                }

                for &succ in &block.successors {
                    if succ >= func.blocks.len() {
                        return Err(BuildError::BadSuccessor {
                            function: func.name.clone(),
                            block: b,
                            index: succ,
                        });
                    }
                    let node = self.block_node(f, succ);
                    self.automaton.add_epsilon_transition(last, node);
                }
            }
        }

        debug!(
            module = %module.name,
            nodes = self.automaton.node_count(),
            "built automaton"
        );
        Ok(self.automaton)
    }

    /// Walk one block's events, threading the current node through each
    /// observation point. Returns the node the block ends on.
    fn scan_block(&mut self, f: usize, b: usize) -> NodeId {
        let module = self.module;
        let func = &module.functions[f];
        let entry = self.block_nodes[&(f, 0)];
        let mut current = self.block_node(f, b);

        for event in &func.blocks[b].events {
            current = match event {
                CallEvent::Syscall { nr } => self.observed(current, &format!("syscall({nr})")),
                CallEvent::Probe { nr } => {
                    self.observed(current, &format!("dummy_syscall({nr})"))
                }
                CallEvent::Call { callee } if *callee == func.name => {
                    // Direct recursion: a silent step back to our own entry.
                    self.automaton.add_epsilon_transition(current, entry);
                    current
                }
                CallEvent::Call { callee } => match self.defined.get(callee.as_str()) {
                    Some(&target) => self.defined_call(current, callee, target),
                    None => self.external_call(current, callee),
                },
            };
        }
        current
    }

    /// Step across an observable event into a fresh node.
    fn observed(&mut self, current: NodeId, label: &str) -> NodeId {
        let next = self.automaton.add_node(false);
        self.automaton.add_transition(current, label, next);
        next
    }

    /// A call into a function defined in this module: enter the callee
    /// and resume from its shared exit node.
    fn defined_call(&mut self, current: NodeId, callee: &str, target: usize) -> NodeId {
        let callee_entry = self.block_nodes[&(target, 0)];
        match self.flavor {
            Flavor::Calls => {
                let label = format!("call:{callee}");
                self.automaton.add_transition(current, &label, callee_entry);
            }
            Flavor::Syscalls => {
                self.automaton.add_epsilon_transition(current, callee_entry);
            }
        }
        let next = self.automaton.add_node(false);
        let exit = self.exit_nodes[&target];
        self.automaton.add_epsilon_transition(exit, next);
        next
    }

    /// A call to an external declaration.
    fn external_call(&mut self, current: NodeId, callee: &str) -> NodeId {
        if self.libc.is_libc(callee) {
            match self.flavor {
                Flavor::Calls => {
                    let next = self.automaton.add_node(is_exit_call(callee));
                    let label = format!("call:{callee}");
                    self.automaton.add_transition(current, &label, next);
                    next
                }
                Flavor::Syscalls => {
                    // The probe inserted ahead of the call carries the
                    // observable event; the call itself is silent. An
                    // exit-like call ends the trace: the point already
                    // reached becomes accepting. Marking a successor
                    // reached only by ε would not survive ε elimination,
                    // which rewrites transition lists but never moves
                    // accepting flags.
                    if is_exit_call(callee) {
                        self.automaton.set_accepting(current, true);
                    }
                    current
                }
            }
        } else {
            // Unknown external: a silent step.
            let next = self.automaton.add_node(false);
            self.automaton.add_epsilon_transition(current, next);
            next
        }
    }

    /// Get or create the node for a block.
    fn block_node(&mut self, f: usize, b: usize) -> NodeId {
        if let Some(&node) = self.block_nodes.get(&(f, b)) {
            return node;
        }
        let node = self.automaton.add_node(false);
        self.block_nodes.insert((f, b), node);
        node
    }
}
