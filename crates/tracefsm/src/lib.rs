//! Finite-automaton modeling of observable call and syscall behavior.
//!
//! A module's control/call structure (a [`summary::ModuleSummary`]) is
//! turned into an ε-NFA whose labeled transitions are observable events
//! (`call:<name>`, `syscall(<nr>)`, `dummy_syscall(<nr>)`, `ret:<name>`),
//! simplified by ε elimination and subset-construction state merging, and
//! rendered as Graphviz DOT:
//!
//! ```
//! use tracefsm::{dot, fsm, libc_call_automaton, LibcCalls};
//! # use tracefsm::{BlockSummary, CallEvent, FunctionSummary, ModuleSummary};
//! # let module = ModuleSummary {
//! #     name: "demo".to_owned(),
//! #     functions: vec![FunctionSummary {
//! #         name: "main".to_owned(),
//! #         blocks: vec![BlockSummary {
//! #             events: vec![CallEvent::Call { callee: "exit".to_owned() }],
//! #             successors: vec![],
//! #             returns: true,
//! #         }],
//! #     }],
//! # };
//!
//! let mut automaton = libc_call_automaton(&module, &LibcCalls::default())?;
//! fsm::remove_epsilon_transitions(&mut automaton);
//! let merged = fsm::merge_equivalent_states(automaton);
//! let rendered = dot::render_to_string(&merged);
//! # assert!(rendered.starts_with("digraph CFG {"));
//! # Ok::<(), tracefsm::BuildError>(())
//! ```

pub mod builder;
pub mod classify;
pub mod dot;
pub mod error;
pub mod fsm;
pub mod instrument;
pub mod summary;

pub use builder::{libc_call_automaton, syscall_automaton};
pub use classify::{is_exit_call, LibcCalls, SyscallTable, EXIT_CALLS};
pub use error::BuildError;
pub use fsm::{
    epsilon_closure, merge_equivalent_states, remove_epsilon_transitions, Automaton, NodeId,
    NodeSet, SymbolId, EPSILON,
};
pub use instrument::insert_probes;
pub use summary::{BlockSummary, CallEvent, FunctionSummary, ModuleSummary};
