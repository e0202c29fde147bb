//! Epsilon-transition elimination.

use tracing::debug;

use crate::fsm::closure::epsilon_closure;
use crate::fsm::graph::{Automaton, Transition};
use crate::fsm::state::NodeId;
use crate::fsm::symbol::is_epsilon;

/// Rewrite every node reachable from the start node so that its transition
/// list contains exactly the non-ε transitions found on any member of its
/// ε-closure. ε edges are dropped.
///
/// All closures are computed against the un-rewritten graph before any
/// node is touched, so the result does not depend on node processing
/// order. Within one node, closure members contribute their edges in
/// ascending id order; duplicate labeled edges contributed by distinct
/// members are kept.
///
/// Idempotent: once no ε edge remains, every closure is the singleton
/// `{n}` and the rewrite is the identity. A node whose closure contributes
/// no non-ε transition ends with an empty transition list (a dead end
/// unless accepting).
pub fn remove_epsilon_transitions(automaton: &mut Automaton) {
    let order = automaton.reachable_from(automaton.start());

    let mut rewrites: Vec<(NodeId, Vec<Transition>)> = Vec::with_capacity(order.len());
    for &id in &order {
        let closure = epsilon_closure(automaton, id);
        let mut edges = Vec::new();
        for member in closure.iter() {
            for transition in automaton.node(member).transitions() {
                if !is_epsilon(transition.symbol) {
                    edges.push(*transition);
                }
            }
        }
        rewrites.push((id, edges));
    }

    for (id, edges) in rewrites {
        automaton.set_transitions(id, edges);
    }
    debug!(nodes = order.len(), "eliminated epsilon transitions");
}
