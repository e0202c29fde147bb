//! Breadth-first epsilon-closure computation.

use std::collections::VecDeque;

use crate::fsm::graph::Automaton;
use crate::fsm::state::{NodeId, NodeSet};
use crate::fsm::symbol::is_epsilon;

/// The set of nodes reachable from `node` by zero or more ε transitions,
/// including `node` itself.
///
/// Breadth-first: the visited set is seeded with the origin and a node is
/// never re-enqueued, so arbitrary ε cycles terminate. The returned set is
/// deterministic; its iteration order (ascending id) matters only to
/// rendering and tests.
pub fn epsilon_closure(automaton: &Automaton, node: NodeId) -> NodeSet {
    let mut closure = NodeSet::with_capacity(automaton.node_count());
    let mut queue = VecDeque::new();
    closure.insert(node);
    queue.push_back(node);

    while let Some(id) = queue.pop_front() {
        for transition in automaton.node(id).transitions() {
            if is_epsilon(transition.symbol) && closure.insert(transition.target) {
                queue.push_back(transition.target);
            }
        }
    }

    closure
}
