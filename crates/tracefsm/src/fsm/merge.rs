//! Equivalent-state merging via subset construction.

use std::collections::VecDeque;

use indexmap::IndexMap;
use tracing::debug;

use crate::fsm::graph::Automaton;
use crate::fsm::state::{NodeId, NodeSet};
use crate::fsm::symbol::{is_epsilon, SymbolId};

/// Merge states with identical observable behavior, producing a fresh
/// automaton whose states are sets of input nodes.
///
/// Each new state corresponds to the set of original nodes reachable under
/// one label from some already-created state, as in the subset construction
/// for NFA→DFA conversion (no minimization follows). The new start state is
/// the set `{start}` — not its ε-closure; ε, if any edges remain, is
/// grouped like any other label. A merged state is accepting iff at least
/// one member is, and carries at most one outgoing transition per label.
///
/// Determinism: member sets are identified by their sorted-id key; out of
/// one state, edges are emitted in lexicographic label order (ε first,
/// ordered as the empty string); new ids are assigned in creation order
/// starting at 0, the start state. The input automaton is consumed — its
/// entire node set is reclaimed when this function returns — and its
/// symbol table moves into the output.
pub fn merge_equivalent_states(mut automaton: Automaton) -> Automaton {
    let original = automaton.node_count();
    let mut merged = Automaton::new();

    // Canonical sorted member-id key -> merged node id.
    let mut state_ids: IndexMap<Vec<NodeId>, NodeId> = IndexMap::new();
    let mut worklist: VecDeque<NodeSet> = VecDeque::new();

    let seed: NodeSet = [automaton.start()].into_iter().collect();
    merged.set_accepting(
        merged.start(),
        automaton.node(automaton.start()).is_accepting(),
    );
    state_ids.insert(seed.to_vec(), merged.start());
    worklist.push_back(seed);

    while let Some(members) = worklist.pop_front() {
        let current = *state_ids.get(&members.to_vec()).unwrap();

        // Union target nodes per label over every member's transitions.
        let mut groups: IndexMap<SymbolId, NodeSet> = IndexMap::new();
        for member in members.iter() {
            for transition in automaton.node(member).transitions() {
                groups
                    .entry(transition.symbol)
                    .or_insert_with(|| NodeSet::with_capacity(original))
                    .insert(transition.target);
            }
        }

        let mut ordered: Vec<(SymbolId, NodeSet)> = groups.into_iter().collect();
        ordered.sort_by(|(a, _), (b, _)| sort_key(&automaton, *a).cmp(sort_key(&automaton, *b)));

        for (symbol, targets) in ordered {
            let key = targets.to_vec();
            let target = match state_ids.get(&key) {
                Some(&id) => id,
                None => {
                    let accepting = targets.iter().any(|m| automaton.node(m).is_accepting());
                    let id = merged.add_node(accepting);
                    state_ids.insert(key, id);
                    worklist.push_back(targets);
                    id
                }
            };
            merged.push_transition(current, symbol, target);
        }
    }

    merged.set_symbols(automaton.take_symbols());
    debug!(original, merged = merged.node_count(), "merged equivalent states");
    // `automaton` drops here, reclaiming the original node set.
    merged
}

fn sort_key(automaton: &Automaton, symbol: SymbolId) -> &str {
    if is_epsilon(symbol) {
        ""
    } else {
        automaton.label(symbol)
    }
}
