//! The automaton graph: an arena of nodes with labeled transitions.

use std::collections::VecDeque;

use tracing::debug;

use crate::fsm::state::{NodeId, NodeSet};
use crate::fsm::symbol::{SymbolId, SymbolTable, EPSILON};

/// A single labeled edge to a target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub symbol: SymbolId,
    pub target: NodeId,
}

/// One automaton state: a program point with its outgoing edges.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    accepting: bool,
    transitions: Vec<Transition>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whether this node marks a terminal observable condition
    /// (process exit or abort).
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Outgoing transitions in insertion order. Parallel edges and
    /// self-loops are legal.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

/// A nondeterministic finite automaton over observable-event labels.
///
/// The arena owns every node by value and nodes reference each other only
/// by id, so cycles (loops, recursive calls) need no ownership cycle and
/// reclamation is dropping or clearing the arena. Node 0 is the designated
/// start node and exists from construction on; ids are assigned
/// sequentially and are reassigned from 0 whenever a transformation
/// produces a fresh automaton.
#[derive(Debug, Clone)]
pub struct Automaton {
    nodes: Vec<Node>,
    symbols: SymbolTable,
}

impl Automaton {
    /// Create an automaton holding a single non-accepting start node.
    pub fn new() -> Self {
        let mut automaton = Automaton {
            nodes: Vec::new(),
            symbols: SymbolTable::new(),
        };
        automaton.add_node(false);
        automaton
    }

    /// The designated start node. Always node 0.
    pub fn start(&self) -> NodeId {
        0
    }

    /// Append a fresh node, assigning the next sequential id.
    pub fn add_node(&mut self, accepting: bool) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            id,
            accepting,
            transitions: Vec::new(),
        });
        id
    }

    /// Number of nodes in the arena, reachable or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Borrow a node. Out-of-range ids are a precondition violation.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// Flip a node's accepting flag.
    pub fn set_accepting(&mut self, id: NodeId, accepting: bool) {
        self.nodes[id as usize].accepting = accepting;
    }

    /// Append an event-labeled transition. Appends without deduplication.
    /// The label must name an observable event; ε goes through
    /// [`add_epsilon_transition`](Self::add_epsilon_transition).
    pub fn add_transition(&mut self, from: NodeId, label: &str, to: NodeId) {
        assert!(
            (to as usize) < self.nodes.len(),
            "transition target {to} out of range"
        );
        let symbol = self.symbols.intern(label);
        self.nodes[from as usize]
            .transitions
            .push(Transition { symbol, target: to });
    }

    /// Append an ε (silent control-flow) transition.
    pub fn add_epsilon_transition(&mut self, from: NodeId, to: NodeId) {
        assert!(
            (to as usize) < self.nodes.len(),
            "transition target {to} out of range"
        );
        self.nodes[from as usize].transitions.push(Transition {
            symbol: EPSILON,
            target: to,
        });
    }

    /// The label text of a transition symbol. ε renders as `"ε"`.
    pub fn label(&self, symbol: SymbolId) -> &str {
        self.symbols.text(symbol)
    }

    /// Every node reachable from `from` via any transition (ε or labeled),
    /// in breadth-first discovery order. The order is deterministic: first
    /// discovered, first expanded.
    pub fn reachable_from(&self, from: NodeId) -> Vec<NodeId> {
        assert!((from as usize) < self.nodes.len(), "node {from} out of range");
        let mut order = Vec::new();
        let mut seen = NodeSet::with_capacity(self.nodes.len());
        let mut queue = VecDeque::new();
        seen.insert(from);
        queue.push_back(from);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for transition in self.nodes[id as usize].transitions.iter() {
                if seen.insert(transition.target) {
                    queue.push_back(transition.target);
                }
            }
        }
        order
    }

    /// Release every node and reset id assignment, re-seeding a fresh
    /// non-accepting start node.
    ///
    /// The arena owns all nodes, so this also releases nodes that were not
    /// reachable from the start; the reachable count is reported for
    /// diagnostics only.
    pub fn clear(&mut self) {
        let reachable = self.reachable_from(self.start()).len();
        debug!(reachable, total = self.nodes.len(), "clearing automaton");
        self.nodes.clear();
        self.add_node(false);
    }

    /// Replace a node's transition list wholesale. Used by the epsilon
    /// eliminator's in-place rewrite.
    pub(crate) fn set_transitions(&mut self, id: NodeId, transitions: Vec<Transition>) {
        self.nodes[id as usize].transitions = transitions;
    }

    /// Append a transition by raw symbol id. The id must come from this
    /// automaton's own symbol table (or the table about to be adopted).
    pub(crate) fn push_transition(&mut self, from: NodeId, symbol: SymbolId, to: NodeId) {
        self.nodes[from as usize]
            .transitions
            .push(Transition { symbol, target: to });
    }

    /// Move this automaton's symbol table out, leaving an empty one.
    pub(crate) fn take_symbols(&mut self) -> SymbolTable {
        std::mem::take(&mut self.symbols)
    }

    /// Install a symbol table; transitions added by raw id resolve
    /// through it.
    pub(crate) fn set_symbols(&mut self, symbols: SymbolTable) {
        self.symbols = symbols;
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::symbol::is_epsilon;

    #[test]
    fn test_new_automaton_has_start_node() {
        let automaton = Automaton::new();
        assert_eq!(automaton.node_count(), 1);
        assert_eq!(automaton.start(), 0);
        assert!(!automaton.node(0).is_accepting());
        assert!(automaton.node(0).transitions().is_empty());
    }

    #[test]
    fn test_sequential_ids() {
        let mut automaton = Automaton::new();
        assert_eq!(automaton.add_node(false), 1);
        assert_eq!(automaton.add_node(true), 2);
        assert!(automaton.node(2).is_accepting());
    }

    #[test]
    fn test_duplicate_transitions_are_kept() {
        let mut automaton = Automaton::new();
        let a = automaton.add_node(false);
        automaton.add_transition(0, "call:read", a);
        automaton.add_transition(0, "call:read", a);
        assert_eq!(automaton.node(0).transitions().len(), 2);
    }

    #[test]
    fn test_epsilon_transition_symbol() {
        let mut automaton = Automaton::new();
        let a = automaton.add_node(false);
        automaton.add_epsilon_transition(0, a);
        let transition = automaton.node(0).transitions()[0];
        assert!(is_epsilon(transition.symbol));
        assert_eq!(automaton.label(transition.symbol), "ε");
    }

    #[test]
    fn test_reachable_bfs_order() {
        // 0 -> 1 -> 3, 0 -> 2, 3 -> 0 (cycle back)
        let mut automaton = Automaton::new();
        let n1 = automaton.add_node(false);
        let n2 = automaton.add_node(false);
        let n3 = automaton.add_node(false);
        automaton.add_epsilon_transition(0, n1);
        automaton.add_epsilon_transition(0, n2);
        automaton.add_epsilon_transition(n1, n3);
        automaton.add_epsilon_transition(n3, 0);

        assert_eq!(automaton.reachable_from(0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unreachable_nodes_are_not_enumerated() {
        let mut automaton = Automaton::new();
        let n1 = automaton.add_node(false);
        automaton.add_node(false); // no edge to it
        automaton.add_epsilon_transition(0, n1);

        assert_eq!(automaton.reachable_from(0), vec![0, 1]);
        assert_eq!(automaton.node_count(), 3);
    }

    #[test]
    fn test_clear_resets_arena() {
        let mut automaton = Automaton::new();
        let a = automaton.add_node(true);
        automaton.add_transition(0, "call:exit", a);
        automaton.add_epsilon_transition(a, 0);

        automaton.clear();
        assert_eq!(automaton.node_count(), 1);
        assert!(automaton.node(0).transitions().is_empty());
        assert_eq!(automaton.add_node(false), 1);
    }

    #[test]
    #[should_panic]
    fn test_transition_to_missing_node_panics() {
        let mut automaton = Automaton::new();
        automaton.add_transition(0, "call:read", 7);
    }
}
