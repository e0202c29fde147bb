//! Graphviz DOT rendering.

use std::io::{self, Write};

use crate::fsm::Automaton;

/// Serialize an automaton as a DOT digraph.
///
/// Nodes are visited in breadth-first order from the start node and each
/// node's edges in transition-list order, so the output is byte-stable
/// for a given automaton. Accepting states are drawn as double circles.
/// Duplicate edges and self-loops are written as-is; the automaton is not
/// modified.
pub fn render<W: Write>(automaton: &Automaton, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph CFG {{")?;
    writeln!(out, "    rankdir=LR;")?;
    writeln!(out, "    node [shape=circle];")?;

    let order = automaton.reachable_from(automaton.start());
    for &id in &order {
        if automaton.node(id).is_accepting() {
            writeln!(out, "    {id} [shape=doublecircle];")?;
        }
    }
    for &id in &order {
        for transition in automaton.node(id).transitions() {
            writeln!(
                out,
                "    {} -> {} [label=\"{}\"];",
                id,
                transition.target,
                automaton.label(transition.symbol)
            )?;
        }
    }

    writeln!(out, "}}")
}

/// Render into a `String`.
pub fn render_to_string(automaton: &Automaton) -> String {
    let mut buf = Vec::new();
    render(automaton, &mut buf).expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("DOT output is UTF-8")
}
