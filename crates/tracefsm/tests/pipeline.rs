//! End-to-end pipeline tests: summary -> build -> eliminate -> merge ->
//! render.

use pretty_assertions::assert_eq;

use tracefsm::fsm::{merge_equivalent_states, remove_epsilon_transitions};
use tracefsm::{
    dot, insert_probes, libc_call_automaton, syscall_automaton, BlockSummary, CallEvent,
    FunctionSummary, LibcCalls, ModuleSummary, SyscallTable,
};

fn call(callee: &str) -> CallEvent {
    CallEvent::Call {
        callee: callee.to_owned(),
    }
}

fn block(events: Vec<CallEvent>, successors: Vec<usize>, returns: bool) -> BlockSummary {
    BlockSummary {
        events,
        successors,
        returns,
    }
}

/// main { write(); exit(); return }
fn linear_module() -> ModuleSummary {
    ModuleSummary {
        name: "linear".to_owned(),
        functions: vec![FunctionSummary {
            name: "main".to_owned(),
            blocks: vec![block(vec![call("write"), call("exit")], vec![], true)],
        }],
    }
}

/// main branches into two arms that both call write, then join on a block
/// calling exit.
fn diamond_module() -> ModuleSummary {
    ModuleSummary {
        name: "diamond".to_owned(),
        functions: vec![FunctionSummary {
            name: "main".to_owned(),
            blocks: vec![
                block(vec![], vec![1, 2], false),
                block(vec![call("write")], vec![3], false),
                block(vec![call("write")], vec![3], false),
                block(vec![call("exit")], vec![], true),
            ],
        }],
    }
}

#[test]
fn libc_pipeline_renders_linear_trace() {
    let libc = LibcCalls::default();
    let mut automaton = libc_call_automaton(&linear_module(), &libc).unwrap();
    remove_epsilon_transitions(&mut automaton);
    let merged = merge_equivalent_states(automaton);

    assert_eq!(
        dot::render_to_string(&merged),
        concat!(
            "digraph CFG {\n",
            "    rankdir=LR;\n",
            "    node [shape=circle];\n",
            "    2 [shape=doublecircle];\n",
            "    3 [shape=doublecircle];\n",
            "    0 -> 1 [label=\"call:write\"];\n",
            "    1 -> 2 [label=\"call:exit\"];\n",
            "    2 -> 3 [label=\"ret:main\"];\n",
            "}\n"
        )
    );
}

#[test]
fn diamond_arms_collapse_to_one_trace() {
    // Both arms observe the same call sequence, so the merged automaton
    // is the same chain the linear module produces.
    let libc = LibcCalls::default();

    let mut diamond = libc_call_automaton(&diamond_module(), &libc).unwrap();
    remove_epsilon_transitions(&mut diamond);
    let diamond = merge_equivalent_states(diamond);

    let mut linear = libc_call_automaton(&linear_module(), &libc).unwrap();
    remove_epsilon_transitions(&mut linear);
    let linear = merge_equivalent_states(linear);

    assert_eq!(diamond.node_count(), 4);
    assert_eq!(
        dot::render_to_string(&diamond),
        dot::render_to_string(&linear)
    );
}

#[test]
fn syscall_pipeline_observes_probes_only() {
    let table = SyscallTable::from_names(["exit", "write"]);
    let libc = LibcCalls::default();

    let mut module = linear_module();
    assert!(insert_probes(&mut module, &table));

    let mut automaton = syscall_automaton(&module, &libc).unwrap();
    remove_epsilon_transitions(&mut automaton);
    let merged = merge_equivalent_states(automaton);

    assert_eq!(
        dot::render_to_string(&merged),
        concat!(
            "digraph CFG {\n",
            "    rankdir=LR;\n",
            "    node [shape=circle];\n",
            "    2 [shape=doublecircle];\n",
            "    0 -> 1 [label=\"dummy_syscall(1)\"];\n",
            "    1 -> 2 [label=\"dummy_syscall(0)\"];\n",
            "}\n"
        )
    );
}

#[test]
fn self_recursion_is_silent_and_collapses() {
    // Direct recursion is a silent step back to the entry, so it adds no
    // observable behavior and disappears under elimination and merging.
    let libc = LibcCalls::default();
    let module = ModuleSummary {
        name: "rec".to_owned(),
        functions: vec![
            FunctionSummary {
                name: "main".to_owned(),
                blocks: vec![block(vec![call("rec"), call("exit")], vec![], true)],
            },
            FunctionSummary {
                name: "rec".to_owned(),
                blocks: vec![block(vec![call("rec"), call("write")], vec![], true)],
            },
        ],
    };

    let mut automaton = libc_call_automaton(&module, &libc).unwrap();
    remove_epsilon_transitions(&mut automaton);
    let merged = merge_equivalent_states(automaton);

    let rendered = dot::render_to_string(&merged);
    assert!(rendered.contains("call:rec"));
    assert!(rendered.contains("call:write"));
    assert!(rendered.contains("ret:rec"));
    assert!(!rendered.contains("ε"));
}

#[test]
fn mutual_recursion_keeps_a_labeled_cycle() {
    // ping and pong call each other through labeled edges; the cycle
    // survives elimination and merging.
    let libc = LibcCalls::default();
    let module = ModuleSummary {
        name: "pingpong".to_owned(),
        functions: vec![
            FunctionSummary {
                name: "main".to_owned(),
                blocks: vec![block(vec![call("ping"), call("exit")], vec![], true)],
            },
            FunctionSummary {
                name: "ping".to_owned(),
                blocks: vec![block(vec![call("pong")], vec![], true)],
            },
            FunctionSummary {
                name: "pong".to_owned(),
                blocks: vec![block(vec![call("ping"), call("write")], vec![], true)],
            },
        ],
    };

    let mut automaton = libc_call_automaton(&module, &libc).unwrap();
    remove_epsilon_transitions(&mut automaton);
    let merged = merge_equivalent_states(automaton);

    let rendered = dot::render_to_string(&merged);
    assert!(rendered.contains("call:ping"));
    assert!(rendered.contains("call:pong"));

    // Ids follow creation order, so any cycle must close through an edge
    // whose target is no younger than its source.
    let order = merged.reachable_from(merged.start());
    let has_back_edge = order
        .iter()
        .any(|&id| merged.node(id).transitions().iter().any(|t| t.target <= id));
    assert!(has_back_edge);
}

#[test]
fn json_summary_feeds_the_pipeline() {
    let raw = r#"{
        "name": "branchy",
        "functions": [
            {
                "name": "main",
                "blocks": [
                    {"successors": [1, 2]},
                    {"events": [{"kind": "syscall", "nr": 1}], "successors": [3]},
                    {"events": [{"kind": "syscall", "nr": 2}], "successors": [3]},
                    {
                        "events": [
                            {"kind": "probe", "nr": 60},
                            {"kind": "call", "callee": "exit"}
                        ],
                        "returns": true
                    }
                ]
            },
            {"name": "exit"}
        ]
    }"#;
    let module: ModuleSummary = serde_json::from_str(raw).unwrap();
    assert!(module.defines("main"));
    assert!(!module.defines("exit"));

    let libc = LibcCalls::default();
    let mut automaton = syscall_automaton(&module, &libc).unwrap();
    remove_epsilon_transitions(&mut automaton);
    let merged = merge_equivalent_states(automaton);

    // Start branches on syscall(1)/syscall(2); the arms join again on the
    // shared dummy_syscall(60) step into one accepting state.
    let start_labels: Vec<&str> = merged
        .node(merged.start())
        .transitions()
        .iter()
        .map(|t| merged.label(t.symbol))
        .collect();
    assert_eq!(start_labels, vec!["syscall(1)", "syscall(2)"]);

    let joins: Vec<_> = merged
        .node(merged.start())
        .transitions()
        .iter()
        .map(|t| {
            let arm = merged.node(t.target).transitions();
            assert_eq!(arm.len(), 1);
            assert_eq!(merged.label(arm[0].symbol), "dummy_syscall(60)");
            arm[0].target
        })
        .collect();
    assert_eq!(joins[0], joins[1]);
    assert!(merged.node(joins[0]).is_accepting());
    assert_eq!(merged.node_count(), 4);
}

#[test]
fn cleared_automaton_is_reusable() {
    let libc = LibcCalls::default();
    let mut automaton = libc_call_automaton(&linear_module(), &libc).unwrap();
    let built = automaton.node_count();
    assert!(built > 1);

    automaton.clear();
    assert_eq!(automaton.node_count(), 1);
    assert!(automaton.node(automaton.start()).transitions().is_empty());

    // The arena is ready for a fresh construction pass.
    let next = automaton.add_node(true);
    automaton.add_transition(automaton.start(), "syscall(60)", next);
    assert_eq!(automaton.reachable_from(automaton.start()), vec![0, 1]);
}
