use serde::Serialize;

use crate::automaton::Automaton;

#[derive(Serialize)]
struct SerializedAutomaton {
    word_count: usize,
    states: Vec<SerializedState>,
    edges: Vec<SerializedEdge>,
}

#[derive(Serialize)]
struct SerializedState {
    id: u32,
    is_final: bool,
}

#[derive(Serialize)]
struct SerializedEdge {
    from: u32,
    label: char,
    to: u32,
}

/// Serializes the automaton structure into a JSON string.
///
/// Ids are assigned by breadth-first traversal from the initial state, which
/// for a built automaton coincides with its arena numbering, so equal
/// automata serialize identically.
///
/// There is no matching deserializer: construction has to go through the
/// builder, which is what guarantees minimality.
pub fn to_json(automaton: &Automaton) -> String {
    let mut states = Vec::new();
    let mut edges = Vec::new();
    for (id, state) in automaton.iter_states() {
        states.push(SerializedState {
            id: id.0,
            is_final: state.is_final,
        });
        for edge in &state.edges {
            edges.push(SerializedEdge {
                from: id.0,
                label: edge.label,
                to: edge.target.0,
            });
        }
    }

    let serialized = SerializedAutomaton {
        word_count: automaton.len(),
        states,
        edges,
    };
    serde_json::to_string_pretty(&serialized).expect("Serialization failed")
}
