use std::collections::HashMap;

use crate::automaton::{EdgeList, State, StateId};

/// The canonical shape of a frozen state: its finality and its ordered
/// out-edge list.
///
/// Two states with equal shapes accept exactly the same suffixes. Equality
/// and hashing compare edge targets by id only; recursing into the targets
/// is unnecessary because states are canonicalized bottom-up, so equivalent
/// sub-automata already share a single id by the time their parents are
/// compared. Edge order matters: labels are appended sorted, so equal edge
/// sets always appear in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct StateShape {
    is_final: bool,
    edges: EdgeList,
}

impl StateShape {
    pub(crate) fn of(state: &State) -> Self {
        StateShape {
            is_final: state.is_final,
            edges: state.edges.clone(),
        }
    }
}

/// Lookup table of canonical states, keyed by shape.
///
/// A state inserted here is frozen: neither its finality nor its edges may
/// change afterwards, otherwise its key would go stale.
#[derive(Debug, Default)]
pub(crate) struct Register {
    canonical: HashMap<StateShape, StateId>,
}

impl Register {
    pub(crate) fn new() -> Self {
        Register::default()
    }

    /// Returns the canonical state equivalent to `id`.
    ///
    /// If an equivalent state is already registered, that representative is
    /// returned and `id` is left to the caller to discard. Otherwise `id`
    /// becomes the representative of its shape and is returned unchanged.
    pub(crate) fn canonicalize(&mut self, shape: StateShape, id: StateId) -> StateId {
        *self.canonical.entry(shape).or_insert(id)
    }

    /// Number of registered canonical states.
    pub(crate) fn len(&self) -> usize {
        self.canonical.len()
    }
}
