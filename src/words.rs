use crate::automaton::{Automaton, StateId};

/// Streaming enumeration of the words stored in an [`Automaton`], in
/// strictly ascending lexicographic order.
///
/// The traversal is an explicit-stack depth-first walk so that it can pause
/// between words and be restarted with [`reset`](Words::reset). Each call to
/// [`advance`](Words::advance) does only the work between two accepted
/// words; the buffer returned by [`current`](Words::current) is reused
/// throughout.
///
/// Also an [`Iterator`] over owned `String`s for use with adapters; the
/// streaming interface avoids the per-word allocation.
pub struct Words<'a> {
    automaton: &'a Automaton,
    /// Path from the initial state to the state being visited.
    path: String,
    stack: Vec<Frame>,
}

/// A state pending a visit, together with the edge that leads to it: the
/// label and the byte length of the path up to the edge's source. The
/// initial state carries no edge record.
#[derive(Debug, Clone, Copy)]
struct Frame {
    state: StateId,
    via: Option<(char, usize)>,
}

impl<'a> Words<'a> {
    pub(crate) fn new(automaton: &'a Automaton) -> Self {
        let mut words = Words {
            automaton,
            path: String::new(),
            stack: Vec::new(),
        };
        words.reset();
        words
    }

    /// Moves to the next word; returns false when the set is exhausted.
    pub fn advance(&mut self) -> bool {
        let automaton = self.automaton;
        while let Some(Frame { state, via }) = self.stack.pop() {
            if let Some((label, depth)) = via {
                self.path.truncate(depth);
                self.path.push(label);
            }
            let state = automaton.state(state);
            // Reverse order, so the smallest label is popped next.
            for edge in state.edges.iter().rev() {
                self.stack.push(Frame {
                    state: edge.target,
                    via: Some((edge.label, self.path.len())),
                });
            }
            if state.is_final {
                return true;
            }
        }
        false
    }

    /// The word reached by the most recent successful [`advance`].
    ///
    /// Before the first `advance` this is the empty string; after `advance`
    /// has returned false it is the last yielded word. Neither is a
    /// meaningful position.
    ///
    /// [`advance`]: Words::advance
    pub fn current(&self) -> &str {
        &self.path
    }

    /// Rewinds to the position before the first word.
    pub fn reset(&mut self) {
        self.path.clear();
        self.stack.clear();
        if let Some(initial) = self.automaton.initial() {
            self.stack.push(Frame {
                state: initial,
                via: None,
            });
        }
    }
}

impl Iterator for Words<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.advance().then(|| self.path.clone())
    }
}
