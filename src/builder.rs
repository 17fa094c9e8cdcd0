use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::io;

use log::{debug, trace};

use crate::automaton::{Automaton, Edge, State, StateId};
use crate::register::{Register, StateShape};

/// Failure while feeding words into a [`Builder`].
#[derive(Debug)]
pub enum BuildError {
    /// A word compared lexicographically smaller than its predecessor.
    ///
    /// The incremental algorithm is only correct on sorted input, so this is
    /// detected and rejected rather than left to corrupt the automaton.
    OutOfOrder { previous: String, word: String },
    /// The word source failed before the next word could be produced.
    Source(io::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::OutOfOrder { previous, word } => {
                write!(f, "word {:?} is out of order after {:?}", word, previous)
            }
            BuildError::Source(err) => write!(f, "word source failed: {}", err),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::OutOfOrder { .. } => None,
            BuildError::Source(err) => Some(err),
        }
    }
}

impl From<io::Error> for BuildError {
    fn from(err: io::Error) -> Self {
        BuildError::Source(err)
    }
}

/// Incremental construction of a minimal acyclic DFA from sorted words.
///
/// Words are inserted one at a time in lexicographic order. After each
/// insertion the automaton is minimal except along the rightmost path (the
/// chain of states spelling the most recent word), which stays mutable until
/// a later word diverges from it or [`finish`](Builder::finish) is called.
/// Everything to the left has been folded into the register and is frozen.
///
/// A word equal to its predecessor is accepted and collapsed: the stored set
/// and the count are unchanged.
pub struct Builder {
    states: Vec<State>,
    /// Slots of states discarded in favor of a registered equivalent,
    /// available for reuse.
    free: Vec<StateId>,
    initial: Option<StateId>,
    register: Register,
    previous: String,
    len: usize,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            states: Vec::new(),
            free: Vec::new(),
            initial: None,
            register: Register::new(),
            previous: String::new(),
            len: 0,
        }
    }

    /// Number of distinct words inserted so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `word` to the set under construction.
    ///
    /// `word` must be lexicographically greater than or equal to the
    /// previously inserted word; anything smaller fails with
    /// [`BuildError::OutOfOrder`] and leaves the builder unchanged.
    pub fn insert(&mut self, word: &str) -> Result<(), BuildError> {
        if self.initial.is_some() {
            match word.cmp(self.previous.as_str()) {
                Ordering::Less => {
                    return Err(BuildError::OutOfOrder {
                        previous: self.previous.clone(),
                        word: word.to_owned(),
                    });
                }
                // Duplicate of the previous word: already stored.
                Ordering::Equal => return Ok(()),
                Ordering::Greater => {}
            }
        }

        let initial = match self.initial {
            Some(id) => id,
            None => {
                // The first word decides whether the initial state is final:
                // it is iff that word is empty.
                let id = self.alloc(word.is_empty());
                self.initial = Some(id);
                id
            }
        };

        // Walk the longest prefix of `word` already present. Because input
        // is sorted, this walk stays on the rightmost (still mutable) path.
        let mut state = initial;
        let mut suffix = word;
        while let Some(ch) = suffix.chars().next() {
            match self.states[state.index()].transition(ch) {
                Some(next) => {
                    state = next;
                    suffix = &suffix[ch.len_utf8()..];
                }
                None => break,
            }
        }

        // Everything hanging below the divergence point belongs to the
        // previous word alone and can never be extended again; fold it into
        // the register before grafting the new suffix.
        if !self.states[state.index()].edges.is_empty() {
            self.replace_or_register(state);
        }

        self.add_suffix(state, suffix);
        self.len += 1;
        self.previous.clear();
        self.previous.push_str(word);
        Ok(())
    }

    /// Freezes the remaining rightmost path and produces the automaton.
    pub fn finish(mut self) -> Automaton {
        let Some(initial) = self.initial else {
            return Automaton::new(Vec::new(), None, 0);
        };
        if !self.states[initial.index()].edges.is_empty() {
            self.replace_or_register(initial);
        }
        let automaton = self.compact(initial);
        debug!(
            "built automaton: {} words, {} states, {} registered shapes",
            automaton.len(),
            automaton.state_count(),
            self.register.len()
        );
        automaton
    }

    /// Canonicalizes the chain of last children descending from `parent`.
    ///
    /// Recurses to the bottom of the chain first: a state may only be looked
    /// up in the register once all of its targets are canonical, otherwise
    /// id-based shape equality would miss equivalent states.
    fn replace_or_register(&mut self, parent: StateId) {
        let Some(Edge { target: child, .. }) = self.states[parent.index()].last_child() else {
            return;
        };
        if !self.states[child.index()].edges.is_empty() {
            self.replace_or_register(child);
        }
        let shape = StateShape::of(&self.states[child.index()]);
        let canonical = self.register.canonicalize(shape, child);
        if canonical != child {
            trace!("merging state {:?} into canonical {:?}", child, canonical);
            self.states[parent.index()].replace_last_child(canonical);
            self.release(child);
        }
    }

    /// Grafts fresh states spelling `suffix` below `state`. Intermediate
    /// states are non-final; the state reached by the last character is
    /// final. The new chain becomes the rightmost path.
    fn add_suffix(&mut self, mut state: StateId, suffix: &str) {
        let mut chars = suffix.chars().peekable();
        while let Some(ch) = chars.next() {
            let target = self.alloc(chars.peek().is_none());
            self.states[state.index()].add_edge(ch, target);
            state = target;
        }
    }

    fn alloc(&mut self, is_final: bool) -> StateId {
        match self.free.pop() {
            Some(id) => {
                let state = &mut self.states[id.index()];
                state.is_final = is_final;
                state.edges.clear();
                id
            }
            None => {
                let id = StateId(self.states.len() as u32);
                self.states.push(State::new(is_final));
                id
            }
        }
    }

    fn release(&mut self, id: StateId) {
        self.free.push(id);
    }

    /// Renumbers the reachable states in breadth-first order into a fresh
    /// arena, dropping recycled slots. Equal inputs therefore produce
    /// identical automata, state ids included.
    fn compact(&self, initial: StateId) -> Automaton {
        const UNVISITED: u32 = u32::MAX;
        let mut remap = vec![UNVISITED; self.states.len()];
        let mut order = Vec::with_capacity(self.states.len() - self.free.len());
        let mut queue = VecDeque::new();
        remap[initial.index()] = 0;
        order.push(initial);
        queue.push_back(initial);
        while let Some(id) = queue.pop_front() {
            for edge in &self.states[id.index()].edges {
                if remap[edge.target.index()] == UNVISITED {
                    remap[edge.target.index()] = order.len() as u32;
                    order.push(edge.target);
                    queue.push_back(edge.target);
                }
            }
        }

        let states = order
            .iter()
            .map(|&old| {
                let state = &self.states[old.index()];
                State {
                    is_final: state.is_final,
                    edges: state
                        .edges
                        .iter()
                        .map(|e| Edge {
                            label: e.label,
                            target: StateId(remap[e.target.index()]),
                        })
                        .collect(),
                }
            })
            .collect();
        Automaton::new(states, Some(StateId(0)), self.len)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Automaton {
    /// Builds an automaton from words in non-decreasing lexicographic order.
    ///
    /// Consecutive duplicates are collapsed; a word smaller than its
    /// predecessor fails the whole construction.
    pub fn from_sorted_words<I>(words: I) -> Result<Automaton, BuildError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut builder = Builder::new();
        for word in words {
            builder.insert(word.as_ref())?;
        }
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn build(words: &[&str]) -> Automaton {
        Automaton::from_sorted_words(words).expect("word list is sorted")
    }

    fn collect(automaton: &Automaton) -> Vec<String> {
        automaton.words().collect_vec()
    }

    #[test]
    fn test_bats_cats_rats() {
        let automaton = build(&["bats", "cats", "rats"]);

        assert_eq!(automaton.len(), 3);
        // One initial state, one shared branch head, and a shared "ats"
        // chain of two states ending in one final state.
        assert_eq!(automaton.state_count(), 5);

        assert!(automaton.contains("bats"));
        assert!(automaton.contains("cats"));
        assert!(automaton.contains("rats"));
        assert!(!automaton.contains("ats"));
        assert!(!automaton.contains("bat"));
        assert!(!automaton.contains(""));
        assert!(!automaton.contains("batss"));

        assert_eq!(collect(&automaton), vec!["bats", "cats", "rats"]);
    }

    #[test]
    fn test_empty_input() {
        let automaton = Builder::new().finish();

        assert_eq!(automaton.len(), 0);
        assert!(!automaton.contains(""));
        assert!(!automaton.contains("anything"));
        assert!(collect(&automaton).is_empty());
        assert_eq!(automaton.state_count(), 0);
    }

    #[test]
    fn test_only_empty_string() {
        let automaton = build(&[""]);

        assert_eq!(automaton.len(), 1);
        assert!(automaton.contains(""));
        assert!(!automaton.contains("a"));
        assert_eq!(collect(&automaton), vec![""]);
        assert_eq!(automaton.state_count(), 1);
    }

    #[test]
    fn test_empty_string_then_a() {
        let automaton = build(&["", "a"]);

        assert_eq!(automaton.len(), 2);
        assert!(automaton.contains(""));
        assert!(automaton.contains("a"));
        assert!(!automaton.contains("b"));
        assert_eq!(collect(&automaton), vec!["", "a"]);
    }

    #[test]
    fn test_prefix_words_share_a_chain() {
        let automaton = build(&["ab", "abc", "abd"]);

        assert_eq!(automaton.len(), 3);
        assert!(automaton.contains("ab"));
        assert!(automaton.contains("abc"));
        assert!(automaton.contains("abd"));
        assert!(!automaton.contains("a"));
        assert!(!automaton.contains("abcd"));
        // 0 --a--> 1 --b--> 2(final) --c/d--> 3(final); c and d merge.
        assert_eq!(automaton.state_count(), 4);
        assert_eq!(collect(&automaton), vec!["ab", "abc", "abd"]);
    }

    #[test]
    fn test_out_of_order_input_is_rejected() {
        let mut builder = Builder::new();
        builder.insert("b").unwrap();
        let err = builder.insert("a").unwrap_err();
        match err {
            BuildError::OutOfOrder { previous, word } => {
                assert_eq!(previous, "b");
                assert_eq!(word, "a");
            }
            other => panic!("expected OutOfOrder, got {:?}", other),
        }

        assert!(Automaton::from_sorted_words(["b", "a"]).is_err());
    }

    #[test]
    fn test_consecutive_duplicates_collapse() {
        let automaton = build(&["a", "a", "b", "b", "b"]);

        assert_eq!(automaton.len(), 2);
        assert!(automaton.contains("a"));
        assert!(automaton.contains("b"));
        assert_eq!(collect(&automaton), vec!["a", "b"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let words = ["bane", "bat", "bats", "cane", "cat", "cats"];
        let first = Automaton::from_sorted_words(words).unwrap();
        let second = Automaton::from_sorted_words(words).unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(first.state_count(), second.state_count());
        assert_eq!(collect(&first), collect(&second));
    }

    #[test]
    fn test_suffix_sharing_on_a_dictionary() {
        let words = [
            "aching", "backing", "backs", "caching", "cracking", "cracks", "hacking", "hacks",
            "jacking", "lacking", "lacks", "mocking", "mocks", "packing", "packs", "racking",
            "racks", "sacking", "sacks", "tracking", "tracks",
        ];
        let automaton = build(&words);

        assert_eq!(automaton.len(), words.len());
        for word in &words {
            assert!(automaton.contains(word), "missing {:?}", word);
        }
        assert!(!automaton.contains("acking"));
        assert!(!automaton.contains("back"));
        assert!(!automaton.contains("trackings"));
        assert_eq!(collect(&automaton), words.iter().copied().collect_vec());

        // Far fewer states than characters proves the suffixes are shared.
        let total_chars: usize = words.iter().map(|w| w.len()).sum();
        assert!(automaton.state_count() < total_chars);
    }

    #[test]
    fn test_word_pairs_with_common_prefixes_and_suffixes() {
        let words = ["tap", "taps", "top", "tops"];
        let automaton = build(&words);

        assert_eq!(automaton.len(), 4);
        assert_eq!(collect(&automaton), words.iter().copied().collect_vec());
        // 0 -t-> 1, 1 -a/o-> 2, 2 -p-> 3(final), 3 -s-> 4(final):
        // "ap"/"op" suffix states merge pairwise.
        assert_eq!(automaton.state_count(), 5);
    }

    #[test]
    fn test_multibyte_labels() {
        // Sorted by code point: 'a' < 'ñ' < 'ü'.
        let words = ["mañana", "mañas", "müsli"];
        let automaton = build(&words);

        assert_eq!(automaton.len(), 3);
        assert!(automaton.contains("mañana"));
        assert!(automaton.contains("mañas"));
        assert!(automaton.contains("müsli"));
        assert!(!automaton.contains("maña"));
        assert_eq!(collect(&automaton), words.iter().copied().collect_vec());
    }

    #[test]
    fn test_builder_len_counts_distinct_words() {
        let mut builder = Builder::new();
        assert!(builder.is_empty());
        builder.insert("a").unwrap();
        builder.insert("a").unwrap();
        builder.insert("ab").unwrap();
        assert_eq!(builder.len(), 2);
        assert!(!builder.is_empty());
    }
}
