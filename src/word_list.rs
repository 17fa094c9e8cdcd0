use std::io::BufRead;

use crate::automaton::Automaton;
use crate::builder::{BuildError, Builder};

/// Builds an automaton from a word list read line by line.
///
/// Each line, without its terminator, is one word; the lines must already be
/// in non-decreasing lexicographic order. An I/O failure while reading or an
/// out-of-order line aborts the construction and no automaton is produced.
pub fn from_reader<R: BufRead>(reader: R) -> Result<Automaton, BuildError> {
    let mut builder = Builder::new();
    for line in reader.lines() {
        let word = line?;
        builder.insert(&word)?;
    }
    Ok(builder.finish())
}
