use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use dawg::{from_reader, to_json};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

/// Builds a minimal acyclic DFA from a sorted word list and queries it.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the word list, one word per line, lexicographically sorted.
    word_list: PathBuf,

    /// Words to test for membership.
    #[arg(short, long = "query")]
    query: Vec<String>,

    /// Prints every stored word in lexicographic order.
    #[arg(long)]
    list: bool,

    /// Dumps the automaton structure as JSON.
    #[arg(long)]
    dump: bool,

    /// Prints the word and state counts.
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.word_list)?;
    let automaton = from_reader(BufReader::new(file))?;
    info!(
        "loaded {}: {} words in {} states",
        args.word_list.display(),
        automaton.len(),
        automaton.state_count()
    );

    for word in &args.query {
        println!("{}: {}", word, automaton.contains(word));
    }
    if args.list {
        let mut words = automaton.words();
        while words.advance() {
            println!("{}", words.current());
        }
    }
    if args.dump {
        println!("{}", to_json(&automaton));
    }
    // Stats are printed when asked for, and also when no action was
    // requested at all, so a bare invocation still reports something.
    if args.stats || (args.query.is_empty() && !args.list && !args.dump) {
        println!(
            "{} words, {} states",
            automaton.len(),
            automaton.state_count()
        );
    }

    Ok(())
}
