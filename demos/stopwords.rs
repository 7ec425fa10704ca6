//! Example: flagging sensitive words in a sentence.
//!
//! Builds one automaton and runs each scanner over the same text: every match,
//! the longest match per position, matching with stop words elided, and matching
//! with a few stray characters tolerated inside a word.
//!
//! Run with: RUST_LOG=debug cargo run --example stopwords

use libacmatch::ac::{Automaton, Match};
use tracing_subscriber::EnvFilter;

fn show(automaton: &Automaton<char>, text: &[char], m: Match) -> String {
    let pattern: String = automaton
        .pattern(m.pattern())
        .map(|p| p.iter().collect())
        .unwrap_or_default();
    let covered: String = text[m.range()].iter().collect();
    format!("{pattern:>8} at {:>2}..{:<2} {covered:?}", m.start(), m.end())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let automaton = Automaton::new(["fraud", "fraudster", "scam", "sca", "the scam"])?;
    let sentence = "the fraudster ran the s-c-a-m and the  scam";
    let text: Vec<char> = sentence.chars().collect();

    println!("All matches:");
    for m in automaton.find_iter(text.iter().copied()) {
        println!("  {}", show(&automaton, &text, m));
    }

    println!("\nLongest match per end position:");
    for m in automaton.find_longest_per_end_iter(text.iter().copied()) {
        println!("  {}", show(&automaton, &text, m));
    }

    if let Some(m) = automaton.find_longest(text.iter().copied()) {
        println!("\nLongest overall:\n  {}", show(&automaton, &text, m));
    }

    println!("\nWith the stop words \"and \" and \"ran \" elided:");
    for m in automaton.find_skip_iter(sentence, ["and ", "ran "])? {
        println!("  {}", show(&automaton, &text, m));
    }

    println!("\nTolerating one stray character inside a word:");
    for m in automaton.find_bounded_skip_iter(sentence, 1)? {
        println!("  {}", show(&automaton, &text, m?));
    }

    let compact = automaton.compact();
    println!(
        "\n{} states: {} bytes as a trie, {} bytes as a double array ({} slots)",
        automaton.num_nodes(),
        automaton.heap_bytes(),
        compact.heap_bytes(),
        compact.num_elements()
    );
    Ok(())
}
