//! The matching engine: five interchangeable strategies for deciding whether
//! a query string equals one full line of the corpus.
//!
//! All variants share the same contract: a query is found iff it is
//! byte-for-byte equal to an entire corpus line. KMP and Rabin-Karp scan
//! line-by-line rather than over a concatenated text, which keeps their
//! answers identical to the other variants.

mod aho_corasick;
mod binary_search;
mod brute_force;
mod kmp;
mod rabin_karp;

pub use aho_corasick::Automaton;

use crate::corpus::Corpus;
use serde::Deserialize;

/// The active matching strategy, fixed at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    BruteForce,
    Kmp,
    RabinKarp,
    #[default]
    BinarySearch,
    AhoCorasick,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::BruteForce,
        Algorithm::Kmp,
        Algorithm::RabinKarp,
        Algorithm::BinarySearch,
        Algorithm::AhoCorasick,
    ];

    /// Full-line exact match of a single query against the corpus.
    pub fn exists(&self, corpus: &Corpus, query: &str) -> bool {
        match self {
            Algorithm::BruteForce => brute_force::exists(corpus.lines(), query),
            Algorithm::Kmp => kmp::exists(corpus.lines(), query),
            Algorithm::RabinKarp => rabin_karp::exists(corpus.lines(), query),
            Algorithm::BinarySearch => binary_search::exists(corpus.sorted(), query),
            Algorithm::AhoCorasick => aho_corasick::exists_all(corpus.lines(), &[query]),
        }
    }

    /// Bulk check: true iff every pattern individually exists in the corpus.
    ///
    /// The Aho-Corasick variant answers this in a single pass over the
    /// corpus; the single-pattern variants fall back to one `exists` call
    /// per pattern.
    pub fn exists_all(&self, corpus: &Corpus, patterns: &[String]) -> bool {
        match self {
            Algorithm::AhoCorasick => aho_corasick::exists_all(corpus.lines(), patterns),
            _ => patterns.iter().all(|p| self.exists(corpus, p)),
        }
    }
}
