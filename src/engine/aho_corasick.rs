//! Aho-Corasick multi-pattern automaton: a trie over the pattern set with
//! BFS-computed failure links, built once per set, then streamed over the
//! corpus in a single pass. Serves the bulk-check contract; a single query
//! is the one-pattern special case.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

#[derive(Debug, Default)]
struct Node {
    next: FxHashMap<u8, usize>,
    fail: usize,
    /// Indices of patterns ending at this state, own plus inherited along
    /// the failure chain.
    output: Vec<usize>,
}

#[derive(Debug)]
pub struct Automaton {
    nodes: Vec<Node>,
    pattern_lens: Vec<usize>,
}

impl Automaton {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut nodes = vec![Node::default()];
        let mut pattern_lens = Vec::with_capacity(patterns.len());

        for (idx, pattern) in patterns.iter().enumerate() {
            let bytes = pattern.as_ref().as_bytes();
            pattern_lens.push(bytes.len());
            if bytes.is_empty() {
                // Empty patterns match empty lines directly in scan_line.
                continue;
            }
            let mut state = 0;
            for &byte in bytes {
                state = if let Some(&next) = nodes[state].next.get(&byte) {
                    next
                } else {
                    nodes.push(Node::default());
                    let next = nodes.len() - 1;
                    nodes[state].next.insert(byte, next);
                    next
                };
            }
            nodes[state].output.push(idx);
        }

        // Wire failure links breadth-first. Depth-1 states keep the root as
        // their fail target; deeper states follow the parent's failure chain
        // for the longest proper suffix present in the trie. Outputs inherit
        // from the fail target so one lookup sees every pattern ending at a
        // state.
        let mut queue: VecDeque<usize> = nodes[0].next.values().copied().collect();
        while let Some(state) = queue.pop_front() {
            let transitions: Vec<(u8, usize)> = nodes[state]
                .next
                .iter()
                .map(|(&byte, &child)| (byte, child))
                .collect();
            for (byte, child) in transitions {
                let mut probe = nodes[state].fail;
                let fail = loop {
                    if let Some(&next) = nodes[probe].next.get(&byte) {
                        break next;
                    }
                    if probe == 0 {
                        break 0;
                    }
                    probe = nodes[probe].fail;
                };
                nodes[child].fail = fail;
                let inherited = nodes[fail].output.clone();
                nodes[child].output.extend(inherited);
                queue.push_back(child);
            }
        }

        Self {
            nodes,
            pattern_lens,
        }
    }

    fn step(&self, mut state: usize, byte: u8) -> usize {
        loop {
            if let Some(&next) = self.nodes[state].next.get(&byte) {
                return next;
            }
            if state == 0 {
                return 0;
            }
            state = self.nodes[state].fail;
        }
    }

    /// Marks patterns equal to `line` in its entirety. The state is reset
    /// per line so matches never span line boundaries, and only patterns
    /// covering every byte of the line count (suffix hits in the final
    /// state's output are filtered by length).
    fn scan_line(&self, line: &str, found: &mut [bool]) {
        let bytes = line.as_bytes();
        if bytes.is_empty() {
            for (idx, &len) in self.pattern_lens.iter().enumerate() {
                if len == 0 {
                    found[idx] = true;
                }
            }
            return;
        }
        let mut state = 0;
        for &byte in bytes {
            state = self.step(state, byte);
        }
        for &idx in &self.nodes[state].output {
            if self.pattern_lens[idx] == bytes.len() {
                found[idx] = true;
            }
        }
    }

    /// Streams the corpus through the automaton once, returning per-pattern
    /// presence. Stops early once every pattern has been seen.
    pub fn find_lines(&self, lines: &[String]) -> Vec<bool> {
        let mut found = vec![false; self.pattern_lens.len()];
        for line in lines {
            self.scan_line(line, &mut found);
            if found.iter().all(|&f| f) {
                break;
            }
        }
        found
    }
}

/// True iff every pattern equals at least one corpus line.
pub fn exists_all<S: AsRef<str>>(lines: &[String], patterns: &[S]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    Automaton::new(patterns).find_lines(lines).iter().all(|&f| f)
}
