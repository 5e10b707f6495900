//! Rabin-Karp. The polynomial hash of the query is computed once; candidate
//! lines of equal length are hashed and compared, and hash-equal candidates
//! are confirmed with a direct comparison so collisions can never produce a
//! false positive. Under the line-by-line contract the window is the whole
//! line, so no rolling step is needed.

const BASE: u64 = 256;
const MODULUS: u64 = 1_000_000_007;

fn hash(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0, |acc, &b| (acc * BASE + u64::from(b)) % MODULUS)
}

pub fn exists(lines: &[String], query: &str) -> bool {
    let pattern = query.as_bytes();
    let target = hash(pattern);
    lines.iter().any(|line| {
        let line = line.as_bytes();
        line.len() == pattern.len() && hash(line) == target && line == pattern
    })
}
