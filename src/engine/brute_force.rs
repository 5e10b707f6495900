//! Baseline linear scan: one direct comparison per corpus line.

pub fn exists(lines: &[String], query: &str) -> bool {
    lines.iter().any(|line| line == query)
}
