//! Knuth-Morris-Pratt. The failure function is built once per query, then
//! each candidate line is scanned with the prefix automaton. A line matches
//! only when the automaton consumes the full pattern exactly at the line's
//! end, so the result is whole-line equality, never a substring hit.

/// Longest-proper-prefix-that-is-also-suffix table for `pattern`.
fn failure_table(pattern: &[u8]) -> Vec<usize> {
    let mut table = vec![0; pattern.len()];
    let mut k = 0;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = table[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        table[i] = k;
    }
    table
}

/// Runs the prefix automaton over one line. The length guard pins the match
/// to the whole line; with equal lengths the pattern can only complete at
/// the final byte.
fn matches_line(line: &[u8], pattern: &[u8], table: &[usize]) -> bool {
    if line.len() != pattern.len() {
        return false;
    }
    let mut k = 0;
    for &byte in line {
        while k > 0 && byte != pattern[k] {
            k = table[k - 1];
        }
        if byte == pattern[k] {
            k += 1;
        }
    }
    k == pattern.len()
}

pub fn exists(lines: &[String], query: &str) -> bool {
    if query.is_empty() {
        return lines.iter().any(|line| line.is_empty());
    }
    let pattern = query.as_bytes();
    let table = failure_table(pattern);
    lines
        .iter()
        .any(|line| matches_line(line.as_bytes(), pattern, &table))
}
