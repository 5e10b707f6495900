//! Binary search over the corpus's pre-sorted copy. Snapshots are immutable
//! once built, so the sort is always complete before any query runs.

pub fn exists(sorted: &[String], query: &str) -> bool {
    sorted
        .binary_search_by(|line| line.as_str().cmp(query))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(lines: &[&str]) -> Vec<String> {
        let mut lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        lines.sort_unstable();
        lines
    }

    #[test]
    fn test_every_member_found() {
        let corpus = sorted(&["gamma", "alpha", "beta"]);
        for line in &corpus {
            assert!(exists(&corpus, line));
        }
    }

    #[test]
    fn test_absent_query() {
        let corpus = sorted(&["gamma", "alpha", "beta"]);
        assert!(!exists(&corpus, "delta"));
        assert!(!exists(&corpus, "alp"));
        assert!(!exists(&corpus, "alphaz"));
        assert!(!exists(&corpus, ""));
    }

    #[test]
    fn test_empty_corpus() {
        assert!(!exists(&[], "alpha"));
    }
}
