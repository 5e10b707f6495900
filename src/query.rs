//! Glue between a corpus source and the matching engine.

use crate::corpus::CorpusSource;
use crate::engine::Algorithm;
use crate::error::ServerResult;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one query: presence plus the wall-clock time spent in the
/// matching call. Carries no partial-match information.
#[derive(Debug, Clone, Copy)]
pub struct MatchOutcome {
    pub found: bool,
    pub elapsed: Duration,
}

/// Runs queries against whatever corpus snapshot the source produces. The
/// corpus fetch is the sole point where the reread-vs-cache cost is paid.
pub struct QueryProcessor {
    source: Arc<dyn CorpusSource>,
    algorithm: Algorithm,
}

impl QueryProcessor {
    pub fn new(source: Arc<dyn CorpusSource>, algorithm: Algorithm) -> Self {
        Self { source, algorithm }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Single-query path. A `SourceUnavailable` from the source propagates
    /// as a processing failure distinct from "not found".
    pub async fn process(&self, query: &str) -> ServerResult<MatchOutcome> {
        let corpus = self.source.corpus().await?;
        let start = Instant::now();
        let found = self.algorithm.exists(&corpus, query);
        Ok(MatchOutcome {
            found,
            elapsed: start.elapsed(),
        })
    }

    /// Bulk path: found iff every pattern exists in the corpus.
    pub async fn process_all(&self, patterns: &[String]) -> ServerResult<MatchOutcome> {
        let corpus = self.source.corpus().await?;
        let start = Instant::now();
        let found = self.algorithm.exists_all(&corpus, patterns);
        Ok(MatchOutcome {
            found,
            elapsed: start.elapsed(),
        })
    }
}
