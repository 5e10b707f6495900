//! Corpus snapshots and the reread-vs-cache policy over the reference file.

use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Immutable snapshot of the reference file at a point in time: the lines in
/// file order plus a lexicographically sorted copy for the binary-search
/// variant. Concurrent queries share snapshots through `Arc` and never
/// observe a partial update.
#[derive(Debug)]
pub struct Corpus {
    lines: Vec<String>,
    sorted: Vec<String>,
}

impl Corpus {
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_owned).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        Self { lines, sorted }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn sorted(&self) -> &[String] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

async fn read_corpus(path: &Path) -> ServerResult<Corpus> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ServerError::SourceUnavailable {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Corpus::from_text(&text))
}

/// Produces the corpus a query runs against. Which policy backs it is fixed
/// at configuration time.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn corpus(&self) -> ServerResult<Arc<Corpus>>;

    /// Called once before the listener starts. Sources that cache load
    /// eagerly here, making an unreadable reference file fatal at startup.
    async fn preload(&self) -> ServerResult<()> {
        self.corpus().await.map(|_| ())
    }
}

/// Reads the reference file once and serves the same snapshot for the
/// process lifetime. The `OnceCell` gate guarantees exactly one load even
/// when connections race to trigger it.
pub struct CachedSource {
    path: PathBuf,
    snapshot: OnceCell<Arc<Corpus>>,
}

impl CachedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: OnceCell::new(),
        }
    }

    async fn load(&self) -> ServerResult<&Arc<Corpus>> {
        self.snapshot
            .get_or_try_init(|| async {
                let corpus = read_corpus(&self.path).await?;
                info!(
                    "Loaded {} lines from {} into memory",
                    corpus.len(),
                    self.path.display()
                );
                Ok(Arc::new(corpus))
            })
            .await
    }
}

#[async_trait]
impl CorpusSource for CachedSource {
    async fn corpus(&self) -> ServerResult<Arc<Corpus>> {
        self.load().await.cloned()
    }
}

/// Re-reads the reference file on every call, so each query observes the
/// file as it currently is. Owns no persistent corpus.
pub struct RereadSource {
    path: PathBuf,
}

impl RereadSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CorpusSource for RereadSource {
    async fn corpus(&self) -> ServerResult<Arc<Corpus>> {
        let corpus = read_corpus(&self.path).await?;
        debug!(
            "Reread {} lines from {}",
            corpus.len(),
            self.path.display()
        );
        Ok(Arc::new(corpus))
    }

    async fn preload(&self) -> ServerResult<()> {
        // A missing file is a per-query error under this policy, not a
        // startup failure.
        if let Err(e) = tokio::fs::metadata(&self.path).await {
            warn!(
                "Reference file {} not readable at startup: {}",
                self.path.display(),
                e
            );
        }
        Ok(())
    }
}

/// Builds the source matching the configured policy.
pub fn create_source(config: &Config) -> Arc<dyn CorpusSource> {
    if config.reread_on_query {
        Arc::new(RereadSource::new(&config.reference_path))
    } else {
        Arc::new(CachedSource::new(&config.reference_path))
    }
}
