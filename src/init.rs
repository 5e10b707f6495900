//! Initialization helpers for the application startup.

use crate::config::Config;
use crate::corpus::{create_source, CorpusSource};
use crate::query::QueryProcessor;
use std::sync::Arc;

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Wires the policy-selected corpus source to the configured algorithm.
///
/// The source is returned alongside the processor so startup can trigger the
/// eager preload before the listener binds.
pub fn build_processor(config: &Config) -> (Arc<dyn CorpusSource>, Arc<QueryProcessor>) {
    let source = create_source(config);
    let processor = Arc::new(QueryProcessor::new(source.clone(), config.algorithm));
    (source, processor)
}
