use crate::config::StatsConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::info;

/// Lock-free query counters with a background task dumping a summary line
/// at the configured interval.
#[derive(Debug)]
pub struct StatsCollector {
    total_queries: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,

    // Latency kept as separate sum and count so updates stay lock-free.
    match_total_us: AtomicU64,
    match_count: AtomicU64,

    log_interval: Duration,
}

impl StatsCollector {
    pub fn new(config: StatsConfig) -> Arc<Self> {
        let stats = Arc::new(Self {
            total_queries: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            match_total_us: AtomicU64::new(0),
            match_count: AtomicU64::new(0),
            log_interval: Duration::from_secs(config.log_interval_seconds),
        });

        if config.enable {
            // Spawn background dumper
            let stats_clone = stats.clone();
            tokio::spawn(async move {
                stats_clone.run_logger().await;
            });
        }

        stats
    }

    pub fn inc_queries(&self) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_match_latency(&self, micros: u64) {
        self.match_total_us.fetch_add(micros, Ordering::Relaxed);
        self.match_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_queries(&self) -> u64 {
        self.total_queries.load(Ordering::Relaxed)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    async fn run_logger(&self) {
        let mut interval = time::interval(self.log_interval);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let total = self.total_queries.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        let match_count = self.match_count.load(Ordering::Relaxed);
        let avg_match_us = if match_count > 0 {
            self.match_total_us.load(Ordering::Relaxed) as f64 / match_count as f64
        } else {
            0.0
        };

        info!(
            "STATS DUMP: Total: {}, Hits: {} ({:.1}%), Misses: {}, Rejected: {}, Failed: {}, AvgMatch: {:.1}us",
            total,
            hits,
            if total > 0 {
                (hits as f64 / total as f64) * 100.0
            } else {
                0.0
            },
            misses,
            rejected,
            failed,
            avg_match_us
        );
    }
}
