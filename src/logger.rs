use crate::config::LoggingConfig;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug)]
pub struct QueryLogEntry {
    pub client_ip: String,
    pub query: String,
    pub action: QueryAction,
    pub latency_ms: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum QueryAction {
    Found,
    NotFound,
    Rejected,
    Failed,
}

pub struct QueryLogger {
    tx: mpsc::Sender<QueryLogEntry>,
}

impl QueryLogger {
    pub fn new(config: LoggingConfig) -> Arc<Self> {
        let (tx, mut rx) = mpsc::channel(1000); // Buffer up to 1000 logs

        // Spawn async logger task
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                Self::process_log(&config, entry);
            }
        });

        Arc::new(Self { tx })
    }

    pub fn log(&self, entry: QueryLogEntry) {
        // Fire and forget, don't block the caller if the buffer is full
        // (drop the log instead of stalling the query path)
        let _ = self.tx.try_send(entry);
    }

    fn process_log(config: &LoggingConfig, entry: QueryLogEntry) {
        if !config.enable {
            return;
        }

        let should_log = match entry.action {
            QueryAction::Found | QueryAction::NotFound => config.log_all_queries,
            // Rejections and failures are always worth a line.
            QueryAction::Rejected | QueryAction::Failed => true,
        };

        if should_log {
            if config.format == "json" {
                info!(
                    target: "search_query",
                    client = %entry.client_ip,
                    query = %entry.query,
                    action = ?entry.action,
                    lat = %entry.latency_ms
                );
            } else {
                let action_str = match entry.action {
                    QueryAction::Found => "EXISTS",
                    QueryAction::NotFound => "NOT FOUND",
                    QueryAction::Rejected => "REJECTED",
                    QueryAction::Failed => "FAILED",
                };

                info!(
                    "{} {:?} -> {} [{}ms]",
                    entry.client_ip, entry.query, action_str, entry.latency_ms
                );
            }
        }
    }
}
