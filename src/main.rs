use anyhow::Result;
use tracing::info;

use linehound::config::Config;
use linehound::init::{build_processor, setup_logging};
use linehound::logger::QueryLogger;
use linehound::server::SearchServer;
use linehound::stats::StatsCollector;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args().nth(1).unwrap_or("config.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting linehound...");

    if !std::path::Path::new(&config_path).exists() {
        info!("Config file not found, using defaults.");
    }

    // 3. Init Stats
    let stats = StatsCollector::new(config.stats.clone());

    // 4. Init Query Logger
    let logger = QueryLogger::new(config.logging.clone());

    // 5. Init Corpus Source & Processor
    // Under the cached policy this loads the reference file now; an
    // unreadable file aborts startup before the listener binds.
    let (source, processor) = build_processor(&config);
    source.preload().await?;

    // 6. Bind & Run Server
    let server = SearchServer::bind(config, processor, stats, logger).await?;
    server.run().await?;

    Ok(())
}
