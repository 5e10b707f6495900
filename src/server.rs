//! Listener and per-connection handling: accept, optional TLS upgrade, read
//! one query per turn, match, respond.

use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::logger::{QueryAction, QueryLogEntry, QueryLogger};
use crate::query::QueryProcessor;
use crate::stats::StatsCollector;
use crate::tls;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

pub const RESPONSE_EXISTS: &str = "STRING EXISTS\n";
pub const RESPONSE_NOT_FOUND: &str = "STRING NOT FOUND\n";
pub const RESPONSE_ERROR: &str = "SERVER ERROR\n";

pub struct SearchServer {
    listener: TcpListener,
    handler: ConnectionHandler,
}

impl SearchServer {
    /// Binds the configured address and, when `use_ssl` is set, prepares the
    /// TLS acceptor. Bind and TLS material failures are fatal.
    pub async fn bind(
        config: Config,
        processor: Arc<QueryProcessor>,
        stats: Arc<StatsCollector>,
        logger: Arc<QueryLogger>,
    ) -> ServerResult<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener =
            TcpListener::bind(&addr)
                .await
                .map_err(|source| ServerError::ListenerBindFailed {
                    addr: addr.clone(),
                    source,
                })?;

        let tls_acceptor = if config.use_ssl {
            Some(tls::build_acceptor(
                Path::new(&config.tls.cert_path),
                Path::new(&config.tls.key_path),
            )?)
        } else {
            None
        };

        info!(
            "Listening on {} (tls: {}, algorithm: {:?}, reread_on_query: {})",
            listener.local_addr()?,
            config.use_ssl,
            processor.algorithm(),
            config.reread_on_query
        );

        Ok(Self {
            listener,
            handler: ConnectionHandler {
                config,
                processor,
                stats,
                logger,
                tls_acceptor,
            },
        })
    }

    /// Address actually bound; differs from the configured one when port 0
    /// was requested.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop: one spawned task per connection, so a slow client never
    /// stalls accepting. Transient accept errors are logged and the loop
    /// continues; ctrl-c stops accepting.
    pub async fn run(self) -> ServerResult<()> {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let handler = self.handler.clone();
                            tokio::spawn(async move {
                                handler.handle(stream, peer).await;
                            });
                        }
                        Err(e) => {
                            warn!("Accept failed: {}", e);
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Shutdown signal received.");
                    break;
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
struct ConnectionHandler {
    config: Config,
    processor: Arc<QueryProcessor>,
    stats: Arc<StatsCollector>,
    logger: Arc<QueryLogger>,
    tls_acceptor: Option<tokio_rustls::TlsAcceptor>,
}

impl ConnectionHandler {
    /// Connection lifecycle. The task owns the socket, so every exit path
    /// (handshake failure, timeout, read error, processing failure) releases
    /// it on drop.
    async fn handle(self, stream: TcpStream, peer: SocketAddr) {
        debug!("Accepted connection from {}", peer);
        if let Err(e) = self.run_connection(stream, peer).await {
            warn!("Connection from {} aborted: {}", peer, e);
        }
        debug!("Connection from {} closed", peer);
    }

    /// `Accepted → (TlsHandshake) → serve`. A failed or timed-out handshake
    /// closes this connection only; the server keeps accepting.
    async fn run_connection(&self, stream: TcpStream, peer: SocketAddr) -> ServerResult<()> {
        match &self.tls_acceptor {
            Some(acceptor) => {
                let handshake = timeout(
                    Duration::from_millis(self.config.handshake_timeout_ms),
                    acceptor.accept(stream),
                );
                let tls_stream = handshake
                    .await
                    .map_err(|_| ServerError::HandshakeFailed("timed out".to_string()))?
                    .map_err(|e| ServerError::HandshakeFailed(e.to_string()))?;
                self.serve(tls_stream, peer).await;
            }
            None => self.serve(stream, peer).await,
        }
        Ok(())
    }

    /// AwaitingQuery → Processing → Responding, repeated under keep-alive
    /// until the client disconnects. Queries on one connection are handled
    /// strictly in arrival order.
    async fn serve<S>(&self, mut stream: S, peer: SocketAddr)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // One byte of headroom so an oversized payload is distinguishable
        // from one that exactly fills the limit.
        let mut buf = vec![0u8; self.config.max_query_len + 1];
        let read_timeout = Duration::from_millis(self.config.read_timeout_ms);

        loop {
            let read = match timeout(read_timeout, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break, // EOF
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    debug!("Read error from {}: {}", peer, e);
                    break;
                }
                Err(_) => {
                    debug!("Read from {} timed out", peer);
                    break;
                }
            };

            let (response, close) = self.answer(&buf[..read], peer).await;
            if stream.write_all(response.as_bytes()).await.is_err() {
                break;
            }
            if stream.flush().await.is_err() {
                break;
            }
            if close || !self.config.keep_alive {
                break;
            }
        }

        let _ = stream.shutdown().await;
    }

    /// Maps one raw payload to the response line, recording stats and the
    /// query log entry. Returns the response and whether the connection must
    /// close afterwards.
    async fn answer(&self, payload: &[u8], peer: SocketAddr) -> (&'static str, bool) {
        let start = Instant::now();
        self.stats.inc_queries();

        let query = match parse_query(payload, self.config.max_query_len) {
            Ok(query) => query,
            Err(e) => {
                self.stats.inc_rejected();
                warn!("Rejected query from {}: {}", peer, e);
                self.logger.log(QueryLogEntry {
                    client_ip: peer.to_string(),
                    query: String::new(),
                    action: QueryAction::Rejected,
                    latency_ms: start.elapsed().as_millis() as u64,
                });
                return (RESPONSE_NOT_FOUND, true);
            }
        };

        match self.processor.process(query).await {
            Ok(outcome) => {
                if outcome.found {
                    self.stats.inc_hit();
                } else {
                    self.stats.inc_miss();
                }
                self.stats
                    .record_match_latency(outcome.elapsed.as_micros() as u64);
                self.logger.log(QueryLogEntry {
                    client_ip: peer.to_string(),
                    query: query.to_owned(),
                    action: if outcome.found {
                        QueryAction::Found
                    } else {
                        QueryAction::NotFound
                    },
                    latency_ms: start.elapsed().as_millis() as u64,
                });
                if outcome.found {
                    (RESPONSE_EXISTS, false)
                } else {
                    (RESPONSE_NOT_FOUND, false)
                }
            }
            Err(e) => {
                self.stats.inc_failed();
                error!("Query from {} failed: {}", peer, e);
                self.logger.log(QueryLogEntry {
                    client_ip: peer.to_string(),
                    query: query.to_owned(),
                    action: QueryAction::Failed,
                    latency_ms: start.elapsed().as_millis() as u64,
                });
                (RESPONSE_ERROR, true)
            }
        }
    }
}

/// Strips surrounding NUL bytes and whitespace from the payload. Oversized
/// or non-UTF-8 payloads are malformed; both are rejected before they reach
/// the engine.
fn parse_query(payload: &[u8], max_len: usize) -> ServerResult<&str> {
    if payload.len() > max_len {
        return Err(ServerError::MalformedQuery(format!(
            "payload of {} bytes exceeds limit of {}",
            payload.len(),
            max_len
        )));
    }
    let text = std::str::from_utf8(payload)
        .map_err(|_| ServerError::MalformedQuery("payload is not valid UTF-8".to_string()))?;
    Ok(text.trim_matches(|c: char| c == '\0' || c.is_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_strips_framing() {
        assert_eq!(parse_query(b"beta\n", 1024).unwrap(), "beta");
        assert_eq!(parse_query(b"beta\r\n", 1024).unwrap(), "beta");
        assert_eq!(parse_query(b"beta\0\0", 1024).unwrap(), "beta");
        assert_eq!(parse_query(b"  beta  ", 1024).unwrap(), "beta");
        assert_eq!(parse_query(b"\n", 1024).unwrap(), "");
    }

    #[test]
    fn test_parse_query_keeps_interior_bytes() {
        assert_eq!(parse_query(b"beta beta\n", 1024).unwrap(), "beta beta");
    }

    #[test]
    fn test_parse_query_rejects_oversized() {
        let err = parse_query(b"0123456789", 8).unwrap_err();
        assert!(matches!(err, ServerError::MalformedQuery(_)));
    }

    #[test]
    fn test_parse_query_rejects_invalid_utf8() {
        let err = parse_query(&[0xff, 0xfe, 0x0a], 1024).unwrap_err();
        assert!(matches!(err, ServerError::MalformedQuery(_)));
    }
}
