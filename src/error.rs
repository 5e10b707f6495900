use std::io;
use thiserror::Error;

/// Errors surfaced by the server core.
///
/// Per-connection failures (`HandshakeFailed`, `MalformedQuery`, and
/// `SourceUnavailable` under the reread policy) never take the process down;
/// only startup-time resource failures are fatal.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("reference file unavailable at {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("TLS handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("failed to bind listener on {addr}: {source}")]
    ListenerBindFailed {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
