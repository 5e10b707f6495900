//! TLS material loading for the transport-security upgrade.

use crate::error::{ServerError, ServerResult};
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

/// Builds the acceptor from PEM cert/key paths. Called once at startup when
/// `use_ssl` is set; bad material is fatal before the listener binds.
pub fn build_acceptor(cert_path: &Path, key_path: &Path) -> ServerResult<TlsAcceptor> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(e.to_string()))?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &Path) -> ServerResult<Vec<CertificateDer<'static>>> {
    let pem = std::fs::read(path).map_err(|e| {
        ServerError::Tls(format!(
            "failed to read certificate file {}: {}",
            path.display(),
            e
        ))
    })?;

    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<_, _>>()
        .map_err(|e| {
            ServerError::Tls(format!("failed to parse PEM file {}: {}", path.display(), e))
        })?;

    if certs.is_empty() {
        return Err(ServerError::Tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }

    Ok(certs)
}

fn load_private_key(path: &Path) -> ServerResult<PrivateKeyDer<'static>> {
    let pem = std::fs::read(path)
        .map_err(|e| ServerError::Tls(format!("failed to read key file {}: {}", path.display(), e)))?;

    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|e| {
            ServerError::Tls(format!("failed to parse PEM file {}: {}", path.display(), e))
        })?
        .ok_or_else(|| {
            ServerError::Tls(format!("no private key found in {}", path.display()))
        })
}
