// TLS context construction from the certificate pair on disk

pub mod pem;

use std::sync::{Arc, Once};

use log::debug;
use rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::{certificate::CertificatePaths, error::ServerError};

static CRYPTO_PROVIDER: Once = Once::new();

/// Install aws-lc-rs as the process-wide rustls crypto provider, once
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Another library may have installed a provider already, which is fine.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// Build a rustls `ServerConfig` from the certificate pair, without client authentication
pub fn build_server_config(paths: &CertificatePaths) -> Result<ServerConfig, ServerError> {
    install_crypto_provider();

    let certs = pem::load_certificate_chain(&paths.cert)?;
    if certs.is_empty() {
        return Err(ServerError::InvalidCertificateFile {
            path: paths.cert.display().to_string(),
            message: "No certificate found in file".to_string(),
        });
    }
    let key = pem::load_private_key(&paths.key)?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| {
            ServerError::TlsInitializationFailed(format!("Invalid certificate or key: {e}"))
        })?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    debug!("Loaded TLS certificate from {}", paths.cert.display());
    Ok(config)
}

/// Build the acceptor that wraps accepted TCP streams in TLS
pub fn build_acceptor(paths: &CertificatePaths) -> Result<TlsAcceptor, ServerError> {
    let config = build_server_config(paths)?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}
