use rustls::ServerConfig;
use rustls::pki_types::{ CertificateDer, PrivateKeyDer };
use rustls_pemfile::{ certs, private_key };
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to read PEM data from '{path}': {source}")]
    Pem {
        path: String,
        source: std::io::Error,
    },

    #[error("no certificate found in '{0}'")]
    NoCertificate(String),

    #[error("no private key found in '{0}'")]
    NoPrivateKey(String),

    #[error(transparent)]
    Rustls(#[from] rustls::Error),
}

fn open(path: &str) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Open { path: path.to_string(), source })
}

/// Builds a rustls server config from PEM encoded certificate chain and key.
pub fn load_tls_config(cert_path: &str, key_path: &str) -> Result<Arc<ServerConfig>, TlsError> {
    let cert_chain: Vec<CertificateDer<'static>> = certs(&mut open(cert_path)?)
        .collect::<Result<_, _>>()
        .map_err(|source| TlsError::Pem { path: cert_path.to_string(), source })?;
    if cert_chain.is_empty() {
        return Err(TlsError::NoCertificate(cert_path.to_string()));
    }

    let key: PrivateKeyDer<'static> = private_key(&mut open(key_path)?)
        .map_err(|source| TlsError::Pem { path: key_path.to_string(), source })?
        .ok_or_else(|| TlsError::NoPrivateKey(key_path.to_string()))?;

    let config = ServerConfig::builder_with_provider(
        Arc::new(rustls::crypto::ring::default_provider())
    )
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(cert_chain, key)?;

    Ok(Arc::new(config))
}
