use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls_pemfile::{certs, private_key};

use crate::error::ServerError;

/// Canonicalize a certificate or key path and make sure it points at a regular file
fn validate_pem_path(path: &Path, file_type: &str) -> Result<PathBuf, String> {
    let canonical = path
        .canonicalize()
        .map_err(|e| format!("Cannot access {file_type}: {e}"))?;

    if !canonical.is_file() {
        return Err(format!("{file_type} path is not a file"));
    }

    Ok(canonical)
}

/// Load every certificate from a PEM file
pub fn load_certificate_chain(path: &Path) -> Result<Vec<CertificateDer<'static>>, ServerError> {
    let invalid = |message: String| ServerError::InvalidCertificateFile {
        path: path.display().to_string(),
        message,
    };

    let path = validate_pem_path(path, "certificate").map_err(invalid)?;
    let file = File::open(&path).map_err(|e| invalid(e.to_string()))?;

    certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| invalid(format!("Failed to parse certificate: {e}")))
}

/// Load the first private key (PKCS#1, PKCS#8 or SEC1) from a PEM file
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, ServerError> {
    let invalid = |message: String| ServerError::InvalidPrivateKeyFile {
        path: path.display().to_string(),
        message,
    };

    let path = validate_pem_path(path, "private key").map_err(invalid)?;
    let file = File::open(&path).map_err(|e| invalid(e.to_string()))?;

    private_key(&mut BufReader::new(file))
        .map_err(|e| invalid(format!("Failed to parse private key: {e}")))?
        .ok_or_else(|| invalid("No private key found in file".to_string()))
}
