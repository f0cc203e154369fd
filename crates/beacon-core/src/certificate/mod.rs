// Certificate bootstrap: make sure a certificate/key pair exists before the listener starts

pub mod openssl;
pub mod self_signed;

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    config::{CertificateConfig, Generator},
    error::CertificateError,
};

pub use self::{openssl::OpensslProvider, self_signed::SelfSignedProvider};

/// Locations of the PEM certificate and private key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl CertificatePaths {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }

    /// Whether both files are present
    pub fn exist(&self) -> bool {
        self.cert.is_file() && self.key.is_file()
    }

    /// Create the parent directories of both files
    fn create_parents(&self) -> Result<(), CertificateError> {
        for path in [&self.cert, &self.key] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
            }
        }

        Ok(())
    }
}

impl From<&CertificateConfig> for CertificatePaths {
    fn from(config: &CertificateConfig) -> Self {
        Self::new(config.cert_path(), config.key_path())
    }
}

/// What [`CertificateProvider::ensure`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Both files already existed and were left untouched
    Reused,

    /// The pair was (re)generated
    Generated,
}

/// A source of self-signed certificate pairs.
///
/// Implementations only need to know how to write a fresh pair, the decision of whether one is
/// needed at all is shared.
pub trait CertificateProvider: Send + Sync {
    /// A short name for log messages
    fn name(&self) -> &'static str;

    /// Write a new certificate and private key to `paths`, replacing whatever is there
    fn generate(&self, paths: &CertificatePaths) -> Result<(), CertificateError>;

    /// Make sure both files exist, generating a new pair if either one is missing
    fn ensure(&self, paths: &CertificatePaths) -> Result<Bootstrap, CertificateError> {
        if paths.exist() {
            debug!(
                "Reusing existing certificate {} and key {}",
                paths.cert.display(),
                paths.key.display()
            );
            return Ok(Bootstrap::Reused);
        }

        info!("Generating self-signed certificate using {}", self.name());
        paths.create_parents()?;
        self.generate(paths)?;

        if !paths.exist() {
            return Err(CertificateError::CertificateGenerationFailed(format!(
                "{} reported success but {} or {} is missing",
                self.name(),
                paths.cert.display(),
                paths.key.display()
            )));
        }

        info!(
            "Certificate generated: {}, {}",
            paths.cert.display(),
            paths.key.display()
        );
        Ok(Bootstrap::Generated)
    }
}

/// Build the provider selected by the configuration
pub fn provider_for(config: &CertificateConfig) -> Box<dyn CertificateProvider> {
    match config.generator {
        Generator::Openssl => Box::new(OpensslProvider::new(
            config.common_name.clone(),
            config.validity_days,
        )),
        Generator::Builtin => Box::new(SelfSignedProvider::new(
            config.common_name.clone(),
            config.validity_days,
        )),
    }
}

pub(crate) fn write_failed(path: &Path, error: std::io::Error) -> CertificateError {
    CertificateError::WriteFailed {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
