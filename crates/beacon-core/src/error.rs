use std::path::PathBuf;

use thiserror::Error;

use crate::filesystem::FilesystemError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error in `{field}`: {message}")]
    InvalidField { field: String, message: String },

    #[error("Failed to parse `{field}`: {message}")]
    ParseError { field: String, message: String },

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(String),

    #[error("Failed to write configuration file: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Certificate tool `{program}` is not available: {message}")]
    ToolingUnavailable { program: String, message: String },

    #[error("Certificate generation failed: {0}")]
    CertificateGenerationFailed(String),

    #[error("Failed to write `{path}`: {message}")]
    WriteFailed { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid socket address `{address}`: {message}")]
    InvalidRawSocketAddress { address: String, message: String },

    #[error("Failed to bind to address: {0}")]
    PortBindFailed(std::io::Error),

    #[error("Failed to accept connection: {0}")]
    FailedToAcceptConnection(std::io::Error),

    #[error("Invalid certificate file `{path}`: {message}")]
    InvalidCertificateFile { path: String, message: String },

    #[error("Invalid private key file `{path}`: {message}")]
    InvalidPrivateKeyFile { path: String, message: String },

    #[error("Failed to initialize TLS: {0}")]
    TlsInitializationFailed(String),

    #[error("Invalid value for header `{header}`: {message}")]
    InvalidHeaderValue { header: String, message: String },

    #[error(transparent)]
    FilesystemError(#[from] FilesystemError),

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
