use std::path::PathBuf;

use beacon::error::{CertificateError, ConfigError, ServerError};
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error("Failed to read the configuration file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Generic(String),
}

impl CliError {
    /// The process exit code for this error; 0 is reserved for a clean shutdown
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            CliError::Server(ServerError::PortBindFailed(_)) => 2,
            CliError::Server(ServerError::Certificate(CertificateError::ToolingUnavailable {
                ..
            })) => 3,
            CliError::Server(ServerError::Certificate(_)) => 4,
            _ => 1,
        }
    }

    /// Extra guidance printed below the error message
    pub(crate) fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Server(ServerError::Certificate(CertificateError::ToolingUnavailable {
                ..
            })) => Some(
                "Install OpenSSL and make sure it is on your PATH, \
                 or run with `--generator builtin` to create the certificate without it.",
            ),
            CliError::Server(ServerError::PortBindFailed(_)) => {
                Some("Is another server already listening on this port?")
            }
            _ => None,
        }
    }
}
