use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

use crate::{config::Format, error::ConfigError};

use super::{CertificateConfig, HeadersConfig, LogLevel};

/// The core configuration options available
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The IP address to bind the server to (default: 0.0.0.0)
    #[serde(default = "Config::default_host")]
    pub host: IpAddr,

    /// The port number to bind the server to (default: 4443)
    #[serde(default = "Config::default_port")]
    pub port: u16,

    /// The directory files are served from (default: the working directory)
    #[serde(default = "Config::default_document_root")]
    pub document_root: String,

    /// The log level to use (default: "info")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    /// The script advertised in the startup banner, relative to the document root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_script: Option<String>,

    /// Where the certificate pair lives and how it is created when missing
    #[serde(default)]
    pub certificate: CertificateConfig,

    /// The CORS and security headers added to every response
    #[serde(default)]
    pub headers: HeadersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: Config::default_host(),
            port: Config::default_port(),
            document_root: Config::default_document_root(),
            log_level: None,
            tracking_script: None,
            certificate: CertificateConfig::default(),
            headers: HeadersConfig::default(),
        }
    }
}

impl Config {
    pub fn default_host() -> IpAddr {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    }

    pub fn default_port() -> u16 {
        4443
    }

    pub fn default_document_root() -> String {
        ".".to_string()
    }

    /// The document root as a path
    pub fn document_root(&self) -> PathBuf {
        PathBuf::from(&self.document_root)
    }

    /// Check the values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_root.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "document_root".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if let Some(script) = &self.tracking_script {
            if script.trim_matches('/').is_empty() {
                return Err(ConfigError::InvalidField {
                    field: "tracking_script".to_string(),
                    message: "must name a file".to_string(),
                });
            }
        }

        self.certificate.validate()?;
        self.headers.validate()
    }

    /// Writes the configuration to a file in the specified format
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        format: &dyn Format<'_>,
    ) -> Result<(), ConfigError> {
        let config_str = format.to_format_string(self)?;
        std::fs::write(path, config_str)?;

        Ok(())
    }
}
