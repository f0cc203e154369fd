use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a missing certificate pair gets created
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generator {
    /// Shell out to the `openssl` command-line tool
    #[default]
    Openssl,

    /// Synthesize the pair in-process
    Builtin,
}

impl std::str::FromStr for Generator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openssl" => Ok(Generator::Openssl),
            "builtin" => Ok(Generator::Builtin),
            _ => Err(format!("Invalid certificate generator: {s}")),
        }
    }
}

/// Certificate bootstrap options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    /// Path to the PEM certificate (default: server.crt)
    pub cert_file: String,

    /// Path to the unencrypted PEM private key (default: server.key)
    pub key_file: String,

    /// The generator used when either file is missing
    pub generator: Generator,

    /// Subject common name of generated certificates
    pub common_name: String,

    /// Validity of generated certificates, in days
    pub validity_days: u32,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            cert_file: "server.crt".to_string(),
            key_file: "server.key".to_string(),
            generator: Generator::default(),
            common_name: "localhost".to_string(),
            validity_days: 365,
        }
    }
}

impl CertificateConfig {
    pub fn cert_path(&self) -> PathBuf {
        PathBuf::from(&self.cert_file)
    }

    pub fn key_path(&self) -> PathBuf {
        PathBuf::from(&self.key_file)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, message: &str| ConfigError::InvalidField {
            field: format!("certificate.{field}"),
            message: message.to_string(),
        };

        if self.cert_file.trim().is_empty() {
            return Err(invalid("cert_file", "must not be empty"));
        }
        if self.key_file.trim().is_empty() {
            return Err(invalid("key_file", "must not be empty"));
        }
        if self.cert_file == self.key_file {
            return Err(invalid("key_file", "must differ from cert_file"));
        }
        if self.common_name.trim().is_empty() {
            return Err(invalid("common_name", "must not be empty"));
        }
        if self.validity_days == 0 {
            return Err(invalid("validity_days", "must be at least one day"));
        }

        Ok(())
    }
}
