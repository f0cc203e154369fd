use std::{io::ErrorKind, process::Command};

use log::{debug, trace};

use super::{CertificatePaths, CertificateProvider};
use crate::error::CertificateError;

const DEFAULT_PROGRAM: &str = "openssl";

/// Generates certificates by invoking the `openssl` command-line tool
#[derive(Debug, Clone)]
pub struct OpensslProvider {
    program: String,
    common_name: String,
    validity_days: u32,
}

impl OpensslProvider {
    pub fn new(common_name: impl Into<String>, validity_days: u32) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            common_name: common_name.into(),
            validity_days,
        }
    }

    /// Use a different executable, e.g. an absolute path to `openssl`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Verify the tool can be executed and return its version string
    pub fn check(&self) -> Result<String, CertificateError> {
        let output = Command::new(&self.program)
            .arg("version")
            .output()
            .map_err(|e| self.unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(self.unavailable(format!(
                "`{} version` exited with {}",
                self.program, output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Found {version}");
        Ok(version)
    }

    /// The arguments of a `req` invocation writing an unencrypted RSA key and a self-signed
    /// certificate
    pub fn arguments(&self, paths: &CertificatePaths) -> Vec<String> {
        vec![
            "req".to_string(),
            "-new".to_string(),
            "-x509".to_string(),
            "-newkey".to_string(),
            "rsa:2048".to_string(),
            "-nodes".to_string(),
            "-days".to_string(),
            self.validity_days.to_string(),
            "-subj".to_string(),
            format!("/CN={}", self.common_name),
            "-keyout".to_string(),
            paths.key.to_string_lossy().to_string(),
            "-out".to_string(),
            paths.cert.to_string_lossy().to_string(),
        ]
    }

    fn unavailable(&self, message: String) -> CertificateError {
        CertificateError::ToolingUnavailable {
            program: self.program.clone(),
            message,
        }
    }
}

impl CertificateProvider for OpensslProvider {
    fn name(&self) -> &'static str {
        "openssl"
    }

    fn generate(&self, paths: &CertificatePaths) -> Result<(), CertificateError> {
        let args = self.arguments(paths);
        trace!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => self.unavailable(e.to_string()),
                _ => CertificateError::CertificateGenerationFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CertificateError::CertificateGenerationFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_request_unencrypted_self_signed_pair() {
        let provider = OpensslProvider::new("localhost", 365);
        let args = provider.arguments(&CertificatePaths::new("server.crt", "server.key"));

        assert_eq!(
            args.join(" "),
            "req -new -x509 -newkey rsa:2048 -nodes -days 365 -subj /CN=localhost \
             -keyout server.key -out server.crt"
        );
    }

    #[test]
    fn test_missing_program_is_tooling_unavailable() {
        let provider =
            OpensslProvider::new("localhost", 365).with_program("beacon-no-such-openssl-binary");

        assert!(matches!(
            provider.check(),
            Err(CertificateError::ToolingUnavailable { .. })
        ));
    }
}
