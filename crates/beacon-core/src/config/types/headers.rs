use hyper::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The header policy applied to every response.
///
/// Disabling `cors` also disables preflight handling, so `OPTIONS` requests reach the file
/// handler like any other unsupported method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// Whether to send CORS headers and answer preflight requests
    pub cors: bool,

    /// Value of `Access-Control-Allow-Origin`
    pub allow_origin: String,

    /// Value of `Access-Control-Allow-Methods`
    pub allow_methods: String,

    /// Value of `Access-Control-Allow-Headers`
    pub allow_headers: String,

    /// Whether to send `X-Content-Type-Options` and `X-Frame-Options`
    pub security: bool,

    /// Value of `X-Frame-Options`
    pub frame_options: String,

    /// `max-age` of the `Cache-Control` header sent with JavaScript files, in seconds
    pub script_max_age: u32,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            cors: true,
            allow_origin: "*".to_string(),
            allow_methods: "GET, OPTIONS".to_string(),
            allow_headers: "Content-Type".to_string(),
            security: true,
            frame_options: "SAMEORIGIN".to_string(),
            script_max_age: 3600,
        }
    }
}

impl HeadersConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("allow_origin", &self.allow_origin),
            ("allow_methods", &self.allow_methods),
            ("allow_headers", &self.allow_headers),
            ("frame_options", &self.frame_options),
        ];

        for (field, value) in fields {
            if let Err(e) = HeaderValue::from_str(value) {
                return Err(ConfigError::InvalidField {
                    field: format!("headers.{field}"),
                    message: e.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_header_value() {
        let config = HeadersConfig {
            allow_origin: "https://a.example\nX-Injected: 1".to_string(),
            ..HeadersConfig::default()
        };

        assert!(config.validate().is_err());
        assert!(HeadersConfig::default().validate().is_ok());
    }
}
