use hyper::{
    HeaderMap, Method,
    header::{self, HeaderName, HeaderValue},
};
use log::{debug, error};

use super::handler::{Handler, Reply, RequestInfo, Status, respond};
use crate::{config::HeadersConfig, error::ServerError};

pub const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

#[derive(Debug, Clone)]
struct Cors {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

/// The headers added to every response, before it is sent
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    cors: Option<Cors>,
    frame_options: Option<HeaderValue>,
    script_cache_control: HeaderValue,
}

fn header_value(header: &str, value: &str) -> Result<HeaderValue, ServerError> {
    HeaderValue::from_str(value).map_err(|e| ServerError::InvalidHeaderValue {
        header: header.to_string(),
        message: e.to_string(),
    })
}

impl HeaderPolicy {
    pub fn from_config(config: &HeadersConfig) -> Result<Self, ServerError> {
        let cors = if config.cors {
            Some(Cors {
                allow_origin: header_value("Access-Control-Allow-Origin", &config.allow_origin)?,
                allow_methods: header_value("Access-Control-Allow-Methods", &config.allow_methods)?,
                allow_headers: header_value("Access-Control-Allow-Headers", &config.allow_headers)?,
            })
        } else {
            None
        };

        let frame_options = if config.security {
            Some(header_value("X-Frame-Options", &config.frame_options)?)
        } else {
            None
        };

        Ok(Self {
            cors,
            frame_options,
            script_cache_control: header_value(
                "Cache-Control",
                &format!("public, max-age={}", config.script_max_age),
            )?,
        })
    }

    /// Whether `OPTIONS` requests are answered by the policy instead of the wrapped handler
    pub fn answers_preflight(&self) -> bool {
        self.cors.is_some()
    }

    /// Insert the policy headers, replacing any value the handler already set.
    ///
    /// Request paths ending in `.js` also get the JavaScript content type and a public cache
    /// lifetime, whatever the status of the response. The suffix is matched on the
    /// percent-decoded path, the same route the file handler resolves.
    pub fn finalize_headers(&self, headers: &mut HeaderMap, path: &str) {
        let mut set = |name: HeaderName, value: &HeaderValue| {
            headers.insert(name, value.clone());
        };

        if let Some(cors) = &self.cors {
            set(header::ACCESS_CONTROL_ALLOW_ORIGIN, &cors.allow_origin);
            set(header::ACCESS_CONTROL_ALLOW_METHODS, &cors.allow_methods);
            set(header::ACCESS_CONTROL_ALLOW_HEADERS, &cors.allow_headers);
        }

        if let Some(frame_options) = &self.frame_options {
            set(
                header::X_CONTENT_TYPE_OPTIONS,
                &HeaderValue::from_static("nosniff"),
            );
            set(header::X_FRAME_OPTIONS, frame_options);
        }

        if is_script(path) {
            set(
                header::CONTENT_TYPE,
                &HeaderValue::from_static(JAVASCRIPT_CONTENT_TYPE),
            );
            set(header::CACHE_CONTROL, &self.script_cache_control);
        }
    }
}

fn is_script(path: &str) -> bool {
    match urlencoding::decode(path) {
        Ok(decoded) => decoded.ends_with(".js"),
        Err(_) => path.ends_with(".js"),
    }
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self {
            cors: Some(Cors {
                allow_origin: HeaderValue::from_static("*"),
                allow_methods: HeaderValue::from_static("GET, OPTIONS"),
                allow_headers: HeaderValue::from_static("Content-Type"),
            }),
            frame_options: Some(HeaderValue::from_static("SAMEORIGIN")),
            script_cache_control: HeaderValue::from_static("public, max-age=3600"),
        }
    }
}

/// Wraps a handler, answering preflight requests and applying a [`HeaderPolicy`] to every
/// response it produces
pub struct WithPolicy<H> {
    inner: H,
    policy: HeaderPolicy,
}

impl<H: Handler> WithPolicy<H> {
    pub fn new(inner: H, policy: HeaderPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<H: Handler> Handler for WithPolicy<H> {
    fn handle(&self, request: &RequestInfo) -> Result<Reply, ServerError> {
        let mut response = if request.method == Method::OPTIONS && self.policy.answers_preflight()
        {
            debug!("Answering preflight request for {}", request.path);
            respond(Status::Empty)
        } else {
            match self.inner.handle(request) {
                Ok(response) => response,
                Err(e) => {
                    error!("Failed to handle {} {}: {e}", request.method, request.path);
                    respond(Status::InternalServerError)
                }
            }
        };

        self.policy
            .finalize_headers(response.headers_mut(), &request.path);
        Ok(response)
    }
}
