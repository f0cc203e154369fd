use http_body_util::Full;
use hyper::{
    HeaderMap, Method, Request, Response, StatusCode, Version,
    body::Bytes,
    header::{self, HeaderValue},
};

use crate::error::ServerError;

/// The response type produced by every handler
pub type Reply = Response<Full<Bytes>>;

/// The parts of a request that handlers are allowed to look at
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,

    /// The raw (still percent-encoded) path, without the query string
    pub path: String,

    pub query: Option<String>,

    pub version: Version,
}

impl RequestInfo {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            version: Version::HTTP_11,
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            version: req.version(),
        }
    }
}

/// Turns a request into a response.
///
/// Handlers compose by wrapping each other, see [`super::policy::WithPolicy`].
pub trait Handler: Send + Sync {
    fn handle(&self, request: &RequestInfo) -> Result<Reply, ServerError>;
}

impl<H: Handler + ?Sized> Handler for std::sync::Arc<H> {
    fn handle(&self, request: &RequestInfo) -> Result<Reply, ServerError> {
        (**self).handle(request)
    }
}

pub enum Status {
    Ok {
        /// The body of the response
        body: Vec<u8>,

        /// The headers to include in the response
        headers: HeaderMap<HeaderValue>,
    },
    /// 200 without a body
    Empty,
    NotFound,
    NotImplemented,
    InternalServerError,
}

const NOT_FOUND: &str = "Not Found";
const NOT_IMPLEMENTED: &str = "Not Implemented";
const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

fn text(code: StatusCode, message: &'static str) -> Reply {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = code;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Build a response for the given status
pub fn respond(status: Status) -> Reply {
    match status {
        Status::Ok { body, headers } => {
            let mut response = Response::new(Full::new(Bytes::from(body)));
            response.headers_mut().extend(headers);
            response
        }
        Status::Empty => {
            let mut response = Response::new(Full::new(Bytes::new()));
            response
                .headers_mut()
                .insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
            response
        }
        Status::NotFound => text(StatusCode::NOT_FOUND, NOT_FOUND),
        Status::NotImplemented => text(StatusCode::NOT_IMPLEMENTED, NOT_IMPLEMENTED),
        Status::InternalServerError => {
            text(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
        }
    }
}
