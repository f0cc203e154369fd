use std::sync::Arc;

use beacon::config::HeadersConfig;
use beacon::error::ServerError;
use beacon::filesystem::mock::MockFilesystem;
use beacon::server::{
    Handler, HeaderPolicy, Reply, RequestInfo, StaticFiles, WithPolicy,
    policy::JAVASCRIPT_CONTENT_TYPE,
};
use http_body_util::BodyExt;
use hyper::{HeaderMap, Method, StatusCode, header};

const POLICY_HEADERS: [&str; 5] = [
    "access-control-allow-origin",
    "access-control-allow-methods",
    "access-control-allow-headers",
    "x-content-type-options",
    "x-frame-options",
];

fn handler() -> WithPolicy<StaticFiles> {
    let fs = MockFilesystem::new()
        .with_file("tracker.js", "console.log(1);")
        .with_file("page.html", "<p>hi</p>")
        .with_file("data.js.map", "{}");
    WithPolicy::new(StaticFiles::new(Arc::new(fs)), HeaderPolicy::default())
}

fn assert_policy_headers_once(headers: &HeaderMap) {
    for name in POLICY_HEADERS {
        assert_eq!(headers.get_all(name).iter().count(), 1, "{name}");
    }
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
}

async fn body(reply: Reply) -> Vec<u8> {
    reply.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn test_javascript_file_gets_overrides() {
    let reply = handler()
        .handle(&RequestInfo::new(Method::GET, "/tracker.js"))
        .unwrap();

    assert_eq!(reply.status(), StatusCode::OK);
    assert_policy_headers_once(reply.headers());
    assert_eq!(
        reply.headers().get_all(header::CONTENT_TYPE).iter().collect::<Vec<_>>(),
        vec![JAVASCRIPT_CONTENT_TYPE]
    );
    assert_eq!(reply.headers()[header::CACHE_CONTROL], "public, max-age=3600");
    assert_eq!(body(reply).await, b"console.log(1);");
}

#[tokio::test]
async fn test_encoded_script_path_gets_overrides() {
    let reply = handler()
        .handle(&RequestInfo::new(Method::GET, "/tracker%2Ejs"))
        .unwrap();

    assert_eq!(reply.status(), StatusCode::OK);
    assert_eq!(reply.headers()[header::CONTENT_TYPE], JAVASCRIPT_CONTENT_TYPE);
    assert_eq!(reply.headers()[header::CACHE_CONTROL], "public, max-age=3600");
    assert_eq!(body(reply).await, b"console.log(1);");
}

#[test]
fn test_script_with_trailing_slash_is_not_found() {
    let reply = handler()
        .handle(&RequestInfo::new(Method::GET, "/tracker.js/"))
        .unwrap();

    assert_eq!(reply.status(), StatusCode::NOT_FOUND);
    assert_policy_headers_once(reply.headers());
}

#[test]
fn test_other_files_keep_their_type() {
    for (path, content_type) in [("/page.html", "text/html"), ("/data.js.map", "application/json")] {
        let reply = handler().handle(&RequestInfo::new(Method::GET, path)).unwrap();

        assert_policy_headers_once(reply.headers());
        assert_eq!(reply.headers()[header::CONTENT_TYPE], content_type);
        assert!(reply.headers().get(header::CACHE_CONTROL).is_none());
    }
}

#[tokio::test]
async fn test_options_always_succeeds_with_empty_body() {
    for path in ["/anything", "/tracker.js", "/deeply/nested/missing.css", "/"] {
        let reply = handler()
            .handle(&RequestInfo::new(Method::OPTIONS, path))
            .unwrap();

        assert_eq!(reply.status(), StatusCode::OK, "{path}");
        assert_policy_headers_once(reply.headers());
        assert!(body(reply).await.is_empty());
    }
}

#[test]
fn test_missing_file_is_not_found_with_headers() {
    let reply = handler()
        .handle(&RequestInfo::new(Method::GET, "/nonexistent-file.xyz"))
        .unwrap();

    assert_eq!(reply.status(), StatusCode::NOT_FOUND);
    assert_policy_headers_once(reply.headers());
}

#[test]
fn test_missing_script_still_gets_javascript_type() {
    let reply = handler()
        .handle(&RequestInfo::new(Method::GET, "/missing.js"))
        .unwrap();

    assert_eq!(reply.status(), StatusCode::NOT_FOUND);
    assert_eq!(reply.headers()[header::CONTENT_TYPE], JAVASCRIPT_CONTENT_TYPE);
}

#[test]
fn test_unsupported_method_gets_headers() {
    let reply = handler()
        .handle(&RequestInfo::new(Method::DELETE, "/tracker.js"))
        .unwrap();

    assert_eq!(reply.status(), StatusCode::NOT_IMPLEMENTED);
    assert_policy_headers_once(reply.headers());
}

struct Failing;

impl Handler for Failing {
    fn handle(&self, _request: &RequestInfo) -> Result<Reply, ServerError> {
        Err(ServerError::TlsInitializationFailed("unexpected".to_string()))
    }
}

#[test]
fn test_handler_errors_become_500_with_headers() {
    let handler = WithPolicy::new(Failing, HeaderPolicy::default());
    let reply = handler
        .handle(&RequestInfo::new(Method::GET, "/tracker.js"))
        .unwrap();

    assert_eq!(reply.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_policy_headers_once(reply.headers());
}

#[test]
fn test_disabled_cors_passes_options_through() {
    let config = HeadersConfig {
        cors: false,
        ..HeadersConfig::default()
    };
    let policy = HeaderPolicy::from_config(&config).unwrap();
    assert!(!policy.answers_preflight());

    let fs = MockFilesystem::new().with_file("tracker.js", "console.log(1);");
    let handler = WithPolicy::new(StaticFiles::new(Arc::new(fs)), policy);

    let reply = handler
        .handle(&RequestInfo::new(Method::OPTIONS, "/tracker.js"))
        .unwrap();
    assert_eq!(reply.status(), StatusCode::NOT_IMPLEMENTED);
    assert!(reply.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(reply.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
}

#[test]
fn test_custom_policy_values() {
    let config = HeadersConfig {
        allow_origin: "https://app.example".to_string(),
        security: false,
        script_max_age: 60,
        ..HeadersConfig::default()
    };
    let policy = HeaderPolicy::from_config(&config).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "text/javascript".parse().unwrap());
    policy.finalize_headers(&mut headers, "/lib/app.js");

    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=60");
    assert_eq!(headers.get_all(header::CONTENT_TYPE).iter().count(), 1);
    assert!(headers.get(header::X_FRAME_OPTIONS).is_none());
    assert!(headers.get(header::X_CONTENT_TYPE_OPTIONS).is_none());
}

#[test]
fn test_invalid_header_value_is_rejected() {
    let config = HeadersConfig {
        frame_options: "DENY\r\n".to_string(),
        ..HeadersConfig::default()
    };

    assert!(matches!(
        HeaderPolicy::from_config(&config),
        Err(ServerError::InvalidHeaderValue { .. })
    ));
}
