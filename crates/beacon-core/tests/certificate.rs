use std::path::Path;

use beacon::certificate::{
    Bootstrap, CertificatePaths, CertificateProvider, OpensslProvider, SelfSignedProvider,
};
use beacon::error::CertificateError;
use tempfile::TempDir;
use x509_parser::pem::parse_x509_pem;

const DAY: i64 = 24 * 60 * 60;

fn paths(dir: &Path) -> CertificatePaths {
    CertificatePaths::new(dir.join("server.crt"), dir.join("server.key"))
}

/// Assert the pair on disk is a self-signed certificate for `localhost` and a usable key
fn assert_localhost_pair(paths: &CertificatePaths, validity_days: i64) {
    let pem_bytes = std::fs::read(&paths.cert).unwrap();
    let (_, pem) = parse_x509_pem(&pem_bytes).unwrap();
    let cert = pem.parse_x509().unwrap();

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok());
    assert_eq!(common_name, Some("localhost"));
    assert_eq!(cert.subject().to_string(), cert.issuer().to_string());

    let validity = cert.validity();
    let lifetime = validity.not_after.timestamp() - validity.not_before.timestamp();
    assert!(
        (lifetime - validity_days * DAY).abs() <= DAY,
        "unexpected validity of {lifetime} seconds"
    );

    assert!(beacon::tls::build_server_config(paths).is_ok());
}

#[test]
fn test_existing_pair_is_left_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());
    std::fs::write(&paths.cert, "existing certificate").unwrap();
    std::fs::write(&paths.key, "existing key").unwrap();

    let providers: [Box<dyn CertificateProvider>; 2] = [
        Box::new(SelfSignedProvider::new("localhost", 365)),
        Box::new(OpensslProvider::new("localhost", 365).with_program("beacon-no-such-openssl")),
    ];

    for provider in providers {
        assert_eq!(provider.ensure(&paths).unwrap(), Bootstrap::Reused);
        assert_eq!(std::fs::read(&paths.cert).unwrap(), b"existing certificate");
        assert_eq!(std::fs::read(&paths.key).unwrap(), b"existing key");
    }
}

#[test]
fn test_missing_pair_is_generated() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());

    let provider = SelfSignedProvider::new("localhost", 365);
    assert_eq!(provider.ensure(&paths).unwrap(), Bootstrap::Generated);
    assert_localhost_pair(&paths, 365);
}

#[test]
fn test_missing_key_regenerates_both_files() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());
    std::fs::write(&paths.cert, "stale certificate").unwrap();

    let provider = SelfSignedProvider::new("localhost", 365);
    assert_eq!(provider.ensure(&paths).unwrap(), Bootstrap::Generated);
    assert_ne!(std::fs::read(&paths.cert).unwrap(), b"stale certificate");
    assert_localhost_pair(&paths, 365);
}

#[test]
fn test_parent_directories_are_created() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(&temp_dir.path().join("certs/nested"));

    SelfSignedProvider::new("localhost", 7).ensure(&paths).unwrap();
    assert!(paths.exist());
}

#[cfg(unix)]
#[test]
fn test_generated_key_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());
    SelfSignedProvider::new("localhost", 1).ensure(&paths).unwrap();

    let mode = std::fs::metadata(&paths.key).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn test_regenerated_key_replaces_open_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());
    std::fs::write(&paths.key, "stale key").unwrap();
    std::fs::set_permissions(&paths.key, std::fs::Permissions::from_mode(0o644)).unwrap();

    let outcome = SelfSignedProvider::new("localhost", 1).ensure(&paths).unwrap();
    assert_eq!(outcome, Bootstrap::Generated);

    let mode = std::fs::metadata(&paths.key).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_ne!(std::fs::read_to_string(&paths.key).unwrap(), "stale key");
}

#[test]
fn test_missing_tool_is_tooling_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());
    let provider = OpensslProvider::new("localhost", 365).with_program("beacon-no-such-openssl");

    let result = provider.ensure(&paths);
    assert!(matches!(
        result,
        Err(CertificateError::ToolingUnavailable { .. })
    ));
    assert!(!paths.cert.exists());
}

#[test]
fn test_openssl_generates_localhost_pair() {
    let provider = OpensslProvider::new("localhost", 365);
    if let Err(e) = provider.check() {
        eprintln!("skipping, openssl is not available: {e}");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());

    assert_eq!(provider.ensure(&paths).unwrap(), Bootstrap::Generated);
    assert_localhost_pair(&paths, 365);
}

#[cfg(unix)]
#[test]
fn test_failing_tool_is_generation_failure() {
    // `false` exists everywhere and always exits non-zero
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(temp_dir.path());
    let provider = OpensslProvider::new("localhost", 365).with_program("false");

    assert!(matches!(
        provider.ensure(&paths),
        Err(CertificateError::CertificateGenerationFailed(_))
    ));
}
