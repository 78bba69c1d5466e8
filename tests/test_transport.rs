//! Integration tests for secure transport construction and context loading

mod common;

use std::fs;
use std::time::Duration;

use common::{config_yaml, generate_self_signed_cert};
use tempfile::TempDir;
use temporal_cloud_metrics_adapter::transport::ClientTlsMaterial;
use temporal_cloud_metrics_adapter::{
    AdapterContext, AdapterError, ConnectionError, ScopeLoadError, SecureTransport, TlsConfig,
};

fn tls_config(dir: &TempDir) -> TlsConfig {
    let certs = generate_self_signed_cert(dir.path());
    TlsConfig {
        ca: None,
        cert: certs.cert,
        key: certs.key,
    }
}

#[test]
fn test_build_with_client_identity() {
    let temp_dir = TempDir::new().unwrap();
    let tls = tls_config(&temp_dir);

    let transport = SecureTransport::build(&tls, Duration::from_secs(3)).unwrap();
    assert_eq!(transport.timeout(), Duration::from_secs(3));
}

#[test]
fn test_build_with_ca_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let mut tls = tls_config(&temp_dir);

    // A self-signed certificate doubles as its own CA
    let ca_path = temp_dir.path().join("ca.pem");
    let bundle = format!(
        "{}\n{}",
        fs::read_to_string(&tls.cert).unwrap(),
        fs::read_to_string(&tls.cert).unwrap()
    );
    fs::write(&ca_path, bundle).unwrap();
    tls.ca = Some(ca_path);

    let material = ClientTlsMaterial::load(&tls).unwrap();
    assert_eq!(material.root_count(), Some(2));
    assert!(SecureTransport::from_material(material, Duration::from_secs(30)).is_ok());
}

#[test]
fn test_missing_client_certificate() {
    let temp_dir = TempDir::new().unwrap();
    let mut tls = tls_config(&temp_dir);
    tls.cert = temp_dir.path().join("absent.pem");

    let err = SecureTransport::build(&tls, Duration::from_secs(30)).unwrap_err();
    assert!(matches!(
        err,
        ConnectionError::Unreadable {
            kind: "client certificate",
            ..
        }
    ));
}

#[test]
fn test_missing_client_key() {
    let temp_dir = TempDir::new().unwrap();
    let mut tls = tls_config(&temp_dir);
    tls.key = temp_dir.path().join("absent.key");

    let err = SecureTransport::build(&tls, Duration::from_secs(30)).unwrap_err();
    assert!(matches!(
        err,
        ConnectionError::Unreadable {
            kind: "client key",
            ..
        }
    ));
}

#[test]
fn test_garbage_client_key() {
    let temp_dir = TempDir::new().unwrap();
    let tls = tls_config(&temp_dir);
    fs::write(&tls.key, "this is not a private key").unwrap();

    let err = SecureTransport::build(&tls, Duration::from_secs(30)).unwrap_err();
    assert!(matches!(err, ConnectionError::InvalidIdentity(_)));
}

#[test]
fn test_mismatched_cert_and_key() {
    let cert_dir = TempDir::new().unwrap();
    let key_dir = TempDir::new().unwrap();
    let ours = generate_self_signed_cert(cert_dir.path());
    let theirs = generate_self_signed_cert(key_dir.path());

    let tls = TlsConfig {
        ca: None,
        cert: ours.cert,
        key: theirs.key,
    };

    let err = SecureTransport::build(&tls, Duration::from_secs(30)).unwrap_err();
    assert!(
        matches!(err, ConnectionError::InvalidIdentity(ref reason) if reason.contains("does not match")),
        "unexpected error: {}",
        err
    );
}

#[test]
fn test_ca_block_with_corrupt_body() {
    let temp_dir = TempDir::new().unwrap();
    let mut tls = tls_config(&temp_dir);
    let ca_path = temp_dir.path().join("ca.pem");
    fs::write(
        &ca_path,
        "-----BEGIN CERTIFICATE-----\n!!not*base64!!\n-----END CERTIFICATE-----\n",
    )
    .unwrap();
    tls.ca = Some(ca_path);

    let err = SecureTransport::build(&tls, Duration::from_secs(30)).unwrap_err();
    assert!(matches!(err, ConnectionError::InvalidCa { .. }));
}

#[test]
fn test_ca_block_that_is_not_a_certificate() {
    let temp_dir = TempDir::new().unwrap();
    let mut tls = tls_config(&temp_dir);
    let ca_path = temp_dir.path().join("ca.pem");
    // Valid base64, but the DER inside is not an X.509 certificate
    fs::write(
        &ca_path,
        "-----BEGIN CERTIFICATE-----\naGVsbG8gd29ybGQ=\n-----END CERTIFICATE-----\n",
    )
    .unwrap();
    tls.ca = Some(ca_path);

    let err = ClientTlsMaterial::load(&tls).err().unwrap();
    assert!(matches!(err, ConnectionError::InvalidCa { .. }));
}

#[test]
fn test_ca_bundle_without_certificates() {
    let temp_dir = TempDir::new().unwrap();
    let mut tls = tls_config(&temp_dir);
    let ca_path = temp_dir.path().join("ca.pem");
    fs::write(&ca_path, "not pem at all").unwrap();
    tls.ca = Some(ca_path);

    let err = SecureTransport::build(&tls, Duration::from_secs(30)).unwrap_err();
    assert!(matches!(err, ConnectionError::InvalidCa { .. }));
}

#[test]
fn test_missing_ca_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let mut tls = tls_config(&temp_dir);
    tls.ca = Some(temp_dir.path().join("absent-ca.pem"));

    let err = SecureTransport::build(&tls, Duration::from_secs(30)).unwrap_err();
    assert!(matches!(
        err,
        ConnectionError::Unreadable {
            kind: "CA bundle",
            ..
        }
    ));
}

#[test]
fn test_load_context() {
    let temp_dir = TempDir::new().unwrap();
    let certs = generate_self_signed_cert(temp_dir.path());

    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        config_yaml(
            "https://example.com/prometheus",
            &certs,
            "  temporal_cloud_sync_match_rate:\n    query: foo - bar\n",
        ),
    )
    .unwrap();

    let namespace_path = temp_dir.path().join("namespace");
    fs::write(&namespace_path, "testing.xyz").unwrap();

    let context = AdapterContext::load(&config_path, &namespace_path).unwrap();

    assert_eq!(context.scope().namespace(), "testing.xyz");
    assert_eq!(
        context.config().temporal_cloud.metrics_endpoint,
        "https://example.com/prometheus"
    );
    assert_eq!(
        context.config().query_for("temporal_cloud_sync_match_rate"),
        Some("foo - bar")
    );
    assert_eq!(context.transport().timeout(), Duration::from_secs(30));
}

#[test]
fn test_load_context_without_namespace_file() {
    let temp_dir = TempDir::new().unwrap();
    let certs = generate_self_signed_cert(temp_dir.path());

    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, config_yaml("https://example.com", &certs, "")).unwrap();

    let err = AdapterContext::load(&config_path, temp_dir.path().join("namespace")).unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Scope(ScopeLoadError::Unreadable { .. })
    ));
}

#[test]
fn test_load_context_with_bad_tls_material() {
    let temp_dir = TempDir::new().unwrap();
    let certs = generate_self_signed_cert(temp_dir.path());
    fs::remove_file(&certs.key).unwrap();

    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, config_yaml("https://example.com", &certs, "")).unwrap();
    let namespace_path = temp_dir.path().join("namespace");
    fs::write(&namespace_path, "testing.xyz").unwrap();

    let err = AdapterContext::load(&config_path, &namespace_path).unwrap_err();
    assert!(matches!(err, AdapterError::Connection(_)));
}
