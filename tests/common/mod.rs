//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use temporal_cloud_metrics_adapter::{
    AdapterContext, ConfigLoader, ScopeIdentity, SecureTransport, TemporalCloudProvider,
};

/// Paths of a generated self-signed client certificate and key
pub struct CertFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Write a fresh self-signed certificate and its PKCS#8 key into `dir`
pub fn generate_self_signed_cert(dir: &Path) -> CertFiles {
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let params = rcgen::CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    let cert = params.self_signed(&key_pair).unwrap();

    let cert_path = dir.join("cert.pem");
    let key_path = dir.join("key.pem");
    std::fs::write(&cert_path, cert.pem()).unwrap();
    std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();

    CertFiles {
        cert: cert_path,
        key: key_path,
    }
}

/// Render a config document for `endpoint` with the given metrics block
pub fn config_yaml(endpoint: &str, certs: &CertFiles, metrics: &str) -> String {
    format!(
        r#"
version: "1"
temporal_cloud:
  metrics_endpoint: {}
  tls:
    cert: {}
    key: {}
metrics:
{}
"#,
        endpoint,
        certs.cert.display(),
        certs.key.display(),
        metrics
    )
}

/// Provider over a mock backend at `endpoint`, scoped to `namespace`
pub fn provider_for(
    dir: &TempDir,
    endpoint: &str,
    namespace: &str,
    metrics: &str,
) -> TemporalCloudProvider {
    let certs = generate_self_signed_cert(dir.path());
    let config = ConfigLoader::from_yaml_str(&config_yaml(endpoint, &certs, metrics)).unwrap();
    let transport = SecureTransport::build(&config.temporal_cloud.tls, Duration::from_secs(5)).unwrap();

    AdapterContext::new(config, transport, ScopeIdentity::new(namespace)).into_provider()
}

/// Transport built from freshly generated material
pub fn transport(dir: &TempDir, timeout: Duration) -> SecureTransport {
    let certs = generate_self_signed_cert(dir.path());
    let tls = temporal_cloud_metrics_adapter::TlsConfig {
        ca: None,
        cert: certs.cert,
        key: certs.key,
    };
    SecureTransport::build(&tls, timeout).unwrap()
}

/// Instant-vector response body with one entry per `(labels, timestamp, value)`
pub fn vector_response(series: &[(&[(&str, &str)], f64, &str)]) -> serde_json::Value {
    let result: Vec<serde_json::Value> = series
        .iter()
        .map(|(labels, timestamp, value)| {
            let metric: serde_json::Map<String, serde_json::Value> = labels
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                .collect();
            serde_json::json!({ "metric": metric, "value": [timestamp, value] })
        })
        .collect();

    serde_json::json!({
        "status": "success",
        "data": { "resultType": "vector", "result": result }
    })
}
