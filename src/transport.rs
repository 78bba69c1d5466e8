//! Secure transport
//!
//! Builds the mTLS HTTP client used for every backend query. The client is
//! assembled once at startup and shared read-only afterwards; `reqwest::Client`
//! is reference counted internally so clones share one connection pool.

use std::path::Path;
use std::time::Duration;

use reqwest::{Certificate, Client, Identity};
use rustls::pki_types::CertificateDer;
use rustls::sign::CertifiedKey;
use rustls::{InconsistentKeys, RootCertStore};
use secrecy::{ExposeSecret, SecretVec};
use tracing::{debug, info, warn};

use crate::config::TlsConfig;
use crate::error::ConnectionError;

/// Client TLS material read from disk
pub struct ClientTlsMaterial {
    identity: Identity,
    roots: Option<Vec<Certificate>>,
}

impl ClientTlsMaterial {
    /// Read and parse the certificate, key and optional CA bundle
    ///
    /// The private key must belong to the leaf certificate.
    pub fn load(tls: &TlsConfig) -> Result<Self, ConnectionError> {
        let roots = match tls.ca {
            Some(ref ca) => Some(load_ca_bundle(ca)?),
            None => None,
        };

        let cert = read_material("client certificate", &tls.cert)?;
        let key = SecretVec::new(read_material("client key", &tls.key)?);

        check_key_pair(&cert, key.expose_secret())?;

        // reqwest expects certificate chain and key in a single PEM buffer
        let mut combined = Vec::with_capacity(cert.len() + key.expose_secret().len() + 1);
        combined.extend_from_slice(&cert);
        combined.push(b'\n');
        combined.extend_from_slice(key.expose_secret());
        let combined = SecretVec::new(combined);

        let identity = Identity::from_pem(combined.expose_secret())
            .map_err(|e| ConnectionError::InvalidIdentity(e.to_string()))?;

        debug!(
            cert_path = %tls.cert.display(),
            key_path = %tls.key.display(),
            "Loaded client identity"
        );

        Ok(Self { identity, roots })
    }

    /// Number of trust roots loaded from the CA bundle, if one is configured
    pub fn root_count(&self) -> Option<usize> {
        self.roots.as_ref().map(Vec::len)
    }
}

/// Shared mTLS client for the metrics backend
#[derive(Debug, Clone)]
pub struct SecureTransport {
    client: Client,
    timeout: Duration,
}

impl SecureTransport {
    /// Load TLS material and build the client
    ///
    /// `timeout` bounds every request made through the transport.
    pub fn build(tls: &TlsConfig, timeout: Duration) -> Result<Self, ConnectionError> {
        let material = ClientTlsMaterial::load(tls)?;
        Self::from_material(material, timeout)
    }

    /// Build the client from already loaded material
    pub fn from_material(
        material: ClientTlsMaterial,
        timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let root_count = material.root_count();

        let mut builder = Client::builder()
            .use_rustls_tls()
            .identity(material.identity)
            .timeout(timeout);

        // A configured CA bundle replaces the built-in roots
        if let Some(roots) = material.roots {
            builder = builder.tls_built_in_root_certs(false);
            for root in roots {
                builder = builder.add_root_certificate(root);
            }
        }

        let client = builder
            .build()
            .map_err(|e| ConnectionError::ClientBuild(e.to_string()))?;

        info!(
            timeout_secs = timeout.as_secs_f64(),
            custom_roots = ?root_count,
            "Built secure transport"
        );

        Ok(Self { client, timeout })
    }

    /// HTTP client carrying the client identity
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Per-request deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn read_material(kind: &'static str, path: &Path) -> Result<Vec<u8>, ConnectionError> {
    std::fs::read(path).map_err(|e| ConnectionError::Unreadable {
        kind,
        path: path.display().to_string(),
        source: e,
    })
}

/// Decode every `CERTIFICATE` block in a PEM buffer
///
/// Other PEM sections and text between blocks are skipped.
fn pem_certificates(pem: &[u8]) -> std::io::Result<Vec<CertificateDer<'static>>> {
    rustls_pemfile::certs(&mut &pem[..]).collect()
}

/// Reject a private key that does not belong to the leaf certificate
fn check_key_pair(cert_pem: &[u8], key_pem: &[u8]) -> Result<(), ConnectionError> {
    let invalid = ConnectionError::InvalidIdentity;

    let chain = pem_certificates(cert_pem)
        .map_err(|e| invalid(format!("client certificate: {}", e)))?;
    if chain.is_empty() {
        return Err(invalid("no certificate found in client certificate file".to_string()));
    }

    let key = rustls_pemfile::private_key(&mut &key_pem[..])
        .map_err(|e| invalid(format!("client key: {}", e)))?
        .ok_or_else(|| invalid("no private key found in client key file".to_string()))?;

    let signing_key = rustls::crypto::ring::sign::any_supported_type(&key)
        .map_err(|e| invalid(format!("client key: {}", e)))?;

    match CertifiedKey::new(chain, signing_key).keys_match() {
        Ok(()) => Ok(()),
        Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => {
            warn!("Cannot derive public key from client key; skipping cert/key match check");
            Ok(())
        }
        Err(rustls::Error::InconsistentKeys(InconsistentKeys::KeyMismatch)) => Err(invalid(
            "client key does not match client certificate".to_string(),
        )),
        Err(e) => Err(invalid(e.to_string())),
    }
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>, ConnectionError> {
    let bytes = read_material("CA bundle", path)?;
    let invalid = |reason: String| ConnectionError::InvalidCa {
        path: path.display().to_string(),
        reason,
    };

    let ders = pem_certificates(&bytes).map_err(|e| invalid(e.to_string()))?;
    if ders.is_empty() {
        return Err(invalid("no PEM certificates found".to_string()));
    }

    // Parse each block as a trust anchor so corrupt DER fails here
    let mut store = RootCertStore::empty();
    let mut roots = Vec::with_capacity(ders.len());
    for der in ders {
        roots.push(Certificate::from_der(der.as_ref()).map_err(|e| invalid(e.to_string()))?);
        store.add(der).map_err(|e| invalid(e.to_string()))?;
    }

    debug!(
        ca_path = %path.display(),
        certificates = roots.len(),
        "Loaded CA bundle"
    );

    Ok(roots)
}
