//! Configuration type definitions
//!
//! Mirrors the adapter's YAML document:
//!
//! ```yaml
//! version: "1"
//! temporal_cloud:
//!   metrics_endpoint: https://account.tmprl.cloud/prometheus
//!   tls:
//!     ca: /etc/tcma/ca.pem
//!     cert: /etc/tcma/client.pem
//!     key: /etc/tcma/client.key
//! metrics:
//!   temporal_cloud_sync_match_rate:
//!     query: sum(rate(temporal_cloud_v0_poll_success_sync_count[1m]))
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigLoadError;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Document version, carried through unchanged
    #[serde(default)]
    pub version: String,

    /// Metrics backend connection settings
    pub temporal_cloud: TemporalCloudConfig,

    /// External metric name to backend query
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metrics: HashMap<String, MetricQuery>,
}

impl Config {
    /// Validate configuration values
    ///
    /// Query templates are opaque and are not inspected.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.temporal_cloud.validate()
    }

    /// Query configured for `metric`, if any
    ///
    /// An empty query counts as unconfigured.
    pub fn query_for(&self, metric: &str) -> Option<&str> {
        self.metrics
            .get(metric)
            .map(|q| q.query.as_str())
            .filter(|q| !q.is_empty())
    }
}

/// Metrics backend connection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemporalCloudConfig {
    /// Backend base URL, used verbatim (no trailing-slash normalization)
    pub metrics_endpoint: String,

    /// Client TLS material
    pub tls: TlsConfig,

    /// Deadline for a single backend request in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl TemporalCloudConfig {
    /// Validate endpoint and timeout
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.metrics_endpoint.is_empty() {
            return Err(ConfigLoadError::ValidationFailed(
                "temporal_cloud.metrics_endpoint cannot be empty".to_string(),
            ));
        }

        let url = url::Url::parse(&self.metrics_endpoint).map_err(|e| {
            ConfigLoadError::ValidationFailed(format!(
                "temporal_cloud.metrics_endpoint is not a valid URL: {}",
                e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigLoadError::ValidationFailed(
                "temporal_cloud.metrics_endpoint must use http:// or https:// scheme".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigLoadError::ValidationFailed(
                "temporal_cloud.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Request deadline as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Locations of the client TLS material
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Optional CA bundle; when set it replaces the built-in trust roots
    #[serde(default, deserialize_with = "empty_path_as_none")]
    pub ca: Option<PathBuf>,

    /// Client certificate (PEM)
    pub cert: PathBuf,

    /// Client private key (PEM)
    pub key: PathBuf,
}

/// Backend query for one external metric
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MetricQuery {
    /// Complete PromQL query, passed to the backend verbatim
    #[serde(default)]
    pub query: String,
}

impl From<&str> for MetricQuery {
    fn from(query: &str) -> Self {
        Self {
            query: query.to_string(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, MetricQuery>, D::Error>
where
    D: Deserializer<'de>,
{
    let metrics: Option<HashMap<String, MetricQuery>> = Option::deserialize(deserializer)?;
    Ok(metrics.unwrap_or_default())
}

fn empty_path_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> Config {
        Config {
            version: "1".to_string(),
            temporal_cloud: TemporalCloudConfig {
                metrics_endpoint: endpoint.to_string(),
                tls: TlsConfig {
                    ca: None,
                    cert: PathBuf::from("cert.pem"),
                    key: PathBuf::from("key.pem"),
                },
                request_timeout_secs: default_request_timeout_secs(),
            },
            metrics: HashMap::new(),
        }
    }

    #[test]
    fn test_validate_accepts_https_endpoint() {
        assert!(config("https://example.com/prometheus").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_other_schemes() {
        let err = config("ftp://example.com").validate().unwrap_err();
        assert!(matches!(err, ConfigLoadError::ValidationFailed(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut cfg = config("https://example.com");
        cfg.temporal_cloud.request_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_query_is_unconfigured() {
        let mut cfg = config("https://example.com");
        cfg.metrics.insert("blank".to_string(), MetricQuery::from(""));
        cfg.metrics.insert("rate".to_string(), MetricQuery::from("a - b"));

        assert_eq!(cfg.query_for("blank"), None);
        assert_eq!(cfg.query_for("missing"), None);
        assert_eq!(cfg.query_for("rate"), Some("a - b"));
    }
}
