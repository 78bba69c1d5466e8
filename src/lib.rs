//! Temporal Cloud Metrics Adapter
//!
//! Serves Temporal Cloud Prometheus queries as Kubernetes external metrics,
//! so HorizontalPodAutoscalers can scale workers on Temporal Cloud signals.
//!
//! # Features
//!
//! - YAML configuration mapping external metric names to PromQL queries
//! - mTLS client transport built once and shared by every query
//! - Conversion of Prometheus samples into Kubernetes quantities and timestamps
//! - Namespace scoping and label selector filtering
//!
//! # Example
//!
//! ```no_run
//! use temporal_cloud_metrics_adapter::labels::Selector;
//! use temporal_cloud_metrics_adapter::{AdapterContext, ExternalMetricsProvider};
//!
//! # async fn example() -> Result<(), temporal_cloud_metrics_adapter::AdapterError> {
//! let provider = AdapterContext::load("/app/tcma/config.yaml", "/var/run/secrets/kubernetes.io/serviceaccount/namespace")?
//!     .into_provider();
//!
//! for info in provider.list_all_external_metrics() {
//!     let values = provider
//!         .get_external_metric(&info.metric, "default", &Selector::everything())
//!         .await?;
//!     println!("{}: {} values", info.metric, values.items.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod labels;
pub mod prometheus;
pub mod provider;
pub mod quantity;
pub mod scope;
pub mod transport;

// Re-export public API
pub use api::AdapterContext;
pub use config::{Config, ConfigLoader, MetricQuery, TemporalCloudConfig, TlsConfig};
pub use error::{AdapterError, ConfigLoadError, ConnectionError, QueryError, ScopeLoadError, ValueError};
pub use labels::{LabelSelector, Selector};
pub use provider::{
    ExternalMetricInfo, ExternalMetricValue, ExternalMetricValueList, ExternalMetricsProvider,
    TemporalCloudProvider,
};
pub use quantity::Quantity;
pub use scope::ScopeIdentity;
pub use transport::SecureTransport;

// Initialize tracing subscriber for structured logging
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human readable lines
    Text,
}

/// Install the global `tracing` subscriber
///
/// Filtering follows `RUST_LOG`. Fails if a global subscriber is already set.
pub fn init_logging(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_only_once() {
        let _ = init_logging(LogFormat::Text);
        assert!(init_logging(LogFormat::Json).is_err());
    }
}
