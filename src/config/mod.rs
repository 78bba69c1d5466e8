//! Configuration module
//!
//! Provides the adapter configuration: metrics backend endpoint, TLS material
//! locations and the metric name to query mapping.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{Config, MetricQuery, TemporalCloudConfig, TlsConfig};
