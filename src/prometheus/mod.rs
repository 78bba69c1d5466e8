//! Prometheus backend module
//!
//! Query execution against the Temporal Cloud Prometheus API and conversion
//! of its samples into Kubernetes values.

pub mod client;
pub mod convert;
pub mod response;

pub use client::PrometheusClient;
pub use convert::{sample_to_external, timestamp_from_seconds};
pub use response::{PrometheusResponse, QueryResult, ResponseData, Sample};
