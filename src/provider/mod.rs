//! External metrics provider
//!
//! The two operations a Kubernetes external metrics host needs: enumerate the
//! metric names the adapter serves, and fetch current values for one of them.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::labels::{LabelSelector, Labels};
use crate::quantity::Quantity;

pub mod temporal_cloud;

pub use temporal_cloud::TemporalCloudProvider;

/// API version of the external metrics group
pub const EXTERNAL_METRICS_API_VERSION: &str = "external.metrics.k8s.io/v1beta1";

/// Name of a metric the provider can serve
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct ExternalMetricInfo {
    /// External metric name
    pub metric: String,
}

impl ExternalMetricInfo {
    /// Info for `metric`
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
        }
    }
}

/// One current value of an external metric
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMetricValue {
    /// External metric name
    pub metric_name: String,
    /// Labels of the backend series the value came from
    pub metric_labels: Labels,
    /// Sample time
    pub timestamp: DateTime<Utc>,
    /// Sample value
    pub value: Quantity,
}

/// List of values returned for one request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMetricValueList {
    /// Always `ExternalMetricValueList`
    pub kind: String,
    /// Always `external.metrics.k8s.io/v1beta1`
    pub api_version: String,
    /// Values in backend order
    pub items: Vec<ExternalMetricValue>,
}

impl ExternalMetricValueList {
    /// Wrap `items` in a list
    pub fn new(items: Vec<ExternalMetricValue>) -> Self {
        Self {
            kind: "ExternalMetricValueList".to_string(),
            api_version: EXTERNAL_METRICS_API_VERSION.to_string(),
            items,
        }
    }

    /// List with no items
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Provider interface consumed by the external metrics host
pub trait ExternalMetricsProvider {
    /// Every configured metric name, in no particular order
    fn list_all_external_metrics(&self) -> Vec<ExternalMetricInfo>;

    /// Current values of `metric_name` in `namespace`, filtered by `selector`
    ///
    /// Unknown metrics and foreign namespaces yield an empty list, not an error.
    fn get_external_metric<S>(
        &self,
        metric_name: &str,
        namespace: &str,
        selector: &S,
    ) -> impl Future<Output = Result<ExternalMetricValueList, AdapterError>> + Send
    where
        S: LabelSelector + Sync;
}
