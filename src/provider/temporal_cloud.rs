//! Temporal Cloud backed provider

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::AdapterContext;
use crate::error::AdapterError;
use crate::labels::LabelSelector;
use crate::prometheus::{PrometheusClient, sample_to_external};
use crate::provider::{
    ExternalMetricInfo, ExternalMetricValue, ExternalMetricValueList, ExternalMetricsProvider,
};

/// Serves configured PromQL queries as external metrics
#[derive(Debug, Clone)]
pub struct TemporalCloudProvider {
    context: Arc<AdapterContext>,
    client: PrometheusClient,
}

impl TemporalCloudProvider {
    /// Create a provider over a shared context
    pub fn new(context: Arc<AdapterContext>) -> Self {
        let client = PrometheusClient::new(
            context.config().temporal_cloud.metrics_endpoint.clone(),
            context.transport().clone(),
        );
        Self { context, client }
    }

    /// Shared startup context
    pub fn context(&self) -> &AdapterContext {
        &self.context
    }
}

impl ExternalMetricsProvider for TemporalCloudProvider {
    fn list_all_external_metrics(&self) -> Vec<ExternalMetricInfo> {
        self.context
            .config()
            .metrics
            .keys()
            .map(ExternalMetricInfo::new)
            .collect()
    }

    async fn get_external_metric<S>(
        &self,
        metric_name: &str,
        namespace: &str,
        selector: &S,
    ) -> Result<ExternalMetricValueList, AdapterError>
    where
        S: LabelSelector + Sync,
    {
        let Some(query) = self.context.config().query_for(metric_name) else {
            debug!(metric = %metric_name, "Metric is not configured");
            return Ok(ExternalMetricValueList::empty());
        };

        if !self.context.scope().admits(namespace) {
            debug!(
                metric = %metric_name,
                namespace = %namespace,
                "Namespace is outside the adapter scope"
            );
            return Ok(ExternalMetricValueList::empty());
        }

        let response = self.client.query(query).await?;
        debug!(metric = %metric_name, response = ?response, "Temporal Cloud metrics");

        let total = response.data.result.len();
        let mut items = Vec::new();
        for result in response.data.result {
            if !selector.matches(&result.metric) {
                continue;
            }

            let (value, timestamp) = sample_to_external(&result.value)?;
            items.push(ExternalMetricValue {
                metric_name: metric_name.to_string(),
                metric_labels: result.metric,
                timestamp,
                value,
            });
        }

        debug!(metric = %metric_name, items = ?items, "Kubernetes mapped metrics");
        info!(
            metric = %metric_name,
            namespace = %namespace,
            series = total,
            selected = items.len(),
            "Served external metric"
        );

        Ok(ExternalMetricValueList::new(items))
    }
}
