//! Startup context
//!
//! Everything the adapter loads before serving: configuration, the mTLS
//! transport and the namespace it is scoped to. Built once, then shared
//! immutably behind an `Arc`.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::{Config, ConfigLoader};
use crate::error::AdapterError;
use crate::provider::TemporalCloudProvider;
use crate::scope::ScopeIdentity;
use crate::transport::SecureTransport;

/// Immutable process-wide state
///
/// # Example
///
/// ```no_run
/// use temporal_cloud_metrics_adapter::AdapterContext;
/// use temporal_cloud_metrics_adapter::scope::DEFAULT_NAMESPACE_PATH;
///
/// # fn main() -> Result<(), temporal_cloud_metrics_adapter::AdapterError> {
/// let context = AdapterContext::load("/app/tcma/config.yaml", DEFAULT_NAMESPACE_PATH)?;
/// let provider = context.into_provider();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AdapterContext {
    config: Config,
    transport: SecureTransport,
    scope: ScopeIdentity,
}

impl AdapterContext {
    /// Assemble a context from already loaded parts
    pub fn new(config: Config, transport: SecureTransport, scope: ScopeIdentity) -> Self {
        Self {
            config,
            transport,
            scope,
        }
    }

    /// Load configuration, TLS material and namespace
    ///
    /// Any failure aborts startup; no partially built context is returned.
    pub fn load(
        config_path: impl AsRef<Path>,
        namespace_path: impl AsRef<Path>,
    ) -> Result<Self, AdapterError> {
        let config = ConfigLoader::from_yaml(config_path)?;
        let transport = SecureTransport::build(
            &config.temporal_cloud.tls,
            config.temporal_cloud.request_timeout(),
        )?;
        let scope = ScopeIdentity::load(namespace_path)?;

        info!(
            namespace = %scope,
            metrics_endpoint = %config.temporal_cloud.metrics_endpoint,
            metric_count = config.metrics.len(),
            "Adapter context ready"
        );

        Ok(Self::new(config, transport, scope))
    }

    /// Loaded configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared mTLS transport
    pub fn transport(&self) -> &SecureTransport {
        &self.transport
    }

    /// Namespace this adapter serves
    pub fn scope(&self) -> &ScopeIdentity {
        &self.scope
    }

    /// Wrap the context in a provider
    pub fn into_provider(self) -> TemporalCloudProvider {
        TemporalCloudProvider::new(Arc::new(self))
    }
}
