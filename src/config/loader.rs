//! Configuration loader
//!
//! Loads configuration from a YAML file, then applies environment variable
//! overrides and validates the result.

use std::env;
use std::path::Path;

use crate::config::types::Config;
use crate::error::ConfigLoadError;
use tracing::{debug, info, warn};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Config, ConfigLoadError> {
        let path = path.as_ref();
        info!(
            config_path = %path.display(),
            "Loading configuration from YAML file"
        );

        let content = std::fs::read_to_string(path).map_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Failed to read configuration file"
            );
            ConfigLoadError::Unreadable {
                path: path.display().to_string(),
                source: e,
            }
        })?;

        debug!(
            config_path = %path.display(),
            file_size_bytes = content.len(),
            "Read configuration file"
        );

        Self::from_yaml_str(&content).inspect_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Failed to load configuration"
            );
        })
    }

    /// Load configuration from an in-memory YAML document
    pub fn from_yaml_str(content: &str) -> Result<Config, ConfigLoadError> {
        let mut config: Config = serde_yaml::from_str(content)?;

        debug!(
            version = %config.version,
            metric_count = config.metrics.len(),
            "Parsed YAML configuration successfully"
        );

        Self::apply_env_overrides(&mut config);

        config.validate()?;

        info!(
            metrics_endpoint = %config.temporal_cloud.metrics_endpoint,
            request_timeout_secs = config.temporal_cloud.request_timeout_secs,
            ca_configured = config.temporal_cloud.tls.ca.is_some(),
            metric_count = config.metrics.len(),
            "Configuration loaded and validated successfully"
        );

        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) {
        // TCMA_METRICS_ENDPOINT
        if let Ok(endpoint) = env::var("TCMA_METRICS_ENDPOINT") {
            debug!(
                env_var = "TCMA_METRICS_ENDPOINT",
                value = %endpoint,
                "Applying environment variable override"
            );
            config.temporal_cloud.metrics_endpoint = endpoint;
        }

        // TCMA_REQUEST_TIMEOUT_SECS
        if let Ok(timeout) = env::var("TCMA_REQUEST_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => {
                    debug!(
                        env_var = "TCMA_REQUEST_TIMEOUT_SECS",
                        value = secs,
                        "Applying environment variable override"
                    );
                    config.temporal_cloud.request_timeout_secs = secs;
                }
                Err(e) => {
                    warn!(
                        env_var = "TCMA_REQUEST_TIMEOUT_SECS",
                        value = %timeout,
                        error = %e,
                        "Failed to parse environment variable, keeping configured value"
                    );
                }
            }
        }
    }
}
