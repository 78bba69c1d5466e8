//! Temporal Cloud Metrics Adapter CLI
//!
//! Loads the adapter's startup context and runs provider operations from the
//! command line: list the served metrics, fetch one metric, or just verify
//! that configuration, TLS material and namespace load.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use temporal_cloud_metrics_adapter::labels::Selector;
use temporal_cloud_metrics_adapter::scope::DEFAULT_NAMESPACE_PATH;
use temporal_cloud_metrics_adapter::{AdapterContext, ExternalMetricsProvider, LogFormat, init_logging};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "tcma",
    about = "Temporal Cloud external metrics adapter",
    version
)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "/app/tcma/config.yaml")]
    config_path: String,

    /// File holding the namespace this adapter serves
    #[arg(long, default_value = DEFAULT_NAMESPACE_PATH)]
    namespace_path: String,

    /// Name of the adapter
    #[arg(long, default_value = "temporal-cloud-adapter")]
    name: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogOutput::Json)]
    log_format: LogOutput,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogOutput {
    Json,
    Text,
}

impl From<LogOutput> for LogFormat {
    fn from(output: LogOutput) -> Self {
        match output {
            LogOutput::Json => LogFormat::Json,
            LogOutput::Text => LogFormat::Text,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load configuration, TLS material and namespace, then exit
    Check,
    /// List the external metrics this adapter serves
    List,
    /// Fetch current values of one external metric
    Get {
        /// External metric name
        metric: String,
        /// Namespace to query (default: the adapter's own namespace)
        #[arg(short, long)]
        namespace: Option<String>,
        /// Label selector, e.g. `env=prod,region in (us-east)`
        #[arg(short = 'l', long, default_value = "")]
        selector: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.log_format.into()).map_err(|e| anyhow::anyhow!(e))?;

    let context = AdapterContext::load(&cli.config_path, &cli.namespace_path)
        .context("Failed to build startup prerequisites")?;

    info!(adapter = %cli.name, namespace = %context.scope(), "Starting adapter...");

    match cli.command {
        Commands::Check => {
            info!(adapter = %cli.name, "Startup prerequisites loaded");
        }
        Commands::List => {
            let provider = context.into_provider();
            let mut metrics = provider.list_all_external_metrics();
            metrics.sort();
            for info in metrics {
                println!("{}", info.metric);
            }
        }
        Commands::Get {
            metric,
            namespace,
            selector,
        } => {
            let selector = Selector::parse(&selector).context("Invalid label selector")?;
            let namespace = namespace.unwrap_or_else(|| context.scope().namespace().to_string());
            let provider = context.into_provider();

            let values = provider
                .get_external_metric(&metric, &namespace, &selector)
                .await
                .with_context(|| format!("Failed to fetch external metric {}", metric))?;

            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    }

    Ok(())
}
