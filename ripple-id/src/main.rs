mod config;

use clap::Parser;
use config::{Config, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(about = "Resolves ripple account addresses to human readable names")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, short)]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading {}: {e}", cli.config.display());
            process::exit(1);
        }
    };

    // Must outlive the runtime so buffered events are flushed on exit
    let _sentry = init_sentry(&config.common.logging);
    init_logging(&config.common.logging);

    if let Some(metrics_config) = &config.common.metrics {
        if let Err(e) = init_metrics(metrics_config) {
            tracing::error!("Failed to set up metrics: {e}");
            process::exit(1);
        }
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {e}");
            process::exit(1);
        }
    };

    tracing::info!("Starting ripple-id");
    if let Err(e) = rt.block_on(resolver::run(config.resolver)) {
        tracing::error!("ripple-id exited: {e}");
        process::exit(1);
    }
}

fn init_sentry(logging: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = logging.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(sentry::integrations::tracing::layer())
        .init();
}

#[derive(thiserror::Error, Debug)]
enum MetricsError {
    #[error("statsd: {0}")]
    Statsd(#[from] metrics_exporter_statsd::StatsdError),
    #[error("a metrics recorder is already installed")]
    AlreadyInstalled,
}

fn init_metrics(metrics_config: &MetricsConfig) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(&metrics_config.statsd_host, metrics_config.statsd_port)
        .build(Some("ripple_id"))?;
    metrics::set_global_recorder(recorder).map_err(|_| MetricsError::AlreadyInstalled)?;
    shared::metrics_defs::describe_all(resolver::metrics_defs::ALL_METRICS);

    tracing::info!(
        "Sending metrics to {}:{}",
        metrics_config.statsd_host,
        metrics_config.statsd_port
    );
    Ok(())
}
