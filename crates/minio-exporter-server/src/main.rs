mod config;
mod handlers;
mod router;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use minio_exporter_collector::Exporter;
use minio_exporter_metrics::{BuildInfo, MetricsRegistry, ProcessCollector};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, filter::Directive};

use crate::{
    config::{Cli, LogFormat},
    router::{AppState, exporter_router},
};

const PROGRAM: &str = "minio_exporter";

fn build_info() -> BuildInfo {
    BuildInfo::new(PROGRAM, env!("CARGO_PKG_VERSION")).with_revision(
        option_env!("MINIO_EXPORTER_GIT_REVISION"),
        option_env!("MINIO_EXPORTER_GIT_BRANCH"),
    )
}

fn init_logging(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let directive = format!("{PROGRAM}={level}")
        .parse::<Directive>()
        .context("invalid log level")?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);
    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let build = build_info();

    if cli.version {
        println!("{}", build.summary());
        return Ok(());
    }

    init_logging(&cli.log_level, cli.log_format)?;
    cli.validate()?;
    if cli.incomplete_uploads && !cli.bucket_stats {
        warn!("minio.bucket-incomplete-uploads has no effect without minio.bucket-stats");
    }

    let exporter = Exporter::connect(&cli.exporter_config())
        .context("failed to create MinIO exporter")?;
    info!(
        version = %build.version,
        revision = %build.revision,
        branch = %build.branch,
        bucket_stats = exporter.options().bucket_stats,
        "starting {PROGRAM}"
    );

    let registry = Arc::new(MetricsRegistry::new());
    build
        .register(&registry)
        .context("failed to register build info")?;
    registry
        .register_collector(Arc::new(ProcessCollector::new()))
        .context("failed to register process collector")?;
    registry
        .register_collector(Arc::new(exporter))
        .context("failed to register MinIO collector")?;

    let app = exporter_router(Arc::new(AppState::new(registry, cli.metrics_path.clone())));

    let addr = cli.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("{PROGRAM} listening on {addr}, metrics at {}", cli.metrics_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    Ok(())
}
