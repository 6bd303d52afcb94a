use std::time::Duration;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use minio_exporter_client::ClientOptions;
use minio_exporter_collector::{ExporterConfig, ExporterOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Command line flags. Every flag also reads an environment variable; the
/// flag wins when both are set.
#[derive(Parser)]
#[command(
    name = "minio_exporter",
    about = "Prometheus exporter for MinIO server metrics",
    disable_version_flag = true
)]
pub struct Cli {
    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address", env = "LISTEN_ADDRESS", default_value = ":9290")]
    pub listen_address: String,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", env = "METRIC_PATH", default_value = "/metrics")]
    pub metrics_path: String,

    /// HTTP address of the MinIO server.
    #[arg(
        long = "minio.server",
        env = "MINIO_URL",
        default_value = "http://localhost:9000"
    )]
    pub minio_server: String,

    /// The access key used to log in to MinIO.
    #[arg(long = "minio.access-key", env = "MINIO_ACCESS_KEY", default_value = "")]
    pub access_key: String,

    /// The access secret used to log in to MinIO.
    #[arg(
        long = "minio.access-secret",
        env = "MINIO_ACCESS_SECRET",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub access_secret: String,

    /// Collect bucket statistics. It can take long.
    #[arg(long = "minio.bucket-stats", env = "MINIO_BUCKET_STATS", action = ArgAction::SetTrue)]
    pub bucket_stats: bool,

    /// Also count incomplete multipart uploads per bucket (capped at 100).
    #[arg(
        long = "minio.bucket-incomplete-uploads",
        env = "MINIO_BUCKET_INCOMPLETE_UPLOADS",
        action = ArgAction::SetTrue
    )]
    pub incomplete_uploads: bool,

    /// Region used to sign requests.
    #[arg(long = "minio.region", env = "MINIO_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Timeout in seconds for each request to MinIO.
    #[arg(
        long = "minio.timeout",
        env = "MINIO_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_seconds: u64,

    #[arg(
        long = "log.level",
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    #[arg(long = "log.format", env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Print version information.
    #[arg(long, action = ArgAction::SetTrue)]
    pub version: bool,
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if !self.metrics_path.starts_with('/') {
            bail!(
                "telemetry path must start with '/', got {:?}",
                self.metrics_path
            );
        }
        if self.access_key.is_empty() != self.access_secret.is_empty() {
            bail!("minio.access-key and minio.access-secret must be set together");
        }
        Ok(())
    }

    /// Bind address; a bare `:port` listens on every interface.
    pub fn bind_address(&self) -> String {
        match self.listen_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => self.listen_address.clone(),
        }
    }

    pub fn exporter_config(&self) -> ExporterConfig {
        ExporterConfig {
            uri: self.minio_server.clone(),
            access_key: self.access_key.clone(),
            access_secret: self.access_secret.clone(),
            options: ExporterOptions {
                bucket_stats: self.bucket_stats,
                incomplete_uploads: self.bucket_stats && self.incomplete_uploads,
            },
            client: ClientOptions {
                region: self.region.clone(),
                timeout: Duration::from_secs(self.timeout_seconds),
            },
        }
    }
}
