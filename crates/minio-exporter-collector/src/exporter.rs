use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use minio_exporter_auth::Credentials;
use minio_exporter_client::{AdminApi, ClientOptions, DataPlaneApi, UpstreamClients};
use minio_exporter_common::error::Result;
use minio_exporter_metrics::{Collector, MetricDescriptor, MetricSink};
use tracing::{debug, error, info};

use crate::{
    collectors::{ScrapeContext, bucket, server},
    descriptors::Descriptors,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExporterOptions {
    /// Collect per-bucket statistics.
    pub bucket_stats: bool,
    /// Also count incomplete multipart uploads per bucket. Only honoured
    /// together with `bucket_stats`.
    pub incomplete_uploads: bool,
}

#[derive(Clone)]
pub struct ExporterConfig {
    pub uri: String,
    pub access_key: String,
    pub access_secret: String,
    pub options: ExporterOptions,
    pub client: ClientOptions,
}

/// Translates one MinIO deployment into Prometheus samples on every scrape.
pub struct Exporter {
    admin: Arc<dyn AdminApi>,
    s3: Arc<dyn DataPlaneApi>,
    options: ExporterOptions,
    descriptors: Descriptors,
}

impl Exporter {
    /// Validates the endpoint and credentials and builds the upstream clients.
    pub fn connect(config: &ExporterConfig) -> Result<Self> {
        let credentials = Credentials::from_pair(&config.access_key, &config.access_secret)?;
        let clients = UpstreamClients::connect(&config.uri, credentials, config.client.clone())?;
        info!(endpoint = %clients.endpoint, "created MinIO exporter");

        Ok(Self::with_clients(
            Arc::new(clients.admin),
            Arc::new(clients.s3),
            config.options,
        ))
    }

    pub fn with_clients(
        admin: Arc<dyn AdminApi>,
        s3: Arc<dyn DataPlaneApi>,
        options: ExporterOptions,
    ) -> Self {
        Self {
            admin,
            s3,
            options,
            descriptors: Descriptors::new(),
        }
    }

    pub fn options(&self) -> ExporterOptions {
        self.options
    }

    /// Runs one scrape into `sink` and returns whether the primary info call
    /// succeeded. The two scrape meta-metrics are always sent last.
    pub async fn scrape(&self, sink: &MetricSink) -> bool {
        let started = Instant::now();
        let ctx = ScrapeContext {
            admin: self.admin.as_ref(),
            s3: self.s3.as_ref(),
            descriptors: &self.descriptors,
            sink,
        };

        let info = match self.admin.server_info().await {
            Ok(info) => {
                debug!(servers = info.servers.len(), mode = %info.mode, "collected server info");
                Some(info)
            }
            Err(err) => {
                error!(error = %err, "failed to get server info");
                None
            }
        };
        let success = info.is_some();

        if let Some(info) = &info {
            sink.counter(
                &self.descriptors.uptime,
                server::service_uptime_seconds(info),
                &[],
            );
        }

        server::collect(ctx, info.as_ref()).await;

        if self.options.bucket_stats {
            bucket::collect(ctx, self.options.incomplete_uploads).await;
        }

        let duration = started.elapsed().as_secs_f64();
        sink.gauge(&self.descriptors.scrape_duration, duration, &[]);
        sink.gauge(
            &self.descriptors.scrape_success,
            if success { 1.0 } else { 0.0 },
            &[],
        );

        if success {
            debug!(duration_seconds = duration, "collector succeeded");
        } else {
            error!(duration_seconds = duration, "collector failed");
        }
        success
    }
}

#[async_trait]
impl Collector for Exporter {
    fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
        self.descriptors.all()
    }

    async fn collect(&self, sink: &MetricSink) {
        self.scrape(sink).await;
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use minio_exporter_client::{ClientOptions, StorageInfo};
    use minio_exporter_common::ExporterError;
    use minio_exporter_metrics::{MetricSink, MetricsRegistry};

    use super::{Exporter, ExporterConfig, ExporterOptions};
    use crate::testing::{
        FakeUpstream, bucket, data_usage, disk, named, server, server_info, value_of,
    };

    fn exporter(upstream: &FakeUpstream, options: ExporterOptions) -> Exporter {
        Exporter::with_clients(
            Arc::new(upstream.clone()),
            Arc::new(upstream.clone()),
            options,
        )
    }

    fn healthy() -> FakeUpstream {
        FakeUpstream {
            server_info: Some(server_info(vec![
                server("node1:9000", "online", 7200),
                server("node2:9000", "offline", 0),
            ])),
            storage_info: Some(StorageInfo {
                disks: vec![disk("ok", 100, 40), disk("offline", 100, 0)],
            }),
            data_usage: Some(data_usage(&[("photos", 10, 2048)])),
            buckets: Some(vec![bucket("photos")]),
            locations: HashMap::from([("photos".to_string(), "us-east-1".to_string())]),
            ..FakeUpstream::default()
        }
    }

    async fn scrape(exporter: &Exporter) -> (bool, Vec<minio_exporter_metrics::ConstMetric>) {
        let (sink, stream) = MetricSink::channel();
        let success = exporter.scrape(&sink).await;
        drop(sink);
        (success, stream.drain())
    }

    fn config(uri: &str) -> ExporterConfig {
        ExporterConfig {
            uri: uri.to_string(),
            access_key: "minio".to_string(),
            access_secret: "minio123".to_string(),
            options: ExporterOptions::default(),
            client: ClientOptions::default(),
        }
    }

    #[tokio::test]
    async fn healthy_scrape_reports_everything() {
        let upstream = healthy();
        let exporter = exporter(
            &upstream,
            ExporterOptions {
                bucket_stats: true,
                incomplete_uploads: false,
            },
        );

        let (success, metrics) = scrape(&exporter).await;

        assert!(success);
        assert_eq!(value_of(&metrics, "minio_scrape_collector_success"), Some(1.0));
        assert_eq!(value_of(&metrics, "minio_uptime"), Some(7200.0));
        assert_eq!(named(&metrics, "minio_server_up").len(), 2);
        assert_eq!(value_of(&metrics, "minio_storage_offline_disks"), Some(1.0));
        assert_eq!(value_of(&metrics, "minio_bucket_objects_total_size"), Some(2048.0));
        assert_eq!(
            upstream
                .calls()
                .iter()
                .filter(|call| call.as_str() == "server_info")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn meta_metrics_come_last() {
        let upstream = healthy();
        let exporter = exporter(
            &upstream,
            ExporterOptions {
                bucket_stats: true,
                incomplete_uploads: false,
            },
        );

        let (_, metrics) = scrape(&exporter).await;
        let tail = metrics[metrics.len() - 2..]
            .iter()
            .map(|metric| metric.name())
            .collect::<Vec<_>>();
        assert_eq!(
            tail,
            vec![
                "minio_scrape_collector_duration_seconds",
                "minio_scrape_collector_success"
            ]
        );
        assert!(value_of(&metrics, "minio_scrape_collector_duration_seconds").unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn success_tracks_only_the_primary_call() {
        let mut upstream = healthy();
        upstream.server_info = None;
        let exporter = exporter(
            &upstream,
            ExporterOptions {
                bucket_stats: true,
                incomplete_uploads: false,
            },
        );

        let (success, metrics) = scrape(&exporter).await;

        assert!(!success);
        assert_eq!(value_of(&metrics, "minio_scrape_collector_success"), Some(0.0));
        assert!(named(&metrics, "minio_uptime").is_empty());
        assert!(named(&metrics, "minio_server_up").is_empty());
        assert_eq!(named(&metrics, "minio_storage_total_disk_space").len(), 1);
        assert_eq!(named(&metrics, "minio_bucket_objects_number").len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_keeps_success() {
        let mut upstream = healthy();
        upstream.storage_info = None;
        let exporter = exporter(&upstream, ExporterOptions::default());

        let (success, metrics) = scrape(&exporter).await;

        assert!(success);
        assert_eq!(named(&metrics, "minio_server_up").len(), 2);
        assert_eq!(named(&metrics, "minio_server_uptime").len(), 1);
        assert!(
            metrics
                .iter()
                .all(|metric| !metric.name().starts_with("minio_storage_"))
        );
    }

    #[tokio::test]
    async fn total_outage_still_reports_meta_metrics() {
        let upstream = FakeUpstream::default();
        let exporter = exporter(
            &upstream,
            ExporterOptions {
                bucket_stats: true,
                incomplete_uploads: true,
            },
        );

        let (success, metrics) = scrape(&exporter).await;

        assert!(!success);
        let names = metrics.iter().map(|metric| metric.name()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "minio_scrape_collector_duration_seconds",
                "minio_scrape_collector_success"
            ]
        );
    }

    #[tokio::test]
    async fn bucket_stats_disabled_skips_bucket_calls() {
        let upstream = healthy();
        let exporter = exporter(
            &upstream,
            ExporterOptions {
                bucket_stats: false,
                incomplete_uploads: true,
            },
        );

        let (_, metrics) = scrape(&exporter).await;

        assert!(
            metrics
                .iter()
                .all(|metric| !metric.name().starts_with("minio_bucket_"))
        );
        assert_eq!(
            upstream.calls(),
            vec!["server_info".to_string(), "storage_info".to_string()]
        );
    }

    #[tokio::test]
    async fn renders_through_registry() {
        let registry = MetricsRegistry::new();
        registry
            .register_collector(Arc::new(exporter(&healthy(), ExporterOptions::default())))
            .unwrap();

        let text = registry.render_prometheus().await;
        assert!(text.contains("# TYPE minio_uptime counter\n"));
        assert!(text.contains("minio_server_up{minio_host=\"node2:9000\"} 0\n"));
        assert!(text.contains("minio_scrape_collector_success 1\n"));
        assert!(text.contains("minio_storage_free_disk_space 160\n"));
    }

    #[test]
    fn describe_is_registered_once() {
        let registry = MetricsRegistry::new();
        let upstream = FakeUpstream::default();
        registry
            .register_collector(Arc::new(exporter(&upstream, ExporterOptions::default())))
            .unwrap();
        assert!(
            registry
                .register_collector(Arc::new(exporter(&upstream, ExporterOptions::default())))
                .is_err()
        );
    }

    #[test]
    fn connect_normalizes_bare_host() {
        assert!(Exporter::connect(&config("myhost:9000")).is_ok());
        assert!(Exporter::connect(&config("https://minio.example.com")).is_ok());
    }

    #[test]
    fn connect_rejects_bad_endpoints() {
        for uri in ["ftp://host", "http://", "http://:9000"] {
            assert!(matches!(
                Exporter::connect(&config(uri)),
                Err(ExporterError::InvalidEndpoint(_))
            ));
        }
    }

    #[test]
    fn connect_rejects_half_credentials() {
        let mut config = config("http://localhost:9000");
        config.access_secret.clear();
        assert!(matches!(
            Exporter::connect(&config),
            Err(ExporterError::InvalidCredentials(_))
        ));

        config.access_key.clear();
        assert!(Exporter::connect(&config).is_ok());
    }
}
