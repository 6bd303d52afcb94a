use std::sync::Arc;

use minio_exporter_metrics::MetricDescriptor;

/// Namespace shared by every exported MinIO metric.
pub const NAMESPACE: &str = "minio";

const HOST_LABELS: &[&str] = &["minio_host"];
const BUCKET_LABELS: &[&str] = &["bucket", "location"];

/// The descriptors of every metric the exporter emits, built once.
#[derive(Debug, Clone)]
pub struct Descriptors {
    pub scrape_duration: Arc<MetricDescriptor>,
    pub scrape_success: Arc<MetricDescriptor>,
    pub uptime: Arc<MetricDescriptor>,
    pub server_up: Arc<MetricDescriptor>,
    pub server_uptime: Arc<MetricDescriptor>,
    pub storage_total_disk_space: Arc<MetricDescriptor>,
    pub storage_free_disk_space: Arc<MetricDescriptor>,
    pub storage_online_disks: Arc<MetricDescriptor>,
    pub storage_offline_disks: Arc<MetricDescriptor>,
    pub bucket_objects_number: Arc<MetricDescriptor>,
    pub bucket_objects_total_size: Arc<MetricDescriptor>,
    pub bucket_incomplete_uploads: Arc<MetricDescriptor>,
    pub bucket_exists: Arc<MetricDescriptor>,
}

fn desc(subsystem: &str, name: &str, help: &str, labels: &[&str]) -> Arc<MetricDescriptor> {
    Arc::new(MetricDescriptor::new(NAMESPACE, subsystem, name, help, labels))
}

impl Descriptors {
    pub fn new() -> Self {
        Self {
            scrape_duration: desc(
                "scrape",
                "collector_duration_seconds",
                "minio_exporter: Duration of a collector scrape.",
                &[],
            ),
            scrape_success: desc(
                "scrape",
                "collector_success",
                "minio_exporter: Whether the collector succeeded.",
                &[],
            ),
            uptime: desc("", "uptime", "Minio service uptime in seconds", &[]),
            server_up: desc("server", "up", "Minio host up", HOST_LABELS),
            server_uptime: desc(
                "server",
                "uptime",
                "Minio server uptime in seconds",
                HOST_LABELS,
            ),
            storage_total_disk_space: desc(
                "storage",
                "total_disk_space",
                "Total Minio disk space in bytes",
                &[],
            ),
            storage_free_disk_space: desc(
                "storage",
                "free_disk_space",
                "Free Minio disk space in bytes",
                &[],
            ),
            storage_online_disks: desc(
                "storage",
                "online_disks",
                "Total number of Minio online disks",
                &[],
            ),
            storage_offline_disks: desc(
                "storage",
                "offline_disks",
                "Total number of Minio offline disks",
                &[],
            ),
            bucket_objects_number: desc(
                "bucket",
                "objects_number",
                "The number of objects in the bucket",
                BUCKET_LABELS,
            ),
            bucket_objects_total_size: desc(
                "bucket",
                "objects_total_size",
                "The total size of all objects in the bucket",
                BUCKET_LABELS,
            ),
            bucket_incomplete_uploads: desc(
                "bucket",
                "incomplete_uploads_number",
                "The total number of incomplete uploads per bucket",
                BUCKET_LABELS,
            ),
            bucket_exists: desc("bucket", "exists", "Whether the bucket exists", BUCKET_LABELS),
        }
    }

    pub fn all(&self) -> Vec<Arc<MetricDescriptor>> {
        [
            &self.scrape_duration,
            &self.scrape_success,
            &self.uptime,
            &self.server_up,
            &self.server_uptime,
            &self.storage_total_disk_space,
            &self.storage_free_disk_space,
            &self.storage_online_disks,
            &self.storage_offline_disks,
            &self.bucket_objects_number,
            &self.bucket_objects_total_size,
            &self.bucket_incomplete_uploads,
            &self.bucket_exists,
        ]
        .into_iter()
        .map(Arc::clone)
        .collect()
    }
}

impl Default for Descriptors {
    fn default() -> Self {
        Self::new()
    }
}
