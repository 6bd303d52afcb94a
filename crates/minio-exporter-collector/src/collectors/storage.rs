use minio_exporter_client::StorageInfo;
use tracing::{debug, error};

use super::ScrapeContext;

/// Cluster-wide disk aggregates derived from one storage info reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageSummary {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub total_disks: usize,
    pub online_disks: usize,
}

impl StorageSummary {
    pub fn from_info(info: &StorageInfo) -> Self {
        let mut summary = Self {
            total_bytes: 0,
            used_bytes: 0,
            total_disks: info.disks.len(),
            online_disks: 0,
        };

        for disk in &info.disks {
            if disk.is_online() {
                summary.online_disks += 1;
            }
            summary.total_bytes = summary.total_bytes.saturating_add(disk.total_space);
            summary.used_bytes = summary.used_bytes.saturating_add(disk.used_space);
        }

        summary
    }

    pub fn free_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }

    pub fn offline_disks(&self) -> usize {
        self.total_disks - self.online_disks
    }
}

/// Calls storage info once and emits the disk aggregates. Emits nothing when
/// the call fails.
pub async fn collect(ctx: ScrapeContext<'_>) {
    match ctx.admin.storage_info().await {
        Ok(info) => emit(ctx, &StorageSummary::from_info(&info)),
        Err(err) => error!(error = %err, "failed to get storage info"),
    }
}

fn emit(ctx: ScrapeContext<'_>, summary: &StorageSummary) {
    let descriptors = ctx.descriptors;
    debug!(
        disks = summary.total_disks,
        online = summary.online_disks,
        "collected storage info"
    );

    ctx.sink.gauge(
        &descriptors.storage_total_disk_space,
        summary.total_bytes as f64,
        &[],
    );
    ctx.sink.gauge(
        &descriptors.storage_free_disk_space,
        summary.free_bytes() as f64,
        &[],
    );
    ctx.sink.gauge(
        &descriptors.storage_online_disks,
        summary.online_disks as f64,
        &[],
    );
    ctx.sink.gauge(
        &descriptors.storage_offline_disks,
        summary.offline_disks() as f64,
        &[],
    );
}
