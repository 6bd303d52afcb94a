use async_trait::async_trait;
use minio_exporter_common::error::Result;

use crate::types::{BucketInfo, DataUsageInfo, ServerInfo, StorageInfo};

/// MinIO administrative API as the exporter uses it.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn server_info(&self) -> Result<ServerInfo>;
    async fn storage_info(&self) -> Result<StorageInfo>;
    async fn data_usage_info(&self) -> Result<DataUsageInfo>;
}

/// S3 data-plane API as the exporter uses it.
#[async_trait]
pub trait DataPlaneApi: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>>;
    async fn get_bucket_location(&self, bucket: &str) -> Result<String>;
    /// Counts in-progress multipart uploads, stopping once `limit` is reached.
    async fn count_incomplete_uploads(&self, bucket: &str, limit: u64) -> Result<u64>;
}
