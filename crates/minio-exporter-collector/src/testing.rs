use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use minio_exporter_client::{
    AdminApi, BucketInfo, BucketUsageInfo, DataPlaneApi, DataUsageInfo, Disk, ServerInfo,
    ServerProperties, StorageInfo,
};
use minio_exporter_common::error::{ExporterError, Result};
use minio_exporter_metrics::{ConstMetric, MetricSink, MetricStream};

use crate::{collectors::ScrapeContext, descriptors::Descriptors};

/// In-memory MinIO. `None` makes the matching call fail.
#[derive(Clone, Default)]
pub struct FakeUpstream {
    pub server_info: Option<ServerInfo>,
    pub storage_info: Option<StorageInfo>,
    pub data_usage: Option<DataUsageInfo>,
    pub buckets: Option<Vec<BucketInfo>>,
    pub locations: HashMap<String, String>,
    pub uploads: HashMap<String, u64>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

fn unavailable(operation: &'static str) -> ExporterError {
    ExporterError::Transport {
        operation,
        message: "connection refused".to_string(),
    }
}

#[async_trait]
impl AdminApi for FakeUpstream {
    async fn server_info(&self) -> Result<ServerInfo> {
        self.record("server_info");
        self.server_info.clone().ok_or_else(|| unavailable("server_info"))
    }

    async fn storage_info(&self) -> Result<StorageInfo> {
        self.record("storage_info");
        self.storage_info.clone().ok_or_else(|| unavailable("storage_info"))
    }

    async fn data_usage_info(&self) -> Result<DataUsageInfo> {
        self.record("data_usage_info");
        self.data_usage.clone().ok_or_else(|| unavailable("data_usage_info"))
    }
}

#[async_trait]
impl DataPlaneApi for FakeUpstream {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        self.record("list_buckets");
        self.buckets.clone().ok_or_else(|| unavailable("list_buckets"))
    }

    async fn get_bucket_location(&self, bucket: &str) -> Result<String> {
        self.record(format!("get_bucket_location:{bucket}"));
        self.locations
            .get(bucket)
            .cloned()
            .ok_or_else(|| unavailable("get_bucket_location"))
    }

    async fn count_incomplete_uploads(&self, bucket: &str, limit: u64) -> Result<u64> {
        self.record(format!("count_incomplete_uploads:{bucket}"));
        self.uploads
            .get(bucket)
            .map(|count| (*count).min(limit))
            .ok_or_else(|| unavailable("list_incomplete_uploads"))
    }
}

pub fn server(endpoint: &str, state: &str, uptime: i64) -> ServerProperties {
    ServerProperties {
        state: state.to_string(),
        endpoint: endpoint.to_string(),
        uptime,
        version: String::new(),
    }
}

pub fn server_info(servers: Vec<ServerProperties>) -> ServerInfo {
    ServerInfo {
        mode: "online".to_string(),
        deployment_id: String::new(),
        servers,
    }
}

pub fn disk(state: &str, total: u64, used: u64) -> Disk {
    Disk {
        endpoint: String::new(),
        state: state.to_string(),
        total_space: total,
        used_space: used,
        available_space: total.saturating_sub(used),
    }
}

pub fn data_usage(buckets: &[(&str, u64, u64)]) -> DataUsageInfo {
    DataUsageInfo {
        buckets_usage: buckets
            .iter()
            .map(|(name, objects, size)| {
                (
                    (*name).to_string(),
                    BucketUsageInfo {
                        size: *size,
                        objects_count: *objects,
                    },
                )
            })
            .collect(),
        ..DataUsageInfo::default()
    }
}

pub fn bucket(name: &str) -> BucketInfo {
    BucketInfo {
        name: name.to_string(),
        creation_date: None,
    }
}

/// Sink and descriptors for driving a sub-collector directly.
pub struct Harness {
    descriptors: Descriptors,
    sink: MetricSink,
    stream: MetricStream,
}

impl Harness {
    pub fn new() -> Self {
        let (sink, stream) = MetricSink::channel();
        Self {
            descriptors: Descriptors::new(),
            sink,
            stream,
        }
    }

    pub fn ctx<'a>(&'a self, upstream: &'a FakeUpstream) -> ScrapeContext<'a> {
        ScrapeContext {
            admin: upstream,
            s3: upstream,
            descriptors: &self.descriptors,
            sink: &self.sink,
        }
    }

    pub fn finish(self) -> Vec<ConstMetric> {
        drop(self.sink);
        self.stream.drain()
    }
}

pub fn named<'a>(metrics: &'a [ConstMetric], name: &str) -> Vec<&'a ConstMetric> {
    metrics.iter().filter(|metric| metric.name() == name).collect()
}

pub fn value_of(metrics: &[ConstMetric], name: &str) -> Option<f64> {
    named(metrics, name).first().map(|metric| metric.value())
}
