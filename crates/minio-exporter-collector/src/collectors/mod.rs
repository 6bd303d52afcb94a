//! Sub-collectors, one per upstream data source. Each one handles its own
//! upstream failures and only ever omits samples.

pub mod bucket;
pub mod server;
pub mod storage;

use minio_exporter_client::{AdminApi, DataPlaneApi};
use minio_exporter_metrics::MetricSink;

use crate::descriptors::Descriptors;

/// Everything a sub-collector needs for one scrape.
#[derive(Clone, Copy)]
pub struct ScrapeContext<'a> {
    pub admin: &'a dyn AdminApi,
    pub s3: &'a dyn DataPlaneApi,
    pub descriptors: &'a Descriptors,
    pub sink: &'a MetricSink,
}
