use std::sync::Arc;

use async_trait::async_trait;

use crate::{sink::MetricSink, types::MetricDescriptor};

/// A source of metrics that is asked for fresh samples on every scrape.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Every descriptor this collector may emit. Used for duplicate detection
    /// at registration time.
    fn describe(&self) -> Vec<Arc<MetricDescriptor>>;

    /// Sends this scrape's samples to `sink`. Failures must be handled inside;
    /// a collector never aborts the scrape.
    async fn collect(&self, sink: &MetricSink);
}
