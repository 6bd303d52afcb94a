use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::types::{ConstMetric, MetricDescriptor, MetricType};

/// Write half of a scrape's sample stream. Clones may be used concurrently.
#[derive(Debug, Clone)]
pub struct MetricSink {
    sender: mpsc::UnboundedSender<ConstMetric>,
}

/// Read half of a scrape's sample stream.
#[derive(Debug)]
pub struct MetricStream {
    receiver: mpsc::UnboundedReceiver<ConstMetric>,
}

impl MetricSink {
    pub fn channel() -> (MetricSink, MetricStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (MetricSink { sender }, MetricStream { receiver })
    }

    pub fn send(&self, metric: ConstMetric) {
        // A closed stream means the scrape was abandoned.
        let _ = self.sender.send(metric);
    }

    /// Builds and sends a sample; invalid samples are logged and dropped.
    pub fn emit(
        &self,
        descriptor: &Arc<MetricDescriptor>,
        metric_type: MetricType,
        value: f64,
        label_values: &[&str],
    ) {
        match ConstMetric::new(descriptor, metric_type, value, label_values) {
            Ok(metric) => self.send(metric),
            Err(err) => warn!(error = %err, "dropping invalid metric sample"),
        }
    }

    pub fn gauge(&self, descriptor: &Arc<MetricDescriptor>, value: f64, label_values: &[&str]) {
        self.emit(descriptor, MetricType::Gauge, value, label_values);
    }

    pub fn counter(&self, descriptor: &Arc<MetricDescriptor>, value: f64, label_values: &[&str]) {
        self.emit(descriptor, MetricType::Counter, value, label_values);
    }
}

impl MetricStream {
    /// Returns every sample sent so far and closes the stream.
    pub fn drain(mut self) -> Vec<ConstMetric> {
        self.receiver.close();
        let mut metrics = Vec::new();
        while let Ok(metric) = self.receiver.try_recv() {
            metrics.push(metric);
        }
        metrics
    }
}
