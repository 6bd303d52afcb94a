use std::sync::Arc;

use minio_exporter_common::error::{ExporterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

/// Joins the non-empty name parts with `_`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Fully-qualified name, help text and ordered label names of a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub variable_labels: Vec<String>,
}

impl MetricDescriptor {
    pub fn new(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        variable_labels: &[&str],
    ) -> Self {
        Self {
            name: build_fq_name(namespace, subsystem, name),
            help: help.to_string(),
            variable_labels: variable_labels
                .iter()
                .map(|label| (*label).to_string())
                .collect(),
        }
    }
}

/// One sample produced during a scrape.
#[derive(Debug, Clone)]
pub struct ConstMetric {
    descriptor: Arc<MetricDescriptor>,
    metric_type: MetricType,
    value: f64,
    label_values: Vec<String>,
}

impl ConstMetric {
    /// Fails when `label_values` does not match the descriptor's label names.
    pub fn new(
        descriptor: &Arc<MetricDescriptor>,
        metric_type: MetricType,
        value: f64,
        label_values: &[&str],
    ) -> Result<Self> {
        if label_values.len() != descriptor.variable_labels.len() {
            return Err(ExporterError::LabelCardinality {
                name: descriptor.name.clone(),
                expected: descriptor.variable_labels.len(),
                actual: label_values.len(),
            });
        }

        Ok(Self {
            descriptor: Arc::clone(descriptor),
            metric_type,
            value,
            label_values: label_values.iter().map(|value| (*value).to_string()).collect(),
        })
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of the label called `name`, if the descriptor has one.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .variable_labels
            .iter()
            .position(|label| label == name)
            .and_then(|index| self.label_values.get(index))
            .map(String::as_str)
    }

    pub fn to_sample(&self) -> MetricSample {
        MetricSample {
            labels: self
                .descriptor
                .variable_labels
                .iter()
                .cloned()
                .zip(self.label_values.iter().cloned())
                .collect(),
            value: self.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

/// All samples of one metric family, ready for exposition.
#[derive(Debug, Clone)]
pub struct CollectedMetric {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub samples: Vec<MetricSample>,
}
