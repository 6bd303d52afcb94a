use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use minio_exporter_common::error::{ExporterError, Result};
use tracing::warn;

use crate::{
    collector::Collector,
    sink::MetricSink,
    types::{CollectedMetric, ConstMetric, MetricDescriptor, MetricSample, MetricType},
};

type LabelValues = Vec<String>;

trait RegisteredMetric: Send + Sync {
    fn descriptor(&self) -> MetricDescriptor;
    fn metric_type(&self) -> MetricType;
    fn collect(&self) -> Vec<MetricSample>;
}

#[derive(Default)]
struct RegistryInner {
    names: HashSet<String>,
    metrics: BTreeMap<String, Arc<dyn RegisteredMetric>>,
    collectors: Vec<Arc<dyn Collector>>,
}

/// Holds every metric the process exposes. Created once at startup and owned by
/// the serving layer.
pub struct MetricsRegistry {
    inner: RwLock<RegistryInner>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    pub fn register_gauge(
        &self,
        name: &str,
        help: &str,
        variable_labels: &[&str],
    ) -> Result<Arc<GaugeMetric>> {
        let metric = Arc::new(GaugeMetric::new(name, help, variable_labels));
        let mut inner = self.write()?;
        if !inner.names.insert(name.to_string()) {
            return Err(ExporterError::AlreadyRegistered(name.to_string()));
        }
        inner.metrics.insert(name.to_string(), metric.clone());
        Ok(metric)
    }

    /// Registers a collector. Fails if any described name is already taken.
    pub fn register_collector(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let described = collector
            .describe()
            .into_iter()
            .map(|descriptor| descriptor.name.clone())
            .collect::<Vec<_>>();

        let mut inner = self.write()?;
        let mut seen = HashSet::new();
        for name in &described {
            if inner.names.contains(name) || !seen.insert(name.as_str()) {
                return Err(ExporterError::AlreadyRegistered(name.clone()));
            }
        }

        inner.names.extend(described);
        inner.collectors.push(collector);
        Ok(())
    }

    /// Runs every collector once and returns all families sorted by name.
    pub async fn gather(&self) -> Vec<CollectedMetric> {
        let (metrics, collectors) = match self.inner.read() {
            Ok(inner) => (
                inner.metrics.values().cloned().collect::<Vec<_>>(),
                inner.collectors.clone(),
            ),
            Err(_) => return Vec::new(),
        };

        let mut families = BTreeMap::new();
        for metric in metrics {
            let descriptor = metric.descriptor();
            families.insert(
                descriptor.name.clone(),
                CollectedMetric {
                    name: descriptor.name,
                    help: descriptor.help,
                    metric_type: metric.metric_type(),
                    samples: metric.collect(),
                },
            );
        }

        let (sink, stream) = MetricSink::channel();
        for collector in &collectors {
            collector.collect(&sink).await;
        }
        drop(sink);

        for metric in stream.drain() {
            add_to_family(&mut families, metric);
        }

        families.into_values().collect()
    }

    pub async fn render_prometheus(&self) -> String {
        encode_text(&self.gather().await)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, RegistryInner>> {
        self.inner.write().map_err(|_| {
            ExporterError::InternalError("failed to acquire metrics registry lock".to_string())
        })
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn add_to_family(families: &mut BTreeMap<String, CollectedMetric>, metric: ConstMetric) {
    let family = families
        .entry(metric.name().to_string())
        .or_insert_with(|| CollectedMetric {
            name: metric.name().to_string(),
            help: metric.descriptor().help.clone(),
            metric_type: metric.metric_type(),
            samples: Vec::new(),
        });

    if family.metric_type != metric.metric_type() {
        warn!(
            metric = %family.name,
            expected = family.metric_type.as_prometheus_type(),
            actual = metric.metric_type().as_prometheus_type(),
            "dropping sample with conflicting metric type"
        );
        return;
    }

    family.samples.push(metric.to_sample());
}

/// A gauge whose value is set directly rather than produced per scrape.
pub struct GaugeMetric {
    descriptor: MetricDescriptor,
    series: RwLock<HashMap<LabelValues, Arc<AtomicU64>>>,
}

impl GaugeMetric {
    fn new(name: &str, help: &str, variable_labels: &[&str]) -> Self {
        Self {
            descriptor: MetricDescriptor {
                name: name.to_string(),
                help: help.to_string(),
                variable_labels: variable_labels
                    .iter()
                    .map(|label| (*label).to_string())
                    .collect(),
            },
            series: RwLock::new(HashMap::new()),
        }
    }

    pub fn set(&self, labels: &[&str], value: f64) -> Result<()> {
        self.get_or_create_series(labels)?
            .store(value.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    pub fn get(&self, labels: &[&str]) -> Option<f64> {
        let label_values = labels.iter().map(|value| (*value).to_string()).collect::<Vec<_>>();
        let series = self.series.read().ok()?;
        series
            .get(&label_values)
            .map(|value| f64::from_bits(value.load(Ordering::Relaxed)))
    }

    fn get_or_create_series(&self, labels: &[&str]) -> Result<Arc<AtomicU64>> {
        if labels.len() != self.descriptor.variable_labels.len() {
            return Err(ExporterError::LabelCardinality {
                name: self.descriptor.name.clone(),
                expected: self.descriptor.variable_labels.len(),
                actual: labels.len(),
            });
        }

        let label_values = labels.iter().map(|value| (*value).to_string()).collect::<Vec<_>>();
        if let Ok(guard) = self.series.read()
            && let Some(existing) = guard.get(&label_values)
        {
            return Ok(existing.clone());
        }

        let mut guard = self.series.write().map_err(|_| {
            ExporterError::InternalError(format!("gauge {} lock poisoned", self.descriptor.name))
        })?;
        Ok(guard
            .entry(label_values)
            .or_insert_with(|| Arc::new(AtomicU64::new(0_f64.to_bits())))
            .clone())
    }
}

impl RegisteredMetric for GaugeMetric {
    fn descriptor(&self) -> MetricDescriptor {
        self.descriptor.clone()
    }

    fn metric_type(&self) -> MetricType {
        MetricType::Gauge
    }

    fn collect(&self) -> Vec<MetricSample> {
        let series = match self.series.read() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };

        let mut samples = series
            .iter()
            .map(|(label_values, value)| MetricSample {
                labels: self
                    .descriptor
                    .variable_labels
                    .iter()
                    .cloned()
                    .zip(label_values.iter().cloned())
                    .collect(),
                value: f64::from_bits(value.load(Ordering::Relaxed)),
            })
            .collect::<Vec<_>>();
        samples.sort_by(|left, right| left.labels.cmp(&right.labels));
        samples
    }
}

/// Renders families in the Prometheus text exposition format, version 0.0.4.
pub fn encode_text(metrics: &[CollectedMetric]) -> String {
    let mut output = String::new();

    for metric in metrics {
        output.push_str("# HELP ");
        output.push_str(&metric.name);
        output.push(' ');
        output.push_str(&escape_help(&metric.help));
        output.push('\n');

        output.push_str("# TYPE ");
        output.push_str(&metric.name);
        output.push(' ');
        output.push_str(metric.metric_type.as_prometheus_type());
        output.push('\n');

        for sample in &metric.samples {
            output.push_str(&render_sample_line(&metric.name, &sample.labels, sample.value));
        }
    }

    output
}

fn render_sample_line(name: &str, labels: &[(String, String)], value: f64) -> String {
    let mut rendered = String::new();
    rendered.push_str(name);

    if !labels.is_empty() {
        rendered.push('{');
        for (index, (key, value)) in labels.iter().enumerate() {
            if index > 0 {
                rendered.push(',');
            }
            rendered.push_str(key);
            rendered.push_str("=\"");
            rendered.push_str(&escape_label_value(value));
            rendered.push('"');
        }
        rendered.push('}');
    }

    rendered.push(' ');
    rendered.push_str(&format_metric_value(value));
    rendered.push('\n');
    rendered
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() { "+Inf" } else { "-Inf" }.to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}
