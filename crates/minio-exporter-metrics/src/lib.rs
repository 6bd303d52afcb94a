pub mod collector;
pub mod collectors;
pub mod registry;
pub mod sink;
pub mod types;

pub use collector::Collector;
pub use collectors::{process::ProcessCollector, version::BuildInfo};
pub use registry::{GaugeMetric, MetricsRegistry, encode_text};
pub use sink::{MetricSink, MetricStream};
pub use types::{
    CollectedMetric, ConstMetric, MetricDescriptor, MetricSample, MetricType, build_fq_name,
};
