pub mod collectors;
pub mod descriptors;
pub mod exporter;

#[cfg(test)]
pub(crate) mod testing;

pub use descriptors::{Descriptors, NAMESPACE};
pub use exporter::{Exporter, ExporterConfig, ExporterOptions};
