use std::sync::Arc;

use minio_exporter_common::error::Result;

use crate::registry::{GaugeMetric, MetricsRegistry};

/// Build metadata exposed as a constant `<program>_build_info` gauge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub program: String,
    pub version: String,
    pub revision: String,
    pub branch: String,
}

impl BuildInfo {
    pub fn new(program: &str, version: &str) -> Self {
        Self {
            program: program.to_string(),
            version: version.to_string(),
            revision: "unknown".to_string(),
            branch: "unknown".to_string(),
        }
    }

    pub fn with_revision(mut self, revision: Option<&str>, branch: Option<&str>) -> Self {
        if let Some(revision) = revision.filter(|value| !value.is_empty()) {
            self.revision = revision.to_string();
        }
        if let Some(branch) = branch.filter(|value| !value.is_empty()) {
            self.branch = branch.to_string();
        }
        self
    }

    /// One-line summary printed by `--version` and logged at startup.
    pub fn summary(&self) -> String {
        format!(
            "{}, version {} (branch: {}, revision: {})",
            self.program, self.version, self.branch, self.revision
        )
    }

    /// Registers the build info gauge once and sets it to 1.
    pub fn register(&self, registry: &MetricsRegistry) -> Result<Arc<GaugeMetric>> {
        let gauge = registry.register_gauge(
            &format!("{}_build_info", self.program),
            &format!(
                "A metric with a constant '1' value labeled by version, revision and branch from which {} was built.",
                self.program
            ),
            &["version", "revision", "branch"],
        )?;
        gauge.set(&[&self.version, &self.revision, &self.branch], 1.0)?;
        Ok(gauge)
    }
}
