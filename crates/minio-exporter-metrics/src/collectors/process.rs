use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;

use crate::{collector::Collector, sink::MetricSink, types::MetricDescriptor};

// Kernel reports CPU times in USER_HZ, fixed at 100 on Linux.
const USER_HZ: f64 = 100.0;

/// Resource usage of the exporter process itself.
pub struct ProcessCollector {
    start_time_seconds: f64,
    cpu_seconds: Arc<MetricDescriptor>,
    resident_memory: Arc<MetricDescriptor>,
    virtual_memory: Arc<MetricDescriptor>,
    threads: Arc<MetricDescriptor>,
    open_fds: Arc<MetricDescriptor>,
    max_fds: Arc<MetricDescriptor>,
    start_time: Arc<MetricDescriptor>,
}

impl ProcessCollector {
    pub fn new() -> Self {
        let process = |name: &str, help: &str| {
            Arc::new(MetricDescriptor::new("process", "", name, help, &[]))
        };

        Self {
            start_time_seconds: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|duration| duration.as_secs_f64())
                .unwrap_or_default(),
            cpu_seconds: process(
                "cpu_seconds_total",
                "Total user and system CPU time spent in seconds.",
            ),
            resident_memory: process(
                "resident_memory_bytes",
                "Resident memory size in bytes.",
            ),
            virtual_memory: process(
                "virtual_memory_bytes",
                "Virtual memory size in bytes.",
            ),
            threads: process("threads", "Number of OS threads in the process."),
            open_fds: process("open_fds", "Number of open file descriptors."),
            max_fds: process("max_fds", "Maximum number of open file descriptors."),
            start_time: process(
                "start_time_seconds",
                "Start time of the process since unix epoch in seconds.",
            ),
        }
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for ProcessCollector {
    fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
        vec![
            Arc::clone(&self.cpu_seconds),
            Arc::clone(&self.resident_memory),
            Arc::clone(&self.virtual_memory),
            Arc::clone(&self.threads),
            Arc::clone(&self.open_fds),
            Arc::clone(&self.max_fds),
            Arc::clone(&self.start_time),
        ]
    }

    async fn collect(&self, sink: &MetricSink) {
        sink.gauge(&self.start_time, self.start_time_seconds, &[]);

        let Some(snapshot) = read_snapshot() else {
            return;
        };

        if let Some(cpu) = snapshot.cpu_seconds {
            sink.counter(&self.cpu_seconds, cpu, &[]);
        }
        if let Some(rss) = snapshot.status.resident_bytes {
            sink.gauge(&self.resident_memory, rss as f64, &[]);
        }
        if let Some(vsz) = snapshot.status.virtual_bytes {
            sink.gauge(&self.virtual_memory, vsz as f64, &[]);
        }
        if let Some(threads) = snapshot.status.threads {
            sink.gauge(&self.threads, threads as f64, &[]);
        }
        if let Some(open) = snapshot.open_fds {
            sink.gauge(&self.open_fds, open as f64, &[]);
        }
        if let Some(max) = snapshot.max_fds {
            sink.gauge(&self.max_fds, max as f64, &[]);
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ProcStatus {
    resident_bytes: Option<u64>,
    virtual_bytes: Option<u64>,
    threads: Option<u64>,
}

struct ProcSnapshot {
    status: ProcStatus,
    cpu_seconds: Option<f64>,
    open_fds: Option<u64>,
    max_fds: Option<u64>,
}

#[cfg(target_os = "linux")]
fn read_snapshot() -> Option<ProcSnapshot> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let cpu_seconds = std::fs::read_to_string("/proc/self/stat")
        .ok()
        .and_then(|stat| parse_cpu_seconds(&stat));
    let open_fds = std::fs::read_dir("/proc/self/fd")
        .ok()
        .map(|entries| entries.count() as u64);
    let max_fds = std::fs::read_to_string("/proc/self/limits")
        .ok()
        .and_then(|limits| parse_max_fds(&limits));

    Some(ProcSnapshot {
        status: parse_status(&status),
        cpu_seconds,
        open_fds,
        max_fds,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_snapshot() -> Option<ProcSnapshot> {
    None
}

fn parse_status(status: &str) -> ProcStatus {
    let kib = |rest: &str| {
        rest.split_whitespace()
            .next()
            .and_then(|value| value.parse::<u64>().ok())
            .and_then(|kb| kb.checked_mul(1024))
    };

    let mut parsed = ProcStatus::default();
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            parsed.resident_bytes = kib(rest);
        } else if let Some(rest) = line.strip_prefix("VmSize:") {
            parsed.virtual_bytes = kib(rest);
        } else if let Some(rest) = line.strip_prefix("Threads:") {
            parsed.threads = rest.trim().parse().ok();
        }
    }
    parsed
}

/// utime + stime from `/proc/self/stat`, in seconds.
fn parse_cpu_seconds(stat: &str) -> Option<f64> {
    // The command name may contain spaces; fields resume after the last ')'.
    let fields = stat[stat.rfind(')')? + 1..]
        .split_whitespace()
        .collect::<Vec<_>>();
    let utime = fields.get(11)?.parse::<u64>().ok()?;
    let stime = fields.get(12)?.parse::<u64>().ok()?;
    Some((utime + stime) as f64 / USER_HZ)
}

fn parse_max_fds(limits: &str) -> Option<u64> {
    let line = limits
        .lines()
        .find(|line| line.starts_with("Max open files"))?;
    line["Max open files".len()..]
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}
