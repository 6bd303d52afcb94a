use minio_exporter_client::{ServerInfo, ServerProperties};

use super::{ScrapeContext, storage};

/// Emitted for an online node whose info reply carries no uptime.
pub const PLACEHOLDER_UPTIME_SECONDS: f64 = 24.0 * 60.0 * 60.0;

/// Uptime of one node in seconds, falling back to the placeholder.
pub fn node_uptime_seconds(server: &ServerProperties) -> f64 {
    if server.uptime > 0 {
        server.uptime as f64
    } else {
        PLACEHOLDER_UPTIME_SECONDS
    }
}

/// Largest uptime among online nodes; zero when none is online.
pub fn service_uptime_seconds(info: &ServerInfo) -> f64 {
    info.servers
        .iter()
        .filter(|server| server.is_online())
        .map(node_uptime_seconds)
        .fold(0.0, f64::max)
}

/// Per-node status from the primary `info` reply, then storage aggregates.
///
/// `info` is `None` when the primary call failed; node metrics are skipped and
/// the storage call still runs.
pub async fn collect(ctx: ScrapeContext<'_>, info: Option<&ServerInfo>) {
    if let Some(info) = info {
        for server in &info.servers {
            let host = server.endpoint.as_str();
            let online = server.is_online();

            if online {
                ctx.sink.counter(
                    &ctx.descriptors.server_uptime,
                    node_uptime_seconds(server),
                    &[host],
                );
            }
            ctx.sink.gauge(
                &ctx.descriptors.server_up,
                if online { 1.0 } else { 0.0 },
                &[host],
            );
        }
    }

    storage::collect(ctx).await;
}
