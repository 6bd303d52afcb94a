use std::sync::Arc;

use axum::{Router, routing::get};
use minio_exporter_metrics::MetricsRegistry;
use tower_http::trace::TraceLayer;

use crate::handlers;

pub struct AppState {
    pub registry: Arc<MetricsRegistry>,
    pub metrics_path: String,
}

impl AppState {
    pub fn new(registry: Arc<MetricsRegistry>, metrics_path: impl Into<String>) -> Self {
        Self {
            registry,
            metrics_path: metrics_path.into(),
        }
    }
}

/// `GET <metrics path>` and the `GET /` landing page. Anything else is 404.
pub fn exporter_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route(
        &state.metrics_path,
        get(handlers::prometheus_metrics),
    );
    if state.metrics_path != "/" {
        router = router.route("/", get(handlers::landing_page));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
