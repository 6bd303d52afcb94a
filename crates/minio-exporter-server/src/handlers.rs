use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::router::AppState;

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Runs every registered collector and returns the exposition body. Upstream
/// failures only shrink the body; the status is always 200.
pub async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let payload = state.registry.render_prometheus().await;

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PROMETHEUS_CONTENT_TYPE),
    );

    response
}

pub async fn landing_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>MinIO Exporter</title></head>\n\
         <body>\n\
         <h1>MinIO Exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}
