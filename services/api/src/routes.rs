use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use expert_match::router::{marketplace_router, EngineState};

use crate::infra::{
    AppState, InMemoryDispatchStore, InMemoryInviteRepository, InMemoryMarketplace,
    InMemoryRunStore, LoggingEmailSender,
};

pub(crate) type Engine = EngineState<
    InMemoryMarketplace,
    InMemoryRunStore,
    InMemoryInviteRepository,
    InMemoryDispatchStore,
    LoggingEmailSender,
>;

pub(crate) fn with_marketplace_routes(engine: Arc<Engine>) -> axum::Router {
    marketplace_router(engine)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
