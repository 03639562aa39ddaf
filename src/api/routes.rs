use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

use crate::api::handlers::{health, readings, relay, settings, theft, AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/data", post(readings::receive_data))
        .route("/api/latest", get(readings::get_latest))
        .route("/api/history", get(readings::get_history))
        .route("/api/stats", get(readings::get_stats))
        .route(
            "/api/relay/state",
            post(relay::report_state).get(relay::get_state),
        )
        .route("/api/relay/control", post(relay::control))
        .route("/api/theft/alert", post(theft::alert))
        .route("/api/settings/price", post(settings::update_price))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(
                    |_response: &axum::response::Response,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::INFO, latency = ?latency, "request completed");
                    },
                ),
        )
}
