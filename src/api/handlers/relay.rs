use axum::{extract::State, response::Json};
use serde_json::json;

use crate::api::handlers::AppState;
use crate::api::models::relay::{RelayControlRequest, RelayStateUpdate};
use crate::error::Result;

/// Device reports its actual relay positions (POST /api/relay/state).
pub async fn report_state(
    State(state): State<AppState>,
    Json(update): Json<RelayStateUpdate>,
) -> Json<serde_json::Value> {
    let snapshot = state.meter.apply_device_report(update, None).await;

    Json(json!({
        "status": "success",
        "relay1": snapshot.relay1,
        "relay2": snapshot.relay2,
        "relay3": snapshot.relay3,
        "timestamp": snapshot.last_updated,
    }))
}

/// Current relay states and price (GET /api/relay/state).
pub async fn get_state(State(state): State<AppState>) -> Json<serde_json::Value> {
    let view = state.meter.relay_state().await;

    Json(json!({
        "relay1": view.relay1,
        "relay2": view.relay2,
        "relay3": view.relay3,
        "price": view.price,
        "timestamp": view.timestamp,
    }))
}

/// Dashboard relay command (POST /api/relay/control).
pub async fn control(
    State(state): State<AppState>,
    Json(request): Json<RelayControlRequest>,
) -> Result<Json<serde_json::Value>> {
    let relay = state.meter.command_relay(request.relay, request.state).await?;

    Ok(Json(json!({
        "status": "success",
        "relay": relay.number(),
        "state": request.state,
    })))
}
