use axum::{extract::State, response::Json};
use serde_json::json;

use crate::api::handlers::AppState;
use crate::api::models::relay::TheftAlertRequest;

/// Device theft-detection report (POST /api/theft/alert).
pub async fn alert(
    State(state): State<AppState>,
    Json(request): Json<TheftAlertRequest>,
) -> Json<serde_json::Value> {
    state.meter.report_theft(request.theft_detected, None).await;

    Json(json!({ "status": "success" }))
}
