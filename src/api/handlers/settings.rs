use axum::{extract::State, response::Json};
use serde_json::json;

use crate::api::handlers::AppState;
use crate::api::models::settings::PriceUpdateRequest;
use crate::error::Result;

/// Price update (POST /api/settings/price). Write-through: a failed store
/// write surfaces as 500 and the cached price stays unchanged.
pub async fn update_price(
    State(state): State<AppState>,
    Json(request): Json<PriceUpdateRequest>,
) -> Result<Json<serde_json::Value>> {
    let price = state.meter.set_price(request.price).await?;

    Ok(Json(json!({
        "status": "success",
        "price": price,
    })))
}
