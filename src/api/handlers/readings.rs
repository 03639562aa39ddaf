use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::models::readings::{HistoryParams, Reading, ReadingPayload, StatsParams, StatsPeriod, StatsSummary};
use crate::error::{AppError, Result};

/// Sensor data push (POST /api/data). Raises the theft alarm when the
/// payload flags it (never clears it from this path) and stamps the row
/// with the relay 1/2 positions current at insert time.
pub async fn receive_data(
    State(state): State<AppState>,
    Json(payload): Json<ReadingPayload>,
) -> Result<Json<serde_json::Value>> {
    info!(
        total_power = payload.total_power,
        total_energy = payload.total_energy,
        theft = payload.theft_detected,
        "sensor data received"
    );

    if payload.theft_detected {
        state.meter.report_theft(true, None).await;
    }

    let (relay1_state, relay2_state) = state.meter.relay_flags().await;
    state.readings.insert(&payload, relay1_state, relay2_state).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Data saved",
    })))
}

/// Most recent reading overlaid with the live relay and theft state
/// (GET /api/latest).
pub async fn get_latest(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let reading = state
        .readings
        .latest()
        .await?
        .ok_or_else(|| AppError::NotFound("no data".to_string()))?;

    let snapshot = state.meter.snapshot().await;
    let theft = state.meter.theft_status().await;

    let mut body = serde_json::to_value(&reading)?;
    let object = body
        .as_object_mut()
        .ok_or_else(|| AppError::Internal("reading did not serialize to an object".to_string()))?;
    object.insert("relay1_state".to_string(), json!(snapshot.relay1));
    object.insert("relay2_state".to_string(), json!(snapshot.relay2));
    object.insert("relay3_state".to_string(), json!(snapshot.relay3));
    object.insert("theft_status".to_string(), serde_json::to_value(theft)?);

    Ok(Json(body))
}

/// Historical readings (GET /api/history).
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Reading>>> {
    let (from, to) = resolve_range(&params, Utc::now())?;
    let readings = state.readings.in_range(from, to).await?;

    info!(count = readings.len(), "historical readings retrieved");
    Ok(Json(readings))
}

/// Aggregates over a fixed window (GET /api/stats).
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsSummary>> {
    let period = match params.period.as_deref() {
        Some(s) => StatsPeriod::parse(s)
            .ok_or_else(|| AppError::Validation(format!("Invalid period: {}", s)))?,
        None => StatsPeriod::Day,
    };

    let from = Utc::now() - period.window();
    let summary = state.readings.stats_since(from).await?;

    Ok(Json(summary))
}

/// Range precedence: explicit dates, then days, then hours, then the last
/// 24 hours.
fn resolve_range(
    params: &HistoryParams,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (from, to) = match (params.start_date, params.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            if let Some(days) = params.days {
                if days <= 0 {
                    return Err(AppError::Validation("days must be positive".to_string()));
                }
                (now - chrono::Duration::days(days), now)
            } else {
                let hours = params.hours.unwrap_or(24);
                if hours <= 0 {
                    return Err(AppError::Validation("hours must be positive".to_string()));
                }
                (now - chrono::Duration::hours(hours), now)
            }
        }
    };

    if from > to {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }

    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_defaults_to_last_24_hours() {
        let now = Utc::now();
        let (from, to) = resolve_range(&HistoryParams::default(), now).unwrap();
        assert_eq!(to, now);
        assert_eq!(from, now - chrono::Duration::hours(24));
    }

    #[test]
    fn explicit_dates_win_over_days_and_hours() {
        let now = Utc::now();
        let start = now - chrono::Duration::days(3);
        let end = now - chrono::Duration::days(2);
        let params = HistoryParams {
            hours: Some(1),
            days: Some(1),
            start_date: Some(start),
            end_date: Some(end),
        };

        let (from, to) = resolve_range(&params, now).unwrap();
        assert_eq!(from, start);
        assert_eq!(to, end);
    }

    #[test]
    fn days_win_over_hours() {
        let now = Utc::now();
        let params = HistoryParams {
            hours: Some(1),
            days: Some(2),
            ..Default::default()
        };

        let (from, _) = resolve_range(&params, now).unwrap();
        assert_eq!(from, now - chrono::Duration::days(2));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let now = Utc::now();
        let params = HistoryParams {
            start_date: Some(now),
            end_date: Some(now - chrono::Duration::hours(1)),
            ..Default::default()
        };

        assert!(matches!(
            resolve_range(&params, now).unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn non_positive_windows_are_rejected() {
        let now = Utc::now();
        let params = HistoryParams {
            hours: Some(0),
            ..Default::default()
        };
        assert!(resolve_range(&params, now).is_err());

        let params = HistoryParams {
            days: Some(-1),
            ..Default::default()
        };
        assert!(resolve_range(&params, now).is_err());
    }
}
