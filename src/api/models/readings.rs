use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Sensor sample pushed by the device. Metric fields the device omits
/// default to zero, matching the wire format it has always used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingPayload {
    #[serde(default)]
    pub voltage: f64,
    #[serde(default)]
    pub current1: f64,
    #[serde(default)]
    pub current2: f64,
    #[serde(default)]
    pub current3: f64,
    #[serde(default)]
    pub total_current: f64,
    #[serde(default)]
    pub power1: f64,
    #[serde(default)]
    pub power2: f64,
    #[serde(default)]
    pub total_power: f64,
    #[serde(default)]
    pub energy_l1: f64,
    #[serde(default)]
    pub energy_l2: f64,
    #[serde(default)]
    pub total_energy: f64,
    #[serde(default)]
    pub cost_l1: f64,
    #[serde(default)]
    pub cost_l2: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub theft_detected: bool,
}

/// Persisted reading, stamped with the relay 1/2 positions that were
/// current at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reading {
    pub id: i64,
    #[serde(rename = "timestamp")]
    pub ts: DateTime<Utc>,
    pub voltage: f64,
    pub current1: f64,
    pub current2: f64,
    pub current3: f64,
    pub total_current: f64,
    pub power1: f64,
    pub power2: f64,
    pub total_power: f64,
    pub energy_l1: f64,
    pub energy_l2: f64,
    pub total_energy: f64,
    pub cost_l1: f64,
    pub cost_l2: f64,
    pub total_cost: f64,
    pub theft_detected: bool,
    pub relay1_state: bool,
    pub relay2_state: bool,
}

/// History window selection. A date range wins over `days`, which wins
/// over `hours`; with nothing supplied the last 24 hours are returned.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HistoryParams {
    pub hours: Option<i64>,
    pub days: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsParams {
    pub period: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    Hour,
    Day,
    Week,
    Month,
}

impl StatsPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hour" => Some(StatsPeriod::Hour),
            "day" => Some(StatsPeriod::Day),
            "week" => Some(StatsPeriod::Week),
            "month" => Some(StatsPeriod::Month),
            _ => None,
        }
    }

    pub fn window(self) -> chrono::Duration {
        match self {
            StatsPeriod::Hour => chrono::Duration::hours(1),
            StatsPeriod::Day => chrono::Duration::days(1),
            StatsPeriod::Week => chrono::Duration::days(7),
            StatsPeriod::Month => chrono::Duration::days(30),
        }
    }
}

/// Aggregates over a stats window. The averages and extremes are null
/// when the window holds no readings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatsSummary {
    pub total_readings: i64,
    pub avg_voltage: Option<f64>,
    pub avg_current: Option<f64>,
    pub avg_power: Option<f64>,
    pub max_power: Option<f64>,
    pub min_power: Option<f64>,
    pub total_energy_kwh: Option<f64>,
    pub total_cost: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_period_parses_known_values() {
        assert_eq!(StatsPeriod::parse("hour"), Some(StatsPeriod::Hour));
        assert_eq!(StatsPeriod::parse("day"), Some(StatsPeriod::Day));
        assert_eq!(StatsPeriod::parse("week"), Some(StatsPeriod::Week));
        assert_eq!(StatsPeriod::parse("month"), Some(StatsPeriod::Month));
        assert_eq!(StatsPeriod::parse("year"), None);
        assert_eq!(StatsPeriod::parse(""), None);
    }

    #[test]
    fn reading_payload_defaults_missing_fields() {
        let payload: ReadingPayload = serde_json::from_str(r#"{"voltage": 230.0}"#).unwrap();
        assert_eq!(payload.voltage, 230.0);
        assert_eq!(payload.total_power, 0.0);
        assert!(!payload.theft_detected);
    }

    #[test]
    fn relay_update_tolerates_partial_body() {
        let update: crate::api::models::relay::RelayStateUpdate =
            serde_json::from_str(r#"{"relay3": false}"#).unwrap();
        assert_eq!(update.relay1, None);
        assert_eq!(update.relay2, None);
        assert_eq!(update.relay3, Some(false));
    }
}
