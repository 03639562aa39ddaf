use crate::api::models::readings::{Reading, ReadingPayload, StatsSummary};
use crate::db::DbPool;
use crate::error::Result;
use chrono::{DateTime, Utc};

const READING_COLUMNS: &str = "id, ts, voltage, current1, current2, current3, total_current, \
     power1, power2, total_power, energy_l1, energy_l2, total_energy, \
     cost_l1, cost_l2, total_cost, theft_detected, relay1_state, relay2_state";

#[derive(Clone)]
pub struct ReadingsRepository {
    pool: DbPool,
}

impl ReadingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Appends one reading, stamped with the relay 1/2 positions known at
    /// insert time.
    pub async fn insert(
        &self,
        payload: &ReadingPayload,
        relay1_state: bool,
        relay2_state: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO readings
                (voltage, current1, current2, current3, total_current,
                 power1, power2, total_power, energy_l1, energy_l2, total_energy,
                 cost_l1, cost_l2, total_cost, theft_detected, relay1_state, relay2_state)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(payload.voltage)
        .bind(payload.current1)
        .bind(payload.current2)
        .bind(payload.current3)
        .bind(payload.total_current)
        .bind(payload.power1)
        .bind(payload.power2)
        .bind(payload.total_power)
        .bind(payload.energy_l1)
        .bind(payload.energy_l2)
        .bind(payload.total_energy)
        .bind(payload.cost_l1)
        .bind(payload.cost_l2)
        .bind(payload.total_cost)
        .bind(payload.theft_detected)
        .bind(relay1_state)
        .bind(relay2_state)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn latest(&self) -> Result<Option<Reading>> {
        let reading = sqlx::query_as::<_, Reading>(&format!(
            "SELECT {} FROM readings ORDER BY ts DESC LIMIT 1",
            READING_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(reading)
    }

    /// Readings in [from, to], oldest first.
    pub async fn in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>> {
        let readings = sqlx::query_as::<_, Reading>(&format!(
            "SELECT {} FROM readings WHERE ts BETWEEN $1 AND $2 ORDER BY ts ASC",
            READING_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(readings)
    }

    pub async fn stats_since(&self, from: DateTime<Utc>) -> Result<StatsSummary> {
        let summary = sqlx::query_as::<_, StatsSummary>(
            r#"
            SELECT
                COUNT(*) AS total_readings,
                AVG(voltage) AS avg_voltage,
                AVG(total_current) AS avg_current,
                AVG(total_power) AS avg_power,
                MAX(total_power) AS max_power,
                MIN(total_power) AS min_power,
                MAX(total_energy) AS total_energy_kwh,
                MAX(total_cost) AS total_cost
            FROM readings
            WHERE ts >= $1
            "#,
        )
        .bind(from)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}
