use crate::config::Config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

pub type DbPool = Pool<Postgres>;

/// Builds the pool without connecting. Relay and theft control must stay
/// available while the database is down, so the first real connection is
/// deferred to the first query.
pub fn create_pool(config: &Config) -> Result<DbPool> {
    let max_connections = config.database.max_connections.unwrap_or(10);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(&config.database.url)?;

    Ok(pool)
}

/// Creates the readings and settings tables and seeds the single settings
/// row with the configured default price.
pub async fn init_schema(pool: &DbPool, default_price: f64) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            id BIGSERIAL PRIMARY KEY,
            ts TIMESTAMPTZ NOT NULL DEFAULT now(),
            voltage DOUBLE PRECISION NOT NULL DEFAULT 0,
            current1 DOUBLE PRECISION NOT NULL DEFAULT 0,
            current2 DOUBLE PRECISION NOT NULL DEFAULT 0,
            current3 DOUBLE PRECISION NOT NULL DEFAULT 0,
            total_current DOUBLE PRECISION NOT NULL DEFAULT 0,
            power1 DOUBLE PRECISION NOT NULL DEFAULT 0,
            power2 DOUBLE PRECISION NOT NULL DEFAULT 0,
            total_power DOUBLE PRECISION NOT NULL DEFAULT 0,
            energy_l1 DOUBLE PRECISION NOT NULL DEFAULT 0,
            energy_l2 DOUBLE PRECISION NOT NULL DEFAULT 0,
            total_energy DOUBLE PRECISION NOT NULL DEFAULT 0,
            cost_l1 DOUBLE PRECISION NOT NULL DEFAULT 0,
            cost_l2 DOUBLE PRECISION NOT NULL DEFAULT 0,
            total_cost DOUBLE PRECISION NOT NULL DEFAULT 0,
            theft_detected BOOLEAN NOT NULL DEFAULT FALSE,
            relay1_state BOOLEAN NOT NULL DEFAULT FALSE,
            relay2_state BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_readings_ts ON readings (ts)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            id INT PRIMARY KEY DEFAULT 1,
            price_per_unit DOUBLE PRECISION NOT NULL DEFAULT 5.0,
            last_updated TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT INTO settings (id, price_per_unit) VALUES (1, $1) ON CONFLICT (id) DO NOTHING")
        .bind(default_price)
        .execute(pool)
        .await?;

    Ok(())
}
