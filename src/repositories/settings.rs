use crate::db::DbPool;
use crate::services::PriceStore;
use async_trait::async_trait;

/// Single-row settings record (id = 1) holding the price per unit.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: DbPool,
}

impl SettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceStore for SettingsRepository {
    async fn fetch_price(&self) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>("SELECT price_per_unit FROM settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await
    }

    async fn save_price(&self, price: f64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (id, price_per_unit, last_updated)
            VALUES (1, $1, now())
            ON CONFLICT (id)
            DO UPDATE SET price_per_unit = EXCLUDED.price_per_unit, last_updated = now()
            "#,
        )
        .bind(price)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
