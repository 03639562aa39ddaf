// Integration tests against a live Postgres instance.
// Set DATABASE_URL and run with: cargo test --test integration_test -- --ignored
//
// Tests run sequentially to avoid interference.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use energy_meter_api::repositories::{ReadingsRepository, SettingsRepository};
use energy_meter_api::services::{MeterStateService, PriceStore};
use serial_test::serial;
use test_helpers::*;

mod test_helpers;

async fn connect() -> TestDbPool {
    let pool = create_test_pool(&database_url())
        .await
        .expect("Failed to create test pool");
    setup_test_schema(&pool).await.expect("Failed to setup schema");
    cleanup_test_data(&pool).await.expect("Failed to cleanup");
    pool
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn insert_stamps_relay_flags_onto_reading() {
    let pool = connect().await;
    let repository = ReadingsRepository::new(pool.clone());

    repository
        .insert(&random_payload(), true, false)
        .await
        .expect("Failed to insert");

    let latest = repository
        .latest()
        .await
        .expect("Failed to fetch latest")
        .expect("Expected a reading");
    assert!(latest.relay1_state);
    assert!(!latest.relay2_state);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn latest_returns_none_on_empty_table() {
    let pool = connect().await;
    let repository = ReadingsRepository::new(pool);

    let latest = repository.latest().await.expect("Failed to fetch latest");
    assert!(latest.is_none());
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn history_returns_readings_oldest_first() {
    let pool = connect().await;
    let repository = ReadingsRepository::new(pool.clone());

    insert_test_readings(&pool, 5).await.expect("Failed to insert");

    let now = Utc::now();
    let readings = repository
        .in_range(now - chrono::Duration::hours(24), now)
        .await
        .expect("Failed to fetch history");

    assert_eq!(readings.len(), 5);
    for pair in readings.windows(2) {
        assert!(pair[0].ts <= pair[1].ts);
    }
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn history_range_excludes_older_readings() {
    let pool = connect().await;
    let repository = ReadingsRepository::new(pool.clone());

    insert_test_reading(&pool, Some(Utc::now() - chrono::Duration::days(3)), false, false)
        .await
        .expect("Failed to insert");
    insert_test_reading(&pool, Some(Utc::now() - chrono::Duration::hours(1)), false, false)
        .await
        .expect("Failed to insert");

    let now = Utc::now();
    let readings = repository
        .in_range(now - chrono::Duration::hours(24), now)
        .await
        .expect("Failed to fetch history");

    assert_eq!(readings.len(), 1);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn stats_cover_the_requested_window() {
    let pool = connect().await;
    let repository = ReadingsRepository::new(pool.clone());

    insert_test_readings(&pool, 3).await.expect("Failed to insert");

    let summary = repository
        .stats_since(Utc::now() - chrono::Duration::days(1))
        .await
        .expect("Failed to fetch stats");

    assert_eq!(summary.total_readings, 3);
    assert!(summary.avg_voltage.unwrap() >= 220.0);
    assert!(summary.max_power.unwrap() >= summary.min_power.unwrap());
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn price_round_trips_through_settings_row() {
    let pool = connect().await;
    let repository = SettingsRepository::new(pool);

    assert_eq!(repository.fetch_price().await.expect("Failed to fetch"), 5.0);

    repository.save_price(8.25).await.expect("Failed to save");
    assert_eq!(repository.fetch_price().await.expect("Failed to fetch"), 8.25);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn service_write_through_is_visible_on_next_read() {
    let pool = connect().await;
    let store = Arc::new(SettingsRepository::new(pool));
    let service = MeterStateService::new(store, 5.0, Duration::from_millis(2000));

    service.set_price(6.75).await.expect("Failed to set price");

    let view = service.relay_state().await;
    assert_eq!(view.price, 6.75);
}
