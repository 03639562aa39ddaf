use crate::api::models::relay::RelayStateUpdate;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[cfg(test)]
use mockall::automock;

/// Backing store for the price-per-unit setting. Reads go through the
/// in-memory cache on failure; writes must be confirmed by the store
/// before the cache is touched.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceStore: Send + Sync {
    async fn fetch_price(&self) -> std::result::Result<f64, sqlx::Error>;
    async fn save_price(&self, price: f64) -> std::result::Result<(), sqlx::Error>;
}

/// The three physically controlled switches. Relay 3 is the protective
/// relay: off means power was cut for theft protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayId {
    Relay1,
    Relay2,
    Relay3,
}

impl RelayId {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(RelayId::Relay1),
            2 => Some(RelayId::Relay2),
            3 => Some(RelayId::Relay3),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            RelayId::Relay1 => 1,
            RelayId::Relay2 => 2,
            RelayId::Relay3 => 3,
        }
    }
}

/// Point-in-time view of the three relays and the shared update timestamp.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RelaySnapshot {
    pub relay1: bool,
    pub relay2: bool,
    pub relay3: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TheftStatus {
    pub detected: bool,
    pub detected_at: Option<DateTime<Utc>>,
}

/// Snapshot returned by [`MeterStateService::relay_state`], including the
/// cached price.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RelayStateView {
    pub relay1: bool,
    pub relay2: bool,
    pub relay3: bool,
    pub price: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

struct MeterState {
    relay1: bool,
    relay2: bool,
    relay3: bool,
    // One timestamp shared by all three relays; any mutation refreshes it.
    last_updated: Option<DateTime<Utc>>,
    theft_detected: bool,
    theft_detected_at: Option<DateTime<Utc>>,
    price_per_unit: f64,
}

impl MeterState {
    fn set_relay(&mut self, relay: RelayId, on: bool) {
        match relay {
            RelayId::Relay1 => self.relay1 = on,
            RelayId::Relay2 => self.relay2 = on,
            RelayId::Relay3 => self.relay3 = on,
        }
    }

    fn relay_snapshot(&self) -> RelaySnapshot {
        RelaySnapshot {
            relay1: self.relay1,
            relay2: self.relay2,
            relay3: self.relay3,
            last_updated: self.last_updated,
        }
    }
}

/// Authoritative in-memory view of relay and theft state, shared between
/// the field device and the dashboard.
///
/// All relay, theft, and cached-price fields live behind one lock, so a
/// combined transition like "relay 3 on, alarm cleared" is observed
/// atomically by every concurrent reader. The settings store is never
/// called while the lock is held: fetch first, then lock and merge.
#[derive(Clone)]
pub struct MeterStateService {
    state: Arc<RwLock<MeterState>>,
    store: Arc<dyn PriceStore>,
    store_timeout: Duration,
}

impl MeterStateService {
    /// Startup defaults: relay 1 and 2 off, protective relay 3 on (not
    /// tripped), no theft alarm. State lives for the process lifetime and
    /// is not persisted across restarts.
    pub fn new(store: Arc<dyn PriceStore>, default_price: f64, store_timeout: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(MeterState {
                relay1: false,
                relay2: false,
                relay3: true,
                last_updated: None,
                theft_detected: false,
                theft_detected_at: None,
                price_per_unit: default_price,
            })),
            store,
            store_timeout,
        }
    }

    /// Device-reported relay positions. Only the relays present in the
    /// update change; the shared timestamp always refreshes.
    pub async fn apply_device_report(
        &self,
        update: RelayStateUpdate,
        reported_at: Option<DateTime<Utc>>,
    ) -> RelaySnapshot {
        let mut state = self.state.write().await;
        if let Some(on) = update.relay1 {
            state.relay1 = on;
        }
        if let Some(on) = update.relay2 {
            state.relay2 = on;
        }
        if let Some(on) = update.relay3 {
            state.relay3 = on;
        }
        state.last_updated = Some(reported_at.unwrap_or_else(Utc::now));

        let snapshot = state.relay_snapshot();
        info!(
            relay1 = snapshot.relay1,
            relay2 = snapshot.relay2,
            relay3 = snapshot.relay3,
            "relay states updated by device"
        );
        snapshot
    }

    /// Current relay states plus the cached price. Read-through: the price
    /// is refreshed from the settings store first, outside the lock; if the
    /// store is unreachable the stale cached price is returned instead of
    /// failing the call.
    pub async fn relay_state(&self) -> RelayStateView {
        let fetched = match tokio::time::timeout(self.store_timeout, self.store.fetch_price()).await
        {
            Ok(Ok(price)) => Some(price),
            Ok(Err(e)) => {
                warn!("price refresh failed, serving cached value: {}", e);
                None
            }
            Err(_) => {
                warn!("price refresh timed out, serving cached value");
                None
            }
        };

        let mut state = self.state.write().await;
        if let Some(price) = fetched {
            state.price_per_unit = price;
        }
        RelayStateView {
            relay1: state.relay1,
            relay2: state.relay2,
            relay3: state.relay3,
            price: state.price_per_unit,
            timestamp: state.last_updated,
        }
    }

    /// Dashboard relay command. Applied optimistically without waiting for
    /// a device acknowledgement. Turning the protective relay on clears the
    /// theft alarm in the same critical section; no other relay transition
    /// touches the alarm.
    pub async fn command_relay(&self, relay: u8, on: bool) -> Result<RelayId> {
        let relay = RelayId::from_number(relay)
            .ok_or_else(|| AppError::Validation(format!("Invalid relay: {}", relay)))?;

        let mut state = self.state.write().await;
        state.set_relay(relay, on);
        state.last_updated = Some(Utc::now());

        if relay == RelayId::Relay3 && on {
            state.theft_detected = false;
            state.theft_detected_at = None;
            info!("theft alarm cleared by protective relay command");
        }

        info!(relay = relay.number(), on, "relay commanded from dashboard");
        Ok(relay)
    }

    /// Device theft-detection report. Sets or clears the alarm only; the
    /// device is expected to report its relay positions separately if it
    /// trips the protective relay.
    pub async fn report_theft(&self, detected: bool, reported_at: Option<DateTime<Utc>>) {
        let mut state = self.state.write().await;
        state.theft_detected = detected;
        state.theft_detected_at = if detected {
            Some(reported_at.unwrap_or_else(Utc::now))
        } else {
            None
        };

        if detected {
            warn!("theft alarm raised by device");
        } else {
            info!("theft alarm cleared by device");
        }
    }

    pub async fn theft_status(&self) -> TheftStatus {
        let state = self.state.read().await;
        TheftStatus {
            detected: state.theft_detected,
            detected_at: state.theft_detected_at,
        }
    }

    /// Relay states as of now, without touching the settings store.
    pub async fn snapshot(&self) -> RelaySnapshot {
        self.state.read().await.relay_snapshot()
    }

    /// Relay 1 and 2 positions for stamping onto a persisted reading.
    pub async fn relay_flags(&self) -> (bool, bool) {
        let state = self.state.read().await;
        (state.relay1, state.relay2)
    }

    /// Price update. Write-through: the store write must succeed before the
    /// cache changes; a failed or timed-out write leaves the cache at its
    /// prior value and surfaces the failure.
    pub async fn set_price(&self, price: f64) -> Result<f64> {
        if !(price > 0.0) {
            return Err(AppError::Validation(format!(
                "Price must be positive, got {}",
                price
            )));
        }

        match tokio::time::timeout(self.store_timeout, self.store.save_price(price)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(AppError::StoreUnavailable(e.to_string())),
            Err(_) => {
                return Err(AppError::StoreUnavailable(
                    "settings store write timed out".to_string(),
                ))
            }
        }

        let mut state = self.state.write().await;
        state.price_per_unit = price;
        info!(price, "price per unit updated");
        Ok(price)
    }
}
