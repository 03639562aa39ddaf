use serde::Deserialize;

/// Partial relay positions reported by the device. Absent relays keep
/// their previous value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RelayStateUpdate {
    pub relay1: Option<bool>,
    pub relay2: Option<bool>,
    pub relay3: Option<bool>,
}

/// Dashboard relay command. The relay number is validated by the service;
/// anything outside 1..=3 is rejected.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RelayControlRequest {
    pub relay: u8,
    pub state: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TheftAlertRequest {
    pub theft_detected: bool,
}
