pub mod meter_state;

pub use meter_state::{MeterStateService, PriceStore, RelayId, RelaySnapshot, TheftStatus};
