pub mod health;
pub mod readings;
pub mod relay;
pub mod settings;
pub mod theft;

use crate::repositories::ReadingsRepository;
use crate::services::MeterStateService;

#[derive(Clone)]
pub struct AppState {
    pub meter: MeterStateService,
    pub readings: ReadingsRepository,
}
