pub mod readings;
pub mod settings;

pub use readings::ReadingsRepository;
pub use settings::SettingsRepository;
