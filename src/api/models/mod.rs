pub mod readings;
pub mod relay;
pub mod settings;
