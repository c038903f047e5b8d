pub mod settings;

pub use settings::{LegacySettings, LoggingSettings, Settings};
