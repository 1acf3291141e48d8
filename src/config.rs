//! Site localization settings.
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Configuration types and settings
mod types;

pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    DetectionSettings,
    L10nSettings,
    NonTargetCountry,
    ReadinessSettings,
    StorageSettings,
    TranslationSource,
    TranslationsConfig,
    ValidationError,
};
