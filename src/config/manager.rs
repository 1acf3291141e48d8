//! Holds the validated settings for one project root.

use std::path::Path;

use super::{
    ConfigError,
    L10nSettings,
    loader,
};

/// Validated settings, defaulted until a project is loaded.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Last settings that passed validation
    current_settings: L10nSettings,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates the settings of `root`, falling back to defaults
    /// when the project has no settings file. On error the previous settings
    /// are kept.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation error
    pub fn load_settings(&mut self, root: &Path) -> Result<(), ConfigError> {
        tracing::debug!(root = %root.display(), "Loading settings");

        let settings = loader::load_from_root(root)?.unwrap_or_else(|| {
            tracing::debug!("No settings file, using defaults");
            L10nSettings::default()
        });
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        tracing::debug!(?settings, "Settings loaded");
        self.current_settings = settings;
        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &L10nSettings {
        &self.current_settings
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn defaults_before_loading() {
        let manager = ConfigManager::new();

        assert_eq!(manager.get_settings().key_attribute, "data-i18n");
    }

    #[rstest]
    fn reads_project_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".site-l10n.json"), r#"{"keySeparator": "-"}"#).unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings(temp_dir.path()).unwrap();

        assert_eq!(manager.get_settings().key_separator, "-");
    }

    #[rstest]
    fn missing_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings(temp_dir.path()).unwrap();

        assert_eq!(manager.get_settings().default_locale, "en");
    }

    /// An invalid file is rejected and the previous settings stay.
    #[rstest]
    fn invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new();
        fs::write(temp_dir.path().join(".site-l10n.json"), r#"{"keySeparator": "-"}"#).unwrap();
        manager.load_settings(temp_dir.path()).unwrap();
        fs::write(temp_dir.path().join(".site-l10n.json"), r#"{"keyAttribute": ""}"#).unwrap();

        let result = manager.load_settings(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert_eq!(manager.get_settings().key_separator, "-");
        assert_eq!(manager.get_settings().key_attribute, "data-i18n");
    }
}
