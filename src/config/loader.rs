//! Reads the settings file from a project root.

use std::path::Path;

use super::{
    ConfigError,
    L10nSettings,
};

/// Settings file name, looked up at the project root.
pub(super) const CONFIG_FILE_NAME: &str = ".site-l10n.json";

/// Loads settings from `<root>/.site-l10n.json`.
///
/// # Returns
/// - `Ok(Some(settings))`: the file exists and parsed
/// - `Ok(None)`: no settings file
///
/// # Errors
/// - File read error
/// - JSON parse error
pub(super) fn load_from_root(root: &Path) -> Result<Option<L10nSettings>, ConfigError> {
    let config_path = root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: L10nSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}
