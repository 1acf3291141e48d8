use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "detection.endpoints[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct L10nSettings {
    pub translations: TranslationsConfig,

    /// Attribute carrying a translation key path.
    pub key_attribute: String,
    /// Attribute carrying a locale identifier on language options.
    pub locale_attribute: String,
    pub key_separator: String,

    /// Locale used as secondary fallback when a bundle fails to load.
    pub default_locale: String,

    pub storage: StorageSettings,
    pub detection: DetectionSettings,
    pub readiness: ReadinessSettings,

    /// When a non-default bundle fails to load, bind the default bundle instead.
    pub fallback_to_default_on_load_error: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationsConfig {
    /// Either an `http(s)://` URL or a directory relative to the project root.
    pub base_url: String,
    /// Upper bound on loading one bundle.
    pub timeout_ms: u64,
}

impl Default for TranslationsConfig {
    fn default() -> Self {
        Self { base_url: "resources/lang".to_string(), timeout_ms: 10_000 }
    }
}

/// Where translation bundles come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationSource {
    Http(Url),
    Directory(PathBuf),
}

impl TranslationsConfig {
    /// Resolves `base_url` against the project root.
    #[must_use]
    pub fn source(&self, root: &Path) -> TranslationSource {
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => TranslationSource::Http(url),
            _ => TranslationSource::Directory(root.join(&self.base_url)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Name of the preference slot.
    pub key: String,
    /// Storage file, relative to the project root.
    pub path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { key: "language".to_string(), path: ".site-l10n-storage.json".to_string() }
    }
}

/// Behavior when the lookup succeeds with a country other than the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NonTargetCountry {
    /// Use the fallback locale.
    #[default]
    Fallback,
    /// Report "no change" and keep whatever locale is active.
    NoChange,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionSettings {
    /// Lookup endpoints, queried in order.
    pub endpoints: Vec<String>,
    pub target_country: String,
    pub target_locale: String,
    pub fallback_locale: String,
    pub on_non_target_country: NonTargetCountry,
    pub max_attempts: u32,
    pub attempt_timeout_ms: u64,
    pub retry_interval_ms: u64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            endpoints: vec!["https://api.myip.com".to_string(), "https://ipapi.co/json/".to_string()],
            target_country: "VN".to_string(),
            target_locale: "vi".to_string(),
            fallback_locale: "en".to_string(),
            on_non_target_country: NonTargetCountry::default(),
            max_attempts: 2,
            attempt_timeout_ms: 3000,
            retry_interval_ms: 100,
        }
    }
}

/// Bounded wait for the switcher to become available.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadinessSettings {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self { max_attempts: 10, interval_ms: 100 }
    }
}

fn require_non_empty(errors: &mut Vec<ValidationError>, field: &str, value: &str, example: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(
            field,
            format!("The value cannot be empty. Example: {example}"),
        ));
    }
}

impl L10nSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid endpoint URL
    /// - Invalid country code
    /// - Zero attempt budget or timeout
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        require_non_empty(&mut errors, "translations.baseUrl", &self.translations.base_url, "\"resources/lang\"");
        require_non_empty(&mut errors, "keyAttribute", &self.key_attribute, "\"data-i18n\"");
        require_non_empty(&mut errors, "localeAttribute", &self.locale_attribute, "\"data-lang\"");
        require_non_empty(&mut errors, "defaultLocale", &self.default_locale, "\"en\"");
        require_non_empty(&mut errors, "storage.key", &self.storage.key, "\"language\"");
        require_non_empty(&mut errors, "storage.path", &self.storage.path, "\".site-l10n-storage.json\"");

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.translations.base_url.contains("://")
            && let Err(e) = Url::parse(&self.translations.base_url)
        {
            errors.push(ValidationError::new(
                "translations.baseUrl",
                format!("Invalid URL '{}': {e}", self.translations.base_url),
            ));
        }

        let detection = &self.detection;
        for (index, endpoint) in detection.endpoints.iter().enumerate() {
            match Url::parse(endpoint) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(ValidationError::new(
                    format!("detection.endpoints[{index}]"),
                    format!("Unsupported scheme '{}' in '{endpoint}'. Use http or https", url.scheme()),
                )),
                Err(e) => errors.push(ValidationError::new(
                    format!("detection.endpoints[{index}]"),
                    format!("Invalid URL '{endpoint}': {e}"),
                )),
            }
        }

        let country = detection.target_country.trim();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.push(ValidationError::new(
                "detection.targetCountry",
                format!("'{}' is not a two-letter country code. Example: \"VN\"", detection.target_country),
            ));
        }
        require_non_empty(&mut errors, "detection.targetLocale", &detection.target_locale, "\"vi\"");
        require_non_empty(&mut errors, "detection.fallbackLocale", &detection.fallback_locale, "\"en\"");

        if self.translations.timeout_ms == 0 {
            errors.push(ValidationError::new("translations.timeoutMs", "The timeout must be greater than 0"));
        }
        if detection.attempt_timeout_ms == 0 {
            errors.push(ValidationError::new("detection.attemptTimeoutMs", "The timeout must be greater than 0"));
        }
        if detection.max_attempts == 0 {
            errors.push(ValidationError::new("detection.maxAttempts", "At least one attempt is required"));
        }
        if self.readiness.max_attempts == 0 {
            errors.push(ValidationError::new("readiness.maxAttempts", "At least one attempt is required"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for L10nSettings {
    fn default() -> Self {
        Self {
            translations: TranslationsConfig::default(),
            key_attribute: "data-i18n".to_string(),
            locale_attribute: "data-lang".to_string(),
            key_separator: ".".to_string(),
            default_locale: "en".to_string(),
            storage: StorageSettings::default(),
            detection: DetectionSettings::default(),
            readiness: ReadinessSettings::default(),
            fallback_to_default_on_load_error: false,
        }
    }
}
