//! Fetches a locale's translation bundle from `<base>/<locale>.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::l10n::bundle::TranslationBundle;
use crate::l10n::error::LoadError;
use crate::types::LocaleId;

/// Source of translation bundles. No retry and no caching.
#[async_trait]
pub trait TranslationLoader: Send + Sync {
    async fn load(&self, locale: &LocaleId) -> Result<TranslationBundle, LoadError>;
}

/// Wraps a parsed body, rejecting anything but a JSON object.
fn into_bundle(locale: &LocaleId, value: Value) -> Result<TranslationBundle, LoadError> {
    TranslationBundle::from_value(locale.clone(), value).map_err(|kind| LoadError::Malformed {
        locale: locale.clone(),
        reason: format!("expected a JSON object, got {kind}"),
    })
}

/// Loads bundles over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTranslationLoader {
    /// Directory URL, always ending in `/`
    base_url: Url,
    /// Shared client
    http: reqwest::Client,
}

impl HttpTranslationLoader {
    /// `base_url` is treated as a directory; a trailing slash is added if missing.
    #[must_use]
    pub fn new(mut base_url: Url, http: reqwest::Client) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { base_url, http }
    }

    /// # Errors
    /// Returns an error when the locale does not form a valid URL segment.
    pub fn bundle_url(&self, locale: &LocaleId) -> Result<Url, LoadError> {
        self.base_url
            .join(&format!("{locale}.json"))
            .map_err(|source| LoadError::InvalidUrl { locale: locale.clone(), source })
    }
}

#[async_trait]
impl TranslationLoader for HttpTranslationLoader {
    async fn load(&self, locale: &LocaleId) -> Result<TranslationBundle, LoadError> {
        let url = self.bundle_url(locale)?;
        tracing::debug!(locale = %locale, url = %url, "Fetching translation bundle");

        let network = |source| LoadError::Network { locale: locale.clone(), source };
        let response = self.http.get(url).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(locale = %locale, status = %status, "Translation bundle not available");
            return Err(LoadError::Status { locale: locale.clone(), status });
        }

        let value: Value = response.json().await.map_err(|e| LoadError::Malformed {
            locale: locale.clone(),
            reason: e.to_string(),
        })?;
        let bundle = into_bundle(locale, value)?;
        tracing::debug!(locale = %locale, keys = bundle.leaf_count(), "Loaded translation bundle");
        Ok(bundle)
    }
}

/// Loads bundles from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileTranslationLoader {
    /// Directory holding `<locale>.json` files
    directory: PathBuf,
}

impl FileTranslationLoader {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }
}

#[async_trait]
impl TranslationLoader for FileTranslationLoader {
    async fn load(&self, locale: &LocaleId) -> Result<TranslationBundle, LoadError> {
        let path = self.directory.join(format!("{locale}.json"));
        tracing::debug!(locale = %locale, path = %path.display(), "Reading translation bundle");

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound {
                    locale: locale.clone(),
                    path: path.display().to_string(),
                });
            }
            Err(source) => return Err(LoadError::Io { locale: locale.clone(), source }),
        };

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| LoadError::Malformed { locale: locale.clone(), reason: e.to_string() })?;
        let bundle = into_bundle(locale, value)?;
        tracing::debug!(locale = %locale, keys = bundle.leaf_count(), "Loaded translation bundle");
        Ok(bundle)
    }
}
