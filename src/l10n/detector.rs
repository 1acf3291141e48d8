//! Infers a default locale from the visitor's network location.

use std::sync::Arc;
use std::time::{
    Duration,
    Instant,
};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use crate::config::{
    DetectionSettings,
    NonTargetCountry,
};
use crate::l10n::error::DetectionError;
use crate::types::{
    CountryCode,
    LocaleId,
};

/// Result of a geolocation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoInfo {
    /// Public address the provider saw
    pub ip: Option<String>,
    /// Two-letter country code
    pub country_code: Option<CountryCode>,
    /// Human-readable country name
    pub country_name: Option<String>,
}

/// Field names differ between providers: `api.myip.com` answers
/// `{ip, cc, country}`, `ipapi.co` answers `{ip, country_code, country_name}`.
#[derive(Debug, Deserialize)]
struct RawGeoResponse {
    /// Address, both providers
    ip: Option<String>,
    /// Country code, `api.myip.com`
    cc: Option<String>,
    /// Country code, `ipapi.co`
    country_code: Option<String>,
    /// Country name, `api.myip.com`
    country: Option<String>,
    /// Country name, `ipapi.co`
    country_name: Option<String>,
}

impl GeoInfo {
    /// Reads a provider response.
    ///
    /// # Errors
    /// Fails when the body is not an object or carries no country code.
    pub fn from_response(value: serde_json::Value) -> Result<Self, DetectionError> {
        let raw: RawGeoResponse =
            serde_json::from_value(value).map_err(|e| DetectionError::Malformed(e.to_string()))?;
        let country_code = raw
            .cc
            .or(raw.country_code)
            .filter(|code| code.trim().len() == 2)
            .map(|code| CountryCode::new(&code))
            .ok_or_else(|| DetectionError::Malformed("missing country code".to_string()))?;
        Ok(Self {
            ip: raw.ip,
            country_code: Some(country_code),
            country_name: raw.country_name.or(raw.country),
        })
    }
}

/// Network-address geolocation service.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self) -> Result<GeoInfo, DetectionError>;

    /// Number of providers one lookup may query in turn. The detector grants
    /// each of them a full attempt timeout.
    fn sources(&self) -> u32 {
        1
    }
}

/// Queries each endpoint in order until one answers with a country.
///
/// An endpoint that does not answer within `timeout` counts as failed and
/// the next one is tried.
#[derive(Debug, Clone)]
pub struct HttpGeoLookup {
    /// Providers, in order of preference
    endpoints: Vec<Url>,
    /// Shared client
    http: reqwest::Client,
    /// Budget for a single endpoint
    timeout: Duration,
}

impl HttpGeoLookup {
    #[must_use]
    pub const fn new(endpoints: Vec<Url>, http: reqwest::Client, timeout: Duration) -> Self {
        Self { endpoints, http, timeout }
    }

    async fn query(&self, endpoint: &Url) -> Result<GeoInfo, DetectionError> {
        let response = self
            .http
            .get(endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(endpoint = %endpoint, status = %status, body = %body, "Geolocation HTTP error");
            return Err(DetectionError::Status { endpoint: endpoint.to_string(), status });
        }

        let value: serde_json::Value = response.json().await?;
        GeoInfo::from_response(value)
    }
}

#[async_trait]
impl GeoLookup for HttpGeoLookup {
    async fn lookup(&self) -> Result<GeoInfo, DetectionError> {
        let mut last_error = DetectionError::NoEndpoint;
        for endpoint in &self.endpoints {
            let result = tokio::time::timeout(self.timeout, self.query(endpoint))
                .await
                .unwrap_or(Err(DetectionError::Timeout(self.timeout)));
            match result {
                Ok(info) => {
                    tracing::debug!(endpoint = %endpoint, ?info, "Geolocation lookup succeeded");
                    return Ok(info);
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Geolocation endpoint failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn sources(&self) -> u32 {
        u32::try_from(self.endpoints.len()).unwrap_or(u32::MAX).max(1)
    }
}

/// Maps the lookup result to a locale, never failing.
///
/// Total latency is capped at
/// `max_attempts × (sources × attempt_timeout + retry_interval)`.
#[derive(Clone)]
pub struct GeoLocaleDetector {
    /// Geolocation source
    lookup: Arc<dyn GeoLookup>,
    /// Country mapped to `target_locale`
    target_country: CountryCode,
    /// Locale for visitors from `target_country`
    target_locale: LocaleId,
    /// Locale for everyone else and for failed lookups
    fallback_locale: LocaleId,
    /// What a non-target country maps to
    on_non_target_country: NonTargetCountry,
    /// Lookup attempts before giving up
    max_attempts: u32,
    /// Budget per provider per attempt
    attempt_timeout: Duration,
    /// Pause between attempts
    retry_interval: Duration,
}

impl std::fmt::Debug for GeoLocaleDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoLocaleDetector")
            .field("lookup", &"<dyn GeoLookup>")
            .field("target_country", &self.target_country)
            .field("target_locale", &self.target_locale)
            .field("fallback_locale", &self.fallback_locale)
            .field("on_non_target_country", &self.on_non_target_country)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl GeoLocaleDetector {
    #[must_use]
    pub fn new(lookup: Arc<dyn GeoLookup>, settings: &DetectionSettings) -> Self {
        Self {
            lookup,
            target_country: CountryCode::new(&settings.target_country),
            target_locale: LocaleId::new(settings.target_locale.clone()),
            fallback_locale: LocaleId::new(settings.fallback_locale.clone()),
            on_non_target_country: settings.on_non_target_country,
            max_attempts: settings.max_attempts.max(1),
            attempt_timeout: Duration::from_millis(settings.attempt_timeout_ms),
            retry_interval: Duration::from_millis(settings.retry_interval_ms),
        }
    }

    /// Applies the fixed country → locale rule.
    ///
    /// `None` means "no change" and only occurs under
    /// [`NonTargetCountry::NoChange`].
    #[must_use]
    pub fn map_country(&self, country: Option<&CountryCode>) -> Option<LocaleId> {
        match country {
            Some(code) if *code == self.target_country => Some(self.target_locale.clone()),
            Some(_) => match self.on_non_target_country {
                NonTargetCountry::Fallback => Some(self.fallback_locale.clone()),
                NonTargetCountry::NoChange => None,
            },
            None => Some(self.fallback_locale.clone()),
        }
    }

    /// Resolves the visitor's locale. Lookup failures fall back to the
    /// fallback locale and are never propagated.
    pub async fn detect(&self) -> Option<LocaleId> {
        let started = Instant::now();
        let budget = self.attempt_timeout.saturating_mul(self.lookup.sources());
        for attempt in 1..=self.max_attempts {
            match tokio::time::timeout(budget, self.lookup.lookup()).await {
                Ok(Ok(info)) => {
                    let locale = self.map_country(info.country_code.as_ref());
                    tracing::info!(
                        country = ?info.country_code,
                        country_name = ?info.country_name,
                        locale = ?locale,
                        elapsed = ?started.elapsed(),
                        "Country detected"
                    );
                    return locale;
                }
                Ok(Err(e)) => {
                    tracing::warn!(attempt, error = %e, "Locale detection attempt failed");
                }
                Err(_) => {
                    let e = DetectionError::Timeout(budget);
                    tracing::warn!(attempt, error = %e, "Locale detection attempt failed");
                }
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_interval).await;
            }
        }
        tracing::warn!(
            fallback = %self.fallback_locale,
            elapsed = ?started.elapsed(),
            "Locale detection gave up, using fallback"
        );
        Some(self.fallback_locale.clone())
    }
}
