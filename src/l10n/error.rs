use thiserror::Error;

use crate::types::LocaleId;

/// A translation bundle could not be obtained.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The locale does not form a valid URL segment.
    #[error("Failed to build bundle URL for '{locale}': {source}")]
    InvalidUrl {
        locale: LocaleId,
        #[source]
        source: url::ParseError,
    },

    /// The request could not be sent or the connection broke.
    #[error("Network error while loading '{locale}': {source}")]
    Network {
        locale: LocaleId,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("Bundle for '{locale}' returned HTTP {status}")]
    Status { locale: LocaleId, status: reqwest::StatusCode },

    /// No bundle file for the locale.
    #[error("Bundle for '{locale}' not found at {path}")]
    NotFound { locale: LocaleId, path: String },

    /// The bundle file exists but could not be read.
    #[error("Failed to read bundle for '{locale}': {source}")]
    Io {
        locale: LocaleId,
        #[source]
        source: std::io::Error,
    },

    /// The body is not a JSON object.
    #[error("Bundle for '{locale}' is malformed: {reason}")]
    Malformed { locale: LocaleId, reason: String },

    /// The load did not finish within the configured timeout.
    #[error("Loading '{locale}' timed out after {after:?}")]
    Timeout { locale: LocaleId, after: std::time::Duration },
}

/// The geolocation lookup failed. Always recovered by the detector.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Geolocation request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Geolocation endpoint {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: reqwest::StatusCode },

    #[error("Geolocation response is malformed: {0}")]
    Malformed(String),

    #[error("Geolocation lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("No geolocation endpoint configured")]
    NoEndpoint,
}

/// The preference slot could not be written.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write locale preference: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode locale preference: {0}")]
    Serialization(#[from] serde_json::Error),
}
