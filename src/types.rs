//! Core types used throughout the project.

use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// A locale identifier such as `"en"` or `"vi"`.
///
/// The set of valid identifiers is defined by the translation bundles that
/// exist on the site, so no validation happens here. An unknown identifier
/// simply fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleId(String);

impl LocaleId {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocaleId {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LocaleId {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl PartialEq<str> for LocaleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LocaleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Two-letter ISO 3166 country code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CountryCode {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}
