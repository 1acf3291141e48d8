//! Test helpers shared by the unit test modules.
#![cfg(test)]

use std::collections::HashMap;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::{
    Mutex,
    PoisonError,
};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{
    Value,
    json,
};

use crate::dom::{
    ElementSnapshot,
    PageSnapshot,
};
use crate::l10n::{
    DetectionError,
    GeoInfo,
    GeoLookup,
    LoadError,
    LocaleStore,
    StoreError,
    TranslationBundle,
    TranslationLoader,
};
use crate::types::{
    CountryCode,
    LocaleId,
};

fn language_option(lang: &str, flag: &str, label: &str) -> ElementSnapshot {
    ElementSnapshot::new("li").child(
        ElementSnapshot::new("a")
            .class("language-option")
            .attr("data-lang", lang)
            .attr("href", "#")
            .child(ElementSnapshot::new("img").attr("src", flag).attr("alt", label))
            .child(ElementSnapshot::new("span").text(label)),
    )
}

fn language_dropdown(id: &str) -> ElementSnapshot {
    ElementSnapshot::new("div").class("language-dropdown").attr("id", id).child(
        ElementSnapshot::new("button")
            .class("language-dropdown-toggle")
            .attr("aria-expanded", "false")
            .child(
                ElementSnapshot::new("img")
                    .class("current-flag")
                    .attr("src", "/img/flags/gb.svg")
                    .attr("alt", "English"),
            )
            .child(ElementSnapshot::new("span").attr("data-i18n", "nav.language").text("English"))
            .child(ElementSnapshot::new("svg")),
    )
    .child(
        ElementSnapshot::new("ul")
            .class("language-dropdown-menu")
            .child(language_option("en", "/img/flags/gb.svg", "English"))
            .child(language_option("vi", "/img/flags/vn.svg", "Tiếng Việt")),
    )
}

/// A page with a desktop and a mobile language dropdown, an open mobile menu
/// and a handful of translated elements.
pub(crate) fn sample_page() -> PageSnapshot {
    PageSnapshot::new(
        ElementSnapshot::new("body")
            .class("no-scroll")
            .child(ElementSnapshot::new("header").child(language_dropdown("desktop-language")))
            .child(
                ElementSnapshot::new("button")
                    .class("mobile-menu-button")
                    .class("active")
                    .attr("aria-expanded", "true"),
            )
            .child(
                ElementSnapshot::new("nav")
                    .attr("id", "mobileMenu")
                    .class("active")
                    .child(language_dropdown("mobile-language")),
            )
            .child(ElementSnapshot::new("div").attr("id", "mobileMenuOverlay").class("active"))
            .child(
                ElementSnapshot::new("main")
                    .child(ElementSnapshot::new("h1").attr("id", "hero-title").attr("data-i18n", "hero.title").text("Welcome"))
                    .child(ElementSnapshot::new("p").attr("data-i18n", "hero.subtitle").text("Subtitle"))
                    .child(
                        ElementSnapshot::new("input")
                            .attr("id", "email")
                            .attr("data-i18n", "form.email")
                            .attr("placeholder", "Email"),
                    )
                    .child(ElementSnapshot::new("p").attr("id", "untranslated").attr("data-i18n", "a.b.c").text("Keep me")),
            ),
    )
}

pub(crate) fn site_bundles() -> HashMap<String, Value> {
    HashMap::from([
        (
            "en".to_string(),
            json!({
                "nav": { "language": "English" },
                "hero": { "title": "Hello", "subtitle": "Welcome to our site" },
                "form": { "email": "Your email" }
            }),
        ),
        (
            "vi".to_string(),
            json!({
                "nav": { "language": "Tiếng Việt" },
                "hero": { "title": "Xin chào", "subtitle": "Chào mừng đến với trang của chúng tôi" },
                "form": { "email": "Email của bạn" }
            }),
        ),
    ])
}

/// In-memory loader that records every request.
#[derive(Debug, Default)]
pub(crate) struct FakeLoader {
    bundles: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeLoader {
    pub(crate) fn with_site_bundles() -> Self {
        Self { bundles: site_bundles(), ..Self::default() }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls_for(&self, locale: &str) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).iter().filter(|l| *l == locale).count()
    }
}

#[async_trait]
impl TranslationLoader for FakeLoader {
    async fn load(&self, locale: &LocaleId) -> Result<TranslationBundle, LoadError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(locale.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let value = self.bundles.get(locale.as_str()).cloned().ok_or_else(|| LoadError::Status {
            locale: locale.clone(),
            status: reqwest::StatusCode::NOT_FOUND,
        })?;
        TranslationBundle::from_value(locale.clone(), value)
            .map_err(|kind| LoadError::Malformed { locale: locale.clone(), reason: kind.to_string() })
    }
}

/// Geolocation stub answering with a fixed country, or failing.
#[derive(Debug)]
pub(crate) struct FakeGeoLookup {
    country: Option<CountryCode>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeGeoLookup {
    pub(crate) fn country(code: &str) -> Self {
        Self { country: Some(CountryCode::new(code)), calls: AtomicUsize::new(0), delay: None }
    }

    pub(crate) fn failing() -> Self {
        Self { country: None, calls: AtomicUsize::new(0), delay: None }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoLookup for FakeGeoLookup {
    async fn lookup(&self) -> Result<GeoInfo, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.country {
            Some(code) => Ok(GeoInfo {
                ip: Some("203.0.113.7".to_string()),
                country_code: Some(code.clone()),
                country_name: None,
            }),
            None => Err(DetectionError::Malformed("stub failure".to_string())),
        }
    }
}

/// Store whose writes always fail.
#[derive(Debug)]
pub(crate) struct FailingStore;

impl LocaleStore for FailingStore {
    fn get(&self) -> Option<LocaleId> {
        None
    }

    fn set(&self, _locale: &LocaleId) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("storage disabled")))
    }
}
