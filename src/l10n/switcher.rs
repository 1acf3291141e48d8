//! Language switcher: decides the active locale and drives loading, binding
//! and persistence.

use std::sync::{
    Arc,
    PoisonError,
    RwLock,
    Weak,
};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::L10nSettings;
use crate::dom::Dom;
use crate::l10n::binder::ContentBinder;
use crate::l10n::bundle::TranslationBundle;
use crate::l10n::error::LoadError;
use crate::l10n::loader::TranslationLoader;
use crate::l10n::store::LocaleStore;
use crate::types::LocaleId;

/// Class carried by every language option element.
pub const LANGUAGE_OPTION_CLASS: &str = "language-option";
/// Class of the image showing the active locale's flag.
pub const CURRENT_FLAG_CLASS: &str = "current-flag";

/// Notified after every successful switch, whoever triggered it.
pub trait LocaleObserver: Send + Sync {
    /// Called with the newly bound locale.
    fn locale_changed(&self, locale: &LocaleId);
}

/// The shared switcher.
///
/// Constructed once per page and handed to every component that needs it.
/// `switch_to` calls are serialized: a call made while another is in flight
/// waits for it, so the current locale always matches the last bound bundle.
pub struct LanguageSwitcher {
    /// Page being localized
    dom: Arc<dyn Dom>,
    /// Bundle source
    loader: Arc<dyn TranslationLoader>,
    /// Preference slot
    store: Arc<dyn LocaleStore>,
    /// Elements captured at construction
    binder: ContentBinder,
    /// Attribute carrying translation keys
    key_attribute: String,
    /// Attribute carrying the locale of a language option
    locale_attribute: String,
    /// Locale bound when a load fails and the fallback is enabled
    default_locale: LocaleId,
    /// Whether load failures bind `default_locale`
    fallback_to_default_on_load_error: bool,
    /// Upper bound on a single bundle load
    load_timeout: Duration,
    /// Locale of the last bound bundle
    current: RwLock<Option<LocaleId>>,
    /// Held for the whole of `switch_to`
    switch_lock: Mutex<()>,
    /// Components re-rendered after each switch
    observers: RwLock<Vec<Weak<dyn LocaleObserver>>>,
}

impl std::fmt::Debug for LanguageSwitcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageSwitcher")
            .field("dom", &"<dyn Dom>")
            .field("loader", &"<dyn TranslationLoader>")
            .field("store", &"<dyn LocaleStore>")
            .field("bound_elements", &self.binder.elements().len())
            .field("current", &self.current_locale())
            .finish_non_exhaustive()
    }
}

impl LanguageSwitcher {
    /// Captures the bound element set from `dom`.
    #[must_use]
    pub fn new(
        dom: Arc<dyn Dom>,
        loader: Arc<dyn TranslationLoader>,
        store: Arc<dyn LocaleStore>,
        settings: &L10nSettings,
    ) -> Self {
        let binder = ContentBinder::capture(dom.as_ref(), &settings.key_attribute, &settings.key_separator);
        Self {
            dom,
            loader,
            store,
            binder,
            key_attribute: settings.key_attribute.clone(),
            locale_attribute: settings.locale_attribute.clone(),
            default_locale: LocaleId::new(settings.default_locale.clone()),
            fallback_to_default_on_load_error: settings.fallback_to_default_on_load_error,
            load_timeout: Duration::from_millis(settings.translations.timeout_ms),
            current: RwLock::new(None),
            switch_lock: Mutex::new(()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Locale of the last bound bundle.
    #[must_use]
    pub fn current_locale(&self) -> Option<LocaleId> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn dom(&self) -> &Arc<dyn Dom> {
        &self.dom
    }

    #[must_use]
    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    #[must_use]
    pub fn locale_attribute(&self) -> &str {
        &self.locale_attribute
    }

    /// Registers an observer. Only a weak handle is kept.
    pub fn subscribe(&self, observer: Weak<dyn LocaleObserver>) {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        observers.retain(|o| o.strong_count() > 0);
        observers.push(observer);
    }

    /// Switches the page to `locale`.
    ///
    /// Returns `false` without doing anything when `locale` is already active
    /// and `force` is not set, and `false` when the bundle cannot be loaded
    /// within the load timeout; in that case content and the persisted
    /// preference are left as they were.
    pub async fn switch_to(&self, locale: &LocaleId, force: bool) -> bool {
        let _guard = self.switch_lock.lock().await;

        let current = self.current_locale();
        if !force && current.as_ref() == Some(locale) {
            tracing::debug!(locale = %locale, "Locale already active");
            return false;
        }

        match self.load(locale).await {
            Ok(bundle) => {
                self.commit(&bundle, true);
                tracing::info!(locale = %locale, force, "Switched locale");
                true
            }
            Err(e) => {
                tracing::warn!(locale = %locale, error = %e, "Failed to load translations");
                if self.fallback_to_default_on_load_error
                    && *locale != self.default_locale
                    && current.as_ref() != Some(&self.default_locale)
                {
                    self.bind_default().await;
                }
                false
            }
        }
    }

    async fn load(&self, locale: &LocaleId) -> Result<TranslationBundle, LoadError> {
        tokio::time::timeout(self.load_timeout, self.loader.load(locale))
            .await
            .unwrap_or_else(|_| Err(LoadError::Timeout { locale: locale.clone(), after: self.load_timeout }))
    }

    async fn bind_default(&self) {
        match self.load(&self.default_locale).await {
            Ok(bundle) => {
                tracing::info!(locale = %self.default_locale, "Bound default locale after load failure");
                self.commit(&bundle, false);
            }
            Err(e) => {
                tracing::warn!(locale = %self.default_locale, error = %e, "Default locale failed to load too");
            }
        }
    }

    /// Binds `bundle` and updates everything that reflects the active locale.
    fn commit(&self, bundle: &TranslationBundle, persist: bool) {
        let locale = bundle.locale();
        let report = self.binder.apply(self.dom.as_ref(), bundle);
        tracing::debug!(locale = %locale, applied = report.applied, missing = report.missing.len(), "Bound content");

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(locale.clone());

        if persist && let Err(e) = self.store.set(locale) {
            tracing::warn!(locale = %locale, error = %e, "Locale preference not persisted");
        }

        self.dom.set_document_lang(locale.as_str());
        self.mark_active_options(locale);
        self.swap_current_flag(locale);
        self.notify(locale);
    }

    /// Marks the options for `locale` active and unmarks the others.
    fn mark_active_options(&self, locale: &LocaleId) {
        for option in self.dom.elements_with_class(LANGUAGE_OPTION_CLASS) {
            let active = self.dom.attribute(option, &self.locale_attribute).is_some_and(|l| *locale == l.as_str());
            self.dom.toggle_class(option, "active", active);
            self.dom.set_attribute(option, "aria-pressed", if active { "true" } else { "false" });
        }
    }

    /// Copies the selected option's flag into the first `.current-flag`.
    fn swap_current_flag(&self, locale: &LocaleId) {
        let Some(option) = self.dom.elements_with_class(LANGUAGE_OPTION_CLASS).into_iter().find(|option| {
            self.dom.attribute(*option, &self.locale_attribute).is_some_and(|l| *locale == l.as_str())
        }) else {
            return;
        };
        let (Some(image), Some(flag)) = (
            self.dom.first_descendant_with_tag(option, "img"),
            self.dom.elements_with_class(CURRENT_FLAG_CLASS).into_iter().next(),
        ) else {
            return;
        };
        for name in ["src", "alt"] {
            if let Some(value) = self.dom.attribute(image, name) {
                self.dom.set_attribute(flag, name, &value);
            }
        }
    }

    fn notify(&self, locale: &LocaleId) {
        let observers: Vec<Arc<dyn LocaleObserver>> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for observer in observers {
            observer.locale_changed(locale);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };
    use std::time::Duration;

    use super::*;
    use crate::dom::MemoryDom;
    use crate::l10n::store::MemoryLocaleStore;
    use crate::test_utils::{
        FailingStore,
        FakeLoader,
        sample_page,
    };

    struct Fixture {
        dom: Arc<MemoryDom>,
        loader: Arc<FakeLoader>,
        store: Arc<MemoryLocaleStore>,
        switcher: LanguageSwitcher,
    }

    fn fixture_with(settings: &L10nSettings, loader: FakeLoader) -> Fixture {
        let dom = Arc::new(MemoryDom::from_snapshot(sample_page()));
        let loader = Arc::new(loader);
        let store = Arc::new(MemoryLocaleStore::new());
        let switcher = LanguageSwitcher::new(dom.clone(), loader.clone(), store.clone(), settings);
        Fixture { dom, loader, store, switcher }
    }

    fn fixture() -> Fixture {
        fixture_with(&L10nSettings::default(), FakeLoader::with_site_bundles())
    }

    fn heading_text(dom: &MemoryDom) -> Option<String> {
        dom.text_content(dom.element_by_id("hero-title").unwrap())
    }

    #[tokio::test]
    async fn switch_binds_persists_and_marks() {
        let f = fixture();

        assert!(f.switcher.switch_to(&LocaleId::new("vi"), false).await);

        assert_eq!(f.switcher.current_locale(), Some(LocaleId::new("vi")));
        assert_eq!(f.store.get(), Some(LocaleId::new("vi")));
        assert_eq!(heading_text(&f.dom).as_deref(), Some("Xin chào"));
        assert_eq!(f.dom.document_lang().as_deref(), Some("vi"));

        let options = f.dom.elements_with_class(LANGUAGE_OPTION_CLASS);
        let vi = options.iter().find(|o| f.dom.attribute(**o, "data-lang").as_deref() == Some("vi")).unwrap();
        let en = options.iter().find(|o| f.dom.attribute(**o, "data-lang").as_deref() == Some("en")).unwrap();
        assert!(f.dom.has_class(*vi, "active"));
        assert_eq!(f.dom.attribute(*vi, "aria-pressed").as_deref(), Some("true"));
        assert!(!f.dom.has_class(*en, "active"));
        assert_eq!(f.dom.attribute(*en, "aria-pressed").as_deref(), Some("false"));

        let flag = f.dom.elements_with_class(CURRENT_FLAG_CLASS)[0];
        assert_eq!(f.dom.attribute(flag, "src").as_deref(), Some("/img/flags/vn.svg"));
        assert_eq!(f.dom.attribute(flag, "alt").as_deref(), Some("Tiếng Việt"));
    }

    #[tokio::test]
    async fn same_locale_without_force_is_a_no_op() {
        let f = fixture();

        assert!(f.switcher.switch_to(&LocaleId::new("vi"), false).await);
        assert!(!f.switcher.switch_to(&LocaleId::new("vi"), false).await);

        assert_eq!(f.loader.calls_for("vi"), 1);
    }

    #[tokio::test]
    async fn force_reloads_active_locale() {
        let f = fixture();

        assert!(f.switcher.switch_to(&LocaleId::new("vi"), false).await);
        assert!(f.switcher.switch_to(&LocaleId::new("vi"), true).await);

        assert_eq!(f.loader.calls_for("vi"), 2);
    }

    #[tokio::test]
    async fn load_failure_keeps_previous_state() {
        let f = fixture();
        assert!(f.switcher.switch_to(&LocaleId::new("vi"), false).await);

        assert!(!f.switcher.switch_to(&LocaleId::new("xx"), false).await);

        assert_eq!(f.switcher.current_locale(), Some(LocaleId::new("vi")));
        assert_eq!(f.store.get(), Some(LocaleId::new("vi")));
        assert_eq!(heading_text(&f.dom).as_deref(), Some("Xin chào"));
        assert_eq!(f.loader.calls_for("en"), 0);
    }

    #[tokio::test]
    async fn load_failure_can_fall_back_to_default_locale() {
        let settings = L10nSettings { fallback_to_default_on_load_error: true, ..L10nSettings::default() };
        let f = fixture_with(&settings, FakeLoader::with_site_bundles());

        assert!(!f.switcher.switch_to(&LocaleId::new("xx"), false).await);

        assert_eq!(f.switcher.current_locale(), Some(LocaleId::new("en")));
        assert_eq!(heading_text(&f.dom).as_deref(), Some("Hello"));
        assert_eq!(f.store.get(), None);
    }

    #[tokio::test]
    async fn store_failure_is_not_fatal() {
        let dom = Arc::new(MemoryDom::from_snapshot(sample_page()));
        let switcher = LanguageSwitcher::new(
            dom.clone(),
            Arc::new(FakeLoader::with_site_bundles()),
            Arc::new(FailingStore),
            &L10nSettings::default(),
        );

        assert!(switcher.switch_to(&LocaleId::new("vi"), false).await);

        assert_eq!(heading_text(&dom).as_deref(), Some("Xin chào"));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_switches_are_serialized() {
        let f = fixture_with(
            &L10nSettings::default(),
            FakeLoader::with_site_bundles().with_delay(Duration::from_millis(50)),
        );
        let vi = LocaleId::new("vi");
        let en = LocaleId::new("en");

        let (first, second) = tokio::join!(f.switcher.switch_to(&vi, false), f.switcher.switch_to(&en, false));

        assert!(first && second);
        assert_eq!(f.switcher.current_locale(), Some(en.clone()));
        assert_eq!(f.store.get(), Some(en));
        assert_eq!(heading_text(&f.dom).as_deref(), Some("Hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_identical_switches_bind_once() {
        let f = fixture_with(
            &L10nSettings::default(),
            FakeLoader::with_site_bundles().with_delay(Duration::from_millis(50)),
        );
        let vi = LocaleId::new("vi");

        let (first, second) = tokio::join!(f.switcher.switch_to(&vi, false), f.switcher.switch_to(&vi, false));

        assert!(first ^ second);
        assert_eq!(f.loader.calls_for("vi"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_load_times_out_and_releases_the_lock() {
        let f = fixture_with(
            &L10nSettings::default(),
            FakeLoader::with_site_bundles().with_delay(Duration::from_secs(3600)),
        );
        let started = tokio::time::Instant::now();

        assert!(!f.switcher.switch_to(&LocaleId::new("vi"), false).await);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(f.switcher.current_locale(), None);
        assert_eq!(heading_text(&f.dom).as_deref(), Some("Welcome"));

        assert!(!f.switcher.switch_to(&LocaleId::new("en"), false).await);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    struct CountingObserver(AtomicUsize);

    impl LocaleObserver for CountingObserver {
        fn locale_changed(&self, _locale: &LocaleId) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn observers_see_every_successful_switch() {
        let f = fixture();
        let observer = Arc::new(CountingObserver(AtomicUsize::new(0)));
        let as_dyn: Arc<dyn LocaleObserver> = observer.clone();
        f.switcher.subscribe(Arc::downgrade(&as_dyn));

        f.switcher.switch_to(&LocaleId::new("vi"), false).await;
        f.switcher.switch_to(&LocaleId::new("xx"), false).await;
        f.switcher.switch_to(&LocaleId::new("en"), false).await;

        assert_eq!(observer.0.load(Ordering::SeqCst), 2);
    }
}
