//! Localization subsystem: locale persistence, bundle loading, content
//! binding, geo-based detection and the switcher that composes them.

/// Content binder
pub mod binder;
/// Page-load initialization sequence
pub mod bootstrap;
/// Translation bundle
pub mod bundle;
/// Geo locale detector
pub mod detector;
/// Error types
pub mod error;
/// Translation loaders
pub mod loader;
/// Locale persistence
pub mod store;
/// Language switcher
pub mod switcher;

pub use binder::{
    BindReport,
    BoundElement,
    ContentBinder,
    ElementRole,
};
pub use bootstrap::{
    InitOutcome,
    SwitcherSlot,
    initialize,
};
pub use bundle::TranslationBundle;
pub use detector::{
    GeoInfo,
    GeoLocaleDetector,
    GeoLookup,
    HttpGeoLookup,
};
pub use error::{
    DetectionError,
    LoadError,
    StoreError,
};
pub use loader::{
    FileTranslationLoader,
    HttpTranslationLoader,
    TranslationLoader,
};
pub use store::{
    FileLocaleStore,
    LocaleStore,
    MemoryLocaleStore,
};
pub use switcher::{
    LanguageSwitcher,
    LocaleObserver,
};
