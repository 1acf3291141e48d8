//! Page-load initialization: resolve the first locale and reveal content.
//!
//! Content is hidden from the start of initialization until the first switch
//! completes or the attempt budget runs out. Every path ends with the
//! document visible.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::config::ReadinessSettings;
use crate::dom::Dom;
use crate::l10n::detector::GeoLocaleDetector;
use crate::l10n::store::LocaleStore;
use crate::l10n::switcher::LanguageSwitcher;
use crate::types::LocaleId;

/// Set-once handle through which components reach the switcher once it exists.
#[derive(Debug, Default)]
pub struct SwitcherSlot {
    /// Filled at most once
    cell: OnceCell<Arc<LanguageSwitcher>>,
}

impl SwitcherSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the switcher. Returns `false` if one was already installed.
    pub fn provide(&self, switcher: Arc<LanguageSwitcher>) -> bool {
        self.cell.set(switcher).is_ok()
    }

    #[must_use]
    pub fn get(&self) -> Option<Arc<LanguageSwitcher>> {
        self.cell.get().cloned()
    }

    /// Polls for the switcher at most `max_attempts` times, `interval_ms` apart.
    pub async fn wait(&self, readiness: &ReadinessSettings) -> Option<Arc<LanguageSwitcher>> {
        let interval = Duration::from_millis(readiness.interval_ms);
        for attempt in 0..readiness.max_attempts {
            if let Some(switcher) = self.get() {
                return Some(switcher);
            }
            tracing::trace!(attempt, "Waiting for language switcher");
            tokio::time::sleep(interval).await;
        }
        self.get()
    }
}

/// What initialization ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The persisted preference was bound; detection was skipped.
    Restored(LocaleId),
    /// The detected (or fallback) locale was bound.
    Detected(LocaleId),
    /// Detection reported "no change"; the page keeps its markup language.
    Unchanged,
    /// The resolved locale could not be bound.
    SwitchFailed(LocaleId),
    /// No switcher appeared within the readiness budget.
    SwitcherUnavailable,
}

/// Runs the page-load sequence once.
pub async fn initialize(
    slot: &SwitcherSlot,
    store: &dyn LocaleStore,
    detector: &GeoLocaleDetector,
    dom: &dyn Dom,
    readiness: &ReadinessSettings,
) -> InitOutcome {
    dom.set_document_visible(false);
    let outcome = resolve_initial_locale(slot, store, detector, readiness).await;
    dom.set_document_visible(true);
    tracing::info!(?outcome, "Locale initialization finished");
    outcome
}

/// Picks and binds the first locale while the document is hidden.
async fn resolve_initial_locale(
    slot: &SwitcherSlot,
    store: &dyn LocaleStore,
    detector: &GeoLocaleDetector,
    readiness: &ReadinessSettings,
) -> InitOutcome {
    let Some(switcher) = slot.wait(readiness).await else {
        tracing::warn!("Language switcher not found, showing content");
        return InitOutcome::SwitcherUnavailable;
    };

    if let Some(saved) = store.get() {
        tracing::debug!(locale = %saved, "Using saved language");
        return if switcher.switch_to(&saved, true).await {
            InitOutcome::Restored(saved)
        } else {
            InitOutcome::SwitchFailed(saved)
        };
    }

    let Some(detected) = detector.detect().await else {
        tracing::debug!("Detection requested no change");
        return InitOutcome::Unchanged;
    };
    if switcher.switch_to(&detected, true).await {
        InitOutcome::Detected(detected)
    } else {
        InitOutcome::SwitchFailed(detected)
    }
}
