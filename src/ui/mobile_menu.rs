//! Mobile navigation drawer. Closes itself after every locale switch.

use std::sync::Arc;

use crate::dom::Dom;
use crate::l10n::switcher::{
    LanguageSwitcher,
    LocaleObserver,
};
use crate::types::LocaleId;

/// Id of the navigation drawer.
const MENU_ID: &str = "mobileMenu";
/// Id of the backdrop behind the drawer.
const OVERLAY_ID: &str = "mobileMenuOverlay";
/// Class of the button opening the drawer.
const HAMBURGER_CLASS: &str = "mobile-menu-button";
/// Class marking open drawer parts.
const ACTIVE_CLASS: &str = "active";
/// Body class that blocks page scrolling while the drawer is open.
const NO_SCROLL_CLASS: &str = "no-scroll";

/// The page's mobile navigation drawer.
pub struct MobileMenu {
    /// Page holding the drawer
    dom: Arc<dyn Dom>,
}

impl std::fmt::Debug for MobileMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileMenu").field("open", &self.is_open()).finish_non_exhaustive()
    }
}

impl MobileMenu {
    #[must_use]
    pub fn attach(switcher: &LanguageSwitcher) -> Arc<Self> {
        let this = Arc::new(Self { dom: switcher.dom().clone() });
        let observer: Arc<dyn LocaleObserver> = this.clone();
        switcher.subscribe(Arc::downgrade(&observer));
        this
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.dom.element_by_id(MENU_ID).is_some_and(|menu| self.dom.has_class(menu, ACTIVE_CLASS))
    }

    /// Closes the drawer and its overlay and re-enables page scrolling.
    ///
    /// Does nothing unless both the drawer and the overlay exist.
    pub fn close(&self) {
        let dom = self.dom.as_ref();
        let (Some(menu), Some(overlay)) = (dom.element_by_id(MENU_ID), dom.element_by_id(OVERLAY_ID)) else {
            return;
        };
        dom.toggle_class(menu, ACTIVE_CLASS, false);
        dom.toggle_class(overlay, ACTIVE_CLASS, false);
        for body in dom.elements_with_tag("body") {
            dom.toggle_class(body, NO_SCROLL_CLASS, false);
        }
        if let Some(hamburger) = dom.elements_with_class(HAMBURGER_CLASS).into_iter().next() {
            dom.toggle_class(hamburger, ACTIVE_CLASS, false);
            dom.set_attribute(hamburger, "aria-expanded", "false");
        }
    }
}

impl LocaleObserver for MobileMenu {
    fn locale_changed(&self, locale: &LocaleId) {
        if self.is_open() {
            tracing::debug!(locale = %locale, "Closing mobile menu after locale switch");
        }
        self.close();
    }
}
