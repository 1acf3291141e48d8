//! Language dropdowns: open/close handling and active-locale rendering.

use std::sync::Arc;

use crate::dom::{
    Dom,
    ElementId,
};
use crate::l10n::switcher::{
    CURRENT_FLAG_CLASS,
    LANGUAGE_OPTION_CLASS,
    LanguageSwitcher,
    LocaleObserver,
};
use crate::types::LocaleId;

/// Class of a dropdown container.
const DROPDOWN_CLASS: &str = "language-dropdown";
/// Class of the button opening a dropdown.
const TOGGLE_CLASS: &str = "language-dropdown-toggle";
/// Class of the option list.
const MENU_CLASS: &str = "language-dropdown-menu";
/// Class marking an open option list.
const OPEN_CLASS: &str = "show";

/// One `.language-dropdown` and its parts.
#[derive(Debug, Clone, Copy)]
struct Dropdown {
    /// The `.language-dropdown` element
    root: ElementId,
    /// The button opening the menu
    toggle: ElementId,
    /// The option list
    menu: ElementId,
}

/// Every `.language-dropdown` on the page.
///
/// Holds the switcher it was attached to; the switcher only keeps a weak
/// handle back.
#[derive(Debug)]
pub struct LanguageDropdowns {
    /// Switcher the dropdowns select through
    switcher: Arc<LanguageSwitcher>,
    /// Dropdowns found at attach time, in document order
    dropdowns: Vec<Dropdown>,
}

impl LanguageDropdowns {
    /// Discovers the dropdowns and subscribes them to `switcher`.
    ///
    /// Dropdowns lacking a toggle or a menu are skipped. The ARIA state of
    /// each toggle and menu is synced with the menu's open class.
    #[must_use]
    pub fn attach(switcher: &Arc<LanguageSwitcher>) -> Arc<Self> {
        let dom = switcher.dom();
        let dropdowns: Vec<Dropdown> = dom
            .elements_with_class(DROPDOWN_CLASS)
            .into_iter()
            .filter_map(|root| {
                let toggle = dom.first_descendant_with_class(root, TOGGLE_CLASS)?;
                let menu = dom.first_descendant_with_class(root, MENU_CLASS)?;
                Some(Dropdown { root, toggle, menu })
            })
            .collect();
        tracing::debug!(count = dropdowns.len(), "Attached language dropdowns");

        let this = Arc::new(Self { switcher: switcher.clone(), dropdowns });
        for dropdown in &this.dropdowns {
            let open = dom.has_class(dropdown.menu, OPEN_CLASS);
            this.set_open(dropdown, open);
        }
        let observer: Arc<dyn LocaleObserver> = this.clone();
        switcher.subscribe(Arc::downgrade(&observer));
        this
    }

    fn dom(&self) -> &dyn Dom {
        self.switcher.dom().as_ref()
    }

    /// Whether the dropdown owning `element` is open.
    #[must_use]
    pub fn is_open(&self, element: ElementId) -> bool {
        self.owner_of(element).is_some_and(|d| self.dom().has_class(d.menu, OPEN_CLASS))
    }

    /// Dropdown containing `element`.
    fn owner_of(&self, element: ElementId) -> Option<&Dropdown> {
        self.dropdowns.iter().find(|d| self.dom().contains(d.root, element))
    }

    /// Opens or closes `dropdown` and updates its ARIA state.
    fn set_open(&self, dropdown: &Dropdown, open: bool) {
        let dom = self.dom();
        dom.toggle_class(dropdown.menu, OPEN_CLASS, open);
        dom.set_attribute(dropdown.toggle, "aria-expanded", if open { "true" } else { "false" });
        dom.set_attribute(dropdown.menu, "aria-hidden", if open { "false" } else { "true" });
    }

    /// Handles a click on `toggle`: closes the other dropdowns and flips this
    /// one. Returns the new open state.
    pub fn toggle(&self, toggle: ElementId) -> bool {
        let Some(target) = self.owner_of(toggle).copied() else {
            return false;
        };
        for other in self.dropdowns.iter().filter(|d| d.root != target.root) {
            self.set_open(other, false);
        }
        let open = !self.dom().has_class(target.menu, OPEN_CLASS);
        self.set_open(&target, open);
        open
    }

    /// Handles a click anywhere on the page: closes every dropdown that does
    /// not contain `target`.
    pub fn handle_document_click(&self, target: ElementId) {
        for dropdown in &self.dropdowns {
            if !self.dom().contains(dropdown.root, target) {
                self.set_open(dropdown, false);
            }
        }
    }

    /// Handles a click on a language option: closes its dropdown and asks
    /// the switcher for the option's locale.
    pub async fn select(&self, option: ElementId) -> bool {
        let Some(locale) = self.dom().attribute(option, self.switcher.locale_attribute()) else {
            tracing::debug!(?option, "Language option without locale");
            return false;
        };
        if let Some(dropdown) = self.owner_of(option).copied() {
            self.set_open(&dropdown, false);
        }
        self.switcher.switch_to(&LocaleId::new(locale), false).await
    }

    /// Shows the flag and label of the option for `locale` in every toggle.
    fn render(&self, locale: &LocaleId) {
        let dom = self.dom();
        let locale_attribute = self.switcher.locale_attribute();
        let key_attribute = self.switcher.key_attribute();
        for dropdown in &self.dropdowns {
            let Some(option) = dom.descendants(dropdown.root).into_iter().find(|el| {
                dom.has_class(*el, LANGUAGE_OPTION_CLASS)
                    && dom.attribute(*el, locale_attribute).is_some_and(|l| *locale == l.as_str())
            }) else {
                continue;
            };

            if let (Some(flag), Some(selected)) = (
                dom.first_descendant_with_class(dropdown.toggle, CURRENT_FLAG_CLASS),
                dom.first_descendant_with_tag(option, "img"),
            ) {
                for name in ["src", "alt"] {
                    if let Some(value) = dom.attribute(selected, name) {
                        dom.set_attribute(flag, name, &value);
                    }
                }
            }

            if let (Some(label), Some(text)) = (
                dom.first_descendant_with_tag_and_attribute(dropdown.toggle, "span", key_attribute),
                dom.text_content(option),
            ) {
                dom.set_text_content(label, text.trim());
            }
        }
    }
}

impl LocaleObserver for LanguageDropdowns {
    fn locale_changed(&self, locale: &LocaleId) {
        self.render(locale);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::config::L10nSettings;
    use crate::dom::{
        ElementSnapshot,
        MemoryDom,
        PageSnapshot,
    };
    use crate::l10n::store::MemoryLocaleStore;
    use crate::test_utils::{
        FakeLoader,
        sample_page,
    };

    struct Fixture {
        dom: Arc<MemoryDom>,
        switcher: Arc<LanguageSwitcher>,
        dropdowns: Arc<LanguageDropdowns>,
    }

    fn fixture() -> Fixture {
        let dom = Arc::new(MemoryDom::from_snapshot(sample_page()));
        let switcher = Arc::new(LanguageSwitcher::new(
            dom.clone(),
            Arc::new(FakeLoader::with_site_bundles()),
            Arc::new(MemoryLocaleStore::new()),
            &L10nSettings::default(),
        ));
        let dropdowns = LanguageDropdowns::attach(&switcher);
        Fixture { dom, switcher, dropdowns }
    }

    /// One dropdown whose label carries `label_attribute` and whose menu
    /// starts open.
    fn open_dropdown_page(label_attribute: &str) -> PageSnapshot {
        PageSnapshot::new(
            ElementSnapshot::new("body").child(
                ElementSnapshot::new("div")
                    .class(DROPDOWN_CLASS)
                    .child(
                        ElementSnapshot::new("button")
                            .class(TOGGLE_CLASS)
                            .child(ElementSnapshot::new("span").attr(label_attribute, "nav.current").text("English")),
                    )
                    .child(
                        ElementSnapshot::new("ul").class(MENU_CLASS).class(OPEN_CLASS).child(
                            ElementSnapshot::new("a")
                                .class(LANGUAGE_OPTION_CLASS)
                                .attr("data-lang", "vi")
                                .child(ElementSnapshot::new("span").text(" Tiếng Việt ")),
                        ),
                    ),
            ),
        )
    }

    fn attach_to(page: PageSnapshot, settings: &L10nSettings) -> Fixture {
        let dom = Arc::new(MemoryDom::from_snapshot(page));
        let switcher = Arc::new(LanguageSwitcher::new(
            dom.clone(),
            Arc::new(FakeLoader::with_site_bundles()),
            Arc::new(MemoryLocaleStore::new()),
            settings,
        ));
        let dropdowns = LanguageDropdowns::attach(&switcher);
        Fixture { dom, switcher, dropdowns }
    }

    fn toggles(dom: &MemoryDom) -> Vec<ElementId> {
        dom.elements_with_class(TOGGLE_CLASS)
    }

    fn option(dom: &MemoryDom, dropdown_id: &str, lang: &str) -> ElementId {
        let root = dom.element_by_id(dropdown_id).unwrap();
        dom.descendants(root)
            .into_iter()
            .find(|el| dom.attribute(*el, "data-lang").as_deref() == Some(lang))
            .unwrap()
    }

    #[googletest::test]
    fn attach_discovers_every_dropdown() {
        let f = fixture();

        expect_that!(f.dropdowns.dropdowns.len(), eq(2));
    }

    #[googletest::test]
    fn attach_syncs_aria_state_of_closed_menus() {
        let f = fixture();

        for menu in f.dom.elements_with_class(MENU_CLASS) {
            expect_that!(f.dom.attribute(menu, "aria-hidden"), some(eq("true")));
        }
        for toggle in toggles(&f.dom) {
            expect_that!(f.dom.attribute(toggle, "aria-expanded"), some(eq("false")));
        }
    }

    #[googletest::test]
    fn attach_syncs_aria_state_of_open_menus() {
        let f = attach_to(open_dropdown_page("data-i18n"), &L10nSettings::default());
        let toggle = toggles(&f.dom)[0];
        let menu = f.dom.elements_with_class(MENU_CLASS)[0];

        expect_that!(f.dropdowns.is_open(toggle), eq(true));
        expect_that!(f.dom.attribute(menu, "aria-hidden"), some(eq("false")));
        expect_that!(f.dom.attribute(toggle, "aria-expanded"), some(eq("true")));
    }

    #[googletest::test]
    fn toggle_opens_one_and_closes_the_others() {
        let f = fixture();
        let all = toggles(&f.dom);
        let (desktop, mobile) = (all[0], all[1]);

        expect_that!(f.dropdowns.toggle(desktop), eq(true));
        expect_that!(f.dom.attribute(desktop, "aria-expanded"), some(eq("true")));

        expect_that!(f.dropdowns.toggle(mobile), eq(true));
        expect_that!(f.dropdowns.is_open(desktop), eq(false));
        expect_that!(f.dom.attribute(desktop, "aria-expanded"), some(eq("false")));
        expect_that!(f.dropdowns.is_open(mobile), eq(true));

        expect_that!(f.dropdowns.toggle(mobile), eq(false));
        expect_that!(f.dropdowns.is_open(mobile), eq(false));
    }

    #[googletest::test]
    fn outside_click_closes_open_dropdown() {
        let f = fixture();
        let desktop = toggles(&f.dom)[0];
        f.dropdowns.toggle(desktop);

        f.dropdowns.handle_document_click(desktop);
        expect_that!(f.dropdowns.is_open(desktop), eq(true));

        f.dropdowns.handle_document_click(f.dom.element_by_id("hero-title").unwrap());
        expect_that!(f.dropdowns.is_open(desktop), eq(false));
    }

    #[tokio::test]
    async fn select_switches_and_renders_every_dropdown() {
        let f = fixture();
        let desktop = toggles(&f.dom)[0];
        f.dropdowns.toggle(desktop);

        assert!(f.dropdowns.select(option(&f.dom, "desktop-language", "vi")).await);

        assert!(!f.dropdowns.is_open(desktop));
        assert_eq!(f.switcher.current_locale(), Some(LocaleId::new("vi")));
        for toggle in toggles(&f.dom) {
            let flag = f.dom.first_descendant_with_class(toggle, CURRENT_FLAG_CLASS).unwrap();
            assert_eq!(f.dom.attribute(flag, "src").as_deref(), Some("/img/flags/vn.svg"));
            assert_eq!(f.dom.attribute(flag, "alt").as_deref(), Some("Tiếng Việt"));
            let label = f.dom.first_descendant_with_tag(toggle, "span").unwrap();
            assert_eq!(f.dom.text_content(label).as_deref(), Some("Tiếng Việt"));
        }
    }

    #[tokio::test]
    async fn renders_after_switches_from_other_callers() {
        let f = fixture();

        assert!(f.switcher.switch_to(&LocaleId::new("vi"), true).await);
        assert!(f.switcher.switch_to(&LocaleId::new("en"), false).await);

        let mobile = toggles(&f.dom)[1];
        let flag = f.dom.first_descendant_with_class(mobile, CURRENT_FLAG_CLASS).unwrap();
        assert_eq!(f.dom.attribute(flag, "src").as_deref(), Some("/img/flags/gb.svg"));
    }

    #[tokio::test]
    async fn failed_selection_keeps_previous_rendering() {
        let f = fixture();
        assert!(f.switcher.switch_to(&LocaleId::new("vi"), false).await);
        let menu = f.dom.elements_with_class(MENU_CLASS)[0];
        let bogus = f
            .dom
            .append_child(menu, ElementSnapshot::new("a").class(LANGUAGE_OPTION_CLASS).attr("data-lang", "xx"))
            .unwrap();

        assert!(!f.dropdowns.select(bogus).await);

        let flag = f.dom.elements_with_class(CURRENT_FLAG_CLASS)[0];
        assert_eq!(f.dom.attribute(flag, "src").as_deref(), Some("/img/flags/vn.svg"));
    }

    #[tokio::test]
    async fn label_follows_configured_key_attribute() {
        let settings = L10nSettings { key_attribute: "data-t".to_string(), ..L10nSettings::default() };
        let f = attach_to(open_dropdown_page("data-t"), &settings);

        assert!(f.switcher.switch_to(&LocaleId::new("vi"), false).await);

        let label = f.dom.first_descendant_with_tag(toggles(&f.dom)[0], "span").unwrap();
        assert_eq!(f.dom.text_content(label).as_deref(), Some("Tiếng Việt"));
    }
}
