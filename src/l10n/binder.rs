//! Writes bundle strings into the elements marked with a translation key.

use crate::dom::{
    Dom,
    ElementId,
};
use crate::l10n::bundle::TranslationBundle;

/// How a bound element receives its translated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    /// Replaces the element's text
    TextContent,
    /// Sets the form control's value
    InputValue,
    /// Sets the `placeholder` attribute
    InputPlaceholder,
}

impl ElementRole {
    /// Decides the role from the element's tag and attributes.
    ///
    /// `INPUT` with a `placeholder` attribute gets the placeholder, other
    /// `INPUT` and `TEXTAREA` elements get their value, everything else its
    /// text content.
    #[must_use]
    pub fn classify(dom: &dyn Dom, element: ElementId) -> Self {
        match dom.tag_name(element).as_deref() {
            Some("INPUT") if dom.has_attribute(element, "placeholder") => Self::InputPlaceholder,
            Some("INPUT" | "TEXTAREA") => Self::InputValue,
            _ => Self::TextContent,
        }
    }
}

/// An element captured at construction together with its key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundElement {
    /// The marked element
    pub element: ElementId,
    /// Value of the key attribute at capture time
    pub key_path: String,
    /// How the translation is written
    pub role: ElementRole,
}

/// Outcome of one [`ContentBinder::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Elements that received a translation
    pub applied: usize,
    /// Key paths that did not resolve to a string; their elements are untouched.
    pub missing: Vec<String>,
}

/// The bound element set, captured once.
///
/// Elements added to the document after [`ContentBinder::capture`] are never
/// translated.
#[derive(Debug, Clone)]
pub struct ContentBinder {
    /// Captured elements, in document order
    elements: Vec<BoundElement>,
    /// Key path separator
    separator: String,
}

impl ContentBinder {
    #[must_use]
    pub fn capture(dom: &dyn Dom, key_attribute: &str, separator: &str) -> Self {
        let elements: Vec<BoundElement> = dom
            .elements_with_attribute(key_attribute)
            .into_iter()
            .filter_map(|element| {
                let key_path = dom.attribute(element, key_attribute)?;
                Some(BoundElement { element, key_path, role: ElementRole::classify(dom, element) })
            })
            .collect();
        tracing::debug!(count = elements.len(), attribute = key_attribute, "Captured bound elements");
        Self { elements, separator: separator.to_string() }
    }

    #[must_use]
    pub fn elements(&self) -> &[BoundElement] {
        &self.elements
    }

    /// Writes every resolvable key into its element.
    pub fn apply(&self, dom: &dyn Dom, bundle: &TranslationBundle) -> BindReport {
        let mut report = BindReport::default();
        for bound in &self.elements {
            let Some(text) = bundle.resolve(&bound.key_path, &self.separator) else {
                tracing::trace!(key = %bound.key_path, locale = %bundle.locale(), "Missing translation");
                report.missing.push(bound.key_path.clone());
                continue;
            };
            match bound.role {
                ElementRole::TextContent => dom.set_text_content(bound.element, text),
                ElementRole::InputValue => dom.set_value(bound.element, text),
                ElementRole::InputPlaceholder => dom.set_attribute(bound.element, "placeholder", text),
            }
            report.applied += 1;
        }
        if !report.missing.is_empty() {
            tracing::debug!(
                locale = %bundle.locale(),
                missing = report.missing.len(),
                "Some bound keys have no translation"
            );
        }
        report
    }
}
