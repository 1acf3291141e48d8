//! Document access used by the localization subsystem and the UI components.
//!
//! Everything the subsystem does to a page goes through [`Dom`], so the same
//! code drives an in-memory page in tests and in the pre-render binary.

/// In-memory document tree
mod memory;

pub use memory::{
    ElementSnapshot,
    MemoryDom,
    PageSnapshot,
};

/// Handle to an element of a [`Dom`].
///
/// Handles stay valid for the lifetime of the document, even after the
/// element has been detached from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// Minimal document surface.
///
/// Mutating methods take `&self`; implementations handle interior mutability.
/// Operations on unknown handles are no-ops and getters return `None`.
pub trait Dom: Send + Sync {
    /// Attached elements carrying attribute `name`, in document order.
    fn elements_with_attribute(&self, name: &str) -> Vec<ElementId>;

    /// Attached elements carrying CSS class `class`, in document order.
    fn elements_with_class(&self, class: &str) -> Vec<ElementId>;

    /// Attached elements with the given tag name (case-insensitive).
    fn elements_with_tag(&self, tag: &str) -> Vec<ElementId>;

    /// Element whose `id` attribute equals `id`.
    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    /// Upper-case tag name, as browsers report it.
    fn tag_name(&self, element: ElementId) -> Option<String>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&self, element: ElementId, name: &str, value: &str);

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, element: ElementId) -> Option<String>;

    /// Replaces the element's children with a single text node.
    fn set_text_content(&self, element: ElementId, text: &str);

    /// Current value of a form control.
    fn value(&self, element: ElementId) -> Option<String>;

    fn set_value(&self, element: ElementId, value: &str);

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    /// Adds `class` when `on` is true, removes it otherwise.
    fn toggle_class(&self, element: ElementId, class: &str, on: bool);

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Descendants of `element` in document order, excluding `element`.
    fn descendants(&self, element: ElementId) -> Vec<ElementId>;

    /// Sets the `lang` attribute of the document element.
    fn set_document_lang(&self, lang: &str);

    fn document_lang(&self) -> Option<String>;

    /// Shows or hides the whole document.
    fn set_document_visible(&self, visible: bool);

    fn document_visible(&self) -> bool;

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    /// Whether `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(el) = current {
            if el == ancestor {
                return true;
            }
            current = self.parent(el);
        }
        false
    }

    /// First descendant carrying `class`, in document order.
    fn first_descendant_with_class(&self, element: ElementId, class: &str) -> Option<ElementId> {
        self.descendants(element).into_iter().find(|el| self.has_class(*el, class))
    }

    /// First descendant with tag name `tag` (case-insensitive).
    fn first_descendant_with_tag(&self, element: ElementId, tag: &str) -> Option<ElementId> {
        self.descendants(element).into_iter().find(|el| {
            self.tag_name(*el).is_some_and(|name| name.eq_ignore_ascii_case(tag))
        })
    }

    /// First descendant matching `tag[attribute]`.
    fn first_descendant_with_tag_and_attribute(
        &self,
        element: ElementId,
        tag: &str,
        attribute: &str,
    ) -> Option<ElementId> {
        self.descendants(element).into_iter().find(|el| {
            self.tag_name(*el).is_some_and(|name| name.eq_ignore_ascii_case(tag))
                && self.has_attribute(*el, attribute)
        })
    }
}
