//! In-memory [`Dom`] backed by an element arena.

use std::collections::BTreeMap;
use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    Dom,
    ElementId,
};

/// Serializable page: document-level state plus the element tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub root: ElementSnapshot,
}

const fn default_visible() -> bool {
    true
}

impl PageSnapshot {
    #[must_use]
    pub const fn new(root: ElementSnapshot) -> Self {
        Self { lang: None, visible: true, root }
    }
}

/// One element of a [`PageSnapshot`].
///
/// `class` is kept out of `attributes` and stored as a list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSnapshot>,
}

impl ElementSnapshot {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_ascii_lowercase(), ..Self::default() }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// Arena slot for one element. Slots are never freed.
#[derive(Debug, Default)]
struct Node {
    /// Lower-case tag name
    tag: String,
    /// Attributes other than `class`
    attributes: BTreeMap<String, String>,
    /// Class list, in insertion order
    classes: Vec<String>,
    /// Own text, rendered before the children
    text: Option<String>,
    /// Form-control value
    value: Option<String>,
    /// `None` for the root and for detached elements
    parent: Option<ElementId>,
    /// Attached children, in document order
    children: Vec<ElementId>,
}

/// Document state guarded by the [`MemoryDom`] lock.
#[derive(Debug)]
struct Inner {
    /// Arena indexed by [`ElementId`]
    nodes: Vec<Node>,
    /// Document root
    root: ElementId,
    /// Document language
    lang: Option<String>,
    /// Whether content is shown
    visible: bool,
}

impl Inner {
    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0)
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(element.0)
    }

    fn insert(&mut self, snapshot: ElementSnapshot, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            tag: snapshot.tag.to_ascii_lowercase(),
            attributes: snapshot.attributes,
            classes: snapshot.classes,
            text: snapshot.text,
            value: snapshot.value,
            parent,
            children: Vec::new(),
        });
        let children: Vec<ElementId> =
            snapshot.children.into_iter().map(|child| self.insert(child, Some(id))).collect();
        if let Some(node) = self.node_mut(id) {
            node.children = children;
        }
        id
    }

    /// Preorder walk starting at `from`, inclusive.
    fn walk(&self, from: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(el) = stack.pop() {
            let Some(node) = self.node(el) else {
                continue;
            };
            order.push(el);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Attached elements satisfying `predicate`, in document order.
    fn attached_matching(&self, predicate: impl Fn(&Node) -> bool) -> Vec<ElementId> {
        self.walk(self.root)
            .into_iter()
            .filter(|el| self.node(*el).is_some_and(&predicate))
            .collect()
    }

    /// Appends the text of `element` and its descendants to `out`.
    fn collect_text(&self, element: ElementId, out: &mut String) {
        let Some(node) = self.node(element) else {
            return;
        };
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Serializable copy of the subtree under `element`.
    fn snapshot(&self, element: ElementId) -> ElementSnapshot {
        let Some(node) = self.node(element) else {
            return ElementSnapshot::default();
        };
        ElementSnapshot {
            tag: node.tag.clone(),
            attributes: node.attributes.clone(),
            classes: node.classes.clone(),
            text: node.text.clone(),
            value: node.value.clone(),
            children: node.children.iter().map(|child| self.snapshot(*child)).collect(),
        }
    }
}

/// Thread-safe in-memory document.
#[derive(Debug)]
pub struct MemoryDom {
    /// Whole document behind one lock
    inner: Mutex<Inner>,
}

impl MemoryDom {
    #[must_use]
    pub fn from_snapshot(page: PageSnapshot) -> Self {
        let mut inner =
            Inner { nodes: Vec::new(), root: ElementId(0), lang: page.lang, visible: page.visible };
        inner.root = inner.insert(page.root, None);
        Self { inner: Mutex::new(inner) }
    }

    /// Root element of the document tree.
    #[must_use]
    pub fn root(&self) -> ElementId {
        self.lock().root
    }

    /// Appends a new subtree under `parent` and returns its root handle.
    pub fn append_child(&self, parent: ElementId, child: ElementSnapshot) -> Option<ElementId> {
        let mut inner = self.lock();
        inner.node(parent)?;
        let id = inner.insert(child, Some(parent));
        if let Some(node) = inner.node_mut(parent) {
            node.children.push(id);
        }
        Some(id)
    }

    #[must_use]
    pub fn to_snapshot(&self) -> PageSnapshot {
        let inner = self.lock();
        PageSnapshot { lang: inner.lang.clone(), visible: inner.visible, root: inner.snapshot(inner.root) }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_node_mut(&self, element: ElementId, f: impl FnOnce(&mut Node)) {
        if let Some(node) = self.lock().node_mut(element) {
            f(node);
        }
    }
}

impl Dom for MemoryDom {
    fn elements_with_attribute(&self, name: &str) -> Vec<ElementId> {
        self.lock().attached_matching(|node| node.attributes.contains_key(name))
    }

    fn elements_with_class(&self, class: &str) -> Vec<ElementId> {
        self.lock().attached_matching(|node| node.classes.iter().any(|c| c == class))
    }

    fn elements_with_tag(&self, tag: &str) -> Vec<ElementId> {
        self.lock().attached_matching(|node| node.tag.eq_ignore_ascii_case(tag))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.lock()
            .attached_matching(|node| node.attributes.get("id").is_some_and(|v| v == id))
            .into_iter()
            .next()
    }

    fn tag_name(&self, element: ElementId) -> Option<String> {
        self.lock().node(element).map(|node| node.tag.to_ascii_uppercase())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let inner = self.lock();
        let node = inner.node(element)?;
        if name == "class" {
            return (!node.classes.is_empty()).then(|| node.classes.join(" "));
        }
        node.attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        self.with_node_mut(element, |node| {
            if name == "class" {
                node.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                node.attributes.insert(name.to_string(), value.to_string());
            }
        });
    }

    fn text_content(&self, element: ElementId) -> Option<String> {
        let inner = self.lock();
        inner.node(element)?;
        let mut out = String::new();
        inner.collect_text(element, &mut out);
        Some(out)
    }

    fn set_text_content(&self, element: ElementId, text: &str) {
        let mut inner = self.lock();
        let detached = match inner.node_mut(element) {
            Some(node) => {
                node.text = Some(text.to_string());
                std::mem::take(&mut node.children)
            }
            None => return,
        };
        for child in detached {
            if let Some(node) = inner.node_mut(child) {
                node.parent = None;
            }
        }
    }

    fn value(&self, element: ElementId) -> Option<String> {
        self.lock().node(element).and_then(|node| node.value.clone())
    }

    fn set_value(&self, element: ElementId, value: &str) {
        self.with_node_mut(element, |node| node.value = Some(value.to_string()));
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.lock().node(element).is_some_and(|node| node.classes.iter().any(|c| c == class))
    }

    fn toggle_class(&self, element: ElementId, class: &str, on: bool) {
        self.with_node_mut(element, |node| {
            let present = node.classes.iter().any(|c| c == class);
            if on && !present {
                node.classes.push(class.to_string());
            } else if !on && present {
                node.classes.retain(|c| c != class);
            }
        });
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.lock().node(element).and_then(|node| node.parent)
    }

    fn descendants(&self, element: ElementId) -> Vec<ElementId> {
        self.lock().walk(element).into_iter().skip(1).collect()
    }

    fn set_document_lang(&self, lang: &str) {
        self.lock().lang = Some(lang.to_string());
    }

    fn document_lang(&self) -> Option<String> {
        self.lock().lang.clone()
    }

    fn set_document_visible(&self, visible: bool) {
        self.lock().visible = visible;
    }

    fn document_visible(&self) -> bool {
        self.lock().visible
    }
}
