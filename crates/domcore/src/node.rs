//! The node graph: the common base carried by every tree entry.
//!
//! A [`Node`] is a cheap, `Clone`-is-`acquire` handle around a reference
//! counted [`NodeInner`]. The owning edge from a parent to a child is the
//! `Rc` held in `first_child` (for the first child) or in the previous
//! sibling's `next_sibling` (for every other child); `parent`,
//! `previous_sibling`, `last_child`, and `owner_document` are all `Weak`,
//! so the tree can never form an `Rc` cycle and a detached subtree is
//! freed node-by-node the instant its last external handle drops.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use crate::attr::AttrData;
use crate::character_data::{CharacterDataPayload, DocumentTypeData, ProcessingInstructionData};
use crate::document::DocumentData;
use crate::element::ElementData;
use crate::event_target::EventTargetData;
use crate::flags::NodeFlags;

/// `DOM_ELEMENT_NODE`
pub const ELEMENT_NODE: u16 = 1;
/// `DOM_ATTRIBUTE_NODE`
pub const ATTRIBUTE_NODE: u16 = 2;
/// `DOM_TEXT_NODE`
pub const TEXT_NODE: u16 = 3;
/// `DOM_CDATA_SECTION_NODE`
pub const CDATA_SECTION_NODE: u16 = 4;
/// `DOM_PROCESSING_INSTRUCTION_NODE`
pub const PROCESSING_INSTRUCTION_NODE: u16 = 7;
/// `DOM_COMMENT_NODE`
pub const COMMENT_NODE: u16 = 8;
/// `DOM_DOCUMENT_NODE`
pub const DOCUMENT_NODE: u16 = 9;
/// `DOM_DOCUMENT_TYPE_NODE`
pub const DOCUMENT_TYPE_NODE: u16 = 10;
/// `DOM_DOCUMENT_FRAGMENT_NODE`
pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;
/// `DOM_SHADOW_ROOT_NODE`
pub const SHADOW_ROOT_NODE: u16 = 12;

/// An empty `DocumentFragment` payload. A `ShadowRoot` is modeled as its
/// own [`NodePayload`] variant rather than a flavor of fragment, since it
/// additionally carries a host backreference and a mode.
#[derive(Debug, Default)]
pub struct DocumentFragmentData;

/// A shadow root: a `DocumentFragment` attached to an element as its
/// shadow tree.
///
/// [§ 4.8 Shadow trees](https://dom.spec.whatwg.org/#shadow-trees)
#[derive(Debug)]
pub struct ShadowRootData {
    /// The element this shadow root is attached to.
    pub host: WeakNode,
    /// `MODE_OPEN` (0) or `MODE_CLOSED` (1).
    pub mode: ShadowRootMode,
}

/// Shadow root mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    /// `MODE_OPEN`
    Open,
    /// `MODE_CLOSED`
    Closed,
}

/// The kind-specific payload of a node. The discriminant of this enum
/// *is* the node's kind — there is deliberately no separately stored
/// `NodeKind` enum that could desync from it.
pub enum NodePayload {
    /// `#document`
    Document(DocumentData),
    /// `#document-fragment`
    DocumentFragment(DocumentFragmentData),
    /// `DocumentType`
    DocumentType(DocumentTypeData),
    /// `Element`
    Element(ElementData),
    /// `#text`
    Text(CharacterDataPayload),
    /// `#comment`
    Comment(CharacterDataPayload),
    /// `#cdata-section`
    CDataSection(CharacterDataPayload),
    /// `ProcessingInstruction`
    ProcessingInstruction(ProcessingInstructionData),
    /// `Attr`
    Attr(AttrData),
    /// `ShadowRoot`
    ShadowRoot(ShadowRootData),
}

impl NodePayload {
    /// The numeric `nodeType`.
    #[must_use]
    pub fn node_type(&self) -> u16 {
        match self {
            Self::Document(_) => DOCUMENT_NODE,
            Self::DocumentFragment(_) => DOCUMENT_FRAGMENT_NODE,
            Self::DocumentType(_) => DOCUMENT_TYPE_NODE,
            Self::Element(_) => ELEMENT_NODE,
            Self::Text(_) => TEXT_NODE,
            Self::Comment(_) => COMMENT_NODE,
            Self::CDataSection(_) => CDATA_SECTION_NODE,
            Self::ProcessingInstruction(_) => PROCESSING_INSTRUCTION_NODE,
            Self::Attr(_) => ATTRIBUTE_NODE,
            Self::ShadowRoot(_) => SHADOW_ROOT_NODE,
        }
    }
}

/// The shared inner state of a node. Never touched directly outside this
/// crate; accessed through [`Node`]'s borrow helpers.
pub struct NodeInner {
    pub(crate) parent: Option<WeakNode>,
    pub(crate) first_child: Option<Node>,
    pub(crate) last_child: Option<WeakNode>,
    pub(crate) previous_sibling: Option<WeakNode>,
    pub(crate) next_sibling: Option<Node>,
    pub(crate) owner_document: Option<WeakNode>,
    pub(crate) flags: NodeFlags,
    pub(crate) payload: NodePayload,
    pub(crate) event_target: EventTargetData,
    pub(crate) observers: Vec<crate::mutation_observer::ObserverRegistration>,
}

impl NodeInner {
    pub(crate) fn new(payload: NodePayload, owner_document: Option<WeakNode>) -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            previous_sibling: None,
            next_sibling: None,
            owner_document,
            flags: NodeFlags::empty(),
            payload,
            event_target: EventTargetData::default(),
            observers: Vec::new(),
        }
    }
}

/// A strong, reference-counted handle to a node.
///
/// [`Clone`] is `acquire`; dropping the last clone is `release`. The free
/// functions [`acquire`] and [`release`] exist alongside `Clone`/`Drop` so
/// C-ABI bindings have an explicit, nameable pair of operations to call
/// across the FFI boundary.
#[derive(Clone)]
pub struct Node(pub(crate) Rc<RefCell<NodeInner>>);

/// A non-owning handle to a node, used for parent/previous-sibling/
/// last-child/owner-document back-references so the tree never forms an
/// `Rc` cycle.
#[derive(Clone)]
pub struct WeakNode(pub(crate) Weak<RefCell<NodeInner>>);

impl WeakNode {
    /// Resolve to a strong handle, if the node is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

/// `acquire(node)` — increment the node's strong reference count.
#[must_use]
pub fn acquire(node: &Node) -> Node {
    node.clone()
}

/// `release(node)` — decrement the node's strong reference count,
/// destroying it (and releasing its children in reverse document order)
/// once it reaches zero.
pub fn release(node: Node) {
    drop(node);
}

impl Node {
    pub(crate) fn from_inner(inner: NodeInner) -> Self {
        Self(Rc::new(RefCell::new(inner)))
    }

    pub(crate) fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    pub(crate) fn borrow(&self) -> Ref<'_, NodeInner> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, NodeInner> {
        self.0.borrow_mut()
    }

    /// Current strong reference count.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Identity comparison ("is the same underlying node"), used by
    /// [`Node::is_same_node`] and by tree algorithms that must distinguish
    /// object identity from structural equality.
    #[must_use]
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// [§ 4.4 nodeType](https://dom.spec.whatwg.org/#dom-node-nodetype)
    #[must_use]
    pub fn node_type(&self) -> u16 {
        self.borrow().payload.node_type()
    }

    /// The node's parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Node> {
        self.borrow().parent.as_ref().and_then(WeakNode::upgrade)
    }

    /// The node's first child, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<Node> {
        self.borrow().first_child.clone()
    }

    /// The node's last child, if any.
    #[must_use]
    pub fn last_child(&self) -> Option<Node> {
        self.borrow().last_child.as_ref().and_then(WeakNode::upgrade)
    }

    /// The node's previous sibling, if any.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<Node> {
        self.borrow()
            .previous_sibling
            .as_ref()
            .and_then(WeakNode::upgrade)
    }

    /// The node's next sibling, if any.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node> {
        self.borrow().next_sibling.clone()
    }

    /// The document that minted this node.
    #[must_use]
    pub fn owner_document(&self) -> Option<Node> {
        self.borrow()
            .owner_document
            .as_ref()
            .and_then(WeakNode::upgrade)
    }

    pub(crate) fn set_owner_document(&self, doc: Option<WeakNode>) {
        self.borrow_mut().owner_document = doc;
    }

    /// Whether the node is attached beneath a document (possibly via a
    /// shadow tree).
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.borrow().flags.contains(NodeFlags::IS_CONNECTED)
    }

    pub(crate) fn set_flag(&self, flag: NodeFlags, value: bool) {
        self.borrow_mut().flags.set(flag, value);
    }

    pub(crate) fn has_flag(&self, flag: NodeFlags) -> bool {
        self.borrow().flags.contains(flag)
    }

    /// An iterator over this node's children, in tree order.
    #[must_use]
    pub fn children(&self) -> ChildNodes {
        ChildNodes {
            next: self.first_child(),
        }
    }

    /// An iterator over this node's inclusive ancestors, starting with
    /// the node itself.
    #[must_use]
    pub fn inclusive_ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// An iterator over this node's strict ancestors.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: self.parent() }
    }

    /// Whether `self` is an inclusive ancestor of `other`.
    #[must_use]
    pub fn is_inclusive_ancestor_of(&self, other: &Node) -> bool {
        other.inclusive_ancestors().any(|n| n.ptr_eq(self))
    }

    /// Whether `self` is a (strict) ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Node) -> bool {
        other.ancestors().any(|n| n.ptr_eq(self))
    }

    /// Whether `self` is a descendant of `other`.
    #[must_use]
    pub fn is_descendant_of(&self, other: &Node) -> bool {
        other.is_ancestor_of(self)
    }

    /// Preorder depth-first traversal, starting with `self`, visiting
    /// children in sibling order (tree order).
    #[must_use]
    pub fn tree_order_descendants(&self) -> TreeOrder {
        TreeOrder {
            root: self.clone(),
            current: None,
        }
    }

    /// Depth of this node (number of strict ancestors). Used by the
    /// `max_tree_depth` quota check.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// [`isSameNode`](https://dom.spec.whatwg.org/#dom-node-issamenode)
    /// (legacy, but still useful for identity comparisons that should not
    /// be confused with structural equality).
    #[must_use]
    pub fn is_same_node(&self, other: &Node) -> bool {
        self.ptr_eq(other)
    }

    /// [`nodeName`](https://dom.spec.whatwg.org/#dom-node-nodename), per
    /// the per-kind table in the data model: the element's qualified
    /// name, a fixed `#`-prefixed token for the structural kinds, the
    /// processing instruction's target, the doctype's name, or the
    /// attribute's qualified name.
    #[must_use]
    pub fn node_name(&self) -> String {
        let inner = self.borrow();
        match &inner.payload {
            NodePayload::Document(_) => "#document".to_string(),
            NodePayload::DocumentFragment(_) => "#document-fragment".to_string(),
            NodePayload::DocumentType(d) => d.name.as_str().to_string(),
            NodePayload::Element(e) => e.qualified_name(),
            NodePayload::Text(_) => "#text".to_string(),
            NodePayload::Comment(_) => "#comment".to_string(),
            NodePayload::CDataSection(_) => "#cdata-section".to_string(),
            NodePayload::ProcessingInstruction(pi) => pi.target.as_str().to_string(),
            NodePayload::Attr(a) => a.qualified_name(),
            NodePayload::ShadowRoot(_) => "#shadow-root".to_string(),
        }
    }

    /// [`nodeValue`](https://dom.spec.whatwg.org/#dom-node-nodevalue)
    /// getter: `None` for every kind but `CharacterData` and `Attr`.
    #[must_use]
    pub fn node_value(&self) -> Option<String> {
        match &self.borrow().payload {
            NodePayload::Text(d) | NodePayload::Comment(d) | NodePayload::CDataSection(d) => {
                Some(d.data.clone())
            }
            NodePayload::ProcessingInstruction(pi) => Some(pi.data.clone()),
            NodePayload::Attr(a) => Some(a.value.clone()),
            _ => None,
        }
    }

    /// `nodeValue` setter: equivalent to replacing `CharacterData.data` or
    /// `Attr.value`; a no-op on every other kind.
    pub fn set_node_value(&self, value: &str) {
        let is_character_data = matches!(
            self.borrow().payload,
            NodePayload::Text(_) | NodePayload::Comment(_) | NodePayload::CDataSection(_)
        );
        if is_character_data {
            let _ = self.set_character_data(value);
            return;
        }
        if matches!(self.borrow().payload, NodePayload::Attr(_)) {
            self.set_attr_value(value);
        }
    }

    /// [`textContent`](https://dom.spec.whatwg.org/#dom-node-textcontent)
    /// getter: the concatenation of every descendant `Text` node's data,
    /// in tree order, for `Document`/`DocumentFragment`/`Element`; the
    /// node's own data for `CharacterData`; `null` otherwise.
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        match self.node_type() {
            TEXT_NODE | CDATA_SECTION_NODE | COMMENT_NODE | PROCESSING_INSTRUCTION_NODE => {
                self.node_value()
            }
            DOCUMENT_NODE | DOCUMENT_FRAGMENT_NODE | ELEMENT_NODE => Some(
                self.tree_order_descendants()
                    .filter(|n| n.node_type() == TEXT_NODE)
                    .filter_map(|n| n.node_value())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// `textContent = value` setter on an element or fragment: removes
    /// every child, then (if `value` is non-empty) appends a single
    /// `Text` node holding it.
    ///
    /// # Errors
    /// Propagates [`crate::error::DomException`] from the underlying
    /// child removal/insertion, and returns
    /// [`crate::error::DomException::InvalidState`] if this node has no
    /// owner document to mint the replacement text node from.
    pub fn set_text_content(&self, value: &str) -> crate::error::DomResult<()> {
        if matches!(
            self.borrow().payload,
            NodePayload::Text(_) | NodePayload::Comment(_) | NodePayload::CDataSection(_)
        ) {
            return self.set_character_data(value);
        }
        for child in self.children().collect::<Vec<_>>() {
            let _ = crate::tree::remove_child(self, &child)?;
        }
        if !value.is_empty() {
            let owner = self.owner_document().unwrap_or_else(|| self.clone());
            let doc = crate::document::Document::from_node(owner);
            let text = doc.create_text_node(value)?;
            let _ = crate::tree::append_child(self, &text)?;
        }
        Ok(())
    }
}

/// Iterator over a node's direct children, in tree order.
pub struct ChildNodes {
    next: Option<Node>,
}

impl Iterator for ChildNodes {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let current = self.next.take()?;
        self.next = current.next_sibling();
        Some(current)
    }
}

/// Iterator walking from a node up through its ancestors to the root.
pub struct Ancestors {
    next: Option<Node>,
}

impl Iterator for Ancestors {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Preorder depth-first iterator over a node's descendants (excludes the
/// root itself).
pub struct TreeOrder {
    root: Node,
    current: Option<Node>,
}

impl Iterator for TreeOrder {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let current = match self.current.take() {
            None => self.root.first_child()?,
            Some(node) => {
                if let Some(child) = node.first_child() {
                    child
                } else {
                    let mut climb = node.clone();
                    loop {
                        if let Some(sibling) = climb.next_sibling() {
                            break sibling;
                        }
                        let parent = climb.parent()?;
                        if parent.ptr_eq(&self.root) {
                            return None;
                        }
                        climb = parent;
                    }
                }
            }
        };
        self.current = Some(current.clone());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;

    #[test]
    fn tree_order_visits_preorder_depth_first() {
        let doc = Document::new(None);
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        let c = doc.create_element("c").unwrap();
        crate::tree::append_child(doc.node(), &a).unwrap();
        crate::tree::append_child(&a, &b).unwrap();
        crate::tree::append_child(doc.node(), &c).unwrap();

        let order: Vec<u16> = doc
            .node()
            .tree_order_descendants()
            .map(|n| n.node_type())
            .collect();
        assert_eq!(order.len(), 3);
        assert!(a.ptr_eq(&doc.node().first_child().unwrap()));
        assert!(b.ptr_eq(&a.first_child().unwrap()));
        assert!(c.ptr_eq(&a.next_sibling().unwrap()));
    }

    #[test]
    fn acquire_and_release_track_refcount() {
        let doc = Document::new(None);
        let a = doc.create_element("a").unwrap();
        let base = a.ref_count();
        let extra = super::acquire(&a);
        assert_eq!(a.ref_count(), base + 1);
        super::release(extra);
        assert_eq!(a.ref_count(), base);
    }

    #[test]
    fn node_name_follows_the_per_kind_table() {
        let doc = Document::new(None);
        let el = doc.create_element("p").unwrap();
        let text = doc.create_text_node("hi").unwrap();
        let comment = doc.create_comment("note").unwrap();
        assert_eq!(el.node_name(), "p");
        assert_eq!(text.node_name(), "#text");
        assert_eq!(comment.node_name(), "#comment");
        assert_eq!(doc.node().node_name(), "#document");
    }

    #[test]
    fn text_content_concatenates_descendant_text_in_tree_order() {
        let doc = Document::new(None);
        let parent = doc.create_element("div").unwrap();
        crate::tree::append_child(doc.node(), &parent).unwrap();
        let child = doc.create_element("span").unwrap();
        crate::tree::append_child(&parent, &child).unwrap();
        let t1 = doc.create_text_node("Hello ").unwrap();
        let t2 = doc.create_text_node("World").unwrap();
        crate::tree::append_child(&parent, &t1).unwrap();
        crate::tree::append_child(&child, &t2).unwrap();

        assert_eq!(parent.text_content().as_deref(), Some("World Hello "));
    }

    #[test]
    fn set_text_content_replaces_all_children_with_one_text_node() {
        let doc = Document::new(None);
        let parent = doc.create_element("div").unwrap();
        crate::tree::append_child(doc.node(), &parent).unwrap();
        let child = doc.create_element("span").unwrap();
        crate::tree::append_child(&parent, &child).unwrap();

        parent.set_text_content("replaced").unwrap();
        assert_eq!(parent.children().count(), 1);
        assert_eq!(parent.text_content().as_deref(), Some("replaced"));

        parent.set_text_content("").unwrap();
        assert_eq!(parent.children().count(), 0);
    }
}
