//! `Document` node payload, construction entry points, and the engine's
//! configurable resource quotas.
//!
//! [`Document`](https://dom.spec.whatwg.org/#interface-document)

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::attr::AttrData;
use crate::character_data::{CharacterDataPayload, DocumentTypeData, ProcessingInstructionData};
use crate::class_bloom::ClassBloom;
use crate::element::{validate_name, ElementData};
use crate::error::{DomException, DomResult};
use crate::interner::{Atom, Interner};
use crate::node::{DocumentFragmentData, Node, NodeInner, NodePayload};

/// Resource quotas enforced while building a document's tree. Exceeding
/// one returns [`DomException::QuotaExceeded`] rather than letting the
/// engine grow without bound inside a long-lived embedding host.
#[derive(Debug, Clone, Copy)]
pub struct DocumentConfig {
    /// Maximum depth of the tree rooted at the document (the document
    /// itself is depth 0).
    pub max_tree_depth: usize,
    /// Maximum number of live nodes a single document may own.
    pub max_ref_count: usize,
    /// Maximum length, in bytes, of an attribute's qualified name.
    pub max_attribute_name_length: usize,
    /// Maximum number of attributes a single element may carry.
    pub max_attribute_count_per_element: usize,
    /// Maximum listeners a single `EventTarget` may accumulate.
    pub max_listeners_per_target: usize,
    /// Maximum length, in bytes, of a single attribute value or character
    /// data payload.
    pub max_text_len: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: 1000,
            max_ref_count: 1_000_000,
            max_attribute_name_length: 10_000,
            max_attribute_count_per_element: 10_000,
            max_listeners_per_target: 10_000,
            max_text_len: 16 * 1024 * 1024,
        }
    }
}

/// A `Document` node's data: its string interner and its resource quotas.
pub struct DocumentData {
    pub(crate) interner: Interner,
    pub config: DocumentConfig,
    pub(crate) node_count: Cell<usize>,
    pub(crate) mutation_generation: Cell<u64>,
    pub(crate) id_index: RefCell<HashMap<String, Node>>,
    pub(crate) id_index_dirty: Cell<bool>,
}

/// A typed handle to a document, wrapping its underlying [`Node`] with
/// the construction operations that only make sense on a document.
#[derive(Clone)]
pub struct Document(Node);

impl Document {
    /// Create a new, empty document.
    #[must_use]
    pub fn new(config: Option<DocumentConfig>) -> Self {
        let node = Node::from_inner(NodeInner::new(
            NodePayload::Document(DocumentData {
                interner: Interner::new(),
                config: config.unwrap_or_default(),
                node_count: Cell::new(1),
                mutation_generation: Cell::new(0),
                id_index: RefCell::new(HashMap::new()),
                id_index_dirty: Cell::new(false),
            }),
            None,
        ));
        Self(node)
    }

    /// The underlying document node.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Wrap an existing document-kind node. Callers are responsible for
    /// ensuring `node` actually carries a `Document` payload; used by
    /// tree algorithms, and by embedders (e.g. the C-ABI layer) that
    /// only have a `Node` handle in hand and need the document-scoped
    /// factory methods back.
    #[must_use]
    pub fn from_node(node: Node) -> Self {
        Self(node)
    }

    /// Intern `s` in this document's string pool.
    #[must_use]
    pub fn intern(&self, s: &str) -> Atom {
        self.0.intern_for_document(s)
    }

    fn with_data<T>(&self, f: impl FnOnce(&DocumentData) -> T) -> T {
        let inner = self.0.borrow();
        match &inner.payload {
            NodePayload::Document(data) => f(data),
            _ => unreachable!("Document always wraps a Document-kind node"),
        }
    }

    fn check_and_count_node(&self) -> DomResult<()> {
        self.with_data(|data| {
            let count = data.node_count.get();
            if count >= data.config.max_ref_count {
                return Err(DomException::QuotaExceeded {
                    quota: "max_ref_count",
                    limit: data.config.max_ref_count,
                });
            }
            data.node_count.set(count + 1);
            Ok(())
        })
    }

    /// `createElement(localName)`.
    pub fn create_element(&self, local_name: &str) -> DomResult<Node> {
        validate_name(local_name)?;
        self.check_and_count_node()?;
        let name = self.intern(local_name);
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::Element(ElementData {
                namespace: None,
                prefix: None,
                local_name: name,
                attributes: Vec::new(),
                class_bloom: ClassBloom::empty(),
                shadow_root: None,
            }),
            Some(self.0.downgrade()),
        )))
    }

    /// `createElementNS(namespace, qualifiedName)`.
    pub fn create_element_ns(&self, namespace: Option<&str>, qualified_name: &str) -> DomResult<Node> {
        let (prefix, local) = split_qualified_name(qualified_name)?;
        self.check_and_count_node()?;
        let local_name = self.intern(local);
        let prefix = prefix.map(|p| self.intern(p));
        let namespace = namespace.map(|ns| self.intern(ns));
        if prefix.is_some() && namespace.is_none() {
            return Err(DomException::Namespace(qualified_name.to_string()));
        }
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::Element(ElementData {
                namespace,
                prefix,
                local_name,
                attributes: Vec::new(),
                class_bloom: ClassBloom::empty(),
                shadow_root: None,
            }),
            Some(self.0.downgrade()),
        )))
    }

    /// `createTextNode(data)`.
    pub fn create_text_node(&self, data: &str) -> DomResult<Node> {
        self.check_text_len(data)?;
        self.check_and_count_node()?;
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::Text(CharacterDataPayload { data: data.to_string() }),
            Some(self.0.downgrade()),
        )))
    }

    /// `createComment(data)`.
    pub fn create_comment(&self, data: &str) -> DomResult<Node> {
        self.check_text_len(data)?;
        self.check_and_count_node()?;
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::Comment(CharacterDataPayload { data: data.to_string() }),
            Some(self.0.downgrade()),
        )))
    }

    /// `createCDATASection(data)`.
    pub fn create_cdata_section(&self, data: &str) -> DomResult<Node> {
        if data.contains("]]>") {
            return Err(DomException::InvalidCharacter("]]>".to_string()));
        }
        self.check_text_len(data)?;
        self.check_and_count_node()?;
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::CDataSection(CharacterDataPayload { data: data.to_string() }),
            Some(self.0.downgrade()),
        )))
    }

    /// `createDocumentFragment()`.
    pub fn create_document_fragment(&self) -> DomResult<Node> {
        self.check_and_count_node()?;
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::DocumentFragment(DocumentFragmentData),
            Some(self.0.downgrade()),
        )))
    }

    /// `createProcessingInstruction(target, data)`.
    pub fn create_processing_instruction(&self, target: &str, data: &str) -> DomResult<Node> {
        validate_name(target)?;
        if data.contains("?>") {
            return Err(DomException::InvalidCharacter("?>".to_string()));
        }
        self.check_text_len(data)?;
        self.check_and_count_node()?;
        let target = self.intern(target);
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::ProcessingInstruction(ProcessingInstructionData {
                target,
                data: data.to_string(),
            }),
            Some(self.0.downgrade()),
        )))
    }

    /// `createAttribute(localName)`, unowned until attached via
    /// `Element::setAttributeNode` (modeled here as pushing onto
    /// `ElementData::attributes` — see [`crate::element`]).
    pub fn create_attribute(&self, local_name: &str) -> DomResult<Node> {
        validate_name(local_name)?;
        self.check_and_count_node()?;
        let local_name = self.intern(local_name);
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::Attr(AttrData {
                namespace: None,
                prefix: None,
                local_name,
                value: String::new(),
                owner_element: None,
            }),
            Some(self.0.downgrade()),
        )))
    }

    /// `implementation.createDocumentType(name, publicId, systemId)`.
    pub fn create_document_type(&self, name: &str, public_id: &str, system_id: &str) -> DomResult<Node> {
        validate_name(name)?;
        self.check_and_count_node()?;
        let name = self.intern(name);
        Ok(Node::from_inner(NodeInner::new(
            NodePayload::DocumentType(DocumentTypeData {
                name,
                public_id: public_id.to_string(),
                system_id: system_id.to_string(),
            }),
            Some(self.0.downgrade()),
        )))
    }

    fn check_text_len(&self, data: &str) -> DomResult<()> {
        self.with_data(|d| {
            if data.len() > d.config.max_text_len {
                Err(DomException::QuotaExceeded {
                    quota: "max_text_len",
                    limit: d.config.max_text_len,
                })
            } else {
                Ok(())
            }
        })
    }

    pub(crate) fn check_depth(&self, depth: usize) -> DomResult<()> {
        self.with_data(|d| {
            if depth > d.config.max_tree_depth {
                Err(DomException::QuotaExceeded {
                    quota: "max_tree_depth",
                    limit: d.config.max_tree_depth,
                })
            } else {
                Ok(())
            }
        })
    }

    /// Checks an attribute's qualified name against `max_attribute_name_length`.
    pub(crate) fn check_attribute_name_length(&self, name: &str) -> DomResult<()> {
        self.with_data(|d| {
            if name.len() > d.config.max_attribute_name_length {
                Err(DomException::QuotaExceeded {
                    quota: "max_attribute_name_length",
                    limit: d.config.max_attribute_name_length,
                })
            } else {
                Ok(())
            }
        })
    }

    /// Checks a would-be new attribute count against
    /// `max_attribute_count_per_element`.
    pub(crate) fn check_attribute_count(&self, current_count: usize) -> DomResult<()> {
        self.with_data(|d| {
            if current_count >= d.config.max_attribute_count_per_element {
                Err(DomException::QuotaExceeded {
                    quota: "max_attribute_count_per_element",
                    limit: d.config.max_attribute_count_per_element,
                })
            } else {
                Ok(())
            }
        })
    }

    /// Checks a target's listener count against `max_listeners_per_target`.
    pub(crate) fn check_listener_count(&self, current_count: usize) -> DomResult<()> {
        self.with_data(|d| {
            if current_count >= d.config.max_listeners_per_target {
                Err(DomException::QuotaExceeded {
                    quota: "max_listeners_per_target",
                    limit: d.config.max_listeners_per_target,
                })
            } else {
                Ok(())
            }
        })
    }

    /// The document's current mutation generation, bumped on every
    /// structural tree change. Live collections compare this against the
    /// generation they were last built at to decide whether to rescan.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.with_data(|d| d.mutation_generation.get())
    }

    pub(crate) fn bump_generation(&self) {
        self.with_data(|d| d.mutation_generation.set(d.mutation_generation.get().wrapping_add(1)));
    }

    /// `getElementById(id)`. Rebuilds the document's id index by a single
    /// tree-order traversal if it was marked dirty by an `id` attribute
    /// change since the last rebuild; ties resolve to the first element
    /// in tree order.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<Node> {
        if self.with_data(|d| d.id_index_dirty.get()) {
            self.rebuild_id_index();
        }
        self.with_data(|d| d.id_index.borrow().get(id).cloned())
    }

    fn rebuild_id_index(&self) {
        let mut index = HashMap::new();
        for node in self.0.tree_order_descendants() {
            if node.node_type() == crate::node::ELEMENT_NODE {
                if let Some(id) = node.get_attribute("id") {
                    let _ = index.entry(id).or_insert(node);
                }
            }
        }
        self.with_data(|d| {
            *d.id_index.borrow_mut() = index;
            d.id_index_dirty.set(false);
        });
    }
}

/// Bump the mutation generation of `node`'s owning document (or `node`
/// itself, if it is a document), if it has one. A detached, document-less
/// subtree has no generation counter to bump.
pub(crate) fn bump_generation_of(node: &Node) {
    let doc_node = if node.node_type() == crate::node::DOCUMENT_NODE {
        Some(node.clone())
    } else {
        node.owner_document()
    };
    if let Some(doc_node) = doc_node {
        Document::from_node(doc_node).bump_generation();
    }
}

/// Mark `node`'s owning document's id index dirty, if it has one. Called
/// whenever the `id` attribute is set or removed on an element.
pub(crate) fn mark_id_index_dirty_of(node: &Node) {
    let doc_node = if node.node_type() == crate::node::DOCUMENT_NODE {
        Some(node.clone())
    } else {
        node.owner_document()
    };
    if let Some(doc_node) = doc_node {
        Document::from_node(doc_node).with_data(|d| d.id_index_dirty.set(true));
    }
}

/// The mutation generation of `node`'s owning document (or `node` itself,
/// if it is a document), or `0` for a detached, document-less node.
#[must_use]
pub fn generation_of(node: &Node) -> u64 {
    let doc_node = if node.node_type() == crate::node::DOCUMENT_NODE {
        Some(node.clone())
    } else {
        node.owner_document()
    };
    doc_node.map_or(0, |doc_node| Document::from_node(doc_node).generation())
}

fn split_qualified_name(qualified_name: &str) -> DomResult<(Option<&str>, &str)> {
    match qualified_name.split_once(':') {
        Some((prefix, local)) => {
            validate_name(prefix)?;
            validate_name(local)?;
            Ok((Some(prefix), local))
        }
        None => {
            validate_name(qualified_name)?;
            Ok((None, qualified_name))
        }
    }
}

impl Node {
    /// Intern `s` using this node's document interner, if this node is
    /// itself a `Document`; otherwise mints a standalone, non-pooled atom.
    /// Used internally by constructors that need an `Atom` but may be
    /// invoked on a detached, document-less node.
    pub(crate) fn intern_for_document(&self, s: &str) -> Atom {
        let mut inner = self.borrow_mut();
        if let NodePayload::Document(data) = &mut inner.payload {
            data.interner.intern(s)
        } else {
            Atom::uninterned(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_element_rejects_invalid_names() {
        let doc = Document::new(None);
        assert!(doc.create_element("1bad").is_err());
        assert!(doc.create_element("good-name").is_ok());
    }

    #[test]
    fn get_element_by_id_tracks_id_attribute_changes() {
        let doc = Document::new(None);
        let container = doc.create_element("container").unwrap();
        container.set_attribute("id", "root").unwrap();
        crate::tree::append_child(doc.node(), &container).unwrap();

        assert!(doc.get_element_by_id("root").is_some_and(|n| n.ptr_eq(&container)));
        container.set_attribute("id", "x").unwrap();
        assert!(doc.get_element_by_id("root").is_none());
        assert!(doc.get_element_by_id("x").is_some_and(|n| n.ptr_eq(&container)));
    }

    #[test]
    fn quota_exceeded_on_max_ref_count() {
        let doc = Document::new(Some(DocumentConfig {
            max_ref_count: 2,
            ..DocumentConfig::default()
        }));
        assert!(doc.create_element("a").is_ok());
        match doc.create_element("b") {
            Err(DomException::QuotaExceeded { quota, .. }) => assert_eq!(quota, "max_ref_count"),
            other => panic!("expected quota error, got {other:?}"),
        }
    }
}
