//! `Element` node payload and attribute-manipulation operations.
//!
//! [`Element`](https://dom.spec.whatwg.org/#interface-element)

use crate::attr::AttrData;
use crate::class_bloom::ClassBloom;
use crate::document::{bump_generation_of, mark_id_index_dirty_of};
use crate::error::{DomException, DomResult};
use crate::interner::Atom;
use crate::mutation_observer::notify_attribute_change;
use crate::node::{Node, NodePayload, ShadowRootData, ShadowRootMode};

/// An `Element` node's data.
pub struct ElementData {
    /// The element's namespace URI, or `None` for the null namespace.
    pub namespace: Option<Atom>,
    /// The element's namespace prefix, if any.
    pub prefix: Option<Atom>,
    /// The element's local name, e.g. `"div"`.
    pub local_name: Atom,
    /// Ordered attribute list, matching source order and
    /// `setAttributeNode` insertion order. Each entry is an `Attr` node.
    pub attributes: Vec<Node>,
    /// A sound summary of the element's current `class` tokens, kept in
    /// sync with `attributes` on every write. The selector engine ANDs a
    /// compound selector's class tokens against this before doing a real
    /// attribute scan.
    pub class_bloom: ClassBloom,
    /// The element's attached shadow root, if any.
    pub shadow_root: Option<Node>,
}

impl ElementData {
    /// The element's tag name, uppercased the way HTML elements report it
    /// is deliberately left to callers — this engine is namespace
    /// agnostic and returns the qualified name verbatim.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.as_str().to_string(),
        }
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

/// Validate an XML `Name` production, used for tag names, attribute
/// names, and `ProcessingInstruction` targets.
pub(crate) fn validate_name(name: &str) -> DomResult<()> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => {}
        _ => return Err(DomException::InvalidCharacter(name.to_string())),
    }
    if chars.any(|c| !is_name_char(c)) {
        return Err(DomException::InvalidCharacter(name.to_string()));
    }
    Ok(())
}

impl Node {
    fn with_element<T>(&self, f: impl FnOnce(&ElementData) -> T) -> Option<T> {
        let inner = self.borrow();
        match &inner.payload {
            NodePayload::Element(data) => Some(f(data)),
            _ => None,
        }
    }

    fn with_element_mut<T>(&self, f: impl FnOnce(&mut ElementData) -> T) -> Option<T> {
        let mut inner = self.borrow_mut();
        match &mut inner.payload {
            NodePayload::Element(data) => Some(f(data)),
            _ => None,
        }
    }

    /// `tagName` / the element's qualified name. `None` if this node is
    /// not an element.
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        self.with_element(ElementData::qualified_name)
    }

    /// `Element.localName`.
    #[must_use]
    pub fn local_name(&self) -> Option<Atom> {
        self.with_element(|e| e.local_name.clone())
    }

    /// `Element.namespaceURI`.
    #[must_use]
    pub fn namespace_uri(&self) -> Option<Option<Atom>> {
        self.with_element(|e| e.namespace.clone())
    }

    /// `getAttribute(name)`.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.with_element(|e| {
            e.attributes.iter().find_map(|attr| {
                let attr_inner = attr.borrow();
                match &attr_inner.payload {
                    NodePayload::Attr(data) if data.qualified_name() == name => {
                        Some(data.value.clone())
                    }
                    _ => None,
                }
            })
        })?
    }

    /// `hasAttribute(name)`.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// `setAttribute(name, value)`.
    ///
    /// # Errors
    /// Returns [`DomException::QuotaExceeded`] if `name` exceeds
    /// `max_attribute_name_length`, or if adding a new attribute would
    /// exceed `max_attribute_count_per_element`. Both checks happen
    /// before any mutation.
    pub fn set_attribute(&self, name: &str, value: &str) -> DomResult<()> {
        validate_name(name)?;
        if let Some(doc) = self.owner_document() {
            crate::document::Document::from_node(doc).check_attribute_name_length(name)?;
        }
        let existing = self.with_element(|e| {
            e.attributes.iter().find_map(|attr| {
                let attr_inner = attr.borrow();
                match &attr_inner.payload {
                    NodePayload::Attr(data) if data.qualified_name() == name => Some(attr.clone()),
                    _ => None,
                }
            })
        });
        let is_new = existing.clone().flatten().is_none();
        if is_new {
            if let Some(doc) = self.owner_document() {
                let count = self.with_element(|e| e.attributes.len()).unwrap_or(0);
                crate::document::Document::from_node(doc).check_attribute_count(count)?;
            }
        }
        let (local_name, old_value) = match existing.flatten() {
            Some(attr) => {
                let mut inner = attr.borrow_mut();
                let NodePayload::Attr(data) = &mut inner.payload else {
                    unreachable!("existing attribute lookup only matches Attr nodes")
                };
                let old_value = data.value.clone();
                data.value = value.to_string();
                (data.local_name.clone(), Some(old_value))
            }
            None => {
                let owner_doc = self.owner_document().unwrap_or_else(|| self.clone());
                let local_name = owner_doc.intern_for_document(name);
                let attr_node = Node::from_inner(crate::node::NodeInner::new(
                    NodePayload::Attr(AttrData {
                        namespace: None,
                        prefix: None,
                        local_name: local_name.clone(),
                        value: value.to_string(),
                        owner_element: Some(self.downgrade()),
                    }),
                    Some(owner_doc.downgrade()),
                ));
                self.with_element_mut(|e| e.attributes.push(attr_node));
                (local_name, None)
            }
        };
        if name == "class" {
            self.recompute_class_bloom(value);
        }
        if name == "id" {
            mark_id_index_dirty_of(self);
        }
        notify_attribute_change(self, &local_name, old_value);
        bump_generation_of(self);
        Ok(())
    }

    /// `removeAttribute(name)`.
    pub fn remove_attribute(&self, name: &str) {
        let removed_value = self.with_element(|e| {
            e.attributes.iter().find_map(|attr| {
                let attr_inner = attr.borrow();
                match &attr_inner.payload {
                    NodePayload::Attr(data) if data.qualified_name() == name => {
                        Some((data.local_name.clone(), data.value.clone()))
                    }
                    _ => None,
                }
            })
        }).flatten();
        self.with_element_mut(|e| {
            e.attributes.retain(|attr| {
                let attr_inner = attr.borrow();
                !matches!(&attr_inner.payload, NodePayload::Attr(data) if data.qualified_name() == name)
            });
        });
        if name == "class" {
            self.recompute_class_bloom("");
        }
        if name == "id" {
            mark_id_index_dirty_of(self);
        }
        if let Some((local_name, old_value)) = removed_value {
            notify_attribute_change(self, &local_name, Some(old_value));
            bump_generation_of(self);
        }
    }

    /// Rebuild `class_bloom` from `class_value`'s whitespace-separated
    /// tokens. `None` if `self` is not an element.
    fn recompute_class_bloom(&self, class_value: &str) -> Option<()> {
        self.with_element_mut(|e| {
            e.class_bloom = ClassBloom::from_tokens(class_value.split_ascii_whitespace());
        })
    }

    /// Whether the element's class tokens might include `class`, per its
    /// [`ClassBloom`]. `false` is a hard guarantee of absence.
    #[must_use]
    pub fn class_might_contain(&self, class: &str) -> bool {
        self.with_element(|e| e.class_bloom.might_contain(class)).unwrap_or(false)
    }

    /// The element's `Attr` nodes, in source/insertion order.
    #[must_use]
    pub fn attribute_nodes(&self) -> Vec<Node> {
        self.with_element(|e| e.attributes.clone()).unwrap_or_default()
    }

    /// Push an already-constructed `Attr` node onto this element's
    /// attribute list. `None` if `self` is not an element.
    pub(crate) fn push_attribute_node(&self, attr: Node) -> Option<()> {
        self.with_element_mut(|e| e.attributes.push(attr))
    }

    /// Attach a shadow root to this element.
    ///
    /// # Errors
    /// Returns [`DomException::InvalidState`] if a shadow root is already
    /// attached, or if this node is not an element.
    pub fn attach_shadow(&self, mode: ShadowRootMode) -> DomResult<Node> {
        let already = self
            .with_element(|e| e.shadow_root.is_some())
            .ok_or_else(|| DomException::InvalidState("attachShadow on a non-element".into()))?;
        if already {
            return Err(DomException::InvalidState(
                "element already hosts a shadow root".into(),
            ));
        }
        let owner_doc = self.owner_document();
        let shadow = Node::from_inner(crate::node::NodeInner::new(
            NodePayload::ShadowRoot(ShadowRootData {
                host: self.downgrade(),
                mode,
            }),
            owner_doc.as_ref().map(Node::downgrade),
        ));
        self.with_element_mut(|e| e.shadow_root = Some(shadow.clone()));
        Ok(shadow)
    }

    /// The shadow root attached to this element, if any and if it is not
    /// closed-mode-hidden from the caller (this engine does not model
    /// "closed from script" access control beyond exposing the mode).
    #[must_use]
    pub fn shadow_root(&self) -> Option<Node> {
        self.with_element(|e| e.shadow_root.clone()).flatten()
    }
}
