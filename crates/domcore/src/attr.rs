//! `Attr` node payload and the owning element's attribute list.
//!
//! [`Attr`](https://dom.spec.whatwg.org/#interface-attr)

use crate::interner::Atom;
use crate::node::{Node, NodePayload, WeakNode};

/// An `Attr` node's data. `Attr` is a node kind in its own right rather
/// than a bare key/value pair, so it can carry a namespace, a prefix, and
/// a (weak) owner-element backreference, and so identity comparisons on
/// attributes behave like identity comparisons on every other node.
#[derive(Debug, Clone)]
pub struct AttrData {
    /// The attribute's namespace URI, or `None` for the null namespace.
    pub namespace: Option<Atom>,
    /// The attribute's namespace prefix, if any.
    pub prefix: Option<Atom>,
    /// The attribute's local name.
    pub local_name: Atom,
    /// The attribute's current value.
    pub value: String,
    /// The element that currently owns this attribute, if attached.
    pub owner_element: Option<WeakNode>,
}

impl AttrData {
    /// The attribute's qualified name: `prefix:localName`, or just
    /// `localName` when there is no prefix.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.as_str().to_string(),
        }
    }
}

impl Node {
    fn with_attr<T>(&self, f: impl FnOnce(&AttrData) -> T) -> Option<T> {
        let inner = self.borrow();
        match &inner.payload {
            NodePayload::Attr(data) => Some(f(data)),
            _ => None,
        }
    }

    /// `Attr.name`. `None` if this node is not an attribute.
    #[must_use]
    pub fn attr_name(&self) -> Option<String> {
        self.with_attr(AttrData::qualified_name)
    }

    /// `Attr.value`.
    #[must_use]
    pub fn attr_value(&self) -> Option<String> {
        self.with_attr(|a| a.value.clone())
    }

    /// `Attr.value = v`.
    pub fn set_attr_value(&self, value: &str) {
        let mut inner = self.borrow_mut();
        if let NodePayload::Attr(data) = &mut inner.payload {
            data.value = value.to_string();
        }
    }

    /// `Attr.ownerElement`.
    #[must_use]
    pub fn attr_owner_element(&self) -> Option<Node> {
        self.with_attr(|a| a.owner_element.clone())
            .flatten()
            .and_then(|w| w.upgrade())
    }

    /// `setAttributeNode(attr)`: attach a previously unattached `Attr`
    /// node to this element, replacing any existing attribute of the
    /// same name. Returns the replaced node, if any.
    ///
    /// # Errors
    /// [`crate::error::DomException::InvalidState`] if `self` is not an
    /// element or `attr` is not an attribute node.
    pub fn set_attribute_node(&self, attr: &Node) -> crate::error::DomResult<Option<Node>> {
        let name = attr
            .attr_name()
            .ok_or_else(|| crate::error::DomException::InvalidState("not an attribute node".to_string()))?;
        let previous = self
            .attribute_nodes()
            .into_iter()
            .find(|a| a.attr_name().as_deref() == Some(name.as_str()));
        self.remove_attribute(&name);
        attr.borrow_mut().parent = None;
        if let NodePayload::Attr(data) = &mut attr.borrow_mut().payload {
            data.owner_element = Some(self.downgrade());
        }
        self.push_attribute_node(attr.clone())
            .ok_or_else(|| crate::error::DomException::InvalidState("not an element".to_string()))?;
        Ok(previous)
    }
}
