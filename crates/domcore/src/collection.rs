//! Live node collections: `NodeList` and `HTMLCollection`-style views.
//!
//! [`NodeList`](https://dom.spec.whatwg.org/#interface-nodelist)
//!
//! `ChildNodeList` is a thin, recomputed-on-access view: `length`/`item`
//! walk the tree fresh each call, which is cheap since it only visits
//! direct children. [`FilteredCollection`] (the `getElementsBy*` views,
//! which walk the whole subtree) instead caches its last scan alongside
//! the document's mutation generation counter and only rescans once that
//! counter has moved, per the live-collection contract.

use std::cell::RefCell;

use crate::document::generation_of;
use crate::node::Node;

/// A live, order-preserving list of a root's direct children.
pub struct ChildNodeList {
    root: Node,
}

impl ChildNodeList {
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.root.children().count()
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<Node> {
        self.root.children().nth(index)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Node> {
        self.root.children().collect()
    }
}

/// A live collection of a root's descendants matching a predicate, in
/// tree order. Used for `getElementsByTagName`/`getElementsByClassName`
/// and for the element-only view exposed as `children`.
pub struct FilteredCollection<F: Fn(&Node) -> bool> {
    root: Node,
    predicate: F,
    cache: RefCell<Option<(u64, Vec<Node>)>>,
}

impl<F: Fn(&Node) -> bool> FilteredCollection<F> {
    pub fn new(root: Node, predicate: F) -> Self {
        Self { root, predicate, cache: RefCell::new(None) }
    }

    fn rescan(&self) -> Vec<Node> {
        self.root.tree_order_descendants().filter(|n| (self.predicate)(n)).collect()
    }

    /// The current snapshot, rescanning the tree only if the owning
    /// document's mutation generation has advanced since the last scan.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Node> {
        let current_generation = generation_of(&self.root);
        let mut cache = self.cache.borrow_mut();
        if let Some((generation, items)) = cache.as_ref() {
            if *generation == current_generation {
                return items.clone();
            }
        }
        let items = self.rescan();
        *cache = Some((current_generation, items.clone()));
        items
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.to_vec().len()
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<Node> {
        self.to_vec().into_iter().nth(index)
    }
}

/// `getElementsByTagName(qualifiedName)`. `"*"` matches every element.
#[must_use]
pub fn elements_by_tag_name(root: Node, qualified_name: &str) -> FilteredCollection<impl Fn(&Node) -> bool> {
    let wildcard = qualified_name == "*";
    let qualified_name = qualified_name.to_string();
    FilteredCollection::new(root, move |n| {
        n.node_type() == crate::node::ELEMENT_NODE
            && (wildcard || n.tag_name().as_deref() == Some(qualified_name.as_str()))
    })
}

/// `getElementsByClassName(names)`: elements whose `class` attribute
/// contains every whitespace-separated token in `names`.
#[must_use]
pub fn elements_by_class_name(root: Node, names: &str) -> FilteredCollection<impl Fn(&Node) -> bool> {
    let wanted: Vec<String> = names.split_whitespace().map(str::to_string).collect();
    FilteredCollection::new(root, move |n| {
        if n.node_type() != crate::node::ELEMENT_NODE {
            return false;
        }
        let Some(class_attr) = n.get_attribute("class") else {
            return false;
        };
        let present: Vec<&str> = class_attr.split_whitespace().collect();
        wanted.iter().all(|w| present.contains(&w.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn elements_by_tag_name_is_live() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let a = doc.create_element("a").unwrap();
        crate::tree::append_child(&root, &a).unwrap();

        let collection = elements_by_tag_name(root.clone(), "a");
        assert_eq!(collection.length(), 1);

        let b = doc.create_element("a").unwrap();
        crate::tree::append_child(&root, &b).unwrap();
        assert_eq!(collection.length(), 2);
    }

    #[test]
    fn elements_by_class_name_requires_all_tokens() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let a = doc.create_element("a").unwrap();
        a.set_attribute("class", "foo bar").unwrap();
        crate::tree::append_child(&root, &a).unwrap();

        assert_eq!(elements_by_class_name(root.clone(), "foo").length(), 1);
        assert_eq!(elements_by_class_name(root.clone(), "foo baz").length(), 0);
    }
}
