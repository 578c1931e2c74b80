//! `NodeIterator` and `TreeWalker`.
//!
//! [`NodeIterator`](https://dom.spec.whatwg.org/#interface-nodeiterator),
//! [`TreeWalker`](https://dom.spec.whatwg.org/#interface-treewalker)

use std::rc::Rc;

use crate::flags::WhatToShow;
use crate::node::Node;

/// `NodeFilter.FILTER_ACCEPT`
pub const FILTER_ACCEPT: i16 = 1;
/// `NodeFilter.FILTER_REJECT`
pub const FILTER_REJECT: i16 = 2;
/// `NodeFilter.FILTER_SKIP`
pub const FILTER_SKIP: i16 = 3;

/// A user-supplied acceptance callback, mirroring the `NodeFilter`
/// interface's single `acceptNode` method.
pub type NodeFilterFn = Rc<dyn Fn(&Node) -> i16>;

fn what_to_show_matches(what_to_show: WhatToShow, node: &Node) -> bool {
    let bit = match node.node_type() {
        crate::node::ELEMENT_NODE => WhatToShow::ELEMENT,
        crate::node::ATTRIBUTE_NODE => WhatToShow::ATTRIBUTE,
        crate::node::TEXT_NODE => WhatToShow::TEXT,
        crate::node::CDATA_SECTION_NODE => WhatToShow::CDATA_SECTION,
        crate::node::PROCESSING_INSTRUCTION_NODE => WhatToShow::PROCESSING_INSTRUCTION,
        crate::node::COMMENT_NODE => WhatToShow::COMMENT,
        crate::node::DOCUMENT_NODE => WhatToShow::DOCUMENT,
        crate::node::DOCUMENT_TYPE_NODE => WhatToShow::DOCUMENT_TYPE,
        crate::node::DOCUMENT_FRAGMENT_NODE => WhatToShow::DOCUMENT_FRAGMENT,
        _ => return false,
    };
    what_to_show.contains(bit)
}

fn accept(what_to_show: WhatToShow, filter: Option<&NodeFilterFn>, node: &Node) -> i16 {
    if !what_to_show_matches(what_to_show, node) {
        return FILTER_SKIP;
    }
    match filter {
        Some(f) => f(node),
        None => FILTER_ACCEPT,
    }
}

/// A `NodeIterator` walking the document-order flattening of `root`'s
/// subtree (`root` itself is never returned).
pub struct NodeIterator {
    root: Node,
    reference: Node,
    pointer_before_reference: bool,
    what_to_show: WhatToShow,
    filter: Option<NodeFilterFn>,
}

impl NodeIterator {
    #[must_use]
    pub fn new(root: Node, what_to_show: WhatToShow, filter: Option<NodeFilterFn>) -> Self {
        Self {
            reference: root.clone(),
            root,
            pointer_before_reference: true,
            what_to_show,
            filter,
        }
    }

    /// `nextNode()`.
    pub fn next_node(&mut self) -> Option<Node> {
        let mut node = self.reference.clone();
        let mut before = self.pointer_before_reference;
        loop {
            if !before {
                node = next_in_tree_order(&self.root, &node)?;
            }
            before = false;
            if accept(self.what_to_show, self.filter.as_ref(), &node) == FILTER_ACCEPT {
                self.reference = node.clone();
                self.pointer_before_reference = false;
                return Some(node);
            }
        }
    }

    /// `previousNode()`.
    pub fn previous_node(&mut self) -> Option<Node> {
        let mut node = self.reference.clone();
        let mut before = self.pointer_before_reference;
        loop {
            if before {
                node = previous_in_tree_order(&self.root, &node)?;
            }
            before = true;
            if accept(self.what_to_show, self.filter.as_ref(), &node) == FILTER_ACCEPT {
                self.reference = node.clone();
                self.pointer_before_reference = true;
                return Some(node);
            }
        }
    }
}

fn next_in_tree_order(root: &Node, node: &Node) -> Option<Node> {
    if let Some(child) = node.first_child() {
        return Some(child);
    }
    let mut current = node.clone();
    loop {
        if current.ptr_eq(root) {
            return None;
        }
        if let Some(sibling) = current.next_sibling() {
            return Some(sibling);
        }
        current = current.parent()?;
    }
}

fn previous_in_tree_order(root: &Node, node: &Node) -> Option<Node> {
    if node.ptr_eq(root) {
        return None;
    }
    if let Some(sibling) = node.previous_sibling() {
        let mut deepest = sibling;
        while let Some(child) = deepest.last_child() {
            deepest = child;
        }
        return Some(deepest);
    }
    node.parent()
}

/// A `TreeWalker` exposing parent/sibling/child navigation filtered by
/// `whatToShow`/`filter`.
pub struct TreeWalker {
    root: Node,
    current: Node,
    what_to_show: WhatToShow,
    filter: Option<NodeFilterFn>,
}

impl TreeWalker {
    #[must_use]
    pub fn new(root: Node, what_to_show: WhatToShow, filter: Option<NodeFilterFn>) -> Self {
        Self { current: root.clone(), root, what_to_show, filter }
    }

    #[must_use]
    pub fn current_node(&self) -> Node {
        self.current.clone()
    }

    pub fn set_current_node(&mut self, node: Node) {
        self.current = node;
    }

    fn verdict(&self, node: &Node) -> i16 {
        accept(self.what_to_show, self.filter.as_ref(), node)
    }

    /// `parentNode()`.
    pub fn parent_node(&mut self) -> Option<Node> {
        let mut node = self.current.clone();
        while !node.ptr_eq(&self.root) {
            node = node.parent()?;
            if self.verdict(&node) == FILTER_ACCEPT {
                self.current = node.clone();
                return Some(node);
            }
        }
        None
    }

    /// `firstChild()`.
    pub fn first_child(&mut self) -> Option<Node> {
        self.traverse_children(true)
    }

    /// `lastChild()`.
    pub fn last_child(&mut self) -> Option<Node> {
        self.traverse_children(false)
    }

    fn traverse_children(&mut self, forward: bool) -> Option<Node> {
        let mut node = if forward { self.current.first_child() } else { self.current.last_child() }?;
        loop {
            match self.verdict(&node) {
                FILTER_ACCEPT => {
                    self.current = node.clone();
                    return Some(node);
                }
                FILTER_SKIP => {
                    if let Some(child) = if forward { node.first_child() } else { node.last_child() } {
                        node = child;
                        continue;
                    }
                }
                _ => {}
            }
            loop {
                let sibling = if forward { node.next_sibling() } else { node.previous_sibling() };
                match sibling {
                    Some(s) => {
                        node = s;
                        break;
                    }
                    None => {
                        let parent = node.parent()?;
                        if parent.ptr_eq(&self.current) || parent.ptr_eq(&self.root) {
                            return None;
                        }
                        node = parent;
                    }
                }
            }
        }
    }

    /// `nextSibling()`.
    pub fn next_sibling(&mut self) -> Option<Node> {
        self.traverse_siblings(true)
    }

    /// `previousSibling()`.
    pub fn previous_sibling(&mut self) -> Option<Node> {
        self.traverse_siblings(false)
    }

    fn traverse_siblings(&mut self, forward: bool) -> Option<Node> {
        if self.current.ptr_eq(&self.root) {
            return None;
        }
        let mut node = self.current.clone();
        loop {
            let sibling = if forward { node.next_sibling() } else { node.previous_sibling() };
            let mut sibling = match sibling {
                Some(s) => s,
                None => {
                    let parent = node.parent()?;
                    if parent.ptr_eq(&self.root) || self.verdict(&parent) != FILTER_ACCEPT {
                        return None;
                    }
                    node = parent;
                    continue;
                }
            };
            loop {
                match self.verdict(&sibling) {
                    FILTER_ACCEPT => {
                        self.current = sibling.clone();
                        return Some(sibling);
                    }
                    FILTER_SKIP => {
                        let descend = if forward { sibling.first_child() } else { sibling.last_child() };
                        match descend {
                            Some(child) => sibling = child,
                            None => break,
                        }
                    }
                    _ => break,
                }
            }
            node = sibling;
        }
    }

    /// `nextNode()`.
    pub fn next_node(&mut self) -> Option<Node> {
        let mut node = self.current.clone();
        loop {
            if let Some(child) = node.first_child() {
                node = child;
            } else {
                loop {
                    if node.ptr_eq(&self.root) {
                        return None;
                    }
                    if let Some(sibling) = node.next_sibling() {
                        node = sibling;
                        break;
                    }
                    node = node.parent()?;
                }
            }
            match self.verdict(&node) {
                FILTER_ACCEPT => {
                    self.current = node.clone();
                    return Some(node);
                }
                FILTER_REJECT => continue,
                _ => continue,
            }
        }
    }

    /// `previousNode()`.
    pub fn previous_node(&mut self) -> Option<Node> {
        let mut node = self.current.clone();
        loop {
            if node.ptr_eq(&self.root) {
                return None;
            }
            if let Some(sibling) = node.previous_sibling() {
                node = sibling;
                while let Some(child) = node.last_child() {
                    node = child;
                }
            } else {
                node = node.parent()?;
            }
            if self.verdict(&node) == FILTER_ACCEPT {
                self.current = node.clone();
                return Some(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn node_iterator_walks_all_elements() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        crate::tree::append_child(&root, &a).unwrap();
        crate::tree::append_child(&root, &b).unwrap();

        let mut it = NodeIterator::new(root, WhatToShow::ELEMENT, None);
        let first = it.next_node().unwrap();
        let second = it.next_node().unwrap();
        assert!(first.ptr_eq(&a));
        assert!(second.ptr_eq(&b));
        assert!(it.next_node().is_none());
    }

    #[test]
    fn tree_walker_next_node_is_preorder() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        crate::tree::append_child(&root, &a).unwrap();
        crate::tree::append_child(&a, &b).unwrap();

        let mut walker = TreeWalker::new(root, WhatToShow::ALL, None);
        assert!(walker.next_node().unwrap().ptr_eq(&a));
        assert!(walker.next_node().unwrap().ptr_eq(&b));
        assert!(walker.next_node().is_none());
    }
}
