//! Tree mutation algorithms: insertion, removal, replacement, adoption,
//! and cloning.
//!
//! [§ 4.2.1 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)

use crate::attr::AttrData;
use crate::character_data::{CharacterDataPayload, DocumentTypeData, ProcessingInstructionData};
use crate::document::bump_generation_of;
use crate::element::ElementData;
use crate::error::{DomException, DomResult};
use crate::flags::NodeFlags;
use crate::mutation_observer::notify_child_list_change;
use crate::node::{
    DocumentFragmentData, Node, NodeInner, NodePayload, ShadowRootData, ShadowRootMode,
    DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE, DOCUMENT_TYPE_NODE,
};

fn node_type_name(kind: u16) -> &'static str {
    match kind {
        DOCUMENT_NODE => "document",
        DOCUMENT_TYPE_NODE => "document type",
        DOCUMENT_FRAGMENT_NODE => "document fragment",
        _ => "node",
    }
}

/// Validate that `node` could be inserted as a child of `parent`, before
/// `child` (or appended, if `child` is `None`). Does not mutate anything.
fn ensure_pre_insertion_validity(parent: &Node, node: &Node, child: Option<&Node>) -> DomResult<()> {
    let parent_type = parent.node_type();
    if parent_type != DOCUMENT_NODE
        && parent_type != DOCUMENT_FRAGMENT_NODE
        && parent_type != crate::node::ELEMENT_NODE
    {
        return Err(DomException::HierarchyRequest(format!(
            "{} cannot have children",
            node_type_name(parent_type)
        )));
    }

    if node.is_inclusive_ancestor_of(parent) {
        return Err(DomException::HierarchyRequest(
            "node is an inclusive ancestor of parent".to_string(),
        ));
    }

    if let Some(child) = child {
        match child.parent() {
            Some(p) if p.ptr_eq(parent) => {}
            _ => {
                return Err(DomException::NotFound(
                    "child is not a child of parent".to_string(),
                ))
            }
        }
    }

    let node_type = node.node_type();
    if !matches!(
        node_type,
        crate::node::DOCUMENT_FRAGMENT_NODE
            | crate::node::DOCUMENT_TYPE_NODE
            | crate::node::ELEMENT_NODE
            | crate::node::TEXT_NODE
            | crate::node::CDATA_SECTION_NODE
            | crate::node::PROCESSING_INSTRUCTION_NODE
            | crate::node::COMMENT_NODE
    ) {
        return Err(DomException::HierarchyRequest(format!(
            "node of type {node_type} is not insertable"
        )));
    }

    if parent_type == DOCUMENT_NODE {
        match node_type {
            crate::node::TEXT_NODE => {
                return Err(DomException::HierarchyRequest(
                    "text node cannot be a child of a document".to_string(),
                ))
            }
            crate::node::DOCUMENT_FRAGMENT_NODE => {
                let element_children = node.children().filter(|c| c.node_type() == crate::node::ELEMENT_NODE).count();
                if element_children > 1 {
                    return Err(DomException::HierarchyRequest(
                        "document fragment has more than one element child".to_string(),
                    ));
                }
            }
            crate::node::ELEMENT_NODE => {
                let has_element = parent
                    .children()
                    .any(|c| c.node_type() == crate::node::ELEMENT_NODE && !ptr_eq_opt(child, &c));
                if has_element {
                    return Err(DomException::HierarchyRequest(
                        "document already has a document element".to_string(),
                    ));
                }
            }
            crate::node::DOCUMENT_TYPE_NODE => {
                let has_doctype = parent
                    .children()
                    .any(|c| c.node_type() == DOCUMENT_TYPE_NODE && !ptr_eq_opt(child, &c));
                if has_doctype {
                    return Err(DomException::HierarchyRequest(
                        "document already has a doctype".to_string(),
                    ));
                }
            }
            _ => {}
        }
    } else if node_type == DOCUMENT_TYPE_NODE {
        return Err(DomException::HierarchyRequest(
            "doctype can only be a child of a document".to_string(),
        ));
    }

    Ok(())
}

fn ptr_eq_opt(maybe: Option<&Node>, node: &Node) -> bool {
    matches!(maybe, Some(n) if n.ptr_eq(node))
}

/// Propagate `IN_DOCUMENT`/`IS_CONNECTED` flags to `node` and its
/// descendants after it lands under `parent`.
fn update_connected_flags(node: &Node, connected: bool) {
    node.set_flag(NodeFlags::IN_DOCUMENT, connected);
    node.set_flag(NodeFlags::IS_CONNECTED, connected);
    for descendant in node.tree_order_descendants() {
        descendant.set_flag(NodeFlags::IN_DOCUMENT, connected);
        descendant.set_flag(NodeFlags::IS_CONNECTED, connected);
    }
}

/// Splice `node` into `parent`'s child list immediately before
/// `before`, or at the end if `before` is `None`. Assumes validity has
/// already been checked and `node` is currently detached.
fn splice_in(parent: &Node, node: &Node, before: Option<&Node>) {
    node.borrow_mut().parent = Some(parent.downgrade());

    match before {
        None => {
            let old_last = parent.last_child();
            match &old_last {
                Some(last) => {
                    last.borrow_mut().next_sibling = Some(node.clone());
                    node.borrow_mut().previous_sibling = Some(last.downgrade());
                }
                None => {
                    parent.borrow_mut().first_child = Some(node.clone());
                }
            }
            parent.borrow_mut().last_child = Some(node.downgrade());
        }
        Some(before) => {
            let prev = before.previous_sibling();
            node.borrow_mut().previous_sibling = prev.as_ref().map(Node::downgrade);
            node.borrow_mut().next_sibling = Some(before.clone());
            before.borrow_mut().previous_sibling = Some(node.downgrade());
            match prev {
                Some(prev) => prev.borrow_mut().next_sibling = Some(node.clone()),
                None => parent.borrow_mut().first_child = Some(node.clone()),
            }
        }
    }

    let connected = parent.is_connected() || parent.node_type() == DOCUMENT_NODE;
    update_connected_flags(node, connected);
}

/// Remove `node` from its parent's child list without destroying it.
/// Assumes `node` currently has a parent.
fn splice_out(node: &Node) {
    let parent = node.parent().expect("node has a parent");
    let prev = node.previous_sibling();
    let next = node.next_sibling();

    match &prev {
        Some(prev) => prev.borrow_mut().next_sibling = next.clone(),
        None => parent.borrow_mut().first_child = next.clone(),
    }
    match &next {
        Some(next) => next.borrow_mut().previous_sibling = prev.as_ref().map(Node::downgrade),
        None => parent.borrow_mut().last_child = prev.as_ref().map(Node::downgrade),
    }

    node.borrow_mut().parent = None;
    node.borrow_mut().previous_sibling = None;
    node.borrow_mut().next_sibling = None;
    update_connected_flags(node, false);
}

fn owner_document_of(node: &Node) -> Option<Node> {
    if node.node_type() == DOCUMENT_NODE {
        Some(node.clone())
    } else {
        node.owner_document()
    }
}

fn check_depth_budget(parent: &Node, node: &Node) -> DomResult<()> {
    let Some(doc) = owner_document_of(parent) else {
        return Ok(());
    };
    let doc = crate::document::Document::from_node(doc);
    let base_depth = parent.depth() + 1;
    let subtree_height = node
        .tree_order_descendants()
        .map(|d| d.depth())
        .max()
        .unwrap_or(0)
        .saturating_sub(node.depth());
    doc.check_depth(base_depth + subtree_height)
}

/// `parent.insertBefore(node, child)` / the "pre-insert" algorithm.
/// `child = None` inserts at the end.
pub fn insert_before(parent: &Node, node: &Node, child: Option<&Node>) -> DomResult<Node> {
    ensure_pre_insertion_validity(parent, node, child)?;
    check_depth_budget(parent, node)?;

    let previous_sibling = child.and_then(Node::previous_sibling).or_else(|| parent.last_child());
    let next_sibling_for_record = child.cloned();

    if node.node_type() == DOCUMENT_FRAGMENT_NODE {
        let children: Vec<Node> = node.children().collect();
        for c in &children {
            if let Some(p) = c.parent() {
                if p.ptr_eq(node) {
                    splice_out(c);
                }
            }
            splice_in(parent, c, child);
        }
        notify_child_list_change(parent, children, Vec::new(), previous_sibling, next_sibling_for_record);
        bump_generation_of(parent);
        return Ok(node.clone());
    }

    if node.parent().is_some() {
        splice_out(node);
    }
    splice_in(parent, node, child);
    notify_child_list_change(
        parent,
        vec![node.clone()],
        Vec::new(),
        previous_sibling,
        next_sibling_for_record,
    );
    bump_generation_of(parent);
    Ok(node.clone())
}

/// `parent.appendChild(node)`.
pub fn append_child(parent: &Node, node: &Node) -> DomResult<Node> {
    insert_before(parent, node, None)
}

/// `parent.removeChild(child)`.
pub fn remove_child(parent: &Node, child: &Node) -> DomResult<Node> {
    match child.parent() {
        Some(p) if p.ptr_eq(parent) => {}
        _ => {
            return Err(DomException::NotFound(
                "child is not a child of parent".to_string(),
            ))
        }
    }
    let previous_sibling = child.previous_sibling();
    let next_sibling = child.next_sibling();
    splice_out(child);
    notify_child_list_change(
        parent,
        Vec::new(),
        vec![child.clone()],
        previous_sibling,
        next_sibling,
    );
    bump_generation_of(parent);
    Ok(child.clone())
}

/// `parent.replaceChild(node, child)`.
///
/// All validity and depth-budget checks happen before any mutation, so a
/// rejected replace leaves the tree unchanged. Emits a single `childList`
/// record carrying both the inserted and the removed node.
pub fn replace_child(parent: &Node, node: &Node, child: &Node) -> DomResult<Node> {
    match child.parent() {
        Some(p) if p.ptr_eq(parent) => {}
        _ => {
            return Err(DomException::NotFound(
                "child is not a child of parent".to_string(),
            ))
        }
    }
    ensure_pre_insertion_validity(parent, node, Some(child))?;
    check_depth_budget(parent, node)?;

    let previous_sibling = child.previous_sibling();
    let next = child.next_sibling();
    let reference = if next.as_ref().is_some_and(|n| n.ptr_eq(node)) {
        node.next_sibling()
    } else {
        next
    };
    let reference = reference.filter(|r| !r.ptr_eq(node));

    if node.node_type() == DOCUMENT_FRAGMENT_NODE {
        let children: Vec<Node> = node.children().collect();
        splice_out(child);
        for c in &children {
            if let Some(p) = c.parent() {
                if p.ptr_eq(node) {
                    splice_out(c);
                }
            }
            splice_in(parent, c, reference.as_ref());
        }
        notify_child_list_change(parent, children, vec![child.clone()], previous_sibling, reference);
        bump_generation_of(parent);
        return Ok(child.clone());
    }

    splice_out(child);
    if node.parent().is_some() {
        splice_out(node);
    }
    splice_in(parent, node, reference.as_ref());
    notify_child_list_change(parent, vec![node.clone()], vec![child.clone()], previous_sibling, reference);
    bump_generation_of(parent);
    Ok(child.clone())
}

/// `document.adoptNode(node)`: move `node` into `document`, detaching it
/// from any current parent and re-owning the whole subtree.
pub fn adopt_node(document: &Node, node: &Node) -> DomResult<()> {
    if node.node_type() == DOCUMENT_NODE {
        return Err(DomException::HierarchyRequest(
            "a document cannot be adopted into another document".to_string(),
        ));
    }
    if node.parent().is_some() {
        splice_out(node);
    }
    let weak_doc = document.downgrade();
    node.set_owner_document(Some(weak_doc.clone()));
    for descendant in node.tree_order_descendants() {
        descendant.set_owner_document(Some(weak_doc.clone()));
    }
    Ok(())
}

/// `node.cloneNode(deep)`.
pub fn clone_node(node: &Node, deep: bool) -> DomResult<Node> {
    let owner_doc = node.owner_document();
    let cloned_payload = clone_payload(node)?;
    let cloned = Node::from_inner(NodeInner::new(cloned_payload, owner_doc.as_ref().map(Node::downgrade)));

    if deep {
        for child in node.children() {
            let child_clone = clone_node(&child, true)?;
            splice_in(&cloned, &child_clone, None);
        }
    }
    Ok(cloned)
}

fn clone_payload(node: &Node) -> DomResult<NodePayload> {
    let inner = node.borrow();
    Ok(match &inner.payload {
        NodePayload::Document(_) => {
            return Err(DomException::HierarchyRequest(
                "cloning a document is not supported".to_string(),
            ))
        }
        NodePayload::DocumentFragment(_) => NodePayload::DocumentFragment(DocumentFragmentData),
        NodePayload::DocumentType(d) => NodePayload::DocumentType(DocumentTypeData {
            name: d.name.clone(),
            public_id: d.public_id.clone(),
            system_id: d.system_id.clone(),
        }),
        NodePayload::Element(e) => NodePayload::Element(ElementData {
            namespace: e.namespace.clone(),
            prefix: e.prefix.clone(),
            local_name: e.local_name.clone(),
            attributes: e
                .attributes
                .iter()
                .map(|attr| clone_attr(attr))
                .collect::<DomResult<Vec<_>>>()?,
            class_bloom: e.class_bloom,
            shadow_root: None,
        }),
        NodePayload::Text(cd) => NodePayload::Text(cd.clone()),
        NodePayload::Comment(cd) => NodePayload::Comment(cd.clone()),
        NodePayload::CDataSection(cd) => NodePayload::CDataSection(cd.clone()),
        NodePayload::ProcessingInstruction(pi) => NodePayload::ProcessingInstruction(ProcessingInstructionData {
            target: pi.target.clone(),
            data: pi.data.clone(),
        }),
        NodePayload::Attr(a) => NodePayload::Attr(AttrData {
            namespace: a.namespace.clone(),
            prefix: a.prefix.clone(),
            local_name: a.local_name.clone(),
            value: a.value.clone(),
            owner_element: None,
        }),
        NodePayload::ShadowRoot(s) => NodePayload::ShadowRoot(ShadowRootData {
            host: s.host.clone(),
            mode: match s.mode {
                ShadowRootMode::Open => ShadowRootMode::Open,
                ShadowRootMode::Closed => ShadowRootMode::Closed,
            },
        }),
    })
}

fn clone_attr(attr: &Node) -> DomResult<Node> {
    let cloned_payload = clone_payload(attr)?;
    Ok(Node::from_inner(NodeInner::new(cloned_payload, attr.owner_document().as_ref().map(Node::downgrade))))
}

/// `node.isEqualNode(other)`: structural equality, ignoring identity,
/// `ownerDocument`, and attribute/attr-node order independence for
/// attributes (compared as a set of name/value/namespace triples).
#[must_use]
pub fn is_equal_node(a: &Node, b: &Node) -> bool {
    if a.node_type() != b.node_type() {
        return false;
    }
    let a_inner = a.borrow();
    let b_inner = b.borrow();
    let payload_eq = match (&a_inner.payload, &b_inner.payload) {
        (NodePayload::Document(_), NodePayload::Document(_)) => true,
        (NodePayload::DocumentFragment(_), NodePayload::DocumentFragment(_)) => true,
        (NodePayload::DocumentType(x), NodePayload::DocumentType(y)) => {
            x.name == y.name && x.public_id == y.public_id && x.system_id == y.system_id
        }
        (NodePayload::Element(x), NodePayload::Element(y)) => {
            x.local_name == y.local_name
                && x.namespace == y.namespace
                && x.prefix == y.prefix
                && attrs_equal(&x.attributes, &y.attributes)
        }
        (NodePayload::Text(x), NodePayload::Text(y))
        | (NodePayload::Comment(x), NodePayload::Comment(y))
        | (NodePayload::CDataSection(x), NodePayload::CDataSection(y)) => x.data == y.data,
        (NodePayload::ProcessingInstruction(x), NodePayload::ProcessingInstruction(y)) => {
            x.target == y.target && x.data == y.data
        }
        (NodePayload::Attr(x), NodePayload::Attr(y)) => {
            x.local_name == y.local_name && x.namespace == y.namespace && x.value == y.value
        }
        (NodePayload::ShadowRoot(x), NodePayload::ShadowRoot(y)) => x.mode == y.mode,
        _ => false,
    };
    drop(a_inner);
    drop(b_inner);
    if !payload_eq {
        return false;
    }
    let a_children: Vec<Node> = a.children().collect();
    let b_children: Vec<Node> = b.children().collect();
    a_children.len() == b_children.len()
        && a_children
            .iter()
            .zip(b_children.iter())
            .all(|(x, y)| is_equal_node(x, y))
}

/// An item accepted by the `ParentNode`/`ChildNode` convenience
/// operations below: either an existing node, or a bare string that is
/// converted to a `Text` node bound to the target's owner document
/// before insertion.
pub enum NodeOrString<'a> {
    /// An already-constructed node, inserted as-is.
    Node(Node),
    /// A bare string, materialized into a `Text` node.
    Text(&'a str),
}

impl From<Node> for NodeOrString<'_> {
    fn from(node: Node) -> Self {
        NodeOrString::Node(node)
    }
}

impl<'a> From<&'a str> for NodeOrString<'a> {
    fn from(text: &'a str) -> Self {
        NodeOrString::Text(text)
    }
}

fn materialize(owner_doc_source: &Node, items: Vec<NodeOrString<'_>>) -> DomResult<Vec<Node>> {
    let owner = owner_document_of(owner_doc_source).unwrap_or_else(|| owner_doc_source.clone());
    let doc = crate::document::Document::from_node(owner);
    items
        .into_iter()
        .map(|item| match item {
            NodeOrString::Node(n) => Ok(n),
            NodeOrString::Text(s) => doc.create_text_node(s),
        })
        .collect()
}

/// `ParentNode.append(...nodes)`: insert `items` as the last children of
/// `parent`, in order.
pub fn append(parent: &Node, items: Vec<NodeOrString<'_>>) -> DomResult<()> {
    for node in materialize(parent, items) {
        let node = node?;
        let _ = append_child(parent, &node)?;
    }
    Ok(())
}

/// `ParentNode.prepend(...nodes)`: insert `items` as the first children
/// of `parent`, in order.
pub fn prepend(parent: &Node, items: Vec<NodeOrString<'_>>) -> DomResult<()> {
    let first = parent.first_child();
    for node in materialize(parent, items) {
        let node = node?;
        let _ = insert_before(parent, &node, first.as_ref())?;
    }
    Ok(())
}

/// `ParentNode.replaceChildren(...nodes)`: atomically replace all of
/// `parent`'s children with `items`.
pub fn replace_children(parent: &Node, items: Vec<NodeOrString<'_>>) -> DomResult<()> {
    let materialized = materialize(parent, items)
        .into_iter()
        .collect::<DomResult<Vec<_>>>()?;
    for child in parent.children().collect::<Vec<_>>() {
        let _ = remove_child(parent, &child)?;
    }
    for node in materialized {
        let _ = append_child(parent, &node)?;
    }
    Ok(())
}

/// `ChildNode.before(...nodes)`: insert `items` as previous siblings of
/// `node`. A no-op if `node` is currently parentless.
pub fn before(node: &Node, items: Vec<NodeOrString<'_>>) -> DomResult<()> {
    let Some(parent) = node.parent() else {
        return Ok(());
    };
    for item in materialize(node, items) {
        let item = item?;
        let _ = insert_before(&parent, &item, Some(node))?;
    }
    Ok(())
}

/// `ChildNode.after(...nodes)`: insert `items` as next siblings of
/// `node`. A no-op if `node` is currently parentless.
pub fn after(node: &Node, items: Vec<NodeOrString<'_>>) -> DomResult<()> {
    let Some(parent) = node.parent() else {
        return Ok(());
    };
    let reference = node.next_sibling();
    for item in materialize(node, items) {
        let item = item?;
        let _ = insert_before(&parent, &item, reference.as_ref())?;
    }
    Ok(())
}

/// `ChildNode.replaceWith(...nodes)`: replace `node` with `items` among
/// its siblings. A no-op if `node` is currently parentless.
pub fn replace_with(node: &Node, items: Vec<NodeOrString<'_>>) -> DomResult<()> {
    let Some(parent) = node.parent() else {
        return Ok(());
    };
    let reference = node.next_sibling();
    let had_parent_still = |n: &Node| n.parent().is_some_and(|p| p.ptr_eq(&parent));
    for item in materialize(node, items) {
        let item = item?;
        if had_parent_still(node) {
            let _ = insert_before(&parent, &item, Some(node))?;
        } else {
            let _ = insert_before(&parent, &item, reference.as_ref())?;
        }
    }
    if had_parent_still(node) {
        let _ = remove_child(&parent, node)?;
    }
    Ok(())
}

/// `ChildNode.remove()`: detach `node` from its parent. A no-op if
/// `node` is currently parentless.
pub fn remove(node: &Node) -> DomResult<()> {
    if let Some(parent) = node.parent() {
        let _ = remove_child(&parent, node)?;
    }
    Ok(())
}

fn attrs_equal(a: &[Node], b: &[Node]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|attr| {
        let attr_inner = attr.borrow();
        let NodePayload::Attr(ad) = &attr_inner.payload else {
            return false;
        };
        b.iter().any(|other| {
            let other_inner = other.borrow();
            matches!(&other_inner.payload, NodePayload::Attr(od)
                if od.local_name == ad.local_name && od.namespace == ad.namespace && od.value == ad.value)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn child_names(parent: &Node) -> Vec<String> {
        parent.children().map(|c| c.node_name()).collect()
    }

    #[test]
    fn append_accepts_nodes_and_bare_strings_in_order() {
        let doc = Document::new(None);
        let parent = doc.create_element("ul").unwrap();
        let li = doc.create_element("li").unwrap();
        append(&parent, vec![NodeOrString::Node(li), NodeOrString::Text("tail")]).unwrap();
        assert_eq!(child_names(&parent), vec!["li", "#text"]);
    }

    #[test]
    fn prepend_inserts_before_existing_first_child() {
        let doc = Document::new(None);
        let parent = doc.create_element("ul").unwrap();
        let existing = doc.create_element("li").unwrap();
        append_child(&parent, &existing).unwrap();
        prepend(&parent, vec![NodeOrString::Text("head")]).unwrap();
        assert_eq!(child_names(&parent), vec!["#text", "li"]);
    }

    #[test]
    fn replace_children_swaps_out_the_whole_child_list() {
        let doc = Document::new(None);
        let parent = doc.create_element("ul").unwrap();
        append_child(&parent, &doc.create_element("li").unwrap()).unwrap();
        append_child(&parent, &doc.create_element("li").unwrap()).unwrap();
        replace_children(&parent, vec![NodeOrString::Text("only")]).unwrap();
        assert_eq!(child_names(&parent), vec!["#text"]);
    }

    #[test]
    fn replace_child_emits_one_record_with_both_added_and_removed() {
        use crate::mutation_observer::{MutationObserver, ObserverInit};
        use std::cell::RefCell as StdRefCell;
        use std::rc::Rc;

        let doc = Document::new(None);
        let parent = doc.create_element("div").unwrap();
        let old = doc.create_element("old").unwrap();
        let new = doc.create_element("new").unwrap();
        append_child(&parent, &old).unwrap();

        let seen = Rc::new(StdRefCell::new(Vec::new()));
        let seen2 = Rc::clone(&seen);
        let observer = MutationObserver::new(move |records| {
            seen2.borrow_mut().extend(records.iter().cloned());
        });
        observer.observe(&parent, ObserverInit { child_list: true, ..Default::default() });

        replace_child(&parent, &new, &old).unwrap();
        observer.deliver();

        let records = seen.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].added_nodes.len(), 1);
        assert!(records[0].added_nodes[0].ptr_eq(&new));
        assert_eq!(records[0].removed_nodes.len(), 1);
        assert!(records[0].removed_nodes[0].ptr_eq(&old));
        assert_eq!(child_names(&parent), vec!["new"]);
    }

    #[test]
    fn replace_child_leaves_tree_unchanged_on_validation_failure() {
        let doc = Document::new(None);
        let parent = doc.create_element("div").unwrap();
        let old = doc.create_element("old").unwrap();
        append_child(&parent, &old).unwrap();

        // parent is itself a descendant of `old` once nested; replacing with
        // an inclusive ancestor of parent must fail and change nothing.
        assert!(replace_child(&parent, &doc.node().clone(), &old).is_err());
        assert_eq!(child_names(&parent), vec!["old"]);
        assert!(old.parent().is_some_and(|p| p.ptr_eq(&parent)));
    }

    #[test]
    fn before_and_after_insert_relative_to_a_sibling() {
        let doc = Document::new(None);
        let parent = doc.create_element("div").unwrap();
        let middle = doc.create_element("span").unwrap();
        append_child(&parent, &middle).unwrap();
        before(&middle, vec![NodeOrString::Text("a")]).unwrap();
        after(&middle, vec![NodeOrString::Text("b")]).unwrap();
        assert_eq!(child_names(&parent), vec!["#text", "span", "#text"]);
    }

    #[test]
    fn replace_with_swaps_a_node_for_its_replacements() {
        let doc = Document::new(None);
        let parent = doc.create_element("div").unwrap();
        let middle = doc.create_element("span").unwrap();
        append_child(&parent, &middle).unwrap();
        replace_with(&middle, vec![NodeOrString::Text("gone")]).unwrap();
        assert_eq!(child_names(&parent), vec!["#text"]);
        assert!(middle.parent().is_none());
    }

    #[test]
    fn remove_detaches_and_is_a_no_op_when_already_detached() {
        let doc = Document::new(None);
        let parent = doc.create_element("div").unwrap();
        let child = doc.create_element("span").unwrap();
        append_child(&parent, &child).unwrap();
        remove(&child).unwrap();
        assert!(child.parent().is_none());
        remove(&child).unwrap();
    }
}
