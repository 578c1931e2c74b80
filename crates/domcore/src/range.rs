//! `Range`: a pair of boundary points and the arithmetic to compare and
//! adjust them.
//!
//! [`Range`](https://dom.spec.whatwg.org/#interface-range),
//! [`StaticRange`](https://dom.spec.whatwg.org/#interface-staticrange)

use std::cmp::Ordering;

use crate::error::{DomException, DomResult};
use crate::node::Node;

fn child_index(node: &Node) -> usize {
    let mut index = 0;
    let mut sibling = node.previous_sibling();
    while let Some(s) = sibling {
        index += 1;
        sibling = s.previous_sibling();
    }
    index
}

/// Compare two boundary points `(a_node, a_offset)` and `(b_node,
/// b_offset)` in tree order, per the boundary-point comparison algorithm.
/// Both containers must belong to the same tree.
#[must_use]
pub fn compare_boundary_points(
    a_node: &Node,
    a_offset: usize,
    b_node: &Node,
    b_offset: usize,
) -> Ordering {
    if a_node.ptr_eq(b_node) {
        return a_offset.cmp(&b_offset);
    }

    if b_node.is_descendant_of(a_node) {
        // b's root-of-comparison lies under a's child at a_offset.
        let ancestor_in_a = b_node
            .inclusive_ancestors()
            .find(|n| n.parent().is_some_and(|p| p.ptr_eq(a_node)));
        if let Some(child) = ancestor_in_a {
            let idx = child_index(&child);
            return if idx < a_offset { Ordering::Less } else { Ordering::Greater };
        }
    }

    if a_node.is_descendant_of(b_node) {
        let ancestor_in_b = a_node
            .inclusive_ancestors()
            .find(|n| n.parent().is_some_and(|p| p.ptr_eq(b_node)));
        if let Some(child) = ancestor_in_b {
            let idx = child_index(&child);
            return if idx < b_offset { Ordering::Greater } else { Ordering::Less };
        }
    }

    // Disjoint subtrees: order by their respective ancestor chain
    // against a common ancestor, found by tree order of the whole
    // document. Falls back to comparing node identity via the root
    // document's tree order.
    let root = a_node.inclusive_ancestors().last();
    match root {
        Some(root) => {
            let order: Vec<Node> = root.tree_order_descendants().collect();
            let a_pos = order.iter().position(|n| n.ptr_eq(a_node));
            let b_pos = order.iter().position(|n| n.ptr_eq(b_node));
            a_pos.cmp(&b_pos)
        }
        None => Ordering::Equal,
    }
}

/// `Range.START_TO_START`
pub const START_TO_START: i16 = 0;
/// `Range.START_TO_END`
pub const START_TO_END: i16 = 1;
/// `Range.END_TO_END`
pub const END_TO_END: i16 = 2;
/// `Range.END_TO_START`
pub const END_TO_START: i16 = 3;

/// A live range between two boundary points.
#[derive(Clone)]
pub struct Range {
    start_container: Node,
    start_offset: usize,
    end_container: Node,
    end_offset: usize,
}

impl Range {
    /// Construct a collapsed range at the start of `node`'s document (or
    /// at `node` itself if it has no owner document, e.g. the document
    /// node).
    #[must_use]
    pub fn new(node: Node) -> Self {
        Self {
            start_container: node.clone(),
            start_offset: 0,
            end_container: node,
            end_offset: 0,
        }
    }

    #[must_use]
    pub fn start_container(&self) -> Node {
        self.start_container.clone()
    }

    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    #[must_use]
    pub fn end_container(&self) -> Node {
        self.end_container.clone()
    }

    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    #[must_use]
    pub fn collapsed(&self) -> bool {
        self.start_container.ptr_eq(&self.end_container) && self.start_offset == self.end_offset
    }

    /// `setStart(node, offset)`.
    pub fn set_start(&mut self, node: Node, offset: usize) -> DomResult<()> {
        if compare_boundary_points(&node, offset, &self.end_container, self.end_offset) == Ordering::Greater {
            self.end_container = node.clone();
            self.end_offset = offset;
        }
        self.start_container = node;
        self.start_offset = offset;
        Ok(())
    }

    /// `setEnd(node, offset)`.
    pub fn set_end(&mut self, node: Node, offset: usize) -> DomResult<()> {
        if compare_boundary_points(&node, offset, &self.start_container, self.start_offset) == Ordering::Less {
            self.start_container = node.clone();
            self.start_offset = offset;
        }
        self.end_container = node;
        self.end_offset = offset;
        Ok(())
    }

    /// `collapse(toStart)`.
    pub fn collapse(&mut self, to_start: bool) {
        if to_start {
            self.end_container = self.start_container.clone();
            self.end_offset = self.start_offset;
        } else {
            self.start_container = self.end_container.clone();
            self.start_offset = self.end_offset;
        }
    }

    /// `selectNode(node)`: the range spans exactly `node` as a child of
    /// its parent.
    pub fn select_node(&mut self, node: &Node) -> DomResult<()> {
        let parent = node
            .parent()
            .ok_or_else(|| DomException::InvalidState("node has no parent".to_string()))?;
        let index = child_index(node);
        self.start_container = parent.clone();
        self.start_offset = index;
        self.end_container = parent;
        self.end_offset = index + 1;
        Ok(())
    }

    /// `selectNodeContents(node)`: the range spans all of `node`'s
    /// children.
    pub fn select_node_contents(&mut self, node: &Node) {
        self.start_container = node.clone();
        self.start_offset = 0;
        self.end_container = node.clone();
        self.end_offset = node.children().count();
    }

    /// `cloneRange()`.
    #[must_use]
    pub fn clone_range(&self) -> Self {
        self.clone()
    }

    /// `comparePoint(node, offset)`: -1, 0, or 1 relative to this range.
    ///
    /// # Errors
    /// `InvalidState` if `node`'s root is not the same as the range's.
    pub fn compare_point(&self, node: &Node, offset: usize) -> DomResult<i16> {
        if compare_boundary_points(node, offset, &self.start_container, self.start_offset) == Ordering::Less {
            return Ok(-1);
        }
        if compare_boundary_points(node, offset, &self.end_container, self.end_offset) == Ordering::Greater {
            return Ok(1);
        }
        Ok(0)
    }

    /// The deepest node that contains both boundary points.
    #[must_use]
    pub fn common_ancestor_container(&self) -> Node {
        if self.start_container.ptr_eq(&self.end_container) {
            return self.start_container.clone();
        }
        for ancestor in self.start_container.inclusive_ancestors() {
            if ancestor.is_inclusive_ancestor_of(&self.end_container) {
                return ancestor;
            }
        }
        self.start_container.clone()
    }

    /// `compareBoundaryPoints(how, sourceRange)`.
    ///
    /// # Errors
    /// `InvalidState` if `how` is not one of the four comparison constants.
    pub fn compare_boundary_points_with(&self, how: i16, other: &Range) -> DomResult<i16> {
        let (this_node, this_offset, other_node, other_offset) = match how {
            START_TO_START => (&self.start_container, self.start_offset, &other.start_container, other.start_offset),
            START_TO_END => (&self.end_container, self.end_offset, &other.start_container, other.start_offset),
            END_TO_END => (&self.end_container, self.end_offset, &other.end_container, other.end_offset),
            END_TO_START => (&self.start_container, self.start_offset, &other.end_container, other.end_offset),
            _ => return Err(DomException::InvalidState(format!("unsupported compareBoundaryPoints how={how}"))),
        };
        Ok(match compare_boundary_points(this_node, this_offset, other_node, other_offset) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        })
    }

    /// `isPointInRange(node, offset)`.
    pub fn is_point_in_range(&self, node: &Node, offset: usize) -> DomResult<bool> {
        Ok(self.compare_point(node, offset)? == 0)
    }

    /// `intersectsNode(node)`: whether any part of `node` lies within
    /// this range.
    #[must_use]
    pub fn intersects_node(&self, node: &Node) -> bool {
        let Some(parent) = node.parent() else {
            return node.ptr_eq(&self.start_container)
                || node.is_descendant_of(&self.start_container)
                || node.is_descendant_of(&self.end_container);
        };
        let index = child_index(node);
        let before_end =
            compare_boundary_points(&parent, index, &self.end_container, self.end_offset) != Ordering::Greater;
        let after_start =
            compare_boundary_points(&parent, index + 1, &self.start_container, self.start_offset) != Ordering::Less;
        before_end && after_start
    }
}

/// An immutable snapshot of a range's boundary points, taken at
/// construction time and never updated as the tree mutates.
#[derive(Clone)]
pub struct StaticRange {
    /// The node holding the start boundary point.
    pub start_container: Node,
    /// The offset of the start boundary point within `start_container`.
    pub start_offset: usize,
    /// The node holding the end boundary point.
    pub end_container: Node,
    /// The offset of the end boundary point within `end_container`.
    pub end_offset: usize,
}

impl From<&Range> for StaticRange {
    fn from(range: &Range) -> Self {
        Self {
            start_container: range.start_container(),
            start_offset: range.start_offset(),
            end_container: range.end_container(),
            end_offset: range.end_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn select_node_spans_single_child_slot() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        crate::tree::append_child(&root, &a).unwrap();
        crate::tree::append_child(&root, &b).unwrap();

        let mut range = Range::new(root.clone());
        range.select_node(&b).unwrap();
        assert!(range.start_container().ptr_eq(&root));
        assert_eq!(range.start_offset(), 1);
        assert_eq!(range.end_offset(), 2);
        assert!(!range.collapsed());
    }

    #[test]
    fn collapse_to_start_equates_boundaries() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let mut range = Range::new(root);
        range.set_end(range.start_container(), 3).unwrap();
        range.collapse(true);
        assert!(range.collapsed());
    }

    #[test]
    fn compare_boundary_points_with_start_to_start() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        crate::tree::append_child(&root, &a).unwrap();
        crate::tree::append_child(&root, &b).unwrap();

        let mut first = Range::new(root.clone());
        first.select_node(&a).unwrap();
        let mut second = Range::new(root);
        second.select_node(&b).unwrap();

        assert_eq!(first.compare_boundary_points_with(START_TO_START, &second).unwrap(), -1);
        assert_eq!(second.compare_boundary_points_with(START_TO_START, &first).unwrap(), 1);
    }

    #[test]
    fn intersects_node_detects_overlap() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        crate::tree::append_child(&root, &a).unwrap();
        crate::tree::append_child(&root, &b).unwrap();

        let mut range = Range::new(root);
        range.select_node(&a).unwrap();
        assert!(range.intersects_node(&a));
        assert!(!range.intersects_node(&b));
    }
}
