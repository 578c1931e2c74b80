//! `NodeIterator` and `TreeWalker`, with an FFI-compatible `NodeFilter`.
//!
//! A `NodeFilter` is a single-method callback interface on the other
//! side of this boundary; there is no identity to preserve across calls
//! the way event listeners need for removal, so construction just wraps
//! the callback once and keeps it alive for the traversal object's
//! lifetime.

use std::ffi::c_void;
use std::ptr;
use std::rc::Rc;

use domcore::flags::WhatToShow;
use domcore::traversal::{NodeFilterFn, NodeIterator, TreeWalker};
use domcore::Node;

use crate::node::{borrow, into_handle, opt_into_handle, DomNodeHandle};

/// `NodeFilter.acceptNode(node)`. Must return one of
/// `DOM_FILTER_ACCEPT`/`DOM_FILTER_REJECT`/`DOM_FILTER_SKIP`.
pub type DomNodeFilterCallback = unsafe extern "C" fn(*const Node, *mut c_void) -> i16;

struct SendableData(*mut c_void);

#[allow(unsafe_code)]
unsafe impl Send for SendableData {}
#[allow(unsafe_code)]
unsafe impl Sync for SendableData {}

unsafe fn make_filter(callback: Option<DomNodeFilterCallback>, user_data: *mut c_void) -> Option<NodeFilterFn> {
    let callback = callback?;
    let data = SendableData(user_data);
    let filter: NodeFilterFn = Rc::new(move |node: &Node| callback(ptr::from_ref(node), data.0));
    Some(filter)
}

/// An opaque handle to a [`NodeIterator`].
pub type DomNodeIteratorHandle = *mut NodeIterator;
/// An opaque handle to a [`TreeWalker`].
pub type DomTreeWalkerHandle = *mut TreeWalker;

/// `document.createNodeIterator(root, whatToShow, filter)`. `callback`
/// may be null to accept every node matching `what_to_show`.
///
/// # Safety
/// `root` must be live. `callback`, if non-null, must remain valid for
/// as long as the returned iterator is used, and must be safe to call
/// with any live node handle and `user_data`.
#[no_mangle]
pub unsafe extern "C" fn dom_node_iterator_new(
    root: DomNodeHandle,
    what_to_show: u32,
    callback: Option<DomNodeFilterCallback>,
    user_data: *mut c_void,
) -> DomNodeIteratorHandle {
    let Some(root) = borrow(root) else {
        return ptr::null_mut();
    };
    let filter = make_filter(callback, user_data);
    let mask = WhatToShow::from_bits_truncate(what_to_show);
    Box::into_raw(Box::new(NodeIterator::new(root.clone(), mask, filter)))
}

/// Release a node-iterator handle.
///
/// # Safety
/// `handle` must be a live handle returned by [`dom_node_iterator_new`],
/// or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_node_iterator_free(handle: DomNodeIteratorHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `NodeIterator.nextNode()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_node_iterator_next_node(handle: DomNodeIteratorHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |it| opt_into_handle(it.next_node()))
}

/// `NodeIterator.previousNode()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_node_iterator_previous_node(handle: DomNodeIteratorHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |it| opt_into_handle(it.previous_node()))
}

/// `document.createTreeWalker(root, whatToShow, filter)`. `callback` may
/// be null to accept every node matching `what_to_show`.
///
/// # Safety
/// Same requirements as [`dom_node_iterator_new`].
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_new(
    root: DomNodeHandle,
    what_to_show: u32,
    callback: Option<DomNodeFilterCallback>,
    user_data: *mut c_void,
) -> DomTreeWalkerHandle {
    let Some(root) = borrow(root) else {
        return ptr::null_mut();
    };
    let filter = make_filter(callback, user_data);
    let mask = WhatToShow::from_bits_truncate(what_to_show);
    Box::into_raw(Box::new(TreeWalker::new(root.clone(), mask, filter)))
}

/// Release a tree-walker handle.
///
/// # Safety
/// `handle` must be a live handle returned by [`dom_tree_walker_new`], or
/// null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_free(handle: DomTreeWalkerHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `TreeWalker.currentNode`. `[NewObject]`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_current_node(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |w| into_handle(w.current_node()))
}

/// `TreeWalker.currentNode = node`.
///
/// # Safety
/// `handle` and `node` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_set_current_node(handle: DomTreeWalkerHandle, node: DomNodeHandle) {
    let (Some(walker), Some(node)) = (handle.as_mut(), borrow(node)) else {
        return;
    };
    walker.set_current_node(node.clone());
}

/// `TreeWalker.parentNode()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_parent_node(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |w| opt_into_handle(w.parent_node()))
}

/// `TreeWalker.firstChild()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_first_child(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |w| opt_into_handle(w.first_child()))
}

/// `TreeWalker.lastChild()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_last_child(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |w| opt_into_handle(w.last_child()))
}

/// `TreeWalker.nextSibling()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_next_sibling(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |w| opt_into_handle(w.next_sibling()))
}

/// `TreeWalker.previousSibling()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_previous_sibling(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |w| opt_into_handle(w.previous_sibling()))
}

/// `TreeWalker.nextNode()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_next_node(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |w| opt_into_handle(w.next_node()))
}

/// `TreeWalker.previousNode()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_walker_previous_node(handle: DomTreeWalkerHandle) -> DomNodeHandle {
    handle.as_mut().map_or(ptr::null_mut(), |w| opt_into_handle(w.previous_node()))
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_node, dom_document_release};
    use crate::node::{dom_node_is_same_node, dom_node_release};

    #[test]
    fn node_iterator_walks_elements_in_order() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("li").unwrap();
            let a = dom_document_create_element(doc, tag.as_ptr());
            let b = dom_document_create_element(doc, tag.as_ptr());
            assert_eq!(crate::dom_tree_append_child(root, a), 0);
            assert_eq!(crate::dom_tree_append_child(root, b), 0);

            let it = dom_node_iterator_new(root, crate::DOM_SHOW_ELEMENT, None, ptr::null_mut());
            let first = dom_node_iterator_next_node(it);
            assert_eq!(dom_node_is_same_node(first, a), 1);
            let second = dom_node_iterator_next_node(it);
            assert_eq!(dom_node_is_same_node(second, b), 1);
            assert!(dom_node_iterator_next_node(it).is_null());

            dom_node_release(first);
            dom_node_release(second);
            dom_node_iterator_free(it);
            dom_node_release(a);
            dom_node_release(b);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }

    #[test]
    fn tree_walker_next_node_is_preorder() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("li").unwrap();
            let a = dom_document_create_element(doc, tag.as_ptr());
            let b = dom_document_create_element(doc, tag.as_ptr());
            assert_eq!(crate::dom_tree_append_child(root, a), 0);
            assert_eq!(crate::dom_tree_append_child(a, b), 0);

            let walker = dom_tree_walker_new(root, crate::DOM_SHOW_ALL, None, ptr::null_mut());
            let first = dom_tree_walker_next_node(walker);
            assert_eq!(dom_node_is_same_node(first, a), 1);
            let second = dom_tree_walker_next_node(walker);
            assert_eq!(dom_node_is_same_node(second, b), 1);
            assert!(dom_tree_walker_next_node(walker).is_null());

            dom_node_release(first);
            dom_node_release(second);
            dom_tree_walker_free(walker);
            dom_node_release(a);
            dom_node_release(b);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }
}
