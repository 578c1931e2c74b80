//! Generic `Node` navigation and data-model accessors.

use std::ffi::{c_char, CStr};
use std::ptr;

use domcore::Node;

use crate::{status_of, to_c_string};

/// An opaque handle to a node. Never dereferenced by callers.
pub type DomNodeHandle = *mut Node;

pub(crate) unsafe fn borrow<'a>(handle: *const Node) -> Option<&'a Node> {
    handle.as_ref()
}

pub(crate) fn into_handle(node: Node) -> DomNodeHandle {
    Box::into_raw(Box::new(node))
}

pub(crate) fn opt_into_handle(node: Option<Node>) -> DomNodeHandle {
    node.map_or(ptr::null_mut(), into_handle)
}

/// `dom_node_addref(handle)`. Returns a new handle to the same
/// underlying node with an incremented strong reference count.
///
/// # Safety
/// `handle` must be a live handle, or null (returns null).
#[no_mangle]
pub unsafe extern "C" fn dom_node_addref(handle: DomNodeHandle) -> DomNodeHandle {
    match borrow(handle) {
        Some(node) => into_handle(domcore::acquire(node)),
        None => ptr::null_mut(),
    }
}

/// `dom_node_release(handle)`. Consumes `handle`; a no-op on null.
///
/// # Safety
/// `handle` must be a handle this module previously returned, not
/// already released, or null.
#[no_mangle]
pub unsafe extern "C" fn dom_node_release(handle: DomNodeHandle) {
    if !handle.is_null() {
        domcore::release(*Box::from_raw(handle));
    }
}

/// `Node.nodeType`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_node_type(handle: DomNodeHandle) -> u16 {
    borrow(handle).map_or(0, Node::node_type)
}

/// `Node.nodeName`. Returns an owned string; free with [`crate::dom_string_free`].
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_node_name(handle: DomNodeHandle) -> *mut c_char {
    match borrow(handle) {
        Some(node) => to_c_string(node.node_name()),
        None => ptr::null_mut(),
    }
}

/// `Node.nodeValue`. Returns null if the node has no node value (not an
/// error — e.g. `Element` and `Document`).
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_node_value(handle: DomNodeHandle) -> *mut c_char {
    match borrow(handle).and_then(Node::node_value) {
        Some(v) => to_c_string(v),
        None => ptr::null_mut(),
    }
}

/// `Node.nodeValue = value`.
///
/// # Safety
/// `handle` and `value` must be valid; `value` must be a NUL-terminated
/// UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn dom_node_set_node_value(handle: DomNodeHandle, value: *const c_char) {
    let (Some(node), Some(value)) = (borrow(handle), c_str_to_str(value)) else {
        return;
    };
    node.set_node_value(value);
}

/// `Node.textContent`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_text_content(handle: DomNodeHandle) -> *mut c_char {
    match borrow(handle).and_then(Node::text_content) {
        Some(v) => to_c_string(v),
        None => ptr::null_mut(),
    }
}

/// `Node.textContent = value`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` and `value` must be valid.
#[no_mangle]
pub unsafe extern "C" fn dom_node_set_text_content(handle: DomNodeHandle, value: *const c_char) -> i32 {
    let (Some(node), Some(value)) = (borrow(handle), c_str_to_str(value)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(node.set_text_content(value))
}

/// `Node.parentNode`. Borrowed handle; the caller does not own a
/// reference unless it calls [`dom_node_addref`].
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_parent_node(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.parent()))
}

/// `Node.firstChild`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_first_child(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.first_child()))
}

/// `Node.lastChild`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_last_child(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.last_child()))
}

/// `Node.previousSibling`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_previous_sibling(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.previous_sibling()))
}

/// `Node.nextSibling`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_next_sibling(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.next_sibling()))
}

/// `Node.ownerDocument`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_owner_document(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.owner_document()))
}

/// `Node.isConnected`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_is_connected(handle: DomNodeHandle) -> u8 {
    u8::from(borrow(handle).is_some_and(Node::is_connected))
}

/// `Node.isSameNode(other)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_node_is_same_node(handle: DomNodeHandle, other: DomNodeHandle) -> u8 {
    match (borrow(handle), borrow(other)) {
        (Some(a), Some(b)) => u8::from(a.is_same_node(b)),
        _ => 0,
    }
}

/// `Node.isEqualNode(other)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_node_is_equal_node(handle: DomNodeHandle, other: DomNodeHandle) -> u8 {
    match (borrow(handle), borrow(other)) {
        (Some(a), Some(b)) => u8::from(domcore::tree::is_equal_node(a, b)),
        _ => 0,
    }
}

/// `Node.contains(other)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_node_contains(handle: DomNodeHandle, other: DomNodeHandle) -> u8 {
    match (borrow(handle), borrow(other)) {
        (Some(a), Some(b)) => u8::from(a.is_inclusive_ancestor_of(b)),
        _ => 0,
    }
}

/// `Node.cloneNode(deep)`. `[NewObject]`: the returned handle carries +1
/// refcount. Null on failure.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_clone_node(handle: DomNodeHandle, deep: u8) -> DomNodeHandle {
    match borrow(handle) {
        Some(node) => domcore::tree::clone_node(node, deep != 0).map_or(ptr::null_mut(), into_handle),
        None => ptr::null_mut(),
    }
}

pub(crate) unsafe fn c_str_to_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;
    use crate::{dom_document_create_element, dom_document_new, dom_document_node, dom_tree_append_child};

    #[test]
    fn node_name_and_release_round_trip() {
        unsafe {
            let doc = dom_document_new();
            let tag = CString::new("p").unwrap();
            let el = dom_document_create_element(doc, tag.as_ptr());
            assert!(!el.is_null());

            let name = dom_node_node_name(el);
            assert_eq!(CStr::from_ptr(name).to_str().unwrap(), "p");
            crate::dom_string_free(name);

            dom_node_release(el);
            dom_node_release(dom_document_node(doc));
        }
    }

    #[test]
    fn parent_child_navigation_after_append() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("child").unwrap();
            let child = dom_document_create_element(doc, tag.as_ptr());
            assert_eq!(dom_tree_append_child(root, child), 0);

            let parent = dom_node_parent_node(child);
            assert_eq!(dom_node_is_same_node(parent, root), 1);

            dom_node_release(parent);
            dom_node_release(child);
            dom_node_release(root);
        }
    }
}
