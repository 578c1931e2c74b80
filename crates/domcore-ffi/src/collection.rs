//! Node collections (`NodeList`/`HTMLCollection`-style) crossing the
//! C-ABI boundary as owned snapshots.
//!
//! The in-process `FilteredCollection` is generic over its predicate
//! closure and recomputes itself lazily against the document's mutation
//! generation; neither of those is expressible as a stable C type. This
//! layer instead hands back a boxed `Vec<Node>` snapshot taken at call
//! time — callers that need a live view must re-query.

use std::ptr;

use domcore::Node;

use crate::node::{borrow, into_handle, DomNodeHandle};

/// An opaque, owned snapshot of a node sequence (`querySelectorAll`,
/// `getElementsByTagName`, a `TreeWalker`/`Range` result set, ...).
pub struct DomNodeList(Vec<Node>);

/// An opaque handle to a [`DomNodeList`].
pub type DomNodeListHandle = *mut DomNodeList;

pub(crate) fn into_list_handle(nodes: Vec<Node>) -> DomNodeListHandle {
    Box::into_raw(Box::new(DomNodeList(nodes)))
}

/// Release a node-list handle.
///
/// # Safety
/// `handle` must be a live handle previously returned by this module, or
/// null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_node_list_free(handle: DomNodeListHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `NodeList.length`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_list_length(handle: DomNodeListHandle) -> usize {
    handle.as_ref().map_or(0, |l| l.0.len())
}

/// `NodeList.item(index)`. The returned handle carries +1 refcount; null
/// if `index` is out of range.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_node_list_item(handle: DomNodeListHandle, index: usize) -> DomNodeHandle {
    handle
        .as_ref()
        .and_then(|l| l.0.get(index))
        .map_or(ptr::null_mut(), |n| into_handle(domcore::acquire(n)))
}

/// `Element.getElementsByTagName(qualifiedName)`, snapshotted at call
/// time.
///
/// # Safety
/// `root` must be live; `qualified_name` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_collection_elements_by_tag_name(
    root: DomNodeHandle,
    qualified_name: *const std::ffi::c_char,
) -> DomNodeListHandle {
    let (Some(root), Some(qualified_name)) = (borrow(root), crate::node::c_str_to_str(qualified_name)) else {
        return ptr::null_mut();
    };
    into_list_handle(domcore::collection::elements_by_tag_name(root.clone(), qualified_name).to_vec())
}

/// `Element.getElementsByClassName(names)`, snapshotted at call time.
///
/// # Safety
/// `root` must be live; `names` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_collection_elements_by_class_name(
    root: DomNodeHandle,
    names: *const std::ffi::c_char,
) -> DomNodeListHandle {
    let (Some(root), Some(names)) = (borrow(root), crate::node::c_str_to_str(names)) else {
        return ptr::null_mut();
    };
    into_list_handle(domcore::collection::elements_by_class_name(root.clone(), names).to_vec())
}

/// `Node.childNodes`, snapshotted at call time.
///
/// # Safety
/// `root` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_collection_child_nodes(root: DomNodeHandle) -> DomNodeListHandle {
    match borrow(root) {
        Some(root) => into_list_handle(domcore::collection::ChildNodeList::new(root.clone()).to_vec()),
        None => ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_node, dom_document_release};
    use crate::node::dom_node_release;

    #[test]
    fn elements_by_tag_name_snapshot() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("a").unwrap();
            let a1 = dom_document_create_element(doc, tag.as_ptr());
            let a2 = dom_document_create_element(doc, tag.as_ptr());
            assert_eq!(crate::dom_tree_append_child(root, a1), 0);
            assert_eq!(crate::dom_tree_append_child(root, a2), 0);

            let query = CString::new("a").unwrap();
            let list = dom_collection_elements_by_tag_name(root, query.as_ptr());
            assert_eq!(dom_node_list_length(list), 2);
            let first = dom_node_list_item(list, 0);
            assert!(!first.is_null());

            dom_node_release(first);
            dom_node_list_free(list);
            dom_node_release(a1);
            dom_node_release(a2);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }
}
