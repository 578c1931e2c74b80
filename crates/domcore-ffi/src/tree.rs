//! Tree mutation: insertion, removal, replacement, adoption, cloning,
//! and the `ParentNode`/`ChildNode` convenience operations.

use std::ffi::c_char;

use domcore::tree::NodeOrString;
use domcore::Node;

use crate::node::{borrow, c_str_to_str, into_handle, DomNodeHandle};
use crate::status_of;

/// `parent.insertBefore(node, child)`. `child` may be null to insert at
/// the end. Returns `0` on success, else a `DOM_ERROR_*` code.
///
/// # Safety
/// `parent` and `node` must be live handles; `child`, if non-null, must
/// also be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_insert_before(
    parent: DomNodeHandle,
    node: DomNodeHandle,
    child: DomNodeHandle,
) -> i32 {
    match (borrow(parent), borrow(node)) {
        (Some(p), Some(n)) => {
            status_of(domcore::tree::insert_before(p, n, borrow(child)).map(|_| ()))
        }
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `parent.appendChild(node)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `parent` and `node` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_append_child(parent: DomNodeHandle, node: DomNodeHandle) -> i32 {
    match (borrow(parent), borrow(node)) {
        (Some(p), Some(n)) => status_of(domcore::tree::append_child(p, n).map(|_| ())),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `parent.removeChild(child)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `parent` and `child` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_remove_child(parent: DomNodeHandle, child: DomNodeHandle) -> i32 {
    match (borrow(parent), borrow(child)) {
        (Some(p), Some(c)) => status_of(domcore::tree::remove_child(p, c).map(|_| ())),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `parent.replaceChild(node, child)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// All three handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_replace_child(
    parent: DomNodeHandle,
    node: DomNodeHandle,
    child: DomNodeHandle,
) -> i32 {
    match (borrow(parent), borrow(node), borrow(child)) {
        (Some(p), Some(n), Some(c)) => status_of(domcore::tree::replace_child(p, n, c).map(|_| ())),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `document.adoptNode(node)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `document` and `node` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_adopt_node(document: DomNodeHandle, node: DomNodeHandle) -> i32 {
    match (borrow(document), borrow(node)) {
        (Some(d), Some(n)) => status_of(domcore::tree::adopt_node(d, n)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// A single entry in a `DomNodeOrString` array, as passed to the
/// `ParentNode`/`ChildNode` convenience operations. When `is_text` is
/// `0`, `text` is ignored and `node` must be a live handle (not
/// consumed). When `is_text` is nonzero, `node` is ignored and `text`
/// must be a NUL-terminated UTF-8 string.
#[repr(C)]
pub struct DomNodeOrString {
    /// Nonzero if this entry carries a bare string rather than a node.
    pub is_text: u8,
    /// A borrowed node handle, used when `is_text == 0`.
    pub node: DomNodeHandle,
    /// A NUL-terminated UTF-8 string, used when `is_text != 0`.
    pub text: *const c_char,
}

unsafe fn collect_items<'a>(
    items: *const DomNodeOrString,
    count: usize,
) -> Option<Vec<NodeOrString<'a>>> {
    if items.is_null() && count > 0 {
        return None;
    }
    let slice = if count == 0 { &[] } else { std::slice::from_raw_parts(items, count) };
    slice
        .iter()
        .map(|entry| {
            if entry.is_text == 0 {
                borrow(entry.node).cloned().map(NodeOrString::Node)
            } else {
                c_str_to_str(entry.text).map(NodeOrString::Text)
            }
        })
        .collect()
}

/// `ParentNode.append(...nodes)`.
///
/// # Safety
/// `parent` must be a live handle. `items` must point to `count`
/// well-formed [`DomNodeOrString`] entries (or be null when `count` is
/// `0`); every entry's `node` handle (when `is_text == 0`) must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_append_nodes(
    parent: DomNodeHandle,
    items: *const DomNodeOrString,
    count: usize,
) -> i32 {
    match (borrow(parent), collect_items(items, count)) {
        (Some(p), Some(items)) => status_of(domcore::tree::append(p, items)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `ParentNode.prepend(...nodes)`.
///
/// # Safety
/// Same requirements as [`dom_tree_append_nodes`].
#[no_mangle]
pub unsafe extern "C" fn dom_tree_prepend_nodes(
    parent: DomNodeHandle,
    items: *const DomNodeOrString,
    count: usize,
) -> i32 {
    match (borrow(parent), collect_items(items, count)) {
        (Some(p), Some(items)) => status_of(domcore::tree::prepend(p, items)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `ParentNode.replaceChildren(...nodes)`.
///
/// # Safety
/// Same requirements as [`dom_tree_append_nodes`].
#[no_mangle]
pub unsafe extern "C" fn dom_tree_replace_children(
    parent: DomNodeHandle,
    items: *const DomNodeOrString,
    count: usize,
) -> i32 {
    match (borrow(parent), collect_items(items, count)) {
        (Some(p), Some(items)) => status_of(domcore::tree::replace_children(p, items)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `ChildNode.before(...nodes)`.
///
/// # Safety
/// Same requirements as [`dom_tree_append_nodes`], with `node` in place
/// of `parent`.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_before(
    node: DomNodeHandle,
    items: *const DomNodeOrString,
    count: usize,
) -> i32 {
    match (borrow(node), collect_items(items, count)) {
        (Some(n), Some(items)) => status_of(domcore::tree::before(n, items)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `ChildNode.after(...nodes)`.
///
/// # Safety
/// Same requirements as [`dom_tree_before`].
#[no_mangle]
pub unsafe extern "C" fn dom_tree_after(
    node: DomNodeHandle,
    items: *const DomNodeOrString,
    count: usize,
) -> i32 {
    match (borrow(node), collect_items(items, count)) {
        (Some(n), Some(items)) => status_of(domcore::tree::after(n, items)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `ChildNode.replaceWith(...nodes)`.
///
/// # Safety
/// Same requirements as [`dom_tree_before`].
#[no_mangle]
pub unsafe extern "C" fn dom_tree_replace_with(
    node: DomNodeHandle,
    items: *const DomNodeOrString,
    count: usize,
) -> i32 {
    match (borrow(node), collect_items(items, count)) {
        (Some(n), Some(items)) => status_of(domcore::tree::replace_with(n, items)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `ChildNode.remove()`.
///
/// # Safety
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_remove(node: DomNodeHandle) -> i32 {
    match borrow(node) {
        Some(n) => status_of(domcore::tree::remove(n)),
        None => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `node.isEqualNode(other)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_is_equal_node(a: DomNodeHandle, b: DomNodeHandle) -> u8 {
    match (borrow(a), borrow(b)) {
        (Some(a), Some(b)) => u8::from(domcore::tree::is_equal_node(a, b)),
        _ => 0,
    }
}

/// `node.cloneNode(deep)`. `[NewObject]`: the returned handle carries +1
/// refcount. Null on failure (e.g. cloning a document).
///
/// # Safety
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_tree_clone_node(node: DomNodeHandle, deep: u8) -> DomNodeHandle {
    match borrow(node) {
        Some(n) => domcore::tree::clone_node(n, deep != 0).map_or(std::ptr::null_mut(), into_handle),
        None => std::ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::ptr;

    use super::*;
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_node, dom_document_release};
    use crate::node::{dom_node_first_child, dom_node_node_name, dom_node_release};

    #[test]
    fn append_nodes_mixes_elements_and_text() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("li").unwrap();
            let li = dom_document_create_element(doc, tag.as_ptr());
            let text = CString::new("tail").unwrap();

            let items = [
                DomNodeOrString { is_text: 0, node: li, text: ptr::null() },
                DomNodeOrString { is_text: 1, node: ptr::null_mut(), text: text.as_ptr() },
            ];
            assert_eq!(dom_tree_append_nodes(root, items.as_ptr(), items.len()), 0);

            let first = dom_node_first_child(root);
            let name = dom_node_node_name(first);
            assert_eq!(std::ffi::CStr::from_ptr(name).to_str().unwrap(), "li");
            crate::dom_string_free(name);

            dom_node_release(first);
            dom_node_release(li);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }

    #[test]
    fn remove_detaches_a_child() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("span").unwrap();
            let child = dom_document_create_element(doc, tag.as_ptr());
            assert_eq!(dom_tree_append_child(root, child), 0);
            assert_eq!(dom_tree_remove(child), 0);
            assert!(borrow(child).unwrap().parent().is_none());

            dom_node_release(child);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }
}
