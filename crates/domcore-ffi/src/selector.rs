//! Compiled selector handles: `matches`, `closest`, `querySelector`, and
//! `querySelectorAll`.

use std::ffi::c_char;
use std::ptr;

use domcore_selectors::Selector;

use crate::collection::{into_list_handle, DomNodeListHandle};
use crate::node::{borrow, c_str_to_str, opt_into_handle, DomNodeHandle};

/// An opaque handle to a compiled selector list.
pub type DomSelectorHandle = *mut Selector;

/// Compile a selector string. Null on a syntax error.
///
/// # Safety
/// `input` must be a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_selector_compile(input: *const c_char) -> DomSelectorHandle {
    let Some(input) = c_str_to_str(input) else {
        return ptr::null_mut();
    };
    Selector::parse(input).map_or(ptr::null_mut(), |s| Box::into_raw(Box::new(s)))
}

/// Release a selector handle.
///
/// # Safety
/// `handle` must be a live handle returned by [`dom_selector_compile`],
/// or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_selector_free(handle: DomSelectorHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `Element.matches(selector)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_selector_matches(handle: DomSelectorHandle, node: DomNodeHandle) -> u8 {
    match (handle.as_ref(), borrow(node)) {
        (Some(selector), Some(node)) => u8::from(selector.matches(node)),
        _ => 0,
    }
}

/// `Element.closest(selector)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_selector_closest(handle: DomSelectorHandle, node: DomNodeHandle) -> DomNodeHandle {
    match (handle.as_ref(), borrow(node)) {
        (Some(selector), Some(node)) => opt_into_handle(selector.closest(node)),
        _ => ptr::null_mut(),
    }
}

/// `root.querySelector(selector)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_selector_query_first(handle: DomSelectorHandle, root: DomNodeHandle) -> DomNodeHandle {
    match (handle.as_ref(), borrow(root)) {
        (Some(selector), Some(root)) => opt_into_handle(selector.query_first(root)),
        _ => ptr::null_mut(),
    }
}

/// `root.querySelectorAll(selector)`.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_selector_query_all(handle: DomSelectorHandle, root: DomNodeHandle) -> DomNodeListHandle {
    match (handle.as_ref(), borrow(root)) {
        (Some(selector), Some(root)) => into_list_handle(selector.query_all(root)),
        _ => ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;
    use crate::collection::{dom_node_list_free, dom_node_list_length};
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_node, dom_document_release};
    use crate::element::dom_element_set_attribute;
    use crate::node::dom_node_release;

    #[test]
    fn compile_and_query_all() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("li").unwrap();
            let li = dom_document_create_element(doc, tag.as_ptr());
            let class_name = CString::new("class").unwrap();
            let class_value = CString::new("active").unwrap();
            assert_eq!(dom_element_set_attribute(li, class_name.as_ptr(), class_value.as_ptr()), 0);
            assert_eq!(crate::dom_tree_append_child(root, li), 0);

            let query = CString::new("li.active").unwrap();
            let selector = dom_selector_compile(query.as_ptr());
            assert!(!selector.is_null());
            assert_eq!(dom_selector_matches(selector, li), 1);

            let list = dom_selector_query_all(selector, root);
            assert_eq!(dom_node_list_length(list), 1);

            dom_node_list_free(list);
            dom_selector_free(selector);
            dom_node_release(li);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }

    #[test]
    fn compile_rejects_malformed_input() {
        unsafe {
            let bad = CString::new("div[").unwrap();
            assert!(dom_selector_compile(bad.as_ptr()).is_null());
        }
    }
}
