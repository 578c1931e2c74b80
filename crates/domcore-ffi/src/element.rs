//! `Element` attribute, class-list, and shadow-tree operations.

use std::ffi::c_char;
use std::ptr;

use domcore::token_list::TokenList;

use crate::node::{borrow, c_str_to_str, into_handle, opt_into_handle, DomNodeHandle};
use crate::{status_of, to_c_string};

/// `Element.tagName`.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_element_tag_name(handle: DomNodeHandle) -> *mut c_char {
    match borrow(handle).and_then(domcore::Node::tag_name) {
        Some(name) => to_c_string(name),
        None => ptr::null_mut(),
    }
}

/// `Element.getAttribute(name)`. Null if absent.
///
/// # Safety
/// `handle` must be live; `name` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_element_get_attribute(handle: DomNodeHandle, name: *const c_char) -> *mut c_char {
    let (Some(node), Some(name)) = (borrow(handle), c_str_to_str(name)) else {
        return ptr::null_mut();
    };
    node.get_attribute(name).map_or(ptr::null_mut(), to_c_string)
}

/// `Element.hasAttribute(name)`.
///
/// # Safety
/// `handle` must be live; `name` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_element_has_attribute(handle: DomNodeHandle, name: *const c_char) -> u8 {
    let (Some(node), Some(name)) = (borrow(handle), c_str_to_str(name)) else {
        return 0;
    };
    u8::from(node.has_attribute(name))
}

/// `Element.setAttribute(name, value)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` must be live; `name`/`value` NUL-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn dom_element_set_attribute(
    handle: DomNodeHandle,
    name: *const c_char,
    value: *const c_char,
) -> i32 {
    let (Some(node), Some(name), Some(value)) = (borrow(handle), c_str_to_str(name), c_str_to_str(value)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(node.set_attribute(name, value))
}

/// `Element.removeAttribute(name)`.
///
/// # Safety
/// `handle` must be live; `name` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_element_remove_attribute(handle: DomNodeHandle, name: *const c_char) {
    let (Some(node), Some(name)) = (borrow(handle), c_str_to_str(name)) else {
        return;
    };
    node.remove_attribute(name);
}

/// `ShadowRoot.MODE_OPEN`/`MODE_CLOSED` → `element.attachShadow({mode})`.
/// Returns null on failure (already has a shadow root, or not an
/// element).
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_element_attach_shadow(handle: DomNodeHandle, mode: u8) -> DomNodeHandle {
    let Some(node) = borrow(handle) else {
        return ptr::null_mut();
    };
    let mode = if mode == crate::DOM_SHADOW_MODE_CLOSED {
        domcore::node::ShadowRootMode::Closed
    } else {
        domcore::node::ShadowRootMode::Open
    };
    node.attach_shadow(mode).map_or(ptr::null_mut(), into_handle)
}

/// `Element.shadowRoot`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_element_shadow_root(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.shadow_root()))
}

/// `Element.classList.length`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_element_class_list_length(handle: DomNodeHandle) -> usize {
    borrow(handle).map_or(0, |n| TokenList::new(n.clone(), "class").length())
}

/// `Element.classList.contains(token)`.
///
/// # Safety
/// `handle` must be live; `token` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_element_class_list_contains(handle: DomNodeHandle, token: *const c_char) -> u8 {
    let (Some(node), Some(token)) = (borrow(handle), c_str_to_str(token)) else {
        return 0;
    };
    u8::from(TokenList::new(node.clone(), "class").contains(token))
}

/// `Element.classList.add(token)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` must be live; `token` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_element_class_list_add(handle: DomNodeHandle, token: *const c_char) -> i32 {
    let (Some(node), Some(token)) = (borrow(handle), c_str_to_str(token)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(TokenList::new(node.clone(), "class").add(&[token]))
}

/// `Element.classList.remove(token)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` must be live; `token` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_element_class_list_remove(handle: DomNodeHandle, token: *const c_char) -> i32 {
    let (Some(node), Some(token)) = (borrow(handle), c_str_to_str(token)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(TokenList::new(node.clone(), "class").remove(&[token]))
}

/// `Element.classList.toggle(token, force)`. `force` is `-1` for "not
/// specified", `0` for `false`, nonzero for `true`. Returns `0`/`1` for
/// the resulting presence, or a negative `DOM_ERROR_*` code on failure.
///
/// # Safety
/// `handle` must be live; `token` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_element_class_list_toggle(
    handle: DomNodeHandle,
    token: *const c_char,
    force: i32,
) -> i32 {
    let (Some(node), Some(token)) = (borrow(handle), c_str_to_str(token)) else {
        return -crate::DOM_ERROR_INVALID_STATE;
    };
    let force = if force < 0 { None } else { Some(force != 0) };
    match TokenList::new(node.clone(), "class").toggle(token, force) {
        Ok(present) => i32::from(present),
        Err(e) => -crate::error_code(&e),
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};

    use super::*;
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_release};
    use crate::node::dom_node_release;

    #[test]
    fn set_get_and_remove_attribute_round_trip() {
        unsafe {
            let doc = dom_document_new();
            let tag = CString::new("div").unwrap();
            let el = dom_document_create_element(doc, tag.as_ptr());

            let name = CString::new("data-x").unwrap();
            let value = CString::new("42").unwrap();
            assert_eq!(dom_element_set_attribute(el, name.as_ptr(), value.as_ptr()), 0);
            assert_eq!(dom_element_has_attribute(el, name.as_ptr()), 1);

            let got = dom_element_get_attribute(el, name.as_ptr());
            assert_eq!(CStr::from_ptr(got).to_str().unwrap(), "42");
            crate::dom_string_free(got);

            dom_element_remove_attribute(el, name.as_ptr());
            assert_eq!(dom_element_has_attribute(el, name.as_ptr()), 0);

            dom_node_release(el);
            dom_document_release(doc);
        }
    }

    #[test]
    fn class_list_add_toggle_and_contains() {
        unsafe {
            let doc = dom_document_new();
            let tag = CString::new("div").unwrap();
            let el = dom_document_create_element(doc, tag.as_ptr());

            let hidden = CString::new("hidden").unwrap();
            assert_eq!(dom_element_class_list_add(el, hidden.as_ptr()), 0);
            assert_eq!(dom_element_class_list_contains(el, hidden.as_ptr()), 1);
            assert_eq!(dom_element_class_list_toggle(el, hidden.as_ptr(), -1), 0);
            assert_eq!(dom_element_class_list_contains(el, hidden.as_ptr()), 0);

            dom_node_release(el);
            dom_document_release(doc);
        }
    }
}
