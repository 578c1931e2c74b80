//! `Attr` nodes and the attribute-node list (`attributes`,
//! `setAttributeNode`).

use std::ffi::c_char;
use std::ptr;

use domcore::Node;

use crate::collection::{into_list_handle, DomNodeListHandle};
use crate::node::{borrow, c_str_to_str, opt_into_handle, DomNodeHandle};
use crate::{status_of, to_c_string};

/// `Attr.name`. Null if `handle` is not an attribute node.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_attr_name(handle: DomNodeHandle) -> *mut c_char {
    borrow(handle).and_then(Node::attr_name).map_or(ptr::null_mut(), to_c_string)
}

/// `Attr.value`. Null if `handle` is not an attribute node.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_attr_value(handle: DomNodeHandle) -> *mut c_char {
    borrow(handle).and_then(Node::attr_value).map_or(ptr::null_mut(), to_c_string)
}

/// `Attr.value = v`. A no-op if `handle` is not an attribute node.
///
/// # Safety
/// `handle` must be live; `value` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_attr_set_value(handle: DomNodeHandle, value: *const c_char) {
    let (Some(node), Some(value)) = (borrow(handle), c_str_to_str(value)) else {
        return;
    };
    node.set_attr_value(value);
}

/// `Attr.ownerElement`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_attr_owner_element(handle: DomNodeHandle) -> DomNodeHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| opt_into_handle(n.attr_owner_element()))
}

/// `Element.setAttributeNode(attr)`. Writes the replaced node (if any)
/// into `*replaced`, which carries +1 refcount; writes null if there was
/// none. Returns `0` on success, else a `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` and `attr` must be live; `replaced` must point to writable
/// storage for one [`DomNodeHandle`].
#[no_mangle]
pub unsafe extern "C" fn dom_element_set_attribute_node(
    handle: DomNodeHandle,
    attr: DomNodeHandle,
    replaced: *mut DomNodeHandle,
) -> i32 {
    let (Some(node), Some(attr)) = (borrow(handle), borrow(attr)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    match node.set_attribute_node(attr) {
        Ok(previous) => {
            if !replaced.is_null() {
                *replaced = opt_into_handle(previous);
            }
            crate::DOM_ERROR_OK
        }
        Err(e) => status_of(Err(e)),
    }
}

/// `Element.attributes`, snapshotted at call time.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_element_attribute_nodes(handle: DomNodeHandle) -> DomNodeListHandle {
    borrow(handle).map_or(ptr::null_mut(), |n| into_list_handle(n.attribute_nodes()))
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};

    use super::*;
    use crate::collection::{dom_node_list_free, dom_node_list_item, dom_node_list_length};
    use crate::document::{dom_document_create_attribute, dom_document_create_element, dom_document_new, dom_document_release};
    use crate::element::dom_element_has_attribute;
    use crate::node::dom_node_release;

    #[test]
    fn set_attribute_node_then_read_via_attributes() {
        unsafe {
            let doc = dom_document_new();
            let tag = CString::new("div").unwrap();
            let el = dom_document_create_element(doc, tag.as_ptr());
            let name = CString::new("data-x").unwrap();
            let attr = dom_document_create_attribute(doc, name.as_ptr());
            assert!(!attr.is_null());

            let value = CString::new("7").unwrap();
            dom_attr_set_value(attr, value.as_ptr());

            let mut replaced: DomNodeHandle = ptr::null_mut();
            assert_eq!(dom_element_set_attribute_node(el, attr, &raw mut replaced), 0);
            assert!(replaced.is_null());
            assert_eq!(dom_element_has_attribute(el, name.as_ptr()), 1);

            let list = dom_element_attribute_nodes(el);
            assert_eq!(dom_node_list_length(list), 1);
            let first = dom_node_list_item(list, 0);
            let first_name = dom_attr_name(first);
            assert_eq!(CStr::from_ptr(first_name).to_str().unwrap(), "data-x");

            crate::dom_string_free(first_name);
            dom_node_release(first);
            dom_node_list_free(list);
            dom_node_release(attr);
            dom_node_release(el);
            dom_document_release(doc);
        }
    }
}
