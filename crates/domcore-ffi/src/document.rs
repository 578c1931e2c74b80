//! Document lifecycle and node-factory operations.

use std::ffi::c_char;
use std::ptr;

use domcore::document::Document;

use crate::node::{c_str_to_str, into_handle, opt_into_handle, DomNodeHandle};

/// An opaque handle to a document. Distinct from [`DomNodeHandle`]
/// because most document-scoped operations (the `createX` factories,
/// `getElementById`) need the factory wrapper, not just the bare node;
/// [`dom_document_node`] recovers the underlying node handle.
pub type DomDocumentHandle = *mut Document;

unsafe fn borrow_doc<'a>(handle: *const Document) -> Option<&'a Document> {
    handle.as_ref()
}

/// `new Document()`. The returned handle carries +1 refcount.
#[no_mangle]
pub extern "C" fn dom_document_new() -> DomDocumentHandle {
    Box::into_raw(Box::new(Document::new(None)))
}

/// Release a document handle returned by [`dom_document_new`] or
/// [`dom_document_from_node`].
///
/// # Safety
/// `handle` must be a live document handle, or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_document_release(handle: DomDocumentHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// The document's own node handle (`[DOM_DOCUMENT_NODE]`).
///
/// # Safety
/// `handle` must be a live document handle.
#[no_mangle]
pub unsafe extern "C" fn dom_document_node(handle: DomDocumentHandle) -> DomNodeHandle {
    borrow_doc(handle).map_or(ptr::null_mut(), |d| into_handle(domcore::acquire(d.node())))
}

/// Re-wrap a node handle known to carry a `Document` payload (e.g. one
/// obtained via [`dom_node_owner_document`](crate::dom_node_owner_document))
/// back into a document handle with its factory methods. The caller
/// still owns `node`; this does not consume it.
///
/// # Safety
/// `node` must be a live handle whose node type is `DOM_DOCUMENT_NODE`.
/// Passing a handle of any other node type is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn dom_document_from_node(node: DomNodeHandle) -> DomDocumentHandle {
    match node.as_ref() {
        Some(n) if n.node_type() == domcore::node::DOCUMENT_NODE => {
            Box::into_raw(Box::new(Document::from_node(domcore::acquire(n))))
        }
        _ => ptr::null_mut(),
    }
}

/// `document.createElement(localName)`. Null on `InvalidCharacterError`
/// or quota exhaustion.
///
/// # Safety
/// `handle` must be live; `local_name` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_element(
    handle: DomDocumentHandle,
    local_name: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(local_name)) = (borrow_doc(handle), c_str_to_str(local_name)) else {
        return ptr::null_mut();
    };
    doc.create_element(local_name).map_or(ptr::null_mut(), into_handle)
}

/// `document.createElementNS(namespace, qualifiedName)`. `namespace`
/// may be null for the null namespace.
///
/// # Safety
/// `handle` must be live; `namespace` (if non-null) and `qualified_name`
/// must be NUL-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_element_ns(
    handle: DomDocumentHandle,
    namespace: *const c_char,
    qualified_name: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(qualified_name)) = (borrow_doc(handle), c_str_to_str(qualified_name)) else {
        return ptr::null_mut();
    };
    let namespace = c_str_to_str(namespace);
    doc.create_element_ns(namespace, qualified_name).map_or(ptr::null_mut(), into_handle)
}

/// `document.createTextNode(data)`.
///
/// # Safety
/// `handle` must be live; `data` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_text_node(
    handle: DomDocumentHandle,
    data: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(data)) = (borrow_doc(handle), c_str_to_str(data)) else {
        return ptr::null_mut();
    };
    doc.create_text_node(data).map_or(ptr::null_mut(), into_handle)
}

/// `document.createComment(data)`.
///
/// # Safety
/// `handle` must be live; `data` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_comment(
    handle: DomDocumentHandle,
    data: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(data)) = (borrow_doc(handle), c_str_to_str(data)) else {
        return ptr::null_mut();
    };
    doc.create_comment(data).map_or(ptr::null_mut(), into_handle)
}

/// `document.createCDATASection(data)`.
///
/// # Safety
/// `handle` must be live; `data` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_cdata_section(
    handle: DomDocumentHandle,
    data: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(data)) = (borrow_doc(handle), c_str_to_str(data)) else {
        return ptr::null_mut();
    };
    doc.create_cdata_section(data).map_or(ptr::null_mut(), into_handle)
}

/// `document.createDocumentFragment()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_document_fragment(handle: DomDocumentHandle) -> DomNodeHandle {
    borrow_doc(handle).map_or(ptr::null_mut(), |doc| {
        doc.create_document_fragment().map_or(ptr::null_mut(), into_handle)
    })
}

/// `document.createProcessingInstruction(target, data)`.
///
/// # Safety
/// `handle` must be live; `target`/`data` NUL-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_processing_instruction(
    handle: DomDocumentHandle,
    target: *const c_char,
    data: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(target), Some(data)) =
        (borrow_doc(handle), c_str_to_str(target), c_str_to_str(data))
    else {
        return ptr::null_mut();
    };
    doc.create_processing_instruction(target, data).map_or(ptr::null_mut(), into_handle)
}

/// `document.createAttribute(localName)`.
///
/// # Safety
/// `handle` must be live; `local_name` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_document_create_attribute(
    handle: DomDocumentHandle,
    local_name: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(local_name)) = (borrow_doc(handle), c_str_to_str(local_name)) else {
        return ptr::null_mut();
    };
    doc.create_attribute(local_name).map_or(ptr::null_mut(), into_handle)
}

/// `document.getElementById(id)`.
///
/// # Safety
/// `handle` must be live; `id` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_document_get_element_by_id(
    handle: DomDocumentHandle,
    id: *const c_char,
) -> DomNodeHandle {
    let (Some(doc), Some(id)) = (borrow_doc(handle), c_str_to_str(id)) else {
        return ptr::null_mut();
    };
    opt_into_handle(doc.get_element_by_id(id))
}

/// `document.adoptNode(node)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// Both handles must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_document_adopt_node(handle: DomDocumentHandle, node: DomNodeHandle) -> i32 {
    match (borrow_doc(handle), node.as_ref()) {
        (Some(doc), Some(n)) => crate::status_of(domcore::tree::adopt_node(doc.node(), n)),
        _ => crate::DOM_ERROR_INVALID_STATE,
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;
    use crate::node::{dom_node_is_same_node, dom_node_release};

    #[test]
    fn create_element_then_get_by_id() {
        unsafe {
            let doc = dom_document_new();
            let tag = CString::new("div").unwrap();
            let el = dom_document_create_element(doc, tag.as_ptr());
            assert!(!el.is_null());

            let id_name = CString::new("id").unwrap();
            let id_value = CString::new("root").unwrap();
            assert_eq!(
                crate::dom_element_set_attribute(el, id_name.as_ptr(), id_value.as_ptr()),
                0
            );

            let root_node = dom_document_node(doc);
            assert_eq!(crate::dom_tree_append_child(root_node, el), 0);

            let query = CString::new("root").unwrap();
            let found = dom_document_get_element_by_id(doc, query.as_ptr());
            assert!(!found.is_null());
            assert_eq!(dom_node_is_same_node(found, el), 1);

            dom_node_release(found);
            dom_node_release(el);
            dom_node_release(root_node);
            dom_document_release(doc);
        }
    }
}
