//! `CharacterData` (`Text`/`Comment`/`CDATASection`) and `Text.splitText`.

use std::ffi::c_char;
use std::ptr;

use crate::node::{borrow, c_str_to_str, into_handle, DomNodeHandle};
use crate::{status_of, to_c_string};

/// `CharacterData.data`. Null if `handle` has no character data.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_data(handle: DomNodeHandle) -> *mut c_char {
    borrow(handle).and_then(domcore::Node::character_data).map_or(ptr::null_mut(), to_c_string)
}

/// `CharacterData.length`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_length(handle: DomNodeHandle) -> usize {
    borrow(handle).and_then(domcore::Node::character_data_len).unwrap_or(0)
}

/// `CharacterData.data = value`.
///
/// # Safety
/// `handle` must be live; `value` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_set_data(handle: DomNodeHandle, value: *const c_char) -> i32 {
    let (Some(node), Some(value)) = (borrow(handle), c_str_to_str(value)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(node.set_character_data(value))
}

/// `substringData(offset, count)`. Returns an owned string; null on
/// failure (not a `CharacterData` node, or `offset` out of range).
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_substring(
    handle: DomNodeHandle,
    offset: usize,
    count: usize,
) -> *mut c_char {
    match borrow(handle).map(|n| n.substring_data(offset, count)) {
        Some(Ok(s)) => to_c_string(s),
        _ => ptr::null_mut(),
    }
}

/// `appendData(data)`. Returns `0` on success, else a `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` must be live; `data` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_append(handle: DomNodeHandle, data: *const c_char) -> i32 {
    let (Some(node), Some(data)) = (borrow(handle), c_str_to_str(data)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(node.append_character_data(data))
}

/// `insertData(offset, data)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` must be live; `data` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_insert(handle: DomNodeHandle, offset: usize, data: *const c_char) -> i32 {
    let (Some(node), Some(data)) = (borrow(handle), c_str_to_str(data)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(node.insert_character_data(offset, data))
}

/// `deleteData(offset, count)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_delete(handle: DomNodeHandle, offset: usize, count: usize) -> i32 {
    match borrow(handle) {
        Some(node) => status_of(node.delete_character_data(offset, count)),
        None => crate::DOM_ERROR_INVALID_STATE,
    }
}

/// `replaceData(offset, count, data)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` must be live; `data` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_character_data_replace(
    handle: DomNodeHandle,
    offset: usize,
    count: usize,
    data: *const c_char,
) -> i32 {
    let (Some(node), Some(data)) = (borrow(handle), c_str_to_str(data)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(node.splice_character_data(offset, count, data))
}

/// `Text.splitText(offset)`. `[NewObject]`: the returned handle carries
/// +1 refcount. Null on failure (not a `Text` node, or `offset` out of
/// range).
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_text_split_text(handle: DomNodeHandle, offset: usize) -> DomNodeHandle {
    match borrow(handle).map(|n| n.split_text(offset)) {
        Some(Ok(tail)) => into_handle(tail),
        _ => ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};

    use super::*;
    use crate::document::{dom_document_create_text_node, dom_document_new, dom_document_release};
    use crate::node::dom_node_release;

    #[test]
    fn append_and_substring_round_trip() {
        unsafe {
            let doc = dom_document_new();
            let text = CString::new("Hello").unwrap();
            let node = dom_document_create_text_node(doc, text.as_ptr());

            let more = CString::new(" World").unwrap();
            assert_eq!(dom_character_data_append(node, more.as_ptr()), 0);
            assert_eq!(dom_character_data_length(node), 11);

            let sub = dom_character_data_substring(node, 6, 5);
            assert_eq!(CStr::from_ptr(sub).to_str().unwrap(), "World");
            crate::dom_string_free(sub);

            dom_node_release(node);
            dom_document_release(doc);
        }
    }

    #[test]
    fn split_text_produces_two_nodes() {
        unsafe {
            let doc = dom_document_new();
            let text = CString::new("abcdef").unwrap();
            let node = dom_document_create_text_node(doc, text.as_ptr());

            let tail = dom_text_split_text(node, 3);
            assert!(!tail.is_null());
            assert_eq!(dom_character_data_length(node), 3);
            assert_eq!(dom_character_data_length(tail), 3);

            dom_node_release(tail);
            dom_node_release(node);
            dom_document_release(doc);
        }
    }
}
