//! C-ABI surface for embedding the DOM engine in a host runtime.
//!
//! Every DOM entity crosses this boundary as an opaque, pointer-sized
//! handle (`*mut domcore::Node`, or a small wrapper struct for things
//! with no natural `Node` representation, such as selectors and
//! node lists). Handles are never dereferenced by callers; every
//! function here is the only code allowed to turn a handle back into a
//! live Rust value. Functions are named `dom_<interface>_<operation>`
//! in lower_snake_case, per the host binding's calling convention.
//!
//! String convention: every string crossing the boundary is UTF-8,
//! NUL-terminated `*const c_char` / owned `*mut c_char`. Returned owned
//! strings must be released with [`dom_string_free`].
//!
//! Error convention: functions returning `i32` return `0` on success and
//! one of the `DOM_ERROR_*` codes on failure. Functions returning a
//! handle return null on failure.
//!
//! Refcounting: because a [`domcore::Node`] handle *is* a clone of its
//! internal `Rc`, every handle this crate hands back — including
//! accessors like `dom_node_parent_node` — already holds a live strong
//! reference, not a borrow into someone else's. Callers must release
//! every handle they receive, including ones the interface spec would
//! otherwise call "borrowed"; `dom_node_addref`/`dom_node_release`
//! remain available for the cases where a caller wants to mint an
//! additional independent handle to the same node.

mod attr;
mod character_data;
mod collection;
mod document;
mod element;
mod event;
mod mutation_observer;
mod node;
mod range;
mod selector;
mod traversal;
mod tree;

pub use attr::*;
pub use character_data::*;
pub use collection::*;
pub use document::*;
pub use element::*;
pub use event::*;
pub use mutation_observer::*;
pub use node::*;
pub use range::*;
pub use selector::*;
pub use traversal::*;
pub use tree::*;

use std::ffi::{c_char, CString};
use std::ptr;

use domcore::error::DomException;

/// `DOM_ELEMENT_NODE`
pub const DOM_ELEMENT_NODE: u16 = domcore::node::ELEMENT_NODE;
/// `DOM_ATTRIBUTE_NODE`
pub const DOM_ATTRIBUTE_NODE: u16 = domcore::node::ATTRIBUTE_NODE;
/// `DOM_TEXT_NODE`
pub const DOM_TEXT_NODE: u16 = domcore::node::TEXT_NODE;
/// `DOM_CDATA_SECTION_NODE`
pub const DOM_CDATA_SECTION_NODE: u16 = domcore::node::CDATA_SECTION_NODE;
/// `DOM_PROCESSING_INSTRUCTION_NODE`
pub const DOM_PROCESSING_INSTRUCTION_NODE: u16 = domcore::node::PROCESSING_INSTRUCTION_NODE;
/// `DOM_COMMENT_NODE`
pub const DOM_COMMENT_NODE: u16 = domcore::node::COMMENT_NODE;
/// `DOM_DOCUMENT_NODE`
pub const DOM_DOCUMENT_NODE: u16 = domcore::node::DOCUMENT_NODE;
/// `DOM_DOCUMENT_TYPE_NODE`
pub const DOM_DOCUMENT_TYPE_NODE: u16 = domcore::node::DOCUMENT_TYPE_NODE;
/// `DOM_DOCUMENT_FRAGMENT_NODE`
pub const DOM_DOCUMENT_FRAGMENT_NODE: u16 = domcore::node::DOCUMENT_FRAGMENT_NODE;
/// `DOM_SHADOW_ROOT_NODE`
pub const DOM_SHADOW_ROOT_NODE: u16 = domcore::node::SHADOW_ROOT_NODE;

/// `Event.NONE`
pub const DOM_EVENT_PHASE_NONE: u16 = domcore::event::PHASE_NONE;
/// `Event.CAPTURING_PHASE`
pub const DOM_EVENT_PHASE_CAPTURING: u16 = domcore::event::PHASE_CAPTURING;
/// `Event.AT_TARGET`
pub const DOM_EVENT_PHASE_AT_TARGET: u16 = domcore::event::PHASE_AT_TARGET;
/// `Event.BUBBLING_PHASE`
pub const DOM_EVENT_PHASE_BUBBLING: u16 = domcore::event::PHASE_BUBBLING;

/// `NodeFilter.FILTER_ACCEPT`
pub const DOM_FILTER_ACCEPT: i16 = domcore::traversal::FILTER_ACCEPT;
/// `NodeFilter.FILTER_REJECT`
pub const DOM_FILTER_REJECT: i16 = domcore::traversal::FILTER_REJECT;
/// `NodeFilter.FILTER_SKIP`
pub const DOM_FILTER_SKIP: i16 = domcore::traversal::FILTER_SKIP;

/// `NodeFilter.SHOW_ALL`
pub const DOM_SHOW_ALL: u32 = domcore::flags::WhatToShow::ALL.bits();
/// `NodeFilter.SHOW_ELEMENT`
pub const DOM_SHOW_ELEMENT: u32 = domcore::flags::WhatToShow::ELEMENT.bits();
/// `NodeFilter.SHOW_TEXT`
pub const DOM_SHOW_TEXT: u32 = domcore::flags::WhatToShow::TEXT.bits();

/// `Range.START_TO_START`
pub const DOM_RANGE_START_TO_START: i16 = domcore::range::START_TO_START;
/// `Range.START_TO_END`
pub const DOM_RANGE_START_TO_END: i16 = domcore::range::START_TO_END;
/// `Range.END_TO_END`
pub const DOM_RANGE_END_TO_END: i16 = domcore::range::END_TO_END;
/// `Range.END_TO_START`
pub const DOM_RANGE_END_TO_START: i16 = domcore::range::END_TO_START;

/// `ShadowRoot.MODE_OPEN`
pub const DOM_SHADOW_MODE_OPEN: u8 = 0;
/// `ShadowRoot.MODE_CLOSED`
pub const DOM_SHADOW_MODE_CLOSED: u8 = 1;

/// No error.
pub const DOM_ERROR_OK: i32 = 0;
/// `HierarchyRequestError`
pub const DOM_ERROR_HIERARCHY_REQUEST: i32 = 1;
/// `NotFoundError`
pub const DOM_ERROR_NOT_FOUND: i32 = 2;
/// `InvalidCharacterError`
pub const DOM_ERROR_INVALID_CHARACTER: i32 = 3;
/// `InvalidStateError`
pub const DOM_ERROR_INVALID_STATE: i32 = 4;
/// `SyntaxError`
pub const DOM_ERROR_SYNTAX: i32 = 5;
/// `NamespaceError`
pub const DOM_ERROR_NAMESPACE: i32 = 6;
/// `InvalidModificationError`
pub const DOM_ERROR_INVALID_MODIFICATION: i32 = 7;
/// `QuotaExceededError`
pub const DOM_ERROR_QUOTA_EXCEEDED: i32 = 8;
/// `WrongDocumentError`
pub const DOM_ERROR_WRONG_DOCUMENT: i32 = 9;

/// Map an engine-internal [`DomException`] onto the fixed `DOM_ERROR_*`
/// code table. Never matched by message text: always by variant.
#[must_use]
pub(crate) fn error_code(err: &DomException) -> i32 {
    match err {
        DomException::HierarchyRequest(_) => DOM_ERROR_HIERARCHY_REQUEST,
        DomException::NotFound(_) => DOM_ERROR_NOT_FOUND,
        DomException::InvalidCharacter(_) => DOM_ERROR_INVALID_CHARACTER,
        DomException::InvalidState(_) => DOM_ERROR_INVALID_STATE,
        DomException::Syntax(_) => DOM_ERROR_SYNTAX,
        DomException::Namespace(_) => DOM_ERROR_NAMESPACE,
        DomException::QuotaExceeded { .. } => DOM_ERROR_QUOTA_EXCEEDED,
        DomException::WrongDocument(_) => DOM_ERROR_WRONG_DOCUMENT,
    }
}

/// Flatten `result` into the `i32` error convention, discarding the
/// success payload.
pub(crate) fn status_of(result: Result<(), DomException>) -> i32 {
    match result {
        Ok(()) => DOM_ERROR_OK,
        Err(e) => error_code(&e),
    }
}

/// Convert a Rust string into an owned, NUL-terminated C string. Returns
/// null if `s` contains an interior NUL byte (which cannot happen for
/// any engine-produced string, but callers should not rely on that).
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a string returned by any `dom_*` function.
///
/// # Safety
/// `s` must be a pointer previously returned by a `dom_*` function that
/// documents it returns an owned string, or null (a no-op). Passing any
/// other pointer, or freeing the same pointer twice, is undefined
/// behavior.
#[no_mangle]
pub unsafe extern "C" fn dom_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
