//! `MutationObserver`, delivering queued changes as an array of
//! `DOMMutationRecord` pointers in one callback invocation.
//!
//! Unlike [`crate::event`]'s listener handles, a mutation callback's
//! identity never needs to be recovered later (there is no
//! `removeObserver`; `disconnect` only needs the observer handle
//! itself), so the callback closure is captured once at construction and
//! kept for the observer's lifetime.

use std::ffi::{c_char, c_void, CString};
use std::ptr;

use domcore::mutation_observer::{MutationKind, MutationObserver, MutationRecord, ObserverInit};
use domcore::Node;

use crate::node::{borrow, c_str_to_str, DomNodeHandle};

/// A `childList` record.
pub const DOM_MUTATION_CHILD_LIST: u8 = 0;
/// An `attributes` record.
pub const DOM_MUTATION_ATTRIBUTES: u8 = 1;
/// A `characterData` record.
pub const DOM_MUTATION_CHARACTER_DATA: u8 = 2;

/// An opaque handle to a live [`MutationObserver`].
pub type DomMutationObserverHandle = *mut MutationObserver;

/// `MutationObserverInit`, marshaled as a flat C struct.
///
/// `attribute_filter`/`attribute_filter_count` describe an array of
/// NUL-terminated UTF-8 strings; pass null/`0` for "no filter".
#[repr(C)]
pub struct DomObserverInit {
    /// Watch for child additions and removals.
    pub child_list: u8,
    /// Watch for attribute value changes.
    pub attributes: u8,
    /// Record the previous value on attribute-change records.
    pub attribute_old_value: u8,
    /// An array of local names to restrict attribute watching to.
    pub attribute_filter: *const *const c_char,
    /// Length of `attribute_filter`.
    pub attribute_filter_count: usize,
    /// Watch for character-data changes.
    pub character_data: u8,
    /// Record the previous value on character-data-change records.
    pub character_data_old_value: u8,
    /// Also watch the target's descendants.
    pub subtree: u8,
}

unsafe fn init_from_c(init: &DomObserverInit) -> ObserverInit {
    let attribute_filter = if init.attribute_filter.is_null() || init.attribute_filter_count == 0 {
        None
    } else {
        let slice = std::slice::from_raw_parts(init.attribute_filter, init.attribute_filter_count);
        Some(slice.iter().filter_map(|s| c_str_to_str(*s).map(str::to_owned)).collect())
    };
    ObserverInit {
        child_list: init.child_list != 0,
        attributes: init.attributes != 0,
        attribute_old_value: init.attribute_old_value != 0,
        attribute_filter,
        character_data: init.character_data != 0,
        character_data_old_value: init.character_data_old_value != 0,
        subtree: init.subtree != 0,
    }
}

/// A single queued mutation, marshaled as a flat C struct. Every node
/// handle and string here is *borrowed*: valid only for the duration of
/// the callback invocation that hands it out. Callers that need to keep
/// one must call `dom_node_addref` / copy the string before returning.
#[repr(C)]
pub struct DomMutationRecord {
    /// One of `DOM_MUTATION_CHILD_LIST`/`DOM_MUTATION_ATTRIBUTES`/`DOM_MUTATION_CHARACTER_DATA`.
    pub kind: u8,
    /// The node the change occurred on.
    pub target: DomNodeHandle,
    /// Nodes added by a `childList` change, in tree order.
    pub added_nodes: *const DomNodeHandle,
    /// Length of `added_nodes`.
    pub added_count: usize,
    /// Nodes removed by a `childList` change, in tree order.
    pub removed_nodes: *const DomNodeHandle,
    /// Length of `removed_nodes`.
    pub removed_count: usize,
    /// The sibling immediately before the change, or null.
    pub previous_sibling: DomNodeHandle,
    /// The sibling immediately after the change, or null.
    pub next_sibling: DomNodeHandle,
    /// The changed attribute's local name, for `attributes` records, or null.
    pub attribute_name: *const c_char,
    /// The value before the change, if requested, or null.
    pub old_value: *const c_char,
}

fn borrowed_handle(node: &Node) -> DomNodeHandle {
    ptr::from_ref(node).cast_mut()
}

fn opt_borrowed_handle(node: Option<&Node>) -> DomNodeHandle {
    node.map_or(ptr::null_mut(), borrowed_handle)
}

/// Per-record scratch storage so `DomMutationRecord`'s pointers stay
/// valid for the call; dropped right after the callback returns.
struct RecordScratch {
    added: Vec<DomNodeHandle>,
    removed: Vec<DomNodeHandle>,
    attribute_name: Option<CString>,
    old_value: Option<CString>,
}

fn build_scratch(record: &MutationRecord) -> RecordScratch {
    RecordScratch {
        added: record.added_nodes.iter().map(borrowed_handle).collect(),
        removed: record.removed_nodes.iter().map(borrowed_handle).collect(),
        attribute_name: record.attribute_name.as_ref().map(|a| CString::new(a.as_str()).unwrap_or_default()),
        old_value: record.old_value.as_ref().map(|v| CString::new(v.as_str()).unwrap_or_default()),
    }
}

fn build_c_record(record: &MutationRecord, scratch: &RecordScratch) -> DomMutationRecord {
    let kind = match record.kind {
        MutationKind::ChildList => DOM_MUTATION_CHILD_LIST,
        MutationKind::Attributes => DOM_MUTATION_ATTRIBUTES,
        MutationKind::CharacterData => DOM_MUTATION_CHARACTER_DATA,
    };
    DomMutationRecord {
        kind,
        target: borrowed_handle(&record.target),
        added_nodes: scratch.added.as_ptr(),
        added_count: scratch.added.len(),
        removed_nodes: scratch.removed.as_ptr(),
        removed_count: scratch.removed.len(),
        previous_sibling: opt_borrowed_handle(record.previous_sibling.as_ref()),
        next_sibling: opt_borrowed_handle(record.next_sibling.as_ref()),
        attribute_name: scratch.attribute_name.as_ref().map_or(ptr::null(), |c| c.as_ptr()),
        old_value: scratch.old_value.as_ref().map_or(ptr::null(), |c| c.as_ptr()),
    }
}

/// Deliver `records` to `callback` as a single array-of-pointers call.
/// A no-op if `records` is empty.
fn deliver_via(records: &[MutationRecord], callback: impl Fn(*const *const DomMutationRecord, usize)) {
    if records.is_empty() {
        return;
    }
    let scratch: Vec<RecordScratch> = records.iter().map(build_scratch).collect();
    let c_records: Vec<DomMutationRecord> =
        records.iter().zip(&scratch).map(|(r, s)| build_c_record(r, s)).collect();
    let pointers: Vec<*const DomMutationRecord> = c_records.iter().map(ptr::from_ref).collect();
    callback(pointers.as_ptr(), pointers.len());
}

struct SendableData(*mut c_void);

#[allow(unsafe_code)]
unsafe impl Send for SendableData {}
#[allow(unsafe_code)]
unsafe impl Sync for SendableData {}

/// `MutationObserver`'s delivery callback.
pub type DomMutationCallback =
    unsafe extern "C" fn(*const *const DomMutationRecord, usize, *mut c_void);

/// `new MutationObserver(callback)`.
///
/// # Safety
/// `callback` must remain valid for as long as the returned observer is
/// used, and must be safe to call with the given `user_data`.
#[no_mangle]
pub unsafe extern "C" fn dom_mutation_observer_new(
    callback: DomMutationCallback,
    user_data: *mut c_void,
) -> DomMutationObserverHandle {
    let data = SendableData(user_data);
    let observer = MutationObserver::new(move |records| {
        deliver_via(records, |ptrs, count| callback(ptrs, count, data.0));
    });
    Box::into_raw(Box::new(observer))
}

/// Release an observer handle. Does not implicitly `disconnect()`.
///
/// # Safety
/// `handle` must be a live handle returned by [`dom_mutation_observer_new`],
/// or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_mutation_observer_free(handle: DomMutationObserverHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `MutationObserver.observe(target, options)`. Returns `0` on success,
/// else a `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` and `target` must be live; `init`, if non-null, must point
/// to a valid `DomObserverInit` whose `attribute_filter` (if any) points
/// to `attribute_filter_count` NUL-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn dom_mutation_observer_observe(
    handle: DomMutationObserverHandle,
    target: DomNodeHandle,
    init: *const DomObserverInit,
) -> i32 {
    let (Some(observer), Some(target), Some(init)) = (handle.as_ref(), borrow(target), init.as_ref()) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    observer.observe(target, init_from_c(init));
    crate::DOM_ERROR_OK
}

/// `MutationObserver.disconnect()`.
///
/// # Safety
/// `handle` and `target` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_mutation_observer_disconnect(handle: DomMutationObserverHandle, target: DomNodeHandle) {
    let (Some(observer), Some(target)) = (handle.as_ref(), borrow(target)) else {
        return;
    };
    observer.disconnect(target);
}

/// Flush the observer's queue through the callback it was constructed
/// with, as a microtask checkpoint would. A no-op if the queue is empty.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_mutation_observer_deliver(handle: DomMutationObserverHandle) {
    if let Some(observer) = handle.as_ref() {
        observer.deliver();
    }
}

/// `MutationObserver.takeRecords()`. Drains the queue and hands it to
/// `callback` as a single call; does *not* invoke the observer's own
/// delivery callback. A no-op (callback never invoked) if the queue is
/// empty.
///
/// # Safety
/// `handle` must be live; `callback` must be safe to call with the given
/// `user_data`.
#[no_mangle]
pub unsafe extern "C" fn dom_mutation_observer_take_records(
    handle: DomMutationObserverHandle,
    callback: DomMutationCallback,
    user_data: *mut c_void,
) {
    let Some(observer) = handle.as_ref() else {
        return;
    };
    let records = observer.take_records();
    let data = SendableData(user_data);
    deliver_via(&records, move |ptrs, count| callback(ptrs, count, data.0));
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::ffi::CString;

    use super::*;
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_node, dom_document_release};
    use crate::node::dom_node_release;

    thread_local! {
        static LAST_COUNT: Cell<usize> = const { Cell::new(0) };
        static LAST_KIND: Cell<u8> = const { Cell::new(u8::MAX) };
    }

    unsafe extern "C" fn record_delivery(records: *const *const DomMutationRecord, count: usize, _: *mut c_void) {
        LAST_COUNT.with(|c| c.set(count));
        if count > 0 {
            let first = *records;
            LAST_KIND.with(|k| k.set((*first).kind));
        }
    }

    #[test]
    fn observe_and_deliver_reports_child_list_mutation() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("li").unwrap();
            let child = dom_document_create_element(doc, tag.as_ptr());

            let observer = dom_mutation_observer_new(record_delivery, ptr::null_mut());
            let init = DomObserverInit {
                child_list: 1,
                attributes: 0,
                attribute_old_value: 0,
                attribute_filter: ptr::null(),
                attribute_filter_count: 0,
                character_data: 0,
                character_data_old_value: 0,
                subtree: 0,
            };
            assert_eq!(dom_mutation_observer_observe(observer, root, &raw const init), 0);

            assert_eq!(crate::dom_tree_append_child(root, child), 0);
            dom_mutation_observer_deliver(observer);

            LAST_COUNT.with(|c| assert_eq!(c.get(), 1));
            LAST_KIND.with(|k| assert_eq!(k.get(), DOM_MUTATION_CHILD_LIST));

            dom_mutation_observer_disconnect(observer, root);
            dom_mutation_observer_free(observer);
            dom_node_release(child);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }
}
