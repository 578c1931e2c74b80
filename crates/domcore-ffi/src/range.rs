//! `Range`/`StaticRange`: boundary-point construction, mutation, and
//! comparison.

use std::ptr;

use domcore::range::{Range, StaticRange};

use crate::node::{borrow, into_handle, DomNodeHandle};
use crate::status_of;

/// An opaque handle to a live [`Range`].
pub type DomRangeHandle = *mut Range;
/// An opaque handle to a frozen [`StaticRange`] snapshot.
pub type DomStaticRangeHandle = *mut StaticRange;

/// `new Range()`, collapsed at the start of `node`.
///
/// # Safety
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn dom_range_new(node: DomNodeHandle) -> DomRangeHandle {
    match borrow(node) {
        Some(n) => Box::into_raw(Box::new(Range::new(n.clone()))),
        None => ptr::null_mut(),
    }
}

/// Release a range handle.
///
/// # Safety
/// `handle` must be a live handle returned by [`dom_range_new`] or
/// [`dom_range_clone_range`], or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_range_free(handle: DomRangeHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `Range.startContainer`. Borrowed; caller does not own a reference.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_start_container(handle: DomRangeHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |r| into_handle(r.start_container()))
}

/// `Range.startOffset`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_start_offset(handle: DomRangeHandle) -> usize {
    handle.as_ref().map_or(0, Range::start_offset)
}

/// `Range.endContainer`. Borrowed; caller does not own a reference.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_end_container(handle: DomRangeHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |r| into_handle(r.end_container()))
}

/// `Range.endOffset`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_end_offset(handle: DomRangeHandle) -> usize {
    handle.as_ref().map_or(0, Range::end_offset)
}

/// `Range.collapsed`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_collapsed(handle: DomRangeHandle) -> u8 {
    u8::from(handle.as_ref().is_some_and(Range::collapsed))
}

/// `Range.setStart(node, offset)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` and `node` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_set_start(handle: DomRangeHandle, node: DomNodeHandle, offset: usize) -> i32 {
    let (Some(range), Some(node)) = (handle.as_mut(), borrow(node)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(range.set_start(node.clone(), offset))
}

/// `Range.setEnd(node, offset)`. Returns `0` on success, else a
/// `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` and `node` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_set_end(handle: DomRangeHandle, node: DomNodeHandle, offset: usize) -> i32 {
    let (Some(range), Some(node)) = (handle.as_mut(), borrow(node)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(range.set_end(node.clone(), offset))
}

/// `Range.collapse(toStart)`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_collapse(handle: DomRangeHandle, to_start: u8) {
    if let Some(range) = handle.as_mut() {
        range.collapse(to_start != 0);
    }
}

/// `Range.selectNode(node)`. Returns `0` on success, else a `DOM_ERROR_*`
/// code.
///
/// # Safety
/// `handle` and `node` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_select_node(handle: DomRangeHandle, node: DomNodeHandle) -> i32 {
    let (Some(range), Some(node)) = (handle.as_mut(), borrow(node)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    status_of(range.select_node(node))
}

/// `Range.selectNodeContents(node)`.
///
/// # Safety
/// `handle` and `node` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_select_node_contents(handle: DomRangeHandle, node: DomNodeHandle) {
    let (Some(range), Some(node)) = (handle.as_mut(), borrow(node)) else {
        return;
    };
    range.select_node_contents(node);
}

/// `Range.cloneRange()`. `[NewObject]`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_clone_range(handle: DomRangeHandle) -> DomRangeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |r| Box::into_raw(Box::new(r.clone_range())))
}

/// `Range.commonAncestorContainer`. Borrowed; caller does not own a
/// reference.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_common_ancestor_container(handle: DomRangeHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |r| into_handle(r.common_ancestor_container()))
}

/// `Range.comparePoint(node, offset)`. Writes -1/0/1 to `*out`. Returns
/// `0` on success, else a `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` and `node` must be live; `out` must point to writable
/// storage for one `i16`.
#[no_mangle]
pub unsafe extern "C" fn dom_range_compare_point(
    handle: DomRangeHandle,
    node: DomNodeHandle,
    offset: usize,
    out: *mut i16,
) -> i32 {
    let (Some(range), Some(node)) = (handle.as_ref(), borrow(node)) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    match range.compare_point(node, offset) {
        Ok(v) => {
            if !out.is_null() {
                *out = v;
            }
            crate::DOM_ERROR_OK
        }
        Err(e) => crate::error_code(&e),
    }
}

/// `Range.compareBoundaryPoints(how, sourceRange)`. Writes -1/0/1 to
/// `*out`. Returns `0` on success, else a `DOM_ERROR_*` code.
///
/// # Safety
/// `handle` and `other` must be live; `out` must point to writable
/// storage for one `i16`.
#[no_mangle]
pub unsafe extern "C" fn dom_range_compare_boundary_points(
    handle: DomRangeHandle,
    how: i16,
    other: DomRangeHandle,
    out: *mut i16,
) -> i32 {
    let (Some(range), Some(other)) = (handle.as_ref(), other.as_ref()) else {
        return crate::DOM_ERROR_INVALID_STATE;
    };
    match range.compare_boundary_points_with(how, other) {
        Ok(v) => {
            if !out.is_null() {
                *out = v;
            }
            crate::DOM_ERROR_OK
        }
        Err(e) => crate::error_code(&e),
    }
}

/// `Range.isPointInRange(node, offset)`.
///
/// # Safety
/// `handle` and `node` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_is_point_in_range(handle: DomRangeHandle, node: DomNodeHandle, offset: usize) -> u8 {
    let (Some(range), Some(node)) = (handle.as_ref(), borrow(node)) else {
        return 0;
    };
    u8::from(range.is_point_in_range(node, offset).unwrap_or(false))
}

/// `Range.intersectsNode(node)`.
///
/// # Safety
/// `handle` and `node` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_range_intersects_node(handle: DomRangeHandle, node: DomNodeHandle) -> u8 {
    let (Some(range), Some(node)) = (handle.as_ref(), borrow(node)) else {
        return 0;
    };
    u8::from(range.intersects_node(node))
}

/// `new StaticRange(init)`, frozen from a live range's current boundary
/// points.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_static_range_from_range(handle: DomRangeHandle) -> DomStaticRangeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |r| Box::into_raw(Box::new(StaticRange::from(r))))
}

/// Release a static-range handle.
///
/// # Safety
/// `handle` must be a live handle returned by [`dom_static_range_from_range`],
/// or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_static_range_free(handle: DomStaticRangeHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `StaticRange.startContainer`. Borrowed; caller does not own a
/// reference.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_static_range_start_container(handle: DomStaticRangeHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |r| into_handle(r.start_container.clone()))
}

/// `StaticRange.startOffset`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_static_range_start_offset(handle: DomStaticRangeHandle) -> usize {
    handle.as_ref().map_or(0, |r| r.start_offset)
}

/// `StaticRange.endContainer`. Borrowed; caller does not own a
/// reference.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_static_range_end_container(handle: DomStaticRangeHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |r| into_handle(r.end_container.clone()))
}

/// `StaticRange.endOffset`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_static_range_end_offset(handle: DomStaticRangeHandle) -> usize {
    handle.as_ref().map_or(0, |r| r.end_offset)
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_node, dom_document_release};
    use crate::node::{dom_node_is_same_node, dom_node_release};

    #[test]
    fn select_node_then_compare_boundary_points() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let tag = CString::new("li").unwrap();
            let a = dom_document_create_element(doc, tag.as_ptr());
            let b = dom_document_create_element(doc, tag.as_ptr());
            assert_eq!(crate::dom_tree_append_child(root, a), 0);
            assert_eq!(crate::dom_tree_append_child(root, b), 0);

            let first = dom_range_new(root);
            assert_eq!(dom_range_select_node(first, a), 0);
            let second = dom_range_new(root);
            assert_eq!(dom_range_select_node(second, b), 0);

            let mut cmp: i16 = 0;
            assert_eq!(dom_range_compare_boundary_points(first, crate::DOM_RANGE_START_TO_START, second, &raw mut cmp), 0);
            assert_eq!(cmp, -1);
            assert_eq!(dom_range_intersects_node(first, a), 1);
            assert_eq!(dom_range_intersects_node(first, b), 0);

            let start = dom_range_start_container(first);
            assert_eq!(dom_node_is_same_node(start, root), 1);

            dom_node_release(start);
            dom_range_free(first);
            dom_range_free(second);
            dom_node_release(a);
            dom_node_release(b);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }

    #[test]
    fn static_range_snapshots_boundary_points() {
        unsafe {
            let doc = dom_document_new();
            let root = dom_document_node(doc);
            let range = dom_range_new(root);
            let snapshot = dom_static_range_from_range(range);
            assert_eq!(dom_static_range_start_offset(snapshot), 0);

            dom_static_range_free(snapshot);
            dom_range_free(range);
            dom_node_release(root);
            dom_document_release(doc);
        }
    }
}
