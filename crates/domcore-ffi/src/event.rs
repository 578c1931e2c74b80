//! `Event` construction/dispatch, listener registration, and
//! `AbortController`/`AbortSignal`.
//!
//! Listener and abort callbacks cross the boundary as raw function
//! pointers plus a `void*` payload, per the fixed calling convention
//! `void callback(DOMEvent*, void*)` (listeners) and `void
//! callback(void*)` (abort). Each registration returns an opaque handle
//! that must be passed back to remove it — this sidesteps needing to
//! reconstruct Rust closure identity from a bare function pointer.

use std::ffi::{c_char, c_void};
use std::ptr;
use std::rc::Rc;

use domcore::abort::{AbortController, AbortSignal};
use domcore::event::{dispatch_event, Event, EventInit};
use domcore::interner::Atom;

use crate::node::{borrow, c_str_to_str, DomNodeHandle};
use crate::to_c_string;

/// An opaque handle to an [`Event`].
pub type DomEventHandle = *mut Event;

/// A listener callback: `callback(event, user_data)`. `event` is
/// borrowed for the duration of the call only.
pub type DomEventCallback = unsafe extern "C" fn(*const Event, *mut c_void);

/// An abort callback: `callback(user_data)`.
pub type DomAbortCallback = unsafe extern "C" fn(*mut c_void);

struct SendableData(*mut c_void);
// Safety: the engine is single-threaded; this newtype only exists to let
// the callback closure below be constructed without `c_void`'s raw
// pointer blocking auto traits we never rely on across threads.
#[allow(unsafe_code)]
unsafe impl Send for SendableData {}
#[allow(unsafe_code)]
unsafe impl Sync for SendableData {}

/// An opaque handle representing one `addEventListener` registration.
/// Pass it to [`dom_node_remove_event_listener`] to remove it.
pub struct DomListener {
    callback: domcore::event_target::ListenerCallback,
    event_type: Atom,
    capture: bool,
}

/// An opaque handle to a `DomListener`.
pub type DomListenerHandle = *mut DomListener;

/// An opaque handle to an `AbortController`.
pub type DomAbortControllerHandle = *mut AbortController;
/// An opaque handle to an `AbortSignal`.
pub type DomAbortSignalHandle = *mut AbortSignal;

/// `new Event(type, {bubbles, cancelable, composed})`.
///
/// # Safety
/// `event_type` must be a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn dom_event_new(
    event_type: *const c_char,
    bubbles: u8,
    cancelable: u8,
    composed: u8,
) -> DomEventHandle {
    let Some(event_type) = c_str_to_str(event_type) else {
        return ptr::null_mut();
    };
    let init = EventInit {
        bubbles: bubbles != 0,
        cancelable: cancelable != 0,
        composed: composed != 0,
    };
    Box::into_raw(Box::new(Event::new(Atom::uninterned(event_type), init)))
}

/// Release an event handle.
///
/// # Safety
/// `handle` must be a live handle returned by [`dom_event_new`], or
/// null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_event_free(handle: DomEventHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `Event.type`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_type(handle: DomEventHandle) -> *mut c_char {
    match handle.as_ref() {
        Some(event) => to_c_string(event.event_type().as_str()),
        None => ptr::null_mut(),
    }
}

/// `Event.bubbles`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_bubbles(handle: DomEventHandle) -> u8 {
    u8::from(handle.as_ref().is_some_and(Event::bubbles))
}

/// `Event.cancelable`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_cancelable(handle: DomEventHandle) -> u8 {
    u8::from(handle.as_ref().is_some_and(Event::cancelable))
}

/// `Event.eventPhase`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_phase(handle: DomEventHandle) -> u16 {
    handle.as_ref().map_or(crate::DOM_EVENT_PHASE_NONE, Event::event_phase)
}

/// `Event.defaultPrevented`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_default_prevented(handle: DomEventHandle) -> u8 {
    u8::from(handle.as_ref().is_some_and(Event::default_prevented))
}

/// `Event.preventDefault()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_prevent_default(handle: DomEventHandle) {
    if let Some(event) = handle.as_ref() {
        event.prevent_default();
    }
}

/// `Event.stopPropagation()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_stop_propagation(handle: DomEventHandle) {
    if let Some(event) = handle.as_ref() {
        event.stop_propagation();
    }
}

/// `Event.stopImmediatePropagation()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_stop_immediate_propagation(handle: DomEventHandle) {
    if let Some(event) = handle.as_ref() {
        event.stop_immediate_propagation();
    }
}

/// `Event.target`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_target(handle: DomEventHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |e| crate::node::opt_into_handle(e.target()))
}

/// `Event.currentTarget`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_event_current_target(handle: DomEventHandle) -> DomNodeHandle {
    handle.as_ref().map_or(ptr::null_mut(), |e| crate::node::opt_into_handle(e.current_target()))
}

/// `EventTarget.dispatchEvent(event)`. Returns `1` if the event's
/// default action was *not* prevented, `0` otherwise — including when
/// `event` is already being dispatched (an `InvalidStateError` on the
/// DOM side, reported here as a rejected dispatch rather than a panic).
///
/// # Safety
/// `target` and `event` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn dom_node_dispatch_event(target: DomNodeHandle, event: DomEventHandle) -> u8 {
    match (borrow(target), event.as_ref()) {
        (Some(target), Some(event)) => u8::from(dispatch_event(target, event).unwrap_or(false)),
        _ => 0,
    }
}

/// `EventTarget.addEventListener(type, callback, {capture, once,
/// passive, signal})`. Returns an opaque listener handle to later pass
/// to [`dom_node_remove_event_listener`]; null if `target` or
/// `event_type` is invalid.
///
/// # Safety
/// `target` must be live; `event_type` a NUL-terminated UTF-8 string;
/// `callback` a valid function pointer outliving every future dispatch
/// that could invoke it; `signal`, if non-null, must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_node_add_event_listener(
    target: DomNodeHandle,
    event_type: *const c_char,
    callback: DomEventCallback,
    user_data: *mut c_void,
    capture: u8,
    once: u8,
    passive: u8,
    signal: DomAbortSignalHandle,
) -> DomListenerHandle {
    let (Some(node), Some(event_type)) = (borrow(target), c_str_to_str(event_type)) else {
        return ptr::null_mut();
    };
    let atom = node
        .owner_document()
        .map_or_else(|| Atom::uninterned(event_type), |doc| domcore::Document::from_node(doc).intern(event_type));
    let data = SendableData(user_data);
    let rust_callback: domcore::event_target::ListenerCallback = Rc::new(move |event: &Event| {
        callback(event, data.0);
    });

    if node
        .add_event_listener(
            atom.clone(),
            Rc::clone(&rust_callback),
            capture != 0,
            once != 0,
            passive != 0,
            signal.as_ref(),
        )
        .is_err()
    {
        return ptr::null_mut();
    }

    Box::into_raw(Box::new(DomListener {
        callback: rust_callback,
        event_type: atom,
        capture: capture != 0,
    }))
}

/// `EventTarget.removeEventListener`, addressed by the handle returned
/// from [`dom_node_add_event_listener`]. Consumes `listener`.
///
/// # Safety
/// `target` must be live; `listener`, if non-null, must be a handle
/// this module previously returned and not already removed.
#[no_mangle]
pub unsafe extern "C" fn dom_node_remove_event_listener(target: DomNodeHandle, listener: DomListenerHandle) {
    if listener.is_null() {
        return;
    }
    let listener = Box::from_raw(listener);
    if let Some(node) = borrow(target) {
        node.remove_event_listener(&listener.event_type, &listener.callback, listener.capture);
    }
}

/// `new AbortController()`.
#[no_mangle]
pub extern "C" fn dom_abort_controller_new() -> DomAbortControllerHandle {
    Box::into_raw(Box::new(AbortController::new()))
}

/// Release an `AbortController` handle. The signal it produced via
/// [`dom_abort_controller_signal`] remains valid independently (it is
/// reference-counted internally).
///
/// # Safety
/// `handle` must be live, or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_abort_controller_free(handle: DomAbortControllerHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `controller.signal`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_abort_controller_signal(handle: DomAbortControllerHandle) -> DomAbortSignalHandle {
    match handle.as_ref() {
        Some(controller) => Box::into_raw(Box::new(controller.signal())),
        None => ptr::null_mut(),
    }
}

/// `controller.abort()`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_abort_controller_abort(handle: DomAbortControllerHandle) {
    if let Some(controller) = handle.as_ref() {
        controller.abort(None);
    }
}

/// Release a signal handle obtained from [`dom_abort_controller_signal`].
///
/// # Safety
/// `handle` must be live, or null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn dom_abort_signal_free(handle: DomAbortSignalHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// `signal.aborted`.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn dom_abort_signal_aborted(handle: DomAbortSignalHandle) -> u8 {
    u8::from(handle.as_ref().is_some_and(AbortSignal::aborted))
}

/// Register a callback to run when `handle` is aborted.
///
/// # Safety
/// `handle` must be live; `callback` a valid function pointer outliving
/// the abort it may be invoked from.
#[no_mangle]
pub unsafe extern "C" fn dom_abort_signal_on_abort(
    handle: DomAbortSignalHandle,
    callback: DomAbortCallback,
    user_data: *mut c_void,
) {
    let Some(signal) = handle.as_ref() else {
        return;
    };
    let data = SendableData(user_data);
    signal.on_abort(Rc::new(move |_event: &Event| {
        callback(data.0);
    }));
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::ffi::CString;
    use std::rc::Rc;

    use super::*;
    use crate::document::{dom_document_create_element, dom_document_new, dom_document_release};
    use crate::node::dom_node_release;

    thread_local! {
        static FIRED: Cell<u32> = const { Cell::new(0) };
    }

    unsafe extern "C" fn record_fire(_event: *const Event, _data: *mut c_void) {
        FIRED.with(|f| f.set(f.get() + 1));
    }

    #[test]
    fn dispatch_invokes_registered_listener() {
        FIRED.with(|f| f.set(0));
        unsafe {
            let doc = dom_document_new();
            let tag = CString::new("div").unwrap();
            let el = dom_document_create_element(doc, tag.as_ptr());
            let click = CString::new("click").unwrap();

            let listener = dom_node_add_event_listener(
                el,
                click.as_ptr(),
                record_fire,
                ptr::null_mut(),
                0,
                0,
                0,
                ptr::null_mut(),
            );
            assert!(!listener.is_null());

            let event = dom_event_new(click.as_ptr(), 0, 0, 0);
            assert_eq!(dom_node_dispatch_event(el, event), 1);
            assert_eq!(FIRED.with(Cell::get), 1);

            dom_event_free(event);
            dom_node_remove_event_listener(el, listener);
            dom_node_release(el);
            dom_document_release(doc);
        }
    }

    #[test]
    fn abort_signal_fires_callback() {
        FIRED.with(|f| f.set(0));
        unsafe extern "C" fn on_abort(_data: *mut c_void) {
            FIRED.with(|f| f.set(f.get() + 1));
        }

        FIRED.with(|f| f.set(0));
        unsafe {
            let controller = dom_abort_controller_new();
            let signal = dom_abort_controller_signal(controller);
            dom_abort_signal_on_abort(signal, on_abort, ptr::null_mut());
            assert_eq!(dom_abort_signal_aborted(signal), 0);
            dom_abort_controller_abort(controller);
            assert_eq!(dom_abort_signal_aborted(signal), 1);
            assert_eq!(FIRED.with(Cell::get), 1);

            dom_abort_signal_free(signal);
            dom_abort_controller_free(controller);
        }
    }
}
