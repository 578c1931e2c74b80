//! `AbortController` / `AbortSignal`.
//!
//! [`AbortSignal`](https://dom.spec.whatwg.org/#interface-abortsignal)

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::DomException;
use crate::event::{Event, EventInit};
use crate::event_target::{EventTargetData, ListenerCallback};
use crate::interner::Atom;

struct AbortSignalInner {
    aborted: RefCell<Option<DomException>>,
    listeners: RefCell<EventTargetData>,
}

/// A signal that can be observed for cancellation.
#[derive(Clone)]
pub struct AbortSignal(Rc<AbortSignalInner>);

impl AbortSignal {
    fn new() -> Self {
        Self(Rc::new(AbortSignalInner {
            aborted: RefCell::new(None),
            listeners: RefCell::new(EventTargetData::default()),
        }))
    }

    /// `signal.aborted`.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.0.aborted.borrow().is_some()
    }

    /// `signal.reason`.
    #[must_use]
    pub fn reason(&self) -> Option<DomException> {
        self.0.aborted.borrow().clone()
    }

    /// `signal.throwIfAborted()`.
    ///
    /// # Errors
    /// Returns the abort reason if the signal has been aborted.
    pub fn throw_if_aborted(&self) -> Result<(), DomException> {
        match self.reason() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// `addEventListener("abort", cb)`, simplified to the one event type
    /// an `AbortSignal` ever fires.
    pub fn on_abort(&self, callback: ListenerCallback) {
        self.0.listeners.borrow_mut().add_listener(
            Atom::uninterned("abort"),
            callback,
            false,
            false,
            false,
        );
    }

    fn fire(&self, reason: DomException) {
        if self.aborted() {
            return;
        }
        *self.0.aborted.borrow_mut() = Some(reason);
        let event_type = Atom::uninterned("abort");
        let snapshot = self.0.listeners.borrow().snapshot(&event_type, false);
        let event = Event::new(event_type, EventInit::default());
        for entry in snapshot {
            (entry.callback)(&event);
        }
    }
}

/// The controller side of an `AbortController`/`AbortSignal` pair.
pub struct AbortController {
    signal: AbortSignal,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    /// Create a controller with a fresh, unaborted signal.
    #[must_use]
    pub fn new() -> Self {
        Self { signal: AbortSignal::new() }
    }

    /// The controller's signal.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// `controller.abort(reason)`. A default reason of
    /// `DomException::InvalidState("AbortError")` is used when none is
    /// supplied, mirroring the spec's default `AbortError`.
    pub fn abort(&self, reason: Option<DomException>) {
        let reason = reason.unwrap_or_else(|| DomException::InvalidState("AbortError".to_string()));
        self.signal.fire(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn abort_fires_listeners_once() {
        let controller = AbortController::new();
        let signal = controller.signal();
        let fired = Rc::new(Cell::new(0));
        let fired2 = Rc::clone(&fired);
        signal.on_abort(Rc::new(move |_e| fired2.set(fired2.get() + 1)));

        assert!(!signal.aborted());
        controller.abort(None);
        controller.abort(None);
        assert!(signal.aborted());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn throw_if_aborted_surfaces_reason() {
        let controller = AbortController::new();
        let signal = controller.signal();
        assert!(signal.throw_if_aborted().is_ok());
        controller.abort(Some(DomException::InvalidState("custom".to_string())));
        assert!(signal.throw_if_aborted().is_err());
    }
}
