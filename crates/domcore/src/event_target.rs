//! Listener storage shared by every node and by [`AbortSignal`](crate::abort::AbortSignal).
//!
//! [`EventTarget`](https://dom.spec.whatwg.org/#interface-eventtarget)

use std::rc::Rc;

use crate::event::Event;
use crate::interner::Atom;

/// A registered event listener callback.
pub type ListenerCallback = Rc<dyn Fn(&Event)>;

/// One entry in a target's listener list.
#[derive(Clone)]
pub struct ListenerEntry {
    pub(crate) event_type: Atom,
    pub(crate) callback: ListenerCallback,
    pub(crate) capture: bool,
    pub(crate) once: bool,
    pub(crate) passive: bool,
    /// Set once the listener has fired (for `once`) or been removed via
    /// an abort signal, so dispatch can skip it without mutating the
    /// listener list mid-iteration.
    pub(crate) removed: bool,
}

/// The listener list carried by every `EventTarget`-capable node.
#[derive(Default, Clone)]
pub struct EventTargetData {
    pub(crate) listeners: Vec<ListenerEntry>,
}

impl EventTargetData {
    /// Number of listeners currently registered, for quota enforcement.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// `addEventListener`. A duplicate `(type, callback, capture)` triple
    /// is a no-op, per the flattened-options algorithm in the interface
    /// definition.
    pub fn add_listener(
        &mut self,
        event_type: Atom,
        callback: ListenerCallback,
        capture: bool,
        once: bool,
        passive: bool,
    ) {
        let already = self.listeners.iter().any(|l| {
            l.event_type == event_type && l.capture == capture && Rc::ptr_eq(&l.callback, &callback)
        });
        if already {
            return;
        }
        self.listeners.push(ListenerEntry {
            event_type,
            callback,
            capture,
            once,
            passive,
            removed: false,
        });
    }

    /// `removeEventListener`.
    pub fn remove_listener(&mut self, event_type: &Atom, callback: &ListenerCallback, capture: bool) {
        self.listeners.retain(|l| {
            !(l.event_type == *event_type && l.capture == capture && Rc::ptr_eq(&l.callback, callback))
        });
    }

    /// Snapshot the listeners matching `event_type` and `capture` at the
    /// moment dispatch visits this target, per the spec's requirement
    /// that listeners added during dispatch don't fire for the current
    /// event.
    pub(crate) fn snapshot(&self, event_type: &Atom, capture: bool) -> Vec<ListenerEntry> {
        self.listeners
            .iter()
            .filter(|l| !l.removed && l.event_type == *event_type && l.capture == capture)
            .cloned()
            .collect()
    }

    pub(crate) fn mark_removed(&mut self, event_type: &Atom, callback: &ListenerCallback, capture: bool) {
        for l in &mut self.listeners {
            if l.event_type == *event_type && l.capture == capture && Rc::ptr_eq(&l.callback, callback) {
                l.removed = true;
            }
        }
        self.listeners.retain(|l| !l.removed);
    }

    /// Whether any listener is registered for `event_type`, used by
    /// dispatch to skip building a path when nothing observes it.
    #[must_use]
    pub fn has_listener_for(&self, event_type: &Atom) -> bool {
        self.listeners.iter().any(|l| l.event_type == *event_type)
    }
}
