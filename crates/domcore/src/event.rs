//! Event objects and the dispatch algorithm.
//!
//! [`Event`](https://dom.spec.whatwg.org/#interface-event),
//! [`EventTarget` dispatch](https://dom.spec.whatwg.org/#dispatching-events)

use std::cell::Cell;
use std::rc::Rc;

use crate::abort::AbortSignal;
use crate::error::DomResult;
use crate::event_target::ListenerCallback;
use crate::interner::Atom;
use crate::node::Node;

/// `Event.NONE`
pub const PHASE_NONE: u16 = 0;
/// `Event.CAPTURING_PHASE`
pub const PHASE_CAPTURING: u16 = 1;
/// `Event.AT_TARGET`
pub const PHASE_AT_TARGET: u16 = 2;
/// `Event.BUBBLING_PHASE`
pub const PHASE_BUBBLING: u16 = 3;

/// An event being (or having been) dispatched.
///
/// Mutable dispatch-only state (`event_phase`, the three flags, and
/// `current_target`) lives behind [`Cell`]/plain fields rather than
/// `RefCell`, since an `Event` is only ever touched from the single
/// thread running dispatch and never aliased mutably while borrowed
/// immutably elsewhere.
pub struct Event {
    event_type: Atom,
    bubbles: bool,
    cancelable: bool,
    composed: bool,
    target: Cell<Option<Node>>,
    current_target: Cell<Option<Node>>,
    related_target: Option<Node>,
    event_phase: Cell<u16>,
    stop_propagation: Cell<bool>,
    stop_immediate: Cell<bool>,
    cancel_default: Cell<bool>,
    in_passive_listener: Cell<bool>,
    dispatched: Cell<bool>,
}

/// Constructor options mirroring `EventInit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventInit {
    /// Whether the event bubbles up through ancestors after the target phase.
    pub bubbles: bool,
    /// Whether `preventDefault()` has any effect on this event.
    pub cancelable: bool,
    /// Whether the event can cross shadow-tree boundaries.
    pub composed: bool,
}

impl Event {
    /// Construct a new, undispatched event.
    #[must_use]
    pub fn new(event_type: Atom, init: EventInit) -> Self {
        Self {
            event_type,
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            composed: init.composed,
            target: Cell::new(None),
            current_target: Cell::new(None),
            related_target: None,
            event_phase: Cell::new(PHASE_NONE),
            stop_propagation: Cell::new(false),
            stop_immediate: Cell::new(false),
            cancel_default: Cell::new(false),
            in_passive_listener: Cell::new(false),
            dispatched: Cell::new(false),
        }
    }

    #[must_use]
    pub fn event_type(&self) -> &Atom {
        &self.event_type
    }

    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    #[must_use]
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    #[must_use]
    pub fn composed(&self) -> bool {
        self.composed
    }

    #[must_use]
    pub fn target(&self) -> Option<Node> {
        clone_cell_node(&self.target)
    }

    #[must_use]
    pub fn current_target(&self) -> Option<Node> {
        clone_cell_node(&self.current_target)
    }

    #[must_use]
    pub fn event_phase(&self) -> u16 {
        self.event_phase.get()
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.cancel_default.get()
    }

    /// `stopPropagation()`.
    pub fn stop_propagation(&self) {
        self.stop_propagation.set(true);
    }

    /// `stopImmediatePropagation()`.
    pub fn stop_immediate_propagation(&self) {
        self.stop_propagation.set(true);
        self.stop_immediate.set(true);
    }

    /// `preventDefault()`. A no-op when the event is not cancelable, or
    /// while a passive listener is invoking it.
    pub fn prevent_default(&self) {
        if self.cancelable.eq(&true) && !self.in_passive_listener.get() {
            self.cancel_default.set(true);
        }
    }

    #[must_use]
    pub fn is_trusted_dispatch_in_progress(&self) -> bool {
        self.dispatched.get()
    }
}

fn clone_cell_node(cell: &Cell<Option<Node>>) -> Option<Node> {
    let taken = cell.take();
    let clone = taken.clone();
    cell.set(taken);
    clone
}

/// `dispatchEvent(event)`.
///
/// Builds the capture/target/bubble path from `target`'s inclusive
/// ancestors, then invokes matching listeners phase by phase. Returns
/// whether the event's default action was *not* prevented (mirroring the
/// boolean `dispatchEvent` returns).
///
/// # Errors
/// Returns [`crate::error::DomException::InvalidState`] if `event` is
/// already being dispatched; the spec forbids re-dispatching a live
/// event, and callers are expected to construct a fresh [`Event`] per
/// call.
pub fn dispatch_event(target: &Node, event: &Event) -> DomResult<bool> {
    if event.dispatched.get() {
        return Err(crate::error::DomException::InvalidState(
            "event is already being dispatched".to_string(),
        ));
    }
    event.dispatched.set(true);
    event.target.set(Some(target.clone()));

    let mut path: Vec<Node> = target.inclusive_ancestors().collect();
    // inclusive_ancestors() walks target -> root; dispatch needs root -> target.
    path.reverse();

    let capture_path = &path[..path.len().saturating_sub(1)];
    let at_target = path.last().cloned();
    let bubble_path: Vec<Node> = path
        .iter()
        .rev()
        .skip(1)
        .cloned()
        .collect();

    event.event_phase.set(PHASE_CAPTURING);
    for node in capture_path {
        if !invoke(node, event, true) {
            return Ok(finish(event));
        }
    }

    if let Some(target_node) = &at_target {
        event.event_phase.set(PHASE_AT_TARGET);
        if !invoke(target_node, event, true) {
            return Ok(finish(event));
        }
        if !invoke(target_node, event, false) {
            return Ok(finish(event));
        }
    }

    if event.bubbles {
        event.event_phase.set(PHASE_BUBBLING);
        for node in &bubble_path {
            if !invoke(node, event, false) {
                return Ok(finish(event));
            }
        }
    }

    Ok(finish(event))
}

/// Invoke listeners on `node` for the active phase. Returns `false` if
/// propagation should stop after this target.
fn invoke(node: &Node, event: &Event, capture: bool) -> bool {
    event.current_target.set(Some(node.clone()));
    let snapshot = node.borrow().event_target.snapshot(&event.event_type, capture);
    for entry in snapshot {
        if event.stop_immediate.get() {
            break;
        }
        event.in_passive_listener.set(entry.passive);
        (entry.callback)(event);
        event.in_passive_listener.set(false);
        if entry.once {
            node.borrow_mut()
                .event_target
                .mark_removed(&entry.event_type, &entry.callback, capture);
        }
    }
    !event.stop_propagation.get()
}

fn finish(event: &Event) -> bool {
    event.event_phase.set(PHASE_NONE);
    event.current_target.set(None);
    event.dispatched.set(false);
    !event.cancel_default.get()
}

impl Node {
    /// `addEventListener(type, callback, { capture, once, passive, signal })`.
    ///
    /// If `signal` is already aborted, this is a no-op. Otherwise, aborting
    /// `signal` later removes the listener.
    ///
    /// # Errors
    /// Returns [`DomException::QuotaExceeded`] if this target already
    /// holds `max_listeners_per_target` listeners.
    pub fn add_event_listener(
        &self,
        event_type: Atom,
        callback: ListenerCallback,
        capture: bool,
        once: bool,
        passive: bool,
        signal: Option<&AbortSignal>,
    ) -> DomResult<()> {
        if signal.is_some_and(AbortSignal::aborted) {
            return Ok(());
        }
        if let Some(doc) = self.owner_document() {
            let current = self.borrow().event_target.listener_count();
            crate::document::Document::from_node(doc).check_listener_count(current)?;
        }
        self.borrow_mut()
            .event_target
            .add_listener(event_type.clone(), Rc::clone(&callback), capture, once, passive);
        if let Some(signal) = signal {
            let target = self.clone();
            signal.on_abort(Rc::new(move |_event| {
                target.borrow_mut().event_target.remove_listener(&event_type, &callback, capture);
            }));
        }
        Ok(())
    }

    /// `removeEventListener(type, callback, capture)`.
    pub fn remove_event_listener(&self, event_type: &Atom, callback: &ListenerCallback, capture: bool) {
        self.borrow_mut().event_target.remove_listener(event_type, callback, capture);
    }

    /// Whether any listener is registered on this node for `event_type`.
    #[must_use]
    pub fn has_event_listener(&self, event_type: &Atom) -> bool {
        self.borrow().event_target.has_listener_for(event_type)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::document::Document;

    #[test]
    fn bubbling_event_visits_target_then_ancestors() {
        let doc = Document::new(None);
        let parent = doc.create_element("parent").unwrap();
        let child = doc.create_element("child").unwrap();
        crate::tree::append_child(doc.node(), &parent).unwrap();
        crate::tree::append_child(&parent, &child).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_child = Rc::clone(&seen);
        let seen_parent = Rc::clone(&seen);
        let click = doc.intern("click");

        child.borrow_mut().event_target.add_listener(
            click.clone(),
            Rc::new(move |_e: &Event| seen_child.borrow_mut().push("child")),
            false,
            false,
            false,
        );
        parent.borrow_mut().event_target.add_listener(
            click.clone(),
            Rc::new(move |_e: &Event| seen_parent.borrow_mut().push("parent")),
            false,
            false,
            false,
        );

        let event = Event::new(click, EventInit { bubbles: true, ..Default::default() });
        let not_prevented = dispatch_event(&child, &event).unwrap();
        assert!(not_prevented);
        assert_eq!(*seen.borrow(), vec!["child", "parent"]);
    }

    #[test]
    fn stop_immediate_propagation_skips_remaining_listeners_on_same_target() {
        let doc = Document::new(None);
        let el = doc.create_element("el").unwrap();
        crate::tree::append_child(doc.node(), &el).unwrap();

        let fired = Rc::new(RefCell::new(0u32));
        let fired_second = Rc::clone(&fired);
        let t = doc.intern("t");

        el.borrow_mut().event_target.add_listener(
            t.clone(),
            Rc::new(|e: &Event| e.stop_immediate_propagation()),
            false,
            false,
            false,
        );
        el.borrow_mut().event_target.add_listener(
            t.clone(),
            Rc::new(move |_e: &Event| *fired_second.borrow_mut() += 1),
            false,
            false,
            false,
        );

        dispatch_event(&el, &Event::new(t, EventInit::default())).unwrap();
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn aborting_signal_removes_listener() {
        use crate::abort::AbortController;

        let doc = Document::new(None);
        let el = doc.create_element("el").unwrap();
        crate::tree::append_child(doc.node(), &el).unwrap();
        let t = doc.intern("t");

        let controller = AbortController::new();
        let fired = Rc::new(RefCell::new(0u32));
        let fired_clone = Rc::clone(&fired);
        el.add_event_listener(
            t.clone(),
            Rc::new(move |_e: &Event| *fired_clone.borrow_mut() += 1),
            false,
            false,
            false,
            Some(&controller.signal()),
        )
        .unwrap();
        controller.abort(None);
        dispatch_event(&el, &Event::new(t, EventInit::default())).unwrap();
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn redispatching_a_live_event_is_rejected_not_panicked() {
        let doc = Document::new(None);
        let el = doc.create_element("el").unwrap();
        crate::tree::append_child(doc.node(), &el).unwrap();
        let t = doc.intern("t");

        let event = Event::new(t, EventInit::default());
        event.dispatched.set(true);

        match dispatch_event(&el, &event) {
            Err(crate::error::DomException::InvalidState(_)) => {}
            other => panic!("expected InvalidState error, got {other:?}"),
        }
    }
}
