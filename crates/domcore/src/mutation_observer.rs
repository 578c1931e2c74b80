//! `MutationObserver`: queued, microtask-delivered notification of tree
//! and attribute changes.
//!
//! [`MutationObserver`](https://dom.spec.whatwg.org/#interface-mutationobserver)

use std::cell::RefCell;
use std::rc::Rc;

use crate::flags::NodeFlags;
use crate::interner::Atom;
use crate::node::Node;

/// The kind of change a [`MutationRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// A child was added or removed.
    ChildList,
    /// An attribute's value changed.
    Attributes,
    /// A `CharacterData` node's data changed.
    CharacterData,
}

/// One entry in an observer's queue.
#[derive(Clone)]
pub struct MutationRecord {
    /// Which kind of change this record describes.
    pub kind: MutationKind,
    /// The node the change occurred on.
    pub target: Node,
    /// Nodes added by a `childList` change, in tree order.
    pub added_nodes: Vec<Node>,
    /// Nodes removed by a `childList` change, in tree order.
    pub removed_nodes: Vec<Node>,
    /// The sibling immediately before the change, if any.
    pub previous_sibling: Option<Node>,
    /// The sibling immediately after the change, if any.
    pub next_sibling: Option<Node>,
    /// The changed attribute's local name, for `attributes` records.
    pub attribute_name: Option<Atom>,
    /// The value before the change, if the observer requested it.
    pub old_value: Option<String>,
}

/// `MutationObserverInit`.
#[derive(Debug, Clone, Default)]
pub struct ObserverInit {
    /// Watch for child additions and removals.
    pub child_list: bool,
    /// Watch for attribute value changes.
    pub attributes: bool,
    /// Record the previous value on attribute-change records.
    pub attribute_old_value: bool,
    /// Restrict attribute watching to these local names, if set.
    pub attribute_filter: Option<Vec<String>>,
    /// Watch for character-data changes.
    pub character_data: bool,
    /// Record the previous value on character-data-change records.
    pub character_data_old_value: bool,
    /// Also watch the target's descendants.
    pub subtree: bool,
}

struct Inner {
    callback: Box<dyn Fn(&[MutationRecord])>,
    queue: RefCell<Vec<MutationRecord>>,
}

/// A handle observers hand out to targets they watch; stored on each
/// watched node (or, with `subtree`, on its inclusive descendants'
/// ancestor-walk) so mutation call sites can find interested observers
/// without a global registry.
#[derive(Clone)]
pub struct ObserverRegistration {
    pub(crate) init: Rc<ObserverInit>,
    pub(crate) inner: Rc<Inner>,
}

/// An observer that accumulates [`MutationRecord`]s and delivers them to
/// its callback when [`MutationObserver::take_records`] or an explicit
/// [`MutationObserver::deliver`] flushes the queue. There is no implicit
/// microtask checkpoint here; callers drive delivery explicitly, which
/// matches an embedding without its own event loop.
#[derive(Clone)]
pub struct MutationObserver {
    inner: Rc<Inner>,
}

impl MutationObserver {
    /// Create an observer bound to `callback`.
    pub fn new(callback: impl Fn(&[MutationRecord]) + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                callback: Box::new(callback),
                queue: RefCell::new(Vec::new()),
            }),
        }
    }

    /// `observe(target, options)`.
    pub fn observe(&self, target: &Node, init: ObserverInit) {
        let registration = ObserverRegistration {
            init: Rc::new(init),
            inner: Rc::clone(&self.inner),
        };
        target.borrow_mut().observers.push(registration);
        target.set_flag(NodeFlags::HAS_OBSERVERS_IN_ANCESTRY, true);
        for ancestor in target.ancestors() {
            ancestor.set_flag(NodeFlags::HAS_OBSERVERS_IN_ANCESTRY, true);
        }
    }

    /// `disconnect()`. Removes every registration this observer holds
    /// across the whole tree it was observing and discards its queue.
    pub fn disconnect(&self, target: &Node) {
        target
            .borrow_mut()
            .observers
            .retain(|r| !Rc::ptr_eq(&r.inner, &self.inner));
        self.inner.queue.borrow_mut().clear();
    }

    /// `takeRecords()`.
    pub fn take_records(&self) -> Vec<MutationRecord> {
        self.inner.queue.borrow_mut().drain(..).collect()
    }

    /// Flush the queue through the callback, as a microtask checkpoint
    /// would.
    pub fn deliver(&self) {
        let records = self.take_records();
        if !records.is_empty() {
            (self.inner.callback)(&records);
        }
    }

    fn enqueue(&self, record: MutationRecord) {
        self.inner.queue.borrow_mut().push(record);
    }
}

fn matching_observers(target: &Node, wants: impl Fn(&ObserverInit) -> bool) -> Vec<MutationObserver> {
    let mut out = Vec::new();
    for reg in target.borrow().observers.iter() {
        if wants(&reg.init) {
            out.push(MutationObserver { inner: Rc::clone(&reg.inner) });
        }
    }
    if !target.has_flag(NodeFlags::HAS_OBSERVERS_IN_ANCESTRY) {
        return out;
    }
    for ancestor in target.ancestors() {
        for reg in ancestor.borrow().observers.iter() {
            if reg.init.subtree && wants(&reg.init) {
                out.push(MutationObserver { inner: Rc::clone(&reg.inner) });
            }
        }
    }
    out
}

/// Queue a `childList` record on every observer watching `target` (and,
/// for `subtree`-registered observers, any ancestor of `target`).
pub(crate) fn notify_child_list_change(
    target: &Node,
    added: Vec<Node>,
    removed: Vec<Node>,
    previous_sibling: Option<Node>,
    next_sibling: Option<Node>,
) {
    let observers = matching_observers(target, |init| init.child_list);
    if observers.is_empty() {
        return;
    }
    let record = MutationRecord {
        kind: MutationKind::ChildList,
        target: target.clone(),
        added_nodes: added,
        removed_nodes: removed,
        previous_sibling,
        next_sibling,
        attribute_name: None,
        old_value: None,
    };
    for observer in observers {
        observer.enqueue(record.clone());
    }
}

/// Queue an `attributes` record, honoring each observer's
/// `attributeFilter` and `attributeOldValue` settings.
pub(crate) fn notify_attribute_change(target: &Node, name: &Atom, old_value: Option<String>) {
    let observers = matching_observers(target, |init| {
        init.attributes
            && init
                .attribute_filter
                .as_ref()
                .map_or(true, |filter| filter.iter().any(|f| f == name.as_str()))
    });
    for observer in observers {
        observer.enqueue(MutationRecord {
            kind: MutationKind::Attributes,
            target: target.clone(),
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.clone()),
            old_value: old_value.clone(),
        });
    }
}

/// Queue a `characterData` record.
pub(crate) fn notify_character_data_change(target: &Node, old_value: Option<String>) {
    let observers = matching_observers(target, |init| init.character_data);
    for observer in observers {
        observer.enqueue(MutationRecord {
            kind: MutationKind::CharacterData,
            target: target.clone(),
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            old_value: old_value.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn observe_child_list_records_appended_node() {
        let doc = Document::new(None);
        let root = doc.create_element("root").unwrap();
        let child = doc.create_element("child").unwrap();

        let seen: Rc<StdRefCell<Vec<MutationRecord>>> = Rc::new(StdRefCell::new(Vec::new()));
        let seen2 = Rc::clone(&seen);
        let observer = MutationObserver::new(move |records| {
            seen2.borrow_mut().extend(records.iter().cloned());
        });
        observer.observe(&root, ObserverInit { child_list: true, ..Default::default() });

        crate::tree::append_child(&root, &child).unwrap();
        observer.deliver();

        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].added_nodes[0].ptr_eq(&child));
    }
}
