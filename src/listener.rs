//! Listener registry: symmetric attach/detach over any event source.
//!
//! Every event source (window, document, canvas element, or a control object
//! like the transform gizmo) implements [`ListenerTarget`]. [`attach`] is the
//! only way the engine subscribes, and it returns a [`Subscription`] guard that
//! detaches exactly once: explicitly through [`Subscription::detach`], or when
//! the guard is dropped at the end of its owner's lifetime.
//!
//! [`EventHub`] is an in-process target. Hosts can adapt their own sources by
//! implementing the trait, or forward native events into a hub.

#[cfg(test)]
#[path = "listener_test.rs"]
mod listener_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::input::{EventKind, InputEvent};

/// Unique identifier for a registered listener, per target.
pub type ListenerId = u32;

/// Shared event handler.
pub type Handler = Rc<dyn Fn(&InputEvent)>;

/// Capability shared by every event source.
pub trait ListenerTarget {
    /// Register `handler` for events of `kind`.
    fn add_listener(&self, kind: EventKind, handler: Handler) -> ListenerId;

    /// Remove a listener. Returns `false` if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

/// Register `handler` for `kind` on `target`, returning the guard that detaches it.
pub fn attach<F>(target: &Rc<dyn ListenerTarget>, kind: EventKind, handler: F) -> Subscription
where
    F: Fn(&InputEvent) + 'static,
{
    let id = target.add_listener(kind, Rc::new(handler));
    Subscription { target: Rc::clone(target), kind, id, attached: true }
}

/// A live registration. Detaches on drop.
#[must_use = "dropping a Subscription detaches its listener immediately"]
pub struct Subscription {
    target: Rc<dyn ListenerTarget>,
    kind: EventKind,
    id: ListenerId,
    attached: bool,
}

impl Subscription {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Remove the listener. Calling this more than once is a no-op.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        if !self.target.remove_listener(self.id) {
            tracing::debug!(id = self.id, kind = ?self.kind, "listener was already gone at detach");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

/// In-process event source.
///
/// Handlers run in registration order. Emitting snapshots the handler list
/// first, so a handler may attach or detach listeners on the same hub.
#[derive(Default)]
pub struct EventHub {
    listeners: RefCell<Vec<(ListenerId, EventKind, Handler)>>,
    next_id: Cell<ListenerId>,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every listener for its kind. Returns how many ran.
    pub fn emit(&self, event: &InputEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.borrow().iter().filter(|(_, k, _)| *k == kind).count()
    }

    /// Number of listeners across all kinds.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl ListenerTarget for EventHub {
    fn add_listener(&self, kind: EventKind, handler: Handler) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.listeners.borrow_mut().push((id, kind, handler));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|(lid, _, _)| *lid == id) {
            Some(pos) => {
                listeners.remove(pos);
                true
            }
            None => false,
        }
    }
}
