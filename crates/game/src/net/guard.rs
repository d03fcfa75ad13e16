use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::event::{Emitter, GameEvent};

/// Per-entity emit capability. While a remote event is being applied every
/// emit through this guard is swallowed, so replayed state never echoes back
/// onto the network.
#[derive(Debug)]
pub struct NetworkGuard {
    emitter: Emitter,
    handling_remote: Rc<Cell<bool>>,
}

impl NetworkGuard {
    pub fn new(emitter: Emitter) -> Self {
        Self {
            emitter,
            handling_remote: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_handling_remote_event(&self) -> bool {
        self.handling_remote.get()
    }

    /// Returns whether the event reached the outbox.
    pub fn emit<T: Serialize + ?Sized>(&self, event_name: &str, data: &T) -> bool {
        if self.handling_remote.get() {
            log::trace!("Suppressed `{}` while applying a remote event", event_name);
            return false;
        }
        self.emitter.emit(event_name, data);
        true
    }

    pub fn emit_event(&self, event: &GameEvent) -> bool {
        self.emit(event.event_name(), event)
    }

    /// Marks this guard as handling a remote event until the returned scope
    /// drops, then restores whatever value it had before.
    pub fn suppress(&self) -> SuppressScope {
        let previous = self.handling_remote.replace(true);
        SuppressScope {
            flag: Rc::clone(&self.handling_remote),
            previous,
        }
    }

    pub fn with_suppressed<R>(&self, f: impl FnOnce() -> R) -> R {
        let _scope = self.suppress();
        f()
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

#[must_use = "suppression ends when the scope is dropped"]
pub struct SuppressScope {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for SuppressScope {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

pub trait Networked {
    fn guard(&self) -> &NetworkGuard;

    fn emit(&self, event: GameEvent) -> bool {
        self.guard().emit_event(&event)
    }

    /// Applies an inbound state change to this entity without rebroadcasting
    /// anything it emits along the way.
    fn handle_remote_event<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let _scope = self.guard().suppress();
        f(self)
    }
}
