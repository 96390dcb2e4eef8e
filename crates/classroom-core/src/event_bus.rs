//! Event bus between the session directory and presentation layers.
//!
//! Single-threaded (WASM constraint), interior mutability via RefCell.
//! Events are buffered until a view drains them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use classroom_types::event::DirectoryEvent;

/// Oldest events are dropped past this many undrained entries.
pub const MAX_PENDING_EVENTS: usize = 256;

/// Shared event bus: clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<DirectoryEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn emit(&self, event: DirectoryEvent) {
        let mut queue = self.inner.borrow_mut();
        if queue.len() == MAX_PENDING_EVENTS {
            queue.pop_front();
        }
        queue.push_back(event);
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<DirectoryEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
