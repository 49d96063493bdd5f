use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Serialises event handling on the single UI thread.
///
/// An event submitted while another one is being handled (for example from
/// inside an effect that synchronously triggers a callback) is appended to
/// the queue and handled after the current one finishes, never interleaved
/// with it. Only the outermost `submit` drains, so the handler passed to a
/// nested call is not invoked.
pub struct EventQueue<E> {
    pending: RefCell<VecDeque<E>>,
    draining: Cell<bool>,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            pending: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn submit(&self, event: E, mut handle: impl FnMut(E)) {
        self.pending.borrow_mut().push_back(event);
        if self.draining.replace(true) {
            return;
        }
        loop {
            // the borrow must end before `handle` runs; it may submit again
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(ev) => handle(ev),
                None => break,
            }
        }
        self.draining.set(false);
    }
}
