use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::trace;

use super::{EventHandler, EventObserver, Unsubscriber};
use crate::destroyable::Destroyable;

/// Buffers events from an observer so a frame loop can drain them at its own pace
/// instead of reacting inside the emitting call.
pub struct EventQueue<T: std::fmt::Debug + Clone + 'static> {
    pending: Rc<RefCell<VecDeque<T>>>,
    subscription: Option<Unsubscriber<T>>,
}

impl<T: std::fmt::Debug + Clone + 'static> EventQueue<T> {
    pub fn attach(observer: &EventObserver<T>) -> Self {
        let pending = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&pending);
        let subscription = observer.subscribe_with_handle(move |event: &T| {
            sink.borrow_mut().push_back(event.clone());
        });
        Self {
            pending,
            subscription: Some(subscription),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Takes every buffered event, oldest first.
    pub fn drain(&self) -> Vec<T> {
        let drained: Vec<T> = self.pending.borrow_mut().drain(..).collect();
        trace!(target: "events", "Drained {} queued events", drained.len());
        drained
    }

    /// Drains into a handler; returns how many events were delivered.
    pub fn dispatch<H: EventHandler<T>>(&self, handler: &mut H) -> usize {
        let events = self.drain();
        handler.handle_events(&events);
        events.len()
    }
}

impl<T: std::fmt::Debug + Clone + 'static> Destroyable for EventQueue<T> {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.pending.borrow_mut().clear();
    }
}
