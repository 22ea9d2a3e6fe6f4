mod channel;
mod event_handler;
mod event_queue;

pub use channel::{Channel, EventEmitter, EventObserver, SubscriptionId, Unsubscriber};
pub use event_handler::EventHandler;
pub use event_queue::EventQueue;
