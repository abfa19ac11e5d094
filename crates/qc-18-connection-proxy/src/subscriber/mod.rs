//! Subscriber registries owned by a proxy.
//!
//! - [`MessageSubscriber`]: typed fan-out of decoded inbound messages
//! - [`StopSubscriber`]: one-shot fan-out of the terminal status code
//!
//! Both registries invoke handlers outside their lock, so a handler may call
//! back into the proxy (subscribe, send, stop) without deadlocking.

mod message;
mod stop;


pub use message::MessageSubscriber;
pub use stop::StopSubscriber;

/// Returned by a message handler to stay registered or leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberAction {
    Keep,
    Unsubscribe,
}
