use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::SubscriberAction;
use crate::domain::ProxyError;
use crate::ports::Message;

type Handler<M> = Box<dyn FnMut(Result<Arc<M>, ProxyError>) -> SubscriberAction + Send>;

/// Type-erased handler list for one command.
trait Relay: Send {
    fn len(&self) -> usize;

    /// Move the handlers out, leaving an empty list of the same type.
    fn take(&mut self) -> Box<dyn Relay>;

    /// Put handlers taken for a dispatch back in front of any added since.
    fn restore(&mut self, retained: Box<dyn Relay>);

    /// Decode once and run the handlers. Handlers not yet reached when
    /// `halted` is raised are kept without being called.
    fn deliver(&mut self, payload: &[u8], halted: &AtomicBool) -> Result<usize, ProxyError>;

    fn stop(&mut self, code: &ProxyError);

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

struct TypedRelay<M: Message> {
    handlers: Vec<Handler<M>>,
}

impl<M: Message> TypedRelay<M> {
    fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    fn notify(&mut self, result: Result<Arc<M>, ProxyError>, halted: &AtomicBool) -> usize {
        let mut notified = 0;
        self.handlers.retain_mut(|handler| {
            if halted.load(Ordering::Acquire) {
                return true;
            }
            notified += 1;
            handler(result.clone()) == SubscriberAction::Keep
        });
        notified
    }
}

impl<M: Message> Relay for TypedRelay<M> {
    fn len(&self) -> usize {
        self.handlers.len()
    }

    fn take(&mut self) -> Box<dyn Relay> {
        Box::new(Self {
            handlers: std::mem::take(&mut self.handlers),
        })
    }

    fn restore(&mut self, retained: Box<dyn Relay>) {
        if let Ok(retained) = retained.into_any().downcast::<Self>() {
            let mut handlers = retained.handlers;
            handlers.append(&mut self.handlers);
            self.handlers = handlers;
        }
    }

    fn deliver(&mut self, payload: &[u8], halted: &AtomicBool) -> Result<usize, ProxyError> {
        match M::decode(payload) {
            Ok(message) => Ok(self.notify(Ok(Arc::new(message)), halted)),
            Err(source) => {
                let error = ProxyError::Decode {
                    command: M::COMMAND,
                    source,
                };
                self.notify(Err(error.clone()), halted);
                Err(error)
            }
        }
    }

    fn stop(&mut self, code: &ProxyError) {
        for mut handler in self.handlers.drain(..) {
            let _ = handler(Err(code.clone()));
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[derive(Default)]
struct Registry {
    relays: HashMap<&'static str, Box<dyn Relay>>,
    stopped: Option<ProxyError>,
}

/// Per-command registry of typed message handlers.
///
/// Each command is bound to exactly one Rust message type, fixed by the
/// first subscription. Payloads are decoded once per dispatch and shared
/// with every handler through an `Arc`.
#[derive(Default)]
pub struct MessageSubscriber {
    registry: Mutex<Registry>,
    halted: AtomicBool,
}

impl MessageSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the handlers of `M::COMMAND`.
    pub fn subscribe<M, F>(&self, handler: F) -> Result<(), ProxyError>
    where
        M: Message,
        F: FnMut(Result<Arc<M>, ProxyError>) -> SubscriberAction + Send + 'static,
    {
        let mut registry = self.registry.lock();
        if registry.stopped.is_some() {
            return Err(ProxyError::ChannelStopped);
        }

        let relay = registry
            .relays
            .entry(M::COMMAND)
            .or_insert_with(|| Box::new(TypedRelay::<M>::new()));
        match relay.as_any_mut().downcast_mut::<TypedRelay<M>>() {
            Some(typed) => {
                typed.handlers.push(Box::new(handler));
                Ok(())
            }
            None => Err(ProxyError::CommandConflict(M::COMMAND)),
        }
    }

    /// Decode `payload` as the type bound to `command` and notify its
    /// handlers in registration order.
    ///
    /// Returns the number of handlers notified, `Ok(0)` when nothing is
    /// subscribed, or the decode error that was delivered to the handlers.
    pub fn dispatch(&self, command: &str, payload: &[u8]) -> Result<usize, ProxyError> {
        let mut taken = {
            let mut registry = self.registry.lock();
            match registry.relays.get_mut(command) {
                Some(relay) if relay.len() > 0 => relay.take(),
                _ => return Ok(0),
            }
        };

        let result = taken.deliver(payload, &self.halted);

        let code = {
            let mut registry = self.registry.lock();
            match registry.stopped.clone() {
                None => {
                    if let Some(relay) = registry.relays.get_mut(command) {
                        relay.restore(taken);
                    }
                    return result;
                }
                Some(code) => code,
            }
        };

        // stopped while handlers were running
        taken.stop(&code);
        result
    }

    /// Deliver `code` once to every handler and refuse later subscriptions.
    pub fn stop(&self, code: &ProxyError) {
        let relays = {
            let mut registry = self.registry.lock();
            if registry.stopped.is_some() {
                return;
            }
            registry.stopped = Some(code.clone());
            self.halted.store(true, Ordering::Release);
            std::mem::take(&mut registry.relays)
        };

        for mut relay in relays.into_values() {
            relay.stop(code);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.registry.lock().stopped.is_some()
    }

    /// Handlers currently registered for `command`.
    pub fn handler_count(&self, command: &str) -> usize {
        self.registry
            .lock()
            .relays
            .get(command)
            .map_or(0, |relay| relay.len())
    }
}
