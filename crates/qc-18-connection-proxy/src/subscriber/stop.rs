use parking_lot::Mutex;

use crate::domain::ProxyError;

type StopHandler = Box<dyn FnOnce(ProxyError) + Send>;

#[derive(Default)]
struct State {
    handlers: Vec<StopHandler>,
    code: Option<ProxyError>,
}

/// One-shot registry for the proxy's terminal code.
///
/// The code is kept after [`StopSubscriber::relay`], so a handler registered
/// late still hears it, immediately and on the caller's thread.
#[derive(Default)]
pub struct StopSubscriber {
    state: Mutex<State>,
}

impl StopSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: FnOnce(ProxyError) + Send + 'static,
    {
        let code = {
            let mut state = self.state.lock();
            match state.code.clone() {
                Some(code) => code,
                None => {
                    state.handlers.push(Box::new(handler));
                    return;
                }
            }
        };
        handler(code);
    }

    /// Notify every handler in registration order. Only the first call has
    /// any effect; returns whether this call was it.
    pub fn relay(&self, code: ProxyError) -> bool {
        let handlers = {
            let mut state = self.state.lock();
            if state.code.is_some() {
                return false;
            }
            state.code = Some(code.clone());
            std::mem::take(&mut state.handlers)
        };

        for handler in handlers {
            handler(code.clone());
        }
        true
    }

    pub fn code(&self) -> Option<ProxyError> {
        self.state.lock().code.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
