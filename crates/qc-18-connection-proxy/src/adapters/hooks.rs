//! Ready-made [`ProxyHooks`] implementations.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::ports::ProxyHooks;

/// Hooks for connections with no role-specific behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHooks;

impl ProxyHooks for NoOpHooks {}

/// Records when the peer was last heard from.
///
/// Keepalive and inactivity policy stay outside the proxy: a timer owned by
/// the caller polls [`ActivityMonitor::is_idle`] and stops the proxy.
#[derive(Debug)]
pub struct ActivityMonitor {
    last_activity: Mutex<Instant>,
    stopping: Mutex<Option<Instant>>,
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self {
            last_activity: Mutex::new(Instant::now()),
            stopping: Mutex::new(None),
        }
    }

    pub fn last_activity(&self) -> Instant {
        *self.last_activity.lock()
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity().elapsed()
    }

    pub fn is_idle(&self, timeout: Duration) -> bool {
        self.idle_for() >= timeout
    }

    /// When teardown ran, if it has.
    pub fn stopped_at(&self) -> Option<Instant> {
        *self.stopping.lock()
    }
}

impl ProxyHooks for ActivityMonitor {
    fn on_activity(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    fn on_stopping(&self) {
        self.stopping.lock().get_or_insert_with(Instant::now);
    }
}
