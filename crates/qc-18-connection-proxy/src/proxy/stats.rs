use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of a proxy's traffic counters. Byte counts include headings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub messages_sent: u64,
    pub messages_received: u64,
    /// Sends accepted but not yet written or failed.
    pub pending_sends: u64,
}

#[derive(Debug, Default)]
pub(super) struct TrafficCounters {
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    pending: Arc<AtomicU64>,
}

/// Counts one queued send until dropped.
#[derive(Debug)]
pub(super) struct PendingSlot(Arc<AtomicU64>);

impl Drop for PendingSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl TrafficCounters {
    pub(super) fn reserve_slot(&self) -> PendingSlot {
        self.pending.fetch_add(1, Ordering::Relaxed);
        PendingSlot(Arc::clone(&self.pending))
    }

    pub(super) fn record_sent(&self, frame_len: usize) {
        self.bytes_sent.fetch_add(frame_len as u64, Ordering::Relaxed);
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_received(&self, frame_len: usize) {
        self.bytes_received
            .fetch_add(frame_len as u64, Ordering::Relaxed);
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self) -> ProxyStats {
        ProxyStats {
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            pending_sends: self.pending.load(Ordering::Relaxed),
        }
    }
}
