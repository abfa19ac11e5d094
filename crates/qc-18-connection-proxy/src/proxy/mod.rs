//! # Connection Proxy
//!
//! Session engine for one established peer socket.
//!
//! ## Tasks
//!
//! `start` splits the socket and spawns two tasks on the runtime:
//!
//! - **reader**: heading/payload state machine, dispatches to subscribers
//! - **writer**: drains the send queue, so frames never interleave
//!
//! Both tasks hold only a `Weak` reference to the proxy and watch a shutdown
//! channel. `stop` is the single exit path: the first caller's code reaches
//! the `start` handler, every stop subscriber, and every message handler.
//!
//! The send queue is unbounded. Callers that can outpace the peer should
//! bound themselves on [`ProxyStats::pending_sends`].
//!
//! ## Lifecycle contract
//!
//! A proxy must be stopped before its last `Arc` is dropped. Dropping an
//! active proxy is logged at `error!` and stops it with `ChannelStopped`.
//!
//! `stop` returns once every stop and message handler has been notified and
//! queued sends have failed. On a started proxy the socket is not yet closed
//! at that point: the reader and writer tasks release their halves when they
//! observe shutdown, so the peer sees the close shortly after.

mod reader;
mod stats;
mod writer;


pub use stats::ProxyStats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, trace, warn};

use crate::domain::{Authority, Heading, ProtocolViolation, ProxyConfig, ProxyError, HEADING_SIZE};
use crate::messages;
use crate::ports::{ConfigProvider, Message, ProxyHooks, Socket};
use crate::subscriber::{MessageSubscriber, StopSubscriber, SubscriberAction};
use stats::TrafficCounters;
use writer::Outbound;

/// Socket halves and queue receiver held until `start` hands them to the
/// I/O tasks.
struct Parked<S> {
    reader: ReadHalf<S>,
    writer: WriteHalf<S>,
    queue: mpsc::UnboundedReceiver<Outbound>,
}

pub struct Proxy<S: Socket, H: ProxyHooks> {
    runtime: Handle,
    config: ProxyConfig,
    authority: Authority,
    hooks: H,
    started: AtomicBool,
    stopped: AtomicBool,
    reason: OnceLock<ProxyError>,
    shutdown: watch::Sender<bool>,
    parked: Mutex<Option<Parked<S>>>,
    outbound: mpsc::UnboundedSender<Outbound>,
    message_subscriber: MessageSubscriber,
    stop_subscriber: StopSubscriber,
    stats: TrafficCounters,
}

impl<S: Socket, H: ProxyHooks> Proxy<S, H> {
    /// Wrap an established socket. Nothing is read or written until
    /// [`Proxy::start`].
    pub fn new(runtime: Handle, socket: S, config: ProxyConfig, hooks: H) -> Arc<Self> {
        let authority = authority_factory(&socket);
        let (reader, writer) = tokio::io::split(socket);
        let (outbound, queue) = mpsc::unbounded_channel();
        let (shutdown, _) = watch::channel(false);

        debug!(%authority, "[qc-18] Proxy created");

        Arc::new(Self {
            runtime,
            config,
            authority,
            hooks,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            reason: OnceLock::new(),
            shutdown,
            parked: Mutex::new(Some(Parked {
                reader,
                writer,
                queue,
            })),
            outbound,
            message_subscriber: MessageSubscriber::new(),
            stop_subscriber: StopSubscriber::new(),
            stats: TrafficCounters::default(),
        })
    }

    /// Same as [`Proxy::new`] with configuration taken from `provider`.
    pub fn with_provider<P>(runtime: Handle, socket: S, provider: &P, hooks: H) -> Arc<Self>
    where
        P: ConfigProvider + ?Sized,
    {
        Self::new(runtime, socket, provider.proxy_config(), hooks)
    }

    /// Begin reading and writing. `on_stop` is invoked exactly once with the
    /// final code; a second call only reports `AlreadyStarted` to its own
    /// handler.
    pub fn start<F>(self: &Arc<Self>, on_stop: F)
    where
        F: FnOnce(ProxyError) + Send + 'static,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!(authority = %self.authority, "[qc-18] Proxy started twice");
            on_stop(ProxyError::AlreadyStarted);
            return;
        }

        self.stop_subscriber.subscribe(on_stop);

        // None when stopped before start
        let Some(Parked {
            reader,
            writer,
            queue,
        }) = self.parked.lock().take()
        else {
            return;
        };

        debug!(authority = %self.authority, "[qc-18] Proxy started");
        let weak = Arc::downgrade(self);
        self.runtime.spawn(reader::run(
            weak.clone(),
            reader,
            self.config.clone(),
            self.shutdown.subscribe(),
        ));
        self.runtime
            .spawn(writer::run(weak, writer, queue, self.shutdown.subscribe()));
    }

    /// Tear the connection down. Only the first call has any effect.
    pub fn stop(&self, code: ProxyError) {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let _ = self.reason.set(code.clone());

        if code.is_terminal() {
            warn!(authority = %self.authority, error = %code, "[qc-18] Proxy stopping");
        } else {
            debug!(authority = %self.authority, reason = %code, "[qc-18] Proxy stopping");
        }

        self.shutdown.send_replace(true);

        let parked = self.parked.lock().take();
        if let Some(Parked {
            reader,
            writer,
            mut queue,
        }) = parked
        {
            drop(reader);
            drop(writer);
            writer::fail_pending(&mut queue);
        }

        self.message_subscriber.stop(&code);
        self.stop_subscriber.relay(code);
        self.hooks.on_stopping();
    }

    /// Frame `message` and queue it behind earlier sends. `on_complete` runs
    /// exactly once, after the frame is written or with the reason it was not.
    pub fn send<M, F>(&self, message: &M, on_complete: F)
    where
        M: Message,
        F: FnOnce(Result<(), ProxyError>) + Send + 'static,
    {
        if self.stopped() {
            on_complete(Err(ProxyError::ChannelStopped));
            return;
        }

        let frame = match messages::serialize(message, self.config.magic) {
            Ok(frame) => frame,
            Err(violation) => {
                on_complete(Err(violation.into()));
                return;
            }
        };

        let declared = frame.len() - HEADING_SIZE;
        if declared > self.config.max_payload_size {
            debug!(
                authority = %self.authority,
                command = M::COMMAND,
                declared,
                "[qc-18] Refusing oversized send"
            );
            on_complete(Err(ProtocolViolation::PayloadTooLarge {
                declared,
                limit: self.config.max_payload_size,
            }
            .into()));
            return;
        }

        let outbound = Outbound {
            command: M::COMMAND,
            frame,
            on_complete: Box::new(on_complete),
            slot: self.stats.reserve_slot(),
        };
        if let Err(mpsc::error::SendError(outbound)) = self.outbound.send(outbound) {
            outbound.complete(Err(ProxyError::ChannelStopped));
        }
    }

    /// Async form of [`Proxy::send`].
    pub async fn send_message<M: Message>(&self, message: &M) -> Result<(), ProxyError> {
        let (tx, rx) = oneshot::channel();
        self.send(message, move |result| {
            let _ = tx.send(result);
        });
        rx.await.unwrap_or(Err(ProxyError::ChannelStopped))
    }

    /// Register a handler for inbound `M` messages.
    pub fn subscribe<M, F>(&self, handler: F) -> Result<(), ProxyError>
    where
        M: Message,
        F: FnMut(Result<Arc<M>, ProxyError>) -> SubscriberAction + Send + 'static,
    {
        if self.stopped() {
            return Err(ProxyError::ChannelStopped);
        }
        self.message_subscriber.subscribe::<M, F>(handler)
    }

    /// Register for the terminal code. Runs immediately if already stopped.
    pub fn subscribe_stop<F>(&self, handler: F)
    where
        F: FnOnce(ProxyError) + Send + 'static,
    {
        self.stop_subscriber.subscribe(handler);
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// The code `stop` was first called with.
    pub fn stop_reason(&self) -> Option<ProxyError> {
        self.reason.get().cloned()
    }

    pub fn stats(&self) -> ProxyStats {
        self.stats.snapshot()
    }

    fn dispatch_inbound(&self, heading: &Heading, payload: &[u8]) {
        self.stats.record_received(HEADING_SIZE + payload.len());

        let command = heading.command.as_str();
        match self.message_subscriber.dispatch(command, payload) {
            Ok(notified) => {
                trace!(authority = %self.authority, command, notified, "[qc-18] Dispatched");
                self.hooks.on_activity();
            }
            Err(error) => {
                debug!(authority = %self.authority, command, %error, "[qc-18] Dropped undecodable message");
            }
        }
    }
}

impl<S: Socket, H: ProxyHooks> Drop for Proxy<S, H> {
    fn drop(&mut self) {
        if !self.stopped() {
            error!(authority = %self.authority, "[qc-18] Proxy dropped while active");
            self.stop(ProxyError::ChannelStopped);
        }
    }
}

/// Resolves once `stop` has published, or the proxy is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}

fn authority_factory<S: Socket>(socket: &S) -> Authority {
    match socket.remote_endpoint() {
        Ok(endpoint) => Authority::from(endpoint),
        Err(error) => {
            debug!(%error, "[qc-18] Remote endpoint unavailable");
            Authority::unspecified()
        }
    }
}
