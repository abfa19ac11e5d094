//! Write task: sole owner of the socket's write half.

use std::sync::Weak;

use tokio::io::{AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use super::stats::PendingSlot;
use super::{shutdown_requested, Proxy};
use crate::domain::ProxyError;
use crate::ports::{ProxyHooks, Socket};

pub(super) type Completion = Box<dyn FnOnce(Result<(), ProxyError>) + Send>;

/// A framed message waiting for the writer.
pub(super) struct Outbound {
    pub(super) command: &'static str,
    pub(super) frame: Vec<u8>,
    pub(super) on_complete: Completion,
    pub(super) slot: PendingSlot,
}

impl Outbound {
    pub(super) fn complete(self, result: Result<(), ProxyError>) {
        let Self {
            on_complete, slot, ..
        } = self;
        drop(slot);
        on_complete(result);
    }
}

/// Close the queue and fail everything still in it.
pub(super) fn fail_pending(queue: &mut mpsc::UnboundedReceiver<Outbound>) {
    queue.close();
    while let Ok(outbound) = queue.try_recv() {
        outbound.complete(Err(ProxyError::ChannelStopped));
    }
}

/// Drain `queue` onto the wire, one frame at a time, until shutdown or a
/// write failure.
pub(super) async fn run<S, H>(
    weak: Weak<Proxy<S, H>>,
    mut writer: WriteHalf<S>,
    mut queue: mpsc::UnboundedReceiver<Outbound>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: Socket,
    H: ProxyHooks,
{
    loop {
        let outbound = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => break,
            next = queue.recv() => match next {
                Some(outbound) => outbound,
                None => break,
            },
        };

        let written = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => None,
            written = write_frame(&mut writer, &outbound.frame) => Some(written),
        };

        match written {
            None => {
                // abandoned mid-frame
                outbound.complete(Err(ProxyError::ChannelStopped));
                break;
            }
            Some(Ok(())) => {
                if let Some(proxy) = weak.upgrade() {
                    proxy.stats.record_sent(outbound.frame.len());
                    trace!(authority = %proxy.authority(), command = outbound.command, "[qc-18] Sent");
                }
                outbound.complete(Ok(()));
            }
            Some(Err(error)) => {
                let code = ProxyError::from(error);
                if let Some(proxy) = weak.upgrade() {
                    proxy.stop(code.clone());
                }
                outbound.complete(Err(code));
                break;
            }
        }
    }

    fail_pending(&mut queue);
    if let Err(error) = writer.shutdown().await {
        debug!(%error, "[qc-18] Write half shutdown failed");
    }
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &[u8]) -> std::io::Result<()> {
    writer.write_all(frame).await?;
    writer.flush().await
}
