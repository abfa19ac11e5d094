//! Read task: sole owner of the socket's read half and both buffers.
//!
//! Alternates between the two read states until a terminal condition:
//!
//! ```text
//! AwaitingHeading --valid heading--> AwaitingPayload --checksum ok--> dispatch
//!        ^                                                              |
//!        +--------------------------------------------------------------+
//! ```
//!
//! Every failure on the way ends in `Proxy::stop` with the cause.

use std::sync::Weak;

use tokio::io::{AsyncReadExt, ReadHalf};
use tokio::sync::watch;
use tracing::warn;

use super::{shutdown_requested, Proxy};
use crate::domain::{Heading, ProxyConfig, ProxyError, HEADING_SIZE};
use crate::ports::{ProxyHooks, Socket};

pub(super) async fn run<S, H>(
    weak: Weak<Proxy<S, H>>,
    mut reader: ReadHalf<S>,
    config: ProxyConfig,
    mut shutdown: watch::Receiver<bool>,
) where
    S: Socket,
    H: ProxyHooks,
{
    let mut raw = [0u8; HEADING_SIZE];
    let mut payload = Vec::new();

    let code = loop {
        // AwaitingHeading
        let read = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => return,
            read = reader.read_exact(&mut raw) => read,
        };
        if let Err(error) = read {
            break ProxyError::from(error);
        }

        let heading = Heading::parse(&raw);
        let length = match heading.validate(&config) {
            Ok(length) => length,
            Err(violation) => {
                warn!(command = %heading.command, %violation, "[qc-18] Invalid heading");
                break violation.into();
            }
        };

        // AwaitingPayload
        payload.clear();
        payload.resize(length, 0);
        let read = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => return,
            read = reader.read_exact(&mut payload) => read,
        };
        if let Err(error) = read {
            break ProxyError::from(error);
        }

        if let Err(violation) = heading.verify_checksum(&payload) {
            warn!(command = %heading.command, %violation, "[qc-18] Invalid payload");
            break violation.into();
        }

        let Some(proxy) = weak.upgrade() else {
            return;
        };
        if proxy.stopped() {
            return;
        }
        proxy.dispatch_inbound(&heading, &payload);
    };

    if let Some(proxy) = weak.upgrade() {
        proxy.stop(code);
    }
}
