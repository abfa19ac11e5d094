//! In-memory sockets, recording hooks and frame builders for unit tests.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};

use crate::domain::{checksum, Checksum, Command, Heading, HEADING_SIZE};
use crate::ports::{ProxyHooks, Socket};

/// Upper bound on any wait for a notification in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Address reported by [`memory_pair`] sockets.
pub const TEST_PEER: &str = "192.0.2.7:18444";

/// One end of an in-memory duplex pipe posing as a peer socket.
pub struct MemorySocket {
    inner: DuplexStream,
    peer: Option<SocketAddr>,
}

impl MemorySocket {
    pub fn new(inner: DuplexStream, peer: Option<SocketAddr>) -> Self {
        Self { inner, peer }
    }
}

impl Socket for MemorySocket {
    fn remote_endpoint(&self) -> io::Result<SocketAddr> {
        self.peer
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no peer address"))
    }
}

impl AsyncRead for MemorySocket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for MemorySocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Proxy-side socket plus the raw remote end driven by the test.
pub fn memory_pair() -> (MemorySocket, DuplexStream) {
    let (local, remote) = tokio::io::duplex(64 * 1024);
    let peer = TEST_PEER.parse().ok();
    (MemorySocket::new(local, peer), remote)
}

/// Hooks counting their invocations.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    activity: AtomicUsize,
    stopping: AtomicUsize,
}

impl RecordingHooks {
    pub fn activity(&self) -> usize {
        self.activity.load(Ordering::SeqCst)
    }

    pub fn stopping(&self) -> usize {
        self.stopping.load(Ordering::SeqCst)
    }
}

impl ProxyHooks for RecordingHooks {
    fn on_activity(&self) {
        self.activity.fetch_add(1, Ordering::SeqCst);
    }

    fn on_stopping(&self) {
        self.stopping.fetch_add(1, Ordering::SeqCst);
    }
}

/// Heading and payload with an explicit checksum.
pub fn raw_frame(magic: u32, command: &str, payload: &[u8], checksum: Checksum) -> Vec<u8> {
    let mut heading = Heading::for_payload(
        magic,
        Command::new(command).expect("valid test command"),
        payload,
    );
    heading.checksum = checksum;

    let mut frame = Vec::with_capacity(HEADING_SIZE + payload.len());
    frame.extend_from_slice(&heading.encode());
    frame.extend_from_slice(payload);
    frame
}

/// Correctly checksummed frame.
pub fn frame(magic: u32, command: &str, payload: &[u8]) -> Vec<u8> {
    raw_frame(magic, command, payload, checksum(payload))
}
