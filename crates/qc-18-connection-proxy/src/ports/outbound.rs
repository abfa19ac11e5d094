//! Outbound ports (SPI) for the connection proxy.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::{DecodeError, ProxyConfig};

/// Established duplex byte stream to a single peer.
///
/// The proxy splits the socket into halves and drives each from its own task,
/// so implementations only need the plain tokio I/O traits.
pub trait Socket: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Address of the far end. Failure falls back to the unspecified
    /// authority.
    fn remote_endpoint(&self) -> io::Result<SocketAddr>;
}

/// Typed payload codec for one command.
pub trait Message: Send + Sync + Sized + 'static {
    /// Command identifier carried in the heading (at most 12 ASCII bytes).
    const COMMAND: &'static str;

    fn encode(&self) -> Vec<u8>;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;
}

/// Role capability injected per connection (inbound, outbound, seed...).
pub trait ProxyHooks: Send + Sync + 'static {
    /// Called after every successfully dispatched inbound message.
    fn on_activity(&self) {}

    /// Called exactly once during teardown, after stop subscribers ran.
    fn on_stopping(&self) {}
}

impl<H: ProxyHooks + ?Sized> ProxyHooks for Arc<H> {
    fn on_activity(&self) {
        (**self).on_activity();
    }

    fn on_stopping(&self) {
        (**self).on_stopping();
    }
}

/// Configuration source for proxies.
pub trait ConfigProvider: Send + Sync {
    fn proxy_config(&self) -> ProxyConfig;
}
