//! # Connection Proxy Subsystem (qc-18)
//!
//! Per-connection session engine for the P2P layer. A [`Proxy`] owns one
//! established socket, frames messages with the network's 24-byte heading,
//! fans decoded payloads out to typed subscribers, and tears the connection
//! down exactly once.
//!
//! ## Architecture Role
//!
//! ```text
//! [Acceptor / Connector] ──socket──→ Proxy::new ──start──→ ┌─ reader task ─→ MessageSubscriber ─→ handlers
//!                                                          └─ writer task ←─ send queue ←─ Proxy::send
//!                                         stop(code) ──→ StopSubscriber ─→ start handler + subscribers
//! ```
//!
//! ## Wire Format
//!
//! `magic (4, LE) | command (12, NUL-padded ASCII) | length (4, LE) | checksum (4)`
//! followed by `length` payload bytes. The checksum is the first four bytes of
//! double SHA-256 over the payload.
//!
//! ## Failure Policy
//!
//! - Transport errors and inbound framing violations stop the proxy
//! - Decode failures reach that command's handlers only
//! - Oversized outbound payloads are refused to their caller only
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use qc_18_connection_proxy::{NoOpHooks, Ping, Pong, Proxy, ProxyConfig, SubscriberAction};
//!
//! # async fn run(stream: tokio::net::TcpStream) {
//! let proxy = Proxy::new(
//!     tokio::runtime::Handle::current(),
//!     stream,
//!     ProxyConfig::default(),
//!     NoOpHooks,
//! );
//!
//! let weak = Arc::downgrade(&proxy);
//! proxy
//!     .subscribe::<Ping, _>(move |ping| {
//!         if let (Ok(ping), Some(proxy)) = (ping, weak.upgrade()) {
//!             proxy.send(&Pong { nonce: ping.nonce }, |_| {});
//!         }
//!         SubscriberAction::Keep
//!     })
//!     .ok();
//!
//! proxy.start(|code| tracing::info!(%code, "connection closed"));
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod guard;
pub mod messages;
pub mod ports;
pub mod proxy;
pub mod subscriber;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapters::{ActivityMonitor, NoOpHooks, StaticConfigProvider};
#[cfg(feature = "toml-config")]
pub use adapters::{ConfigError, TomlConfigProvider};
pub use domain::*;
pub use guard::{Transactional, TxnGuard};
pub use messages::{serialize, Ping, Pong, Verack};
pub use ports::{ConfigProvider, Message, ProxyHooks, Socket};
pub use proxy::{Proxy, ProxyStats};
pub use subscriber::{MessageSubscriber, StopSubscriber, SubscriberAction};
