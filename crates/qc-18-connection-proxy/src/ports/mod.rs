//! # Ports Layer
//!
//! Driven ports (SPIs) the connection proxy requires from its host. The
//! proxy's own surface (`Proxy::start`, `send`, `subscribe`, ...) is the
//! driving side and lives in [`crate::proxy`].

pub mod outbound;

pub use outbound::{ConfigProvider, Message, ProxyHooks, Socket};
