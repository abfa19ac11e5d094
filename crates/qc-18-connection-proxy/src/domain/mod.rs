//! # Domain Layer for the Connection Proxy
//!
//! Pure framing and identity logic with no I/O.
//!
//! ## Contents
//!
//! - **authority**: Remote endpoint identity (`Authority`)
//! - **checksum**: Double SHA-256 payload checksum
//! - **config**: Framing parameters and network presets (`ProxyConfig`, `Network`)
//! - **errors**: `ProxyError` and its causes
//! - **heading**: 24-byte heading parse/encode/validate (`Heading`, `Command`)

mod authority;
mod checksum;
mod config;
mod errors;
mod heading;

pub use authority::*;
pub use checksum::*;
pub use config::*;
pub use errors::*;
pub use heading::*;
