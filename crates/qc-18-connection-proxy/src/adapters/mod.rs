//! # Adapters
//!
//! Concrete implementations of the outbound ports.
//!
//! - **socket**: `Socket` for `tokio::net::TcpStream`
//! - **hooks**: `NoOpHooks` and `ActivityMonitor`
//! - **config**: `StaticConfigProvider`, and `TomlConfigProvider` behind the
//!   `toml-config` feature

pub mod config;
pub mod hooks;
pub mod socket;

pub use config::StaticConfigProvider;
#[cfg(feature = "toml-config")]
pub use config::{ConfigError, TomlConfigProvider};
pub use hooks::{ActivityMonitor, NoOpHooks};
