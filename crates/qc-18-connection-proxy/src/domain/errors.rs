//! Error taxonomy for the connection proxy.
//!
//! | Category  | Variant                      | Terminal |
//! |-----------|------------------------------|----------|
//! | Transport | `ProxyError::Transport`      | yes      |
//! | Protocol  | `ProxyError::Protocol`       | yes      |
//! | Decode    | `ProxyError::Decode`         | no       |
//! | Lifecycle | `ChannelStopped`, misuse     | no       |
//!
//! Terminal errors only ever surface through `Proxy::stop`, which delivers
//! them to the `start` caller and every stop subscriber.

use std::io;
use thiserror::Error;

use super::checksum::Checksum;

/// Framing violations detected in an inbound heading or payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// Heading magic does not belong to the configured network.
    #[error("bad magic: expected {expected:#010x}, found {actual:#010x}")]
    BadMagic { expected: u32, actual: u32 },

    /// Command field is not NUL-padded printable ASCII.
    #[error("malformed command identifier")]
    MalformedCommand,

    /// Declared payload length is above the configured maximum.
    #[error("payload of {declared} bytes exceeds limit of {limit}")]
    PayloadTooLarge { declared: usize, limit: usize },

    /// Payload digest does not match the heading.
    #[error("checksum mismatch: heading {expected:02x?}, payload {actual:02x?}")]
    ChecksumMismatch { expected: Checksum, actual: Checksum },
}

/// Typed decode failure for a payload whose framing was valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {expected} payload bytes, found {actual}")]
    UnexpectedLength { expected: usize, actual: usize },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Status code delivered to stop subscribers, message handlers and send
/// completions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// The proxy was stopped, or the operation was issued after stop.
    #[error("channel stopped")]
    ChannelStopped,

    /// Socket read/write failure, including remote close.
    #[error("transport error ({kind:?}): {message}")]
    Transport { kind: io::ErrorKind, message: String },

    /// Inbound framing violation.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// A known command failed typed decoding.
    #[error("failed to decode `{command}`: {source}")]
    Decode {
        command: &'static str,
        #[source]
        source: DecodeError,
    },

    /// `start` was called on a proxy that is already reading.
    #[error("proxy already started")]
    AlreadyStarted,

    /// The command is already bound to a different message type.
    #[error("command `{0}` is bound to another message type")]
    CommandConflict(&'static str),
}

/// Coarse classification of a [`ProxyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Protocol,
    Decode,
    Lifecycle,
}

impl ProxyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::ChannelStopped | Self::AlreadyStarted | Self::CommandConflict(_) => {
                ErrorCategory::Lifecycle
            }
        }
    }

    /// True for errors that end the connection when raised by the I/O path.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transport | ErrorCategory::Protocol
        )
    }
}

impl From<io::Error> for ProxyError {
    fn from(error: io::Error) -> Self {
        Self::Transport {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_transport() {
        let error = ProxyError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert_eq!(error.category(), ErrorCategory::Transport);
        assert!(error.is_terminal());
        assert!(matches!(
            error,
            ProxyError::Transport {
                kind: io::ErrorKind::UnexpectedEof,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_is_not_terminal() {
        let error = ProxyError::Decode {
            command: "ping",
            source: DecodeError::UnexpectedLength {
                expected: 8,
                actual: 3,
            },
        };
        assert!(!error.is_terminal());
        assert_eq!(
            error.to_string(),
            "failed to decode `ping`: expected 8 payload bytes, found 3"
        );
    }

    #[test]
    fn test_bad_magic_display() {
        let error: ProxyError = ProtocolViolation::BadMagic {
            expected: 0xD9B4_BEF9,
            actual: 0,
        }
        .into();
        assert!(error.is_terminal());
        assert_eq!(
            error.to_string(),
            "protocol error: bad magic: expected 0xd9b4bef9, found 0x00000000"
        );
    }

    #[test]
    fn test_lifecycle_errors() {
        assert_eq!(ProxyError::ChannelStopped.category(), ErrorCategory::Lifecycle);
        assert_eq!(ProxyError::AlreadyStarted.category(), ErrorCategory::Lifecycle);
        assert!(!ProxyError::CommandConflict("ping").is_terminal());
    }
}
