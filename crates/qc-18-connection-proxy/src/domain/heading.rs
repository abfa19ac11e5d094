//! Fixed 24-byte message heading.
//!
//! ```text
//! 0        4                    16        20        24
//! | magic  | command (NUL pad)  | length  | checksum |
//! | u32 LE | 12 x ASCII         | u32 LE  | 4 bytes  |
//! ```

use std::fmt;

use super::checksum::{checksum, Checksum, CHECKSUM_SIZE};
use super::config::ProxyConfig;
use super::errors::ProtocolViolation;

/// Encoded size of a heading.
pub const HEADING_SIZE: usize = 24;
/// Width of the command field.
pub const COMMAND_SIZE: usize = 12;

const MAGIC_RANGE: std::ops::Range<usize> = 0..4;
const COMMAND_RANGE: std::ops::Range<usize> = 4..16;
const LENGTH_RANGE: std::ops::Range<usize> = 16..20;
const CHECKSUM_RANGE: std::ops::Range<usize> = 20..24;

/// Raw command field as it appeared on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command([u8; COMMAND_SIZE]);

impl Command {
    /// Build a command from its textual name. Returns `None` unless the name
    /// is 1 to 12 printable ASCII characters.
    pub fn new(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty()
            || bytes.len() > COMMAND_SIZE
            || !bytes.iter().all(u8::is_ascii_graphic)
        {
            return None;
        }
        let mut field = [0u8; COMMAND_SIZE];
        field[..bytes.len()].copy_from_slice(bytes);
        Some(Self(field))
    }

    pub fn from_bytes(bytes: [u8; COMMAND_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMMAND_SIZE] {
        &self.0
    }

    /// Printable prefix followed only by NUL padding.
    pub fn is_well_formed(&self) -> bool {
        let end = self.name_len();
        end > 0
            && self.0[..end].iter().all(u8::is_ascii_graphic)
            && self.0[end..].iter().all(|&b| b == 0)
    }

    /// Name without padding. Empty when the field is not valid UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0[..self.name_len()]).unwrap_or("")
    }

    fn name_len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(COMMAND_SIZE)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_well_formed() {
            f.write_str(self.as_str())
        } else {
            write!(f, "{:02x?}", self.0)
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({self})")
    }
}

/// Decoded heading fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading {
    pub magic: u32,
    pub command: Command,
    pub payload_length: u32,
    pub checksum: Checksum,
}

impl Heading {
    /// Heading describing `payload` under `magic`.
    pub fn for_payload(magic: u32, command: Command, payload: &[u8]) -> Self {
        Self {
            magic,
            command,
            // callers bound payloads well below u32::MAX
            payload_length: u32::try_from(payload.len()).unwrap_or(u32::MAX),
            checksum: checksum(payload),
        }
    }

    /// Split a raw heading into fields. Never fails; see [`Heading::validate`].
    pub fn parse(bytes: &[u8; HEADING_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[MAGIC_RANGE]);
        let mut command = [0u8; COMMAND_SIZE];
        command.copy_from_slice(&bytes[COMMAND_RANGE]);
        let mut length = [0u8; 4];
        length.copy_from_slice(&bytes[LENGTH_RANGE]);
        let mut sum = [0u8; CHECKSUM_SIZE];
        sum.copy_from_slice(&bytes[CHECKSUM_RANGE]);

        Self {
            magic: u32::from_le_bytes(magic),
            command: Command(command),
            payload_length: u32::from_le_bytes(length),
            checksum: sum,
        }
    }

    pub fn encode(&self) -> [u8; HEADING_SIZE] {
        let mut out = [0u8; HEADING_SIZE];
        out[MAGIC_RANGE].copy_from_slice(&self.magic.to_le_bytes());
        out[COMMAND_RANGE].copy_from_slice(&self.command.0);
        out[LENGTH_RANGE].copy_from_slice(&self.payload_length.to_le_bytes());
        out[CHECKSUM_RANGE].copy_from_slice(&self.checksum);
        out
    }

    /// Check magic, command format and declared length, in that order.
    /// Returns the payload length to read next.
    pub fn validate(&self, config: &ProxyConfig) -> Result<usize, ProtocolViolation> {
        if self.magic != config.magic {
            return Err(ProtocolViolation::BadMagic {
                expected: config.magic,
                actual: self.magic,
            });
        }
        if !self.command.is_well_formed() {
            return Err(ProtocolViolation::MalformedCommand);
        }
        let declared = self.payload_length as usize;
        if declared > config.max_payload_size {
            return Err(ProtocolViolation::PayloadTooLarge {
                declared,
                limit: config.max_payload_size,
            });
        }
        Ok(declared)
    }

    pub fn verify_checksum(&self, payload: &[u8]) -> Result<(), ProtocolViolation> {
        let actual = checksum(payload);
        if actual == self.checksum {
            Ok(())
        } else {
            Err(ProtocolViolation::ChecksumMismatch {
                expected: self.checksum,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checksum::EMPTY_CHECKSUM;
    use crate::domain::config::REGTEST_MAGIC;
    use proptest::prelude::*;

    fn verack_bytes() -> [u8; HEADING_SIZE] {
        let mut raw = [0u8; HEADING_SIZE];
        raw[..4].copy_from_slice(&REGTEST_MAGIC.to_le_bytes());
        raw[4..10].copy_from_slice(b"verack");
        raw[20..].copy_from_slice(&EMPTY_CHECKSUM);
        raw
    }

    #[test]
    fn test_parse_verack() {
        let heading = Heading::parse(&verack_bytes());
        assert_eq!(heading.magic, REGTEST_MAGIC);
        assert_eq!(heading.command.as_str(), "verack");
        assert_eq!(heading.payload_length, 0);
        assert_eq!(heading.validate(&ProxyConfig::for_testing()), Ok(0));
        assert!(heading.verify_checksum(&[]).is_ok());
        assert_eq!(heading.encode(), verack_bytes());
    }

    #[test]
    fn test_magic_checked_before_command() {
        let mut raw = verack_bytes();
        raw[0] ^= 0xff;
        raw[4] = 0x01;
        let result = Heading::parse(&raw).validate(&ProxyConfig::for_testing());
        assert!(matches!(result, Err(ProtocolViolation::BadMagic { .. })));
    }

    #[test]
    fn test_command_with_embedded_nul_rejected() {
        let mut field = [0u8; COMMAND_SIZE];
        field[..2].copy_from_slice(b"pi");
        field[3] = b'g';
        assert!(!Command::from_bytes(field).is_well_formed());
        assert!(!Command::from_bytes([0u8; COMMAND_SIZE]).is_well_formed());
    }

    #[test]
    fn test_command_new_limits() {
        assert!(Command::new("sendheaders").is_some());
        assert!(Command::new("twelve_chars").is_some());
        assert!(Command::new("thirteen_char").is_none());
        assert!(Command::new("").is_none());
        assert!(Command::new("has space").is_none());
    }

    #[test]
    fn test_length_limit_is_inclusive() {
        let config = ProxyConfig::for_testing();
        let command = Command::new("block").unwrap();
        let at_limit = Heading {
            magic: config.magic,
            command,
            payload_length: config.max_payload_size as u32,
            checksum: [0; 4],
        };
        assert_eq!(at_limit.validate(&config), Ok(config.max_payload_size));

        let over = Heading {
            payload_length: at_limit.payload_length + 1,
            ..at_limit
        };
        assert_eq!(
            over.validate(&config),
            Err(ProtocolViolation::PayloadTooLarge {
                declared: config.max_payload_size + 1,
                limit: config.max_payload_size,
            })
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let heading = Heading::for_payload(REGTEST_MAGIC, Command::new("ping").unwrap(), &[1; 8]);
        assert!(heading.verify_checksum(&[1; 8]).is_ok());
        assert!(matches!(
            heading.verify_checksum(&[2; 8]),
            Err(ProtocolViolation::ChecksumMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn validate_never_accepts_foreign_magic(magic in any::<u32>(), raw in any::<[u8; 20]>()) {
            let config = ProxyConfig::for_testing();
            prop_assume!(magic != config.magic);
            let mut bytes = [0u8; HEADING_SIZE];
            bytes[..4].copy_from_slice(&magic.to_le_bytes());
            bytes[4..].copy_from_slice(&raw);
            let is_bad_magic = matches!(
                Heading::parse(&bytes).validate(&config),
                Err(ProtocolViolation::BadMagic { .. })
            );
            prop_assert!(is_bad_magic);
        }

        #[test]
        fn accepted_length_never_exceeds_limit(length in any::<u32>()) {
            let config = ProxyConfig::for_testing();
            let heading = Heading {
                magic: config.magic,
                command: Command::new("inv").unwrap(),
                payload_length: length,
                checksum: [0; 4],
            };
            match heading.validate(&config) {
                Ok(len) => prop_assert!(len <= config.max_payload_size),
                Err(violation) => {
                    let is_too_large = matches!(violation, ProtocolViolation::PayloadTooLarge { .. });
                    prop_assert!(is_too_large);
                }
            }
        }

        #[test]
        fn parse_encode_preserves_bytes(raw in any::<[u8; 24]>()) {
            prop_assert_eq!(Heading::parse(&raw).encode(), raw);
        }
    }
}
