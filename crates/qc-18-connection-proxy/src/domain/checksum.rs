//! Payload checksum: first four bytes of SHA-256(SHA-256(payload)).

use sha2::{Digest, Sha256};

/// Width of the heading checksum field.
pub const CHECKSUM_SIZE: usize = 4;

/// Heading checksum value.
pub type Checksum = [u8; CHECKSUM_SIZE];

/// Checksum of the empty payload (`verack`, `getaddr`, ...).
pub const EMPTY_CHECKSUM: Checksum = [0x5d, 0xf6, 0xe0, 0xe2];

/// Compute the heading checksum for `payload`.
pub fn checksum(payload: &[u8]) -> Checksum {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&second[..CHECKSUM_SIZE]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_checksum() {
        assert_eq!(checksum(&[]), EMPTY_CHECKSUM);
    }

    #[test]
    fn test_checksum_depends_on_every_byte() {
        let a = checksum(&[0u8; 10]);
        let mut payload = [0u8; 10];
        payload[9] = 1;
        assert_ne!(a, checksum(&payload));
    }

    #[test]
    fn test_known_ping_checksum() {
        // sha256d(0x0000000000000000)
        assert_eq!(checksum(&[0u8; 8]), [0x7e, 0xf0, 0xca, 0x62]);
    }
}
