//! Handshake acknowledgement and keepalive messages.

use crate::domain::DecodeError;
use crate::ports::Message;

const NONCE_SIZE: usize = 8;

/// Version acknowledgement. Always an empty payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verack;

impl Message for Verack {
    const COMMAND: &'static str = "verack";

    fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(payload, 0)?;
        Ok(Self)
    }
}

/// Keepalive request; the peer answers with a [`Pong`] echoing the nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub nonce: u64,
}

impl Message for Ping {
    const COMMAND: &'static str = "ping";

    fn encode(&self) -> Vec<u8> {
        self.nonce.to_le_bytes().to_vec()
    }

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            nonce: read_nonce(payload)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong {
    pub nonce: u64,
}

impl Message for Pong {
    const COMMAND: &'static str = "pong";

    fn encode(&self) -> Vec<u8> {
        self.nonce.to_le_bytes().to_vec()
    }

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            nonce: read_nonce(payload)?,
        })
    }
}

fn expect_len(payload: &[u8], expected: usize) -> Result<(), DecodeError> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedLength {
            expected,
            actual: payload.len(),
        })
    }
}

fn read_nonce(payload: &[u8]) -> Result<u64, DecodeError> {
    expect_len(payload, NONCE_SIZE)?;
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(payload);
    Ok(u64::from_le_bytes(nonce))
}
