//! Message framing and the built-in control messages.

mod control;

pub use control::{Ping, Pong, Verack};

use crate::domain::{Command, Heading, ProtocolViolation, HEADING_SIZE};
use crate::ports::Message;

/// Frame `message` as heading plus payload under `magic`.
///
/// Fails only when `M::COMMAND` is not a valid command identifier.
pub fn serialize<M: Message>(message: &M, magic: u32) -> Result<Vec<u8>, ProtocolViolation> {
    let command = Command::new(M::COMMAND).ok_or(ProtocolViolation::MalformedCommand)?;
    let payload = message.encode();
    let heading = Heading::for_payload(magic, command, &payload);

    let mut frame = Vec::with_capacity(HEADING_SIZE + payload.len());
    frame.extend_from_slice(&heading.encode());
    frame.extend_from_slice(&payload);
    Ok(frame)
}
