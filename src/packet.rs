//! Fixed-size packet codec
//!
//! Every exchange with the device is a 32-byte packet: byte 0 is the
//! command code, bytes 1-31 are the payload, zero-filled past the
//! payload's actual length. The wire format carries no length field;
//! the catalog's per-command size is what tells a reader how much of
//! the payload is meaningful.

use crate::error::Error;
use crate::protocol::{Command, MAX_PAYLOAD, PACKET_SIZE};

/// A complete 32-byte wire packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet([u8; PACKET_SIZE]);

impl Packet {
    /// Wrap a raw 32-byte buffer
    pub fn from_bytes(bytes: [u8; PACKET_SIZE]) -> Self {
        Packet(bytes)
    }

    /// The full wire representation
    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.0
    }

    /// Command byte (byte 0)
    pub fn command_code(&self) -> u8 {
        self.0[0]
    }

    /// Payload view (bytes 1-31, including any zero padding)
    pub fn payload(&self) -> &[u8] {
        &self.0[1..]
    }
}

/// Encode a command and payload into a zero-padded 32-byte packet.
///
/// Fails with `InvalidPayload` if the payload exceeds 31 bytes. Never
/// produces a partial packet.
pub fn encode(command: Command, payload: &[u8]) -> Result<Packet, Error> {
    if payload.len() > MAX_PAYLOAD {
        return Err(Error::InvalidPayload(format!(
            "payload is {} bytes, limit is {MAX_PAYLOAD}",
            payload.len()
        )));
    }
    let mut buf = [0u8; PACKET_SIZE];
    buf[0] = command.code();
    buf[1..1 + payload.len()].copy_from_slice(payload);
    Ok(Packet(buf))
}

/// Decode a received buffer into its command byte and payload view.
///
/// Fails with `MalformedPacket` unless the buffer is exactly 32 bytes.
/// Trailing zeros are left in place; callers trim per the catalog's
/// known size for the command.
pub fn decode(bytes: &[u8]) -> Result<(u8, &[u8]), Error> {
    if bytes.len() != PACKET_SIZE {
        return Err(Error::MalformedPacket {
            expected: PACKET_SIZE,
            got: bytes.len(),
        });
    }
    Ok((bytes[0], &bytes[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_with_zeros() {
        let packet = encode(Command::WriteTableLength, &[7]).unwrap();
        assert_eq!(packet.command_code(), 0x04);
        assert_eq!(packet.payload()[0], 7);
        assert!(packet.payload()[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_empty_payload() {
        let packet = encode(Command::StartSequence, &[]).unwrap();
        assert_eq!(packet.as_bytes()[0], 0x02);
        assert!(packet.as_bytes()[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let payload: Vec<u8> = (1..=31).collect();
        let packet = encode(Command::ImmediateWrite, &payload).unwrap();
        let (code, decoded) = decode(packet.as_bytes()).unwrap();
        assert_eq!(code, 0x00);
        assert_eq!(decoded, &payload[..]);
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let payload = [0u8; 32];
        assert!(matches!(
            encode(Command::ImmediateWrite, &payload),
            Err(Error::InvalidPayload(_))
        ));
        // 31 bytes is the boundary
        assert!(encode(Command::ImmediateWrite, &payload[..31]).is_ok());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(matches!(
            decode(&[0u8; 31]),
            Err(Error::MalformedPacket {
                expected: 32,
                got: 31
            })
        ));
        assert!(matches!(
            decode(&[0u8; 33]),
            Err(Error::MalformedPacket {
                expected: 32,
                got: 33
            })
        ));
    }
}
