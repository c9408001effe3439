// Wire header codec
//
// Every datagram starts with a fixed 6-byte big-endian header:
// sequence (u32), flags (u8), energy budget hint (u8). The payload follows
// with no length prefix - the datagram boundary is the message boundary.

use thiserror::Error;

/// Size of the fixed wire header in bytes.
pub const HEADER_SIZE: usize = 6;

/// Payload contains more than one aggregated reading.
pub const FLAG_AGGREGATED: u8 = 0x01;

/// Packet is an acknowledgment; payload must be empty.
pub const FLAG_ACK: u8 = 0x02;

/// Errors that can occur while decoding a datagram
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Datagram too short for header: {0} bytes")]
    TooShort(usize),
}

/// A decoded (or to-be-encoded) protocol packet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Sender-assigned sequence number, wraps modulo 2^32
    pub sequence: u32,
    /// Flag bitset (bit 0 = AGGREGATED, bit 1 = ACK, rest reserved zero)
    pub flags: u8,
    /// Linear 0-100% battery projection mapped onto 0-255
    pub budget: u8,
    /// Opaque payload bytes; empty for ACKs
    pub payload: Vec<u8>,
}

impl Packet {
    /// Create a data packet.
    pub fn new(sequence: u32, flags: u8, budget: u8, payload: Vec<u8>) -> Self {
        Self {
            sequence,
            flags,
            budget,
            payload,
        }
    }

    /// Create an acknowledgment for `sequence`, echoing the received budget.
    /// ACKs carry an empty payload and are never sealed.
    pub fn ack(sequence: u32, budget: u8) -> Self {
        Self {
            sequence,
            flags: FLAG_ACK,
            budget,
            payload: Vec::new(),
        }
    }

    /// Check the AGGREGATED flag
    pub fn is_aggregated(&self) -> bool {
        self.flags & FLAG_AGGREGATED != 0
    }

    /// Check the ACK flag
    pub fn is_ack(&self) -> bool {
        self.flags & FLAG_ACK != 0
    }

    /// Serialize to wire bytes: 6-byte big-endian header followed by the
    /// payload as-is.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        bytes.extend_from_slice(&self.sequence.to_be_bytes());
        bytes.push(self.flags);
        bytes.push(self.budget);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parse wire bytes. Fails if the input cannot contain a full header;
    /// the payload is taken verbatim and never inspected here.
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < HEADER_SIZE {
            return Err(PacketError::TooShort(data.len()));
        }

        let mut seq_bytes = [0u8; 4];
        seq_bytes.copy_from_slice(&data[..4]);

        Ok(Self {
            sequence: u32::from_be_bytes(seq_bytes),
            flags: data[4],
            budget: data[5],
            payload: data[HEADER_SIZE..].to_vec(),
        })
    }
}
