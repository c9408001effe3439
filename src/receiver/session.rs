// Receiver session
//
// Socket-free per-datagram logic: decode, discard ACKs, suppress duplicate
// delivery of the last accepted sequence, validate the payload through the
// codec, and decide what (if anything) to acknowledge. Keeping this free of
// I/O is what makes the dedup behavior unit-testable.
//
// Duplicate suppression remembers exactly one prior sequence number, not a
// window. That is exact for immediate retransmission storms but does not
// protect against reordered duplicates arriving after an intervening
// distinct packet - preserved as observed protocol behavior.

use crate::packet::{Packet, PayloadCodec, Reading};
use tracing::{debug, warn};

/// Readings handed to the application from one accepted packet
#[derive(Clone, Debug)]
pub struct Delivery {
    pub sequence: u32,
    /// Sender's energy budget hint (0-255)
    pub budget: u8,
    pub readings: Vec<Reading>,
}

/// Receive-side counters
#[derive(Clone, Debug, Default)]
pub struct ReceiverStats {
    /// Datagrams that reached the session (any length)
    pub packets_received: u64,
    /// Retransmissions of the last accepted sequence
    pub duplicates: u64,
    /// Payloads rejected by the integrity check
    pub integrity_failures: u64,
    /// Acknowledgments produced (fresh and re-sent)
    pub acks_sent: u64,
    /// Packets delivered to the application
    pub delivered: u64,
}

/// What the listening loop should do with one datagram
#[derive(Debug)]
pub enum Disposition {
    /// Fresh packet accepted: hand readings to the application and ACK
    Accept { ack: Vec<u8>, delivery: Delivery },
    /// Retransmission of the last accepted sequence: ACK again, no redelivery
    AckOnly { ack: Vec<u8> },
    /// Malformed, an ACK, or failed integrity: nothing goes out
    Ignore,
}

/// Dedup + validation state for one listening endpoint
pub struct ReceiverSession {
    codec: Box<dyn PayloadCodec>,
    /// Single dedup slot; -1 until the first packet is accepted
    last_sequence_accepted: i64,
    stats: ReceiverStats,
}

impl ReceiverSession {
    pub fn new(codec: Box<dyn PayloadCodec>) -> Self {
        Self {
            codec,
            last_sequence_accepted: -1,
            stats: ReceiverStats::default(),
        }
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }

    /// Last accepted sequence, or -1 before the first accept
    pub fn last_sequence_accepted(&self) -> i64 {
        self.last_sequence_accepted
    }

    /// Process one datagram in receipt order.
    pub fn handle_datagram(&mut self, data: &[u8]) -> Disposition {
        self.stats.packets_received += 1;

        let packet = match Packet::decode(data) {
            Ok(packet) => packet,
            Err(e) => {
                debug!(error = %e, "dropping malformed datagram");
                return Disposition::Ignore;
            }
        };

        // A receiver never processes acknowledgments
        if packet.is_ack() {
            debug!(sequence = packet.sequence, "discarding stray ACK");
            return Disposition::Ignore;
        }

        // Retransmission after a lost ACK: re-acknowledge, don't redeliver
        if i64::from(packet.sequence) == self.last_sequence_accepted {
            debug!(sequence = packet.sequence, "duplicate packet, re-sending ACK");
            self.stats.duplicates += 1;
            self.stats.acks_sent += 1;
            return Disposition::AckOnly {
                ack: Packet::ack(packet.sequence, packet.budget).encode(),
            };
        }

        // The dedup slot is claimed before payload validation; a tampered
        // packet burns the slot and the clean retransmission re-ACKs above
        self.last_sequence_accepted = i64::from(packet.sequence);

        let readings = match self.codec.decode(&packet.payload) {
            Ok(readings) => readings,
            Err(e) if e.is_integrity_failure() => {
                // Security-relevant: no ACK, so the sender retries and a
                // transient corruption can still succeed on resend
                warn!(
                    sequence = packet.sequence,
                    "payload failed integrity check, dropping without ACK"
                );
                self.stats.integrity_failures += 1;
                return Disposition::Ignore;
            }
            Err(e) => {
                debug!(sequence = packet.sequence, error = %e, "undecodable payload, dropping");
                return Disposition::Ignore;
            }
        };

        self.stats.delivered += 1;
        self.stats.acks_sent += 1;

        Disposition::Accept {
            ack: Packet::ack(packet.sequence, packet.budget).encode(),
            delivery: Delivery {
                sequence: packet.sequence,
                budget: packet.budget,
                readings,
            },
        }
    }
}
