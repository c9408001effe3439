// Sender session
//
// Buffers readings, flushes per the current strategy decision, and runs each
// flush through the bounded retry loop:
//
//   IDLE/BUFFERING -> FLUSHING -> (AWAITING_ACK <-> RETRYING)
//                                      -> { ACKED, EXHAUSTED } -> IDLE
//
// At most one flush is in flight at a time; a flush always runs to a
// terminal state before the next reading is accepted. The sequence counter
// and pending buffer are owned exclusively by this session.

use crate::battery::Battery;
use crate::link::{DatagramLink, LinkError};
use crate::packet::{CodecError, Packet, PayloadCodec, Reading, FLAG_AGGREGATED};
use crate::sender::{FlushOutcome, FlushReport, FlushSink, TracingSink};
use crate::strategy::StrategyDecision;
use chrono::Utc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::{sleep, timeout_at, Instant as TokioInstant};
use tracing::{debug, warn};

/// Default initial ACK wait; doubles on every retry
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(500);

/// Errors that can occur while sending
#[derive(Error, Debug)]
pub enum SenderError {
    /// Terminal: the battery is dead and no further sends are possible
    #[error("Battery depleted")]
    BatteryDepleted,

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Counters the benchmark collaborator reads back after a run
#[derive(Clone, Debug, Default)]
pub struct SenderStats {
    /// Datagrams put on the wire (retries included)
    pub packets_sent: u64,
    /// Bytes put on the wire (retries included)
    pub total_bytes: u64,
    /// Flushes that ended acknowledged
    pub flushes_acked: u64,
    /// Flushes that spent their retry budget unacknowledged
    pub flushes_exhausted: u64,
}

/// Reliable energy-aware sender over one datagram link
pub struct Sender {
    link: Box<dyn DatagramLink>,
    codec: Box<dyn PayloadCodec>,
    battery: Battery,
    sink: Box<dyn FlushSink>,
    base_ack_timeout: Duration,
    sequence: u32,
    buffer: Vec<Reading>,
    stats: SenderStats,
}

impl Sender {
    pub fn new(
        link: Box<dyn DatagramLink>,
        codec: Box<dyn PayloadCodec>,
        battery: Battery,
    ) -> Self {
        Self {
            link,
            codec,
            battery,
            sink: Box::new(TracingSink),
            base_ack_timeout: DEFAULT_ACK_TIMEOUT,
            sequence: 0,
            buffer: Vec::new(),
            stats: SenderStats::default(),
        }
    }

    /// Override the initial ACK wait window
    pub fn with_base_timeout(mut self, timeout: Duration) -> Self {
        self.base_ack_timeout = timeout;
        self
    }

    /// Attach a flush report sink
    pub fn with_sink(mut self, sink: Box<dyn FlushSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Battery access for benchmark drivers that force a level
    pub fn battery_mut(&mut self) -> &mut Battery {
        &mut self.battery
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    /// Readings currently held back waiting for the batch threshold
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Next sequence number to be assigned
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Buffer one reading. Ticks the battery for idle drain, evaluates the
    /// strategy fresh, and flushes if the batch threshold is reached.
    /// Returns the flush report when a flush happened.
    pub async fn offer_reading(
        &mut self,
        reading: Reading,
        now: Instant,
    ) -> Result<Option<FlushReport>, SenderError> {
        self.battery.on_idle_tick(now);
        if self.battery.is_dead() {
            return Err(SenderError::BatteryDepleted);
        }

        let decision = StrategyDecision::for_battery(self.battery.percent());
        self.buffer.push(reading);

        if self.buffer.len() as u32 >= decision.batch_threshold {
            let report = self.flush_with(decision).await?;
            return Ok(Some(report));
        }

        debug!(
            buffered = self.buffer.len(),
            threshold = decision.batch_threshold,
            mode = %decision.mode,
            "holding reading"
        );
        Ok(None)
    }

    /// Flush whatever is buffered regardless of the threshold (end-of-run
    /// drain). No-op on an empty buffer.
    pub async fn flush_pending(
        &mut self,
        now: Instant,
    ) -> Result<Option<FlushReport>, SenderError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        self.battery.on_idle_tick(now);
        let decision = StrategyDecision::for_battery(self.battery.percent());
        let report = self.flush_with(decision).await?;
        Ok(Some(report))
    }

    /// Feed a batch of readings with an idle pause between them, then drain
    /// the buffer. Stops as soon as the battery dies.
    pub async fn run(
        &mut self,
        readings: Vec<Reading>,
        interval: Duration,
    ) -> Result<(), SenderError> {
        for reading in readings {
            self.offer_reading(reading, Instant::now()).await?;
            if !interval.is_zero() {
                sleep(interval).await;
            }
        }
        self.flush_pending(Instant::now()).await?;
        Ok(())
    }

    /// Run one buffered batch through the send/retry state machine to a
    /// terminal state, then reset for the next batch.
    async fn flush_with(
        &mut self,
        decision: StrategyDecision,
    ) -> Result<FlushReport, SenderError> {
        let items = self.buffer.len();
        let payload = match self.codec.encode(&self.buffer) {
            Ok(payload) => payload,
            Err(e) => {
                // An unencodable reading must not wedge the session: drop
                // the batch so the next reading starts clean
                warn!(dropped = items, error = %e, "unencodable batch evicted");
                self.buffer.clear();
                return Err(e.into());
            }
        };

        let mut flags = 0u8;
        if items > 1 {
            flags |= FLAG_AGGREGATED;
        }

        let packet = Packet::new(self.sequence, flags, self.battery.budget_byte(), payload);
        let datagram = packet.encode();

        let mut attempts = 0u32;
        let mut window = self.base_ack_timeout;

        let outcome = loop {
            if self.battery.is_dead() {
                warn!(sequence = packet.sequence, "battery died mid-flush, abandoning");
                break FlushOutcome::Exhausted;
            }

            let retries_so_far = attempts;
            self.link.send(&datagram).await?;
            self.battery.on_transmit(retries_so_far);
            attempts += 1;
            self.stats.packets_sent += 1;
            self.stats.total_bytes += datagram.len() as u64;

            // A dead battery cannot keep the radio up for the ACK wait
            if self.battery.is_dead() {
                warn!(sequence = packet.sequence, "battery died mid-flush, abandoning");
                break FlushOutcome::Exhausted;
            }

            if self.await_ack(packet.sequence, window).await {
                break FlushOutcome::Acked;
            }

            if retries_so_far >= decision.max_retries {
                break FlushOutcome::Exhausted;
            }

            debug!(
                sequence = packet.sequence,
                attempt = attempts,
                next_window_ms = (window * 2).as_millis() as u64,
                "ACK timeout, retrying"
            );
            window *= 2;
        };

        // Terminal state: advance the sequence and clear the buffer either way
        self.sequence = self.sequence.wrapping_add(1);
        self.buffer.clear();
        match outcome {
            FlushOutcome::Acked => self.stats.flushes_acked += 1,
            FlushOutcome::Exhausted => self.stats.flushes_exhausted += 1,
        }

        let report = FlushReport {
            timestamp: Utc::now(),
            sequence: packet.sequence,
            battery_level: self.battery.level(),
            bytes_on_wire: datagram.len(),
            items_in_packet: items,
            mode: decision.mode,
            attempts,
            outcome,
        };
        self.sink.record(&report);
        Ok(report)
    }

    /// Wait up to `window` for an ACK matching `sequence`. Non-matching
    /// packets are ignored without resetting the deadline.
    async fn await_ack(&mut self, sequence: u32, window: Duration) -> bool {
        let deadline = TokioInstant::now() + window;
        let mut buf = vec![0u8; 2048];

        loop {
            let received = match timeout_at(deadline, self.link.recv(&mut buf)).await {
                Err(_) => return false,
                Ok(Err(e)) => {
                    // e.g. ICMP port-unreachable surfacing on a connected
                    // socket; equivalent to a silent peer for this attempt
                    debug!(error = %e, "receive failed during ACK wait");
                    return false;
                }
                Ok(Ok(n)) => n,
            };

            match Packet::decode(&buf[..received]) {
                Ok(packet) if packet.is_ack() && packet.sequence == sequence => return true,
                Ok(packet) => {
                    debug!(
                        got = packet.sequence,
                        want = sequence,
                        "ignoring non-matching packet during ACK wait"
                    );
                }
                Err(_) => {
                    // Malformed datagrams are dropped silently
                }
            }
        }
    }
}
