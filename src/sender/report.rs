// Flush reports
//
// One report per completed flush is the sender's only externally visible
// side effect besides the network write. External collaborators (CSV
// loggers, plotters, benchmark drivers) consume these; the protocol itself
// never reads them back.

use crate::strategy::Mode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Terminal state of a flush
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FlushOutcome {
    /// A matching acknowledgment arrived
    Acked,
    /// Retry budget spent (or battery died mid-flush) with no acknowledgment
    Exhausted,
}

impl fmt::Display for FlushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushOutcome::Acked => write!(f, "ACKED"),
            FlushOutcome::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

/// Observable record of one completed flush
#[derive(Clone, Debug, Serialize)]
pub struct FlushReport {
    /// Wall-clock time the flush completed
    pub timestamp: DateTime<Utc>,
    /// Sequence number the packet carried
    pub sequence: u32,
    /// Battery level after the flush completed
    pub battery_level: f64,
    /// Size of the encoded datagram
    pub bytes_on_wire: usize,
    /// Number of readings aggregated into the packet
    pub items_in_packet: usize,
    /// Strategy mode in effect
    pub mode: Mode,
    /// Total datagrams sent for this flush (initial send + retries)
    pub attempts: u32,
    /// How the flush ended
    pub outcome: FlushOutcome,
}

/// Collaborator interface for flush observability
pub trait FlushSink: Send {
    fn record(&mut self, report: &FlushReport);
}

/// Default sink: emits each report as a structured tracing event
pub struct TracingSink;

impl FlushSink for TracingSink {
    fn record(&mut self, report: &FlushReport) {
        info!(
            sequence = report.sequence,
            battery = format_args!("{:.1}", report.battery_level),
            bytes = report.bytes_on_wire,
            items = report.items_in_packet,
            mode = %report.mode,
            attempts = report.attempts,
            outcome = %report.outcome,
            "flush completed"
        );
    }
}
