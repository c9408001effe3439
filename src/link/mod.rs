// Link module - the datagram boundary between sender and receiver
//
// The sender talks to an abstract DatagramLink so the retry loop can be
// exercised against scripted links in tests; UdpLink is the real
// implementation.

mod udp;

pub use udp::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur on a datagram link
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Failed to bind datagram socket: {0}")]
    Bind(String),

    #[error("Failed to connect datagram socket: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Receive failed: {0}")]
    Recv(String),
}

/// An unreliable, message-boundary-preserving link to one peer
#[async_trait]
pub trait DatagramLink: Send {
    /// Put one datagram on the wire. Returns the datagram length; an
    /// implementation simulating loss still reports success so the caller
    /// charges transmit energy for the attempt.
    async fn send(&mut self, data: &[u8]) -> Result<usize, LinkError>;

    /// Wait for one datagram from the peer.
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;
}
