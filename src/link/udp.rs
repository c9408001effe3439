// UDP link
//
// A connected UDP socket with optional simulated loss. A "lost" send charges
// the sender the same energy as a real one but never reaches the wire, so
// the ACK wait naturally times out.

use crate::link::{DatagramLink, LinkError};
use async_trait::async_trait;
use rand::Rng;
use tokio::net::UdpSocket;
use tracing::debug;

/// Datagram link over a connected UDP socket
pub struct UdpLink {
    socket: UdpSocket,
    loss_probability: f64,
}

impl UdpLink {
    /// Bind a local socket and connect it to the peer. Bind or connect
    /// failure is fatal at startup and is never retried.
    pub async fn connect(
        bind_address: &str,
        target_address: &str,
        loss_probability: f64,
    ) -> Result<Self, LinkError> {
        let socket = UdpSocket::bind(bind_address)
            .await
            .map_err(|e| LinkError::Bind(e.to_string()))?;

        socket
            .connect(target_address)
            .await
            .map_err(|e| LinkError::Connect(e.to_string()))?;

        // gen_bool panics outside [0, 1]; don't rely on callers validating
        Ok(Self {
            socket,
            loss_probability: loss_probability.clamp(0.0, 1.0),
        })
    }
}

#[async_trait]
impl DatagramLink for UdpLink {
    async fn send(&mut self, data: &[u8]) -> Result<usize, LinkError> {
        if self.loss_probability > 0.0 {
            let lost = rand::thread_rng().gen_bool(self.loss_probability);
            if lost {
                debug!(bytes = data.len(), "simulated datagram loss");
                return Ok(data.len());
            }
        }

        self.socket
            .send(data)
            .await
            .map_err(|e| LinkError::Send(e.to_string()))
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        self.socket
            .recv(buf)
            .await
            .map_err(|e| LinkError::Recv(e.to_string()))
    }
}
