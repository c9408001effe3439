// Receiver listener
//
// Owns the listening UDP socket and drives the session loop: one datagram at
// a time, in receipt order, with a cooperative stop. Deliveries go to the
// application over a channel; the loop never blocks on a slow consumer
// longer than the channel allows.

use crate::packet::PayloadCodec;
use crate::receiver::{Delivery, Disposition, ReceiverSession, ReceiverStats};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Errors that can occur setting up or running the receiver
#[derive(Error, Debug)]
pub enum ReceiverError {
    /// Fatal at startup: the listening resource could not be acquired
    #[error("Failed to bind {address}: {reason}")]
    Bind { address: String, reason: String },
}

/// Handle for stopping a running receiver from another task
#[derive(Clone)]
pub struct ReceiverHandle {
    shutdown: mpsc::Sender<()>,
}

impl ReceiverHandle {
    /// Request a cooperative stop; the in-flight receive is abandoned and
    /// the loop exits.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(()).await;
    }
}

/// Listening endpoint: socket + dedup session + delivery channel
pub struct Receiver {
    socket: UdpSocket,
    session: ReceiverSession,
    deliveries: mpsc::Sender<Delivery>,
    shutdown: mpsc::Receiver<()>,
}

impl Receiver {
    /// Bind the listening socket. Address-in-use and friends abort here
    /// rather than being retried.
    pub async fn bind(
        address: &str,
        codec: Box<dyn PayloadCodec>,
        deliveries: mpsc::Sender<Delivery>,
    ) -> Result<(Self, ReceiverHandle), ReceiverError> {
        let socket = UdpSocket::bind(address)
            .await
            .map_err(|e| ReceiverError::Bind {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Ok((
            Self {
                socket,
                session: ReceiverSession::new(codec),
                deliveries,
                shutdown: shutdown_rx,
            },
            ReceiverHandle {
                shutdown: shutdown_tx,
            },
        ))
    }

    /// Actual bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    /// Accept loop. Runs until stopped or the socket fails; per-packet
    /// failures stay local and are never escalated. Returns the final
    /// counters.
    pub async fn run(mut self) -> ReceiverStats {
        let mut buf = vec![0u8; 2048];
        if let Some(addr) = self.local_addr() {
            info!(%addr, "receiver online");
        }

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    info!("receiver stopping");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = match received {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!(error = %e, "socket receive failed, exiting loop");
                            break;
                        }
                    };

                    match self.session.handle_datagram(&buf[..len]) {
                        Disposition::Accept { ack, delivery } => {
                            if let Err(e) = self.socket.send_to(&ack, peer).await {
                                warn!(error = %e, "failed to send ACK");
                            }
                            // Receiver outliving the consumer is not an error
                            let _ = self.deliveries.send(delivery).await;
                        }
                        Disposition::AckOnly { ack } => {
                            if let Err(e) = self.socket.send_to(&ack, peer).await {
                                warn!(error = %e, "failed to re-send ACK");
                            }
                        }
                        Disposition::Ignore => {}
                    }
                }
            }
        }

        self.session.stats().clone()
    }
}
