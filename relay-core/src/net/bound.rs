//! The bind-style, peer-learning connector (spec.md §4.2 "Bound variant"):
//! used for the `server`-mode local socket. Owns a single-writer
//! (listener)/single-reader (transmitter) peer-address cell, implemented as
//! a `tokio::sync::watch` channel so the "wait until a peer is known" loop
//! (spec.md §4.2) is a single `wait_for` rather than a hand-rolled spin.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;

use crate::frame::{Frame, MAX_RECV_BUFFER};
use crate::queue::PacketQueue;

use super::Side;

pub struct BoundConnector {
    socket: Arc<UdpSocket>,
    side: Side,
    max_packet_size: usize,
    peer_tx: watch::Sender<Option<SocketAddr>>,
    peer_rx: watch::Receiver<Option<SocketAddr>>,
}

impl BoundConnector {
    pub async fn bind(
        side: Side,
        endpoint: &str,
        port: u16,
        max_packet_size: usize,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind((endpoint, port)).await?;
        let (peer_tx, peer_rx) = watch::channel(None);

        tracing::info!(%side, endpoint, port, "bound, awaiting first peer datagram");

        Ok(Self {
            socket: Arc::new(socket),
            side,
            max_packet_size,
            peer_tx,
            peer_rx,
        })
    }

    /// Current peer address, or `None` if no datagram has arrived yet.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        *self.peer_rx.borrow()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive datagrams, learning (and logging transitions in) the peer
    /// address, and enqueue them. Returns only on an unrecoverable socket
    /// error.
    pub async fn run_listener(&self, inbound: PacketQueue) -> io::Result<()> {
        let mut buf = vec![0u8; MAX_RECV_BUFFER];

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, from)) => {
                    self.observe_peer(from);

                    if len > self.max_packet_size {
                        tracing::warn!(
                            side = %self.side,
                            len,
                            max = self.max_packet_size,
                            "packet exceeds max_packet_size, dropping"
                        );
                        continue;
                    }

                    tracing::trace!(side = %self.side, len, %from, "received datagram");

                    let _ = inbound.enqueue(Frame::copy_from_slice(&buf[..len]));
                }
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    tracing::error!(side = %self.side, %e, "connection refused");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn observe_peer(&self, from: SocketAddr) {
        let previous = *self.peer_rx.borrow();

        if previous == Some(from) {
            return;
        }

        match previous {
            None => tracing::info!(side = %self.side, %from, "initial transmit endpoint is set to {from}"),
            Some(old) => {
                tracing::info!(side = %self.side, old = %old, new = %from, "transmit endpoint is changing from {old} to {from}")
            }
        }

        // Single writer (this listener); ignoring the send error is correct
        // here since it only fires once every receiver has been dropped.
        let _ = self.peer_tx.send(Some(from));
    }

    /// Drain the outbound queue and send each frame to the current peer
    /// address, busy-waiting (via `watch::Receiver::wait_for`) until a peer
    /// has been observed. Returns only on an unrecoverable socket error.
    pub async fn run_transmitter(&self, outbound: PacketQueue) -> io::Result<()> {
        let mut peer_rx = self.peer_rx.clone();

        loop {
            let Some(frame) = outbound.dequeue() else {
                tokio::task::yield_now().await;
                continue;
            };

            if peer_rx.borrow().is_none() && peer_rx.wait_for(Option::is_some).await.is_err() {
                // All senders dropped; nothing left to wait for.
                return Ok(());
            }

            let Some(addr) = *peer_rx.borrow() else {
                continue;
            };

            match self.socket.send_to(&frame, addr).await {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    tracing::error!(side = %self.side, %e, "connection refused, frame lost");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn peer_address_updates_on_new_source() {
        let connector = BoundConnector::bind(Side::Local, "127.0.0.1", 0, 9000)
            .await
            .unwrap();

        assert_eq!(connector.peer_addr(), None);

        let a: SocketAddr = "127.0.0.1:10001".parse().unwrap();
        connector.observe_peer(a);
        assert_eq!(connector.peer_addr(), Some(a));

        let b: SocketAddr = "127.0.0.1:10002".parse().unwrap();
        connector.observe_peer(b);
        assert_eq!(connector.peer_addr(), Some(b));

        // Re-observing the same address is a no-op, not a new transition.
        connector.observe_peer(b);
        assert_eq!(connector.peer_addr(), Some(b));
    }
}
