//! The connect-style connector (spec.md §4.2 "Connected variant"): used for
//! the local-application side in `client` mode and the peer side in `server`
//! mode.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;

use crate::frame::{Frame, MAX_RECV_BUFFER};
use crate::queue::PacketQueue;

use super::Side;

pub struct ConnectedConnector {
    socket: Arc<UdpSocket>,
    side: Side,
    max_packet_size: usize,
}

impl ConnectedConnector {
    pub async fn connect(
        side: Side,
        endpoint: &str,
        port: u16,
        max_packet_size: usize,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind((std::net::Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect((endpoint, port)).await?;

        tracing::info!(%side, endpoint, port, "connected");

        Ok(Self {
            socket: Arc::new(socket),
            side,
            max_packet_size,
        })
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive datagrams from the connected socket and enqueue them.
    /// Returns only on an unrecoverable socket error (spec.md §4.2
    /// "Failure semantics"); the supervisor restarts the worker.
    pub async fn run_listener(&self, inbound: PacketQueue) -> io::Result<()> {
        let mut buf = vec![0u8; MAX_RECV_BUFFER];

        loop {
            match self.socket.recv(&mut buf).await {
                Ok(len) => {
                    if len > self.max_packet_size {
                        tracing::warn!(
                            side = %self.side,
                            len,
                            max = self.max_packet_size,
                            "packet exceeds max_packet_size, dropping"
                        );
                        continue;
                    }

                    tracing::trace!(side = %self.side, len, "received datagram");

                    let _ = inbound.enqueue(Frame::copy_from_slice(&buf[..len]));
                }
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    tracing::error!(side = %self.side, %e, "connection refused");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drain the outbound queue and send each frame on the connected
    /// socket. Returns only on an unrecoverable socket error.
    pub async fn run_transmitter(&self, outbound: PacketQueue) -> io::Result<()> {
        loop {
            let Some(frame) = outbound.dequeue() else {
                tokio::task::yield_now().await;
                continue;
            };

            match self.socket.send(&frame).await {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    tracing::error!(side = %self.side, %e, "connection refused, frame lost");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
