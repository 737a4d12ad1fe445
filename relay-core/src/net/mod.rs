//! UDP connectors: the two socket variants described in spec.md §4.2.

pub mod bound;
pub mod connected;

pub use bound::BoundConnector;
pub use connected::ConnectedConnector;

use crate::queue::PacketQueue;

/// Shared listener/transmitter contract for the two connector variants
/// (spec.md §9 "Polymorphic connector": two concrete types implementing a
/// common send/receive capability rather than inheritance).
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn run_listener(&self, inbound: PacketQueue) -> std::io::Result<()>;
    async fn run_transmitter(&self, outbound: PacketQueue) -> std::io::Result<()>;
}

#[async_trait::async_trait]
impl Connector for ConnectedConnector {
    async fn run_listener(&self, inbound: PacketQueue) -> std::io::Result<()> {
        ConnectedConnector::run_listener(self, inbound).await
    }

    async fn run_transmitter(&self, outbound: PacketQueue) -> std::io::Result<()> {
        ConnectedConnector::run_transmitter(self, outbound).await
    }
}

#[async_trait::async_trait]
impl Connector for BoundConnector {
    async fn run_listener(&self, inbound: PacketQueue) -> std::io::Result<()> {
        BoundConnector::run_listener(self, inbound).await
    }

    async fn run_transmitter(&self, outbound: PacketQueue) -> std::io::Result<()> {
        BoundConnector::run_transmitter(self, outbound).await
    }
}

/// Identifies which side of the tunnel a connector serves, purely for
/// structured logging (`tracing::info_span!(kind = ...)`), grounded on the
/// original's `[connector_type]` log prefix (see SPEC_FULL.md §10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Local => write!(f, "local"),
            Side::Remote => write!(f, "remote"),
        }
    }
}
