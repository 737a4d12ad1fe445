//! The unit of work flowing through the pipeline: an opaque byte frame.

use bytes::Bytes;

/// Upper bound on a single frame, enforced by [`crate::queue::PacketQueue`].
pub const MAX_PACKET_SIZE: usize = 9000;

/// Size of the scratch buffer used for a single `recv_from`.
pub const MAX_RECV_BUFFER: usize = 65535;

/// An opaque, ordered sequence of octets moving through the pipeline.
///
/// `Bytes` gives cheap cloning without turning a frame into shared mutable
/// state; every consumer sees its own immutable view.
pub type Frame = Bytes;
