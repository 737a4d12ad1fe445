//! The packet converter: assembler/disassembler workers that apply the
//! disguise codec between the four queues (spec.md §4.4).

use crate::codec::Codec;
use crate::queue::PacketQueue;

/// Owns the codec configuration and the four queues it sits between.
///
/// Queue wiring is mode-independent: the assembler always encodes frames
/// flowing local → remote, the disassembler always decodes frames flowing
/// remote → local (spec.md §4.4; `mode` only changes which physical
/// connector is attached to which side, see SPEC_FULL.md §4.6).
#[derive(Clone)]
pub struct PacketConverter {
    codec: Codec,
    from_local: PacketQueue,
    to_remote: PacketQueue,
    from_remote: PacketQueue,
    to_local: PacketQueue,
}

impl PacketConverter {
    pub fn new(
        codec: Codec,
        from_local: PacketQueue,
        to_remote: PacketQueue,
        from_remote: PacketQueue,
        to_local: PacketQueue,
    ) -> Self {
        Self {
            codec,
            from_local,
            to_remote,
            from_remote,
            to_local,
        }
    }

    /// `from_local -> assemble -> to_remote`. Never returns under normal
    /// operation; the supervisor restarts it if the codec itself panics.
    pub async fn assemble_worker(&self) {
        loop {
            let Some(frame) = self.from_local.dequeue() else {
                tokio::task::yield_now().await;
                continue;
            };

            let wire = self.codec.assemble(&frame);

            if tracing::enabled!(target: "wire", tracing::Level::TRACE) {
                tracing::trace!(target: "wire", r#"Assemble("{}" -> "{}")"#, hex::encode(&frame), hex::encode(&wire));
            }

            let _ = self.to_remote.enqueue(wire);
        }
    }

    /// `from_remote -> disassemble -> to_local`. Malformed wire data and
    /// decode failures are dropped silently (already logged by the codec
    /// layer) rather than propagated (spec.md §7).
    pub async fn disassemble_worker(&self) {
        loop {
            let Some(wire) = self.from_remote.dequeue() else {
                tokio::task::yield_now().await;
                continue;
            };

            match self.codec.disassemble(&wire) {
                None => {
                    tracing::error!("failed to parse DNS wire buffer, dropping frame");
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "failed to decode payload, dropping frame");
                }
                Some(Ok(payload)) => {
                    if tracing::enabled!(target: "wire", tracing::Level::TRACE) {
                        tracing::trace!(target: "wire", r#"Disassemble("{}" -> "{}")"#, hex::encode(&wire), hex::encode(&payload));
                    }

                    let _ = self.to_local.enqueue(payload);
                }
            }
        }
    }
}
