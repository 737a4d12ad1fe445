//! The disguise codec: turns a raw frame into something that looks like a
//! different protocol on the wire, and back (spec.md §4.3, SPEC_FULL.md §4.3).

pub mod base85;
pub mod dns;
pub mod encoding;

use bytes::Bytes;

use crate::config::{Encoding, Protocol};

/// Stateless, thread-safe wire codec configuration (spec.md §3
/// "Codec configuration"). Cheap to clone and shared by both converter
/// workers.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    protocol: Protocol,
    encoding: Encoding,
}

impl Codec {
    pub fn new(protocol: Protocol, encoding: Encoding) -> Self {
        Self { protocol, encoding }
    }

    /// Encode a raw frame, then wrap it in the disguise wire format.
    pub fn assemble(&self, payload: &[u8]) -> Bytes {
        let encoded = encoding::encode(self.encoding, payload);

        match self.protocol {
            Protocol::Dns => dns::assemble(&encoded),
            Protocol::None => encoded,
        }
    }

    /// Reverse the disguise, then decode the recovered frame. Returns
    /// `None`/`Err` on malformed wire data or invalid encoding respectively,
    /// per spec.md §7 (both are per-frame, non-fatal).
    pub fn disassemble(&self, wire: &[u8]) -> Option<Result<Bytes, encoding::DecodeError>> {
        let recovered = match self.protocol {
            Protocol::Dns => dns::disassemble(wire)?,
            Protocol::None => Bytes::copy_from_slice(wire),
        };

        Some(encoding::decode(self.encoding, &recovered))
    }
}
