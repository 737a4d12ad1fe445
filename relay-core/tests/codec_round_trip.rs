//! Property-based round-trip coverage for the disguise codec across every
//! protocol/encoding combination (spec.md §8).

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use relay_core::codec::Codec;
use relay_core::config::{Encoding, Protocol};
use test_strategy::proptest;

fn arbitrary_payload() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..2048)
}

fn protocol() -> impl Strategy<Value = Protocol> {
    prop_oneof![Just(Protocol::Dns), Just(Protocol::None)]
}

fn encoding() -> impl Strategy<Value = Encoding> {
    prop_oneof![
        Just(Encoding::None),
        Just(Encoding::Base64),
        Just(Encoding::Base85),
    ]
}

#[proptest]
fn assemble_then_disassemble_recovers_the_original_payload(
    #[strategy(protocol())] protocol: Protocol,
    #[strategy(encoding())] encoding: Encoding,
    #[strategy(arbitrary_payload())] payload: Vec<u8>,
) {
    let codec = Codec::new(protocol, encoding);

    let wire = codec.assemble(&payload);
    let recovered = codec
        .disassemble(&wire)
        .expect("well-formed wire always disassembles")
        .expect("payload produced by our own encoder always decodes");

    prop_assert_eq!(recovered.as_ref(), payload.as_slice());
}

#[proptest]
fn dns_assembly_never_panics_on_arbitrary_bytes(#[strategy(arbitrary_payload())] wire: Vec<u8>) {
    // Not necessarily well-formed DNS; disassemble must fail gracefully
    // rather than panic, whatever garbage comes in off the wire.
    let _ = relay_core::codec::dns::disassemble(&wire);
}
