//! Reusable `proptest` strategies for this crate's core types, exposed
//! behind the `proptest` feature the way `rust/relay/server` exposes its own
//! strategy module for downstream integration tests.

use bytes::Bytes;
use proptest::prelude::*;

use crate::config::{Encoding, Mode, Protocol};
use crate::frame::MAX_PACKET_SIZE;

pub fn frame() -> impl Strategy<Value = Bytes> {
    proptest::collection::vec(any::<u8>(), 0..=MAX_PACKET_SIZE).prop_map(Bytes::from)
}

pub fn protocol() -> impl Strategy<Value = Protocol> {
    prop_oneof![Just(Protocol::Dns), Just(Protocol::None)]
}

pub fn encoding() -> impl Strategy<Value = Encoding> {
    prop_oneof![
        Just(Encoding::None),
        Just(Encoding::Base64),
        Just(Encoding::Base85),
    ]
}

pub fn mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Client), Just(Mode::Server)]
}
