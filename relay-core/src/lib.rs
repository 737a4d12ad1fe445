//! Core library for the relay: configuration, the disguise codec, the
//! bounded packet queues, the two UDP connector variants, the converter
//! workers, and the supervisor that wires them together (spec.md, SPEC_FULL.md).

pub mod codec;
pub mod config;
pub mod converter;
pub mod frame;
pub mod net;
pub mod queue;
pub mod supervisor;

#[cfg(feature = "proptest")]
pub mod proptest;

pub use config::Config;
pub use frame::Frame;
pub use supervisor::Supervisor;
