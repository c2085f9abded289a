//! Normalizers from upstream payloads into the internal record types.
//!
//! Both normalizers are pure functions with no I/O. They differ in how they
//! treat bad input: a malformed state vector is dropped and the batch goes
//! on, while a malformed airport fails the whole call.

pub mod airport;
pub mod vector;

pub use airport::AirportNormalizer;
pub use vector::VectorNormalizer;
