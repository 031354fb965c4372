//! SipHash-2-4: a keyed pseudorandom function mapping a 128-bit key and an
//! arbitrary-length message to a 64-bit digest, intended for
//! hash-flooding-resistant hashing of short inputs (hash-table keys, short
//! authenticated tags).
//!
//! The core lives in [`siphash`]; [`avalanche`] holds the measurement tooling
//! used by the `avalanche` binary to chart the function's bit diffusion.

pub mod avalanche;
pub mod siphash;

pub use siphash::{hash, siphash, InvalidKeyLength, DIGEST_SIZE_BYTES, KEY_SIZE_BYTES};
