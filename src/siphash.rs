//! SipHash-2-4, the keyed PRF of Aumasson and Bernstein: 2 compression
//! rounds per message block, 4 finalization rounds, 64-bit digest.
//!
//! All word decoding is explicitly little-endian, so digests are identical
//! regardless of host byte order.

pub const KEY_SIZE_BYTES: usize = 128 / 8;
pub const DIGEST_SIZE_BYTES: usize = 64 / 8;

/// Returned by [`siphash`] when the key slice is not exactly 16 bytes.
///
/// Carries the offending length. Detected before any hashing work begins;
/// the key is never truncated or padded to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("key must be exactly 128 bits long (16 bytes), got {0} bytes")]
pub struct InvalidKeyLength(pub usize);

/// Hashes `message` under a 16-byte `key`, producing the 64-bit digest.
///
/// Pure function of its inputs: one linear pass over the message, a
/// stack-local 256-bit state, no allocation.
pub fn hash(key: &[u8; KEY_SIZE_BYTES], message: &[u8]) -> u64 {
    let k0 = u64::from_le_bytes((&key[0..8]).try_into().unwrap());
    let k1 = u64::from_le_bytes((&key[8..16]).try_into().unwrap());

    // "somepseudorandomlygeneratedbytes", as four little-endian words.
    let mut v = [
        k0 ^ 0x736f6d6570736575,
        k1 ^ 0x646f72616e646f6d,
        k0 ^ 0x6c7967656e657261,
        k1 ^ 0x7465646279746573,
    ];

    let mut blocks = message.chunks_exact(8);
    for block in &mut blocks {
        let m = u64::from_le_bytes(block.try_into().unwrap());
        absorb(&mut v, m);
    }

    // Tail word: the 0-7 trailing bytes in the low positions, the low byte
    // of the message length in the top byte. Absorbed even when the message
    // is an exact multiple of 8 bytes long, with only the length byte set.
    let rest = blocks.remainder();
    let mut tail = [0u8; 8];
    tail[..rest.len()].copy_from_slice(rest);
    tail[7] = message.len() as u8;
    absorb(&mut v, u64::from_le_bytes(tail));

    v[2] ^= 0xff;
    for _ in 0..4 {
        sip_round(&mut v);
    }

    v[0] ^ v[1] ^ v[2] ^ v[3]
}

/// Hashes `message` under `key`, validating the key length first.
///
/// This is the slice-based surface for callers whose key arrives as an
/// opaque byte buffer; [`hash`] enforces the length through its type
/// instead.
pub fn siphash(key: &[u8], message: &[u8]) -> Result<u64, InvalidKeyLength> {
    let key: &[u8; KEY_SIZE_BYTES] = key.try_into().map_err(|_| InvalidKeyLength(key.len()))?;
    Ok(hash(key, message))
}

/// Feeds one message word into the state: 2 compression rounds.
fn absorb(v: &mut [u64; 4], m: u64) {
    v[3] ^= m;
    sip_round(v);
    sip_round(v);
    v[0] ^= m;
}

fn sip_round(v: &mut [u64; 4]) {
    v[0] = v[0].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(13) ^ v[0];
    v[0] = v[0].rotate_left(32);
    v[2] = v[2].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(16) ^ v[2];
    v[0] = v[0].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(21) ^ v[0];
    v[2] = v[2].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(17) ^ v[2];
    v[2] = v[2].rotate_left(32);
}
