#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! Nova primitives: hashing, fixed-width little-endian encodings, RFC 6962 Merkle hashing.
//
// Shared by the codec and the test-vector generator:
//
// - BLAKE2b-256 over concatenated parts (no framing, callers own the layout)
// - Fixed-width little-endian integer encodings
// - Merkle hasher with `0x00` leaf / `0x01` node prefixes, split at the largest power of two
// - Constant-time equality for 32-byte digests

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use subtle::ConstantTimeEq;

pub mod constants;

/// 32-byte hash (BLAKE2b-256 output).
pub type Hash256 = [u8; constants::HASH_LEN];

type Blake2b256 = Blake2b<U32>;

/// Convert an unsigned integer to fixed-width little-endian bytes.
///
/// The output is exactly `W` bytes (no overlong encodings).
#[must_use]
pub fn le_bytes<const W: usize>(mut x: u128) -> [u8; W] {
    let mut out = [0u8; W];
    let mut i = 0usize;
    while i < W {
        out[i] = (x & 0xFF) as u8;
        x >>= 8;
        i += 1;
    }
    out
}

/// Read a `u64` from the first 8 bytes of a little-endian byte slice.
#[must_use]
pub fn u64_from_le(b: &[u8]) -> u64 {
    let mut x: u64 = 0;
    let mut i = 0usize;
    while i < 8 && i < b.len() {
        x |= u64::from(b[i]) << (8 * i as u64);
        i += 1;
    }
    x
}

/// `BLAKE2b-256( p0 || p1 || ... )`
#[must_use]
pub fn blake2b_256(parts: &[&[u8]]) -> Hash256 {
    let mut hasher = Blake2b256::new();
    for p in parts {
        hasher.update(p);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; constants::HASH_LEN];
    out.copy_from_slice(&digest);
    out
}

/// Hash of the empty tree: `BLAKE2b-256()`.
#[must_use]
pub fn merkle_empty() -> Hash256 {
    blake2b_256(&[])
}

/// Leaf hash: `BLAKE2b-256(0x00 || data)`.
#[must_use]
pub fn merkle_leaf(data: &[u8]) -> Hash256 {
    blake2b_256(&[&[constants::LEAF_HASH_PREFIX], data])
}

/// Inner node hash: `BLAKE2b-256(0x01 || left || right)`.
#[must_use]
pub fn merkle_node(left: &Hash256, right: &Hash256) -> Hash256 {
    blake2b_256(&[&[constants::NODE_HASH_PREFIX], left, right])
}

/// Largest power of two strictly less than `n` (`n >= 2`).
#[must_use]
pub const fn largest_power_of_two(n: usize) -> usize {
    debug_assert!(n >= 2);
    let mut k = 1usize;
    while k << 1 < n {
        k <<= 1;
    }
    k
}

/// Merkle root over the given leaf payloads. The left subtree always holds
/// the largest power of two strictly below the leaf count.
#[must_use]
pub fn merkle_root<T: AsRef<[u8]>>(leaves: &[T]) -> Hash256 {
    match leaves.len() {
        0 => merkle_empty(),
        1 => merkle_leaf(leaves[0].as_ref()),
        n => {
            let k = largest_power_of_two(n);
            merkle_node(&merkle_root(&leaves[..k]), &merkle_root(&leaves[k..]))
        }
    }
}

/// Constant-time equality for two 32-byte hashes.
#[must_use]
pub fn ct_eq_hash(a: &Hash256, b: &Hash256) -> bool {
    a.ct_eq(b).into()
}
