#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::option_if_let_else
)]

//! Nova protocol object codec.
//!
//! Canonical binary and JSON encodings for the ledger's objects (addresses,
//! outputs, transactions, blocks, commitments, protocol parameters), the
//! identifiers derived from them, and output-ID inclusion proofs.
//
// Fixed choices:
// - Hash: BLAKE2b-256 (32-byte output)
// - Signature: Ed25519
// - Integers little-endian, fixed width; slots and epochs are u32
// - Merkle tree: RFC 6962 prefixes (0x00 leaf, 0x01 node), split at the
//   largest power of two below the leaf count
//
// Nothing in this crate logs or holds global state.

#[macro_use]
mod macros;

pub mod address;
pub mod api;
pub mod block;
pub mod capabilities;
pub mod commitment;
pub mod errors;
pub mod feature;
pub mod hashers;
pub mod input;
pub mod json;
pub mod merkle;
pub mod output;
pub mod params;
pub mod payload;
pub mod proof;
pub mod score;
pub mod ser;
pub mod signature;
pub mod transaction;
pub mod types;
pub mod unlock;
pub mod unlock_condition;

pub use address::Address;
pub use api::Api;
pub use block::{Block, BlockBody, BlockHeader};
pub use commitment::Commitment;
pub use errors::CodecError;
pub use merkle::MerkleProof;
pub use output::Output;
pub use params::ProtocolParameters;
pub use payload::Payload;
pub use proof::OutputIdProof;
pub use ser::{decode, decode_prefix, encode, Packable};
pub use transaction::{SignedTransaction, Transaction};
pub use types::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
