#![forbid(unsafe_code)]

/// Output size of BLAKE2b-256.
pub const HASH_LEN: usize = 32;
/// Width of a slot or epoch index on the wire.
pub const SLOT_INDEX_LEN: usize = 4;
/// Identifier suffixed with a slot index (block, commitment, transaction).
pub const SLOT_IDENTIFIER_LEN: usize = HASH_LEN + SLOT_INDEX_LEN;
/// Transaction identifier followed by a `u16` output index.
pub const OUTPUT_ID_LEN: usize = SLOT_IDENTIFIER_LEN + 2;

// RFC 6962 domain separation.
pub const LEAF_HASH_PREFIX: u8 = 0x00;
pub const NODE_HASH_PREFIX: u8 = 0x01;
