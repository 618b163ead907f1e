//! Identifier derivation. Every identifier is a BLAKE2b-256 digest over
//! canonical bytes, optionally followed by the slot it belongs to.

use nova_primitives::{blake2b_256, merkle_root, Hash256};

use crate::{
    block::Block,
    commitment::Commitment,
    errors::CodecError,
    params::ProtocolParameters,
    ser::{encode, Packable, Packer},
    transaction::Transaction,
    types::{BlockId, CommitmentId, Identifier, TransactionId},
};

/// `H(encode(value))`.
pub fn identifier_of<T: Packable>(value: &T) -> Result<Identifier, CodecError> {
    Ok(Identifier(blake2b_256(&[&encode(value)?])))
}

/// `H(essence)`, the transaction without its outputs.
pub fn transaction_commitment(tx: &Transaction) -> Result<Hash256, CodecError> {
    let mut p = Packer::new();
    tx.pack_essence(&mut p)?;
    Ok(blake2b_256(&[&p.into_bytes()]))
}

/// Merkle root over the encoded outputs.
pub fn output_commitment(tx: &Transaction) -> Result<Hash256, CodecError> {
    let leaves = tx.outputs.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
    Ok(merkle_root(&leaves))
}

/// `H(transaction commitment || output commitment) || creation slot`.
pub fn transaction_id(tx: &Transaction) -> Result<TransactionId, CodecError> {
    let tc = transaction_commitment(tx)?;
    let oc = output_commitment(tx)?;
    Ok(TransactionId::from_parts(&Identifier(blake2b_256(&[&tc, &oc])), tx.creation_slot))
}

/// `H(H(header) || H(body) || signature) || slot`, with the slot taken from
/// the issuing time under `params`.
pub fn block_id(block: &Block, params: &ProtocolParameters) -> Result<BlockId, CodecError> {
    let header = blake2b_256(&[&encode(&block.header)?]);
    let body = blake2b_256(&[&encode(&block.body)?]);
    let signature = encode(&block.signature)?;
    let id = Identifier(blake2b_256(&[&header, &body, &signature]));
    Ok(BlockId::from_parts(&id, params.slot_from_time(block.header.issuing_time)))
}

/// `H(encode(commitment)) || slot`.
pub fn commitment_id(commitment: &Commitment) -> Result<CommitmentId, CodecError> {
    Ok(CommitmentId::from_parts(&identifier_of(commitment)?, commitment.slot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_of_is_pure() {
        let a = identifier_of(&42u64).unwrap();
        let b = identifier_of(&42u64).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Identifier::of(&42u64.to_le_bytes()));
        assert_ne!(a, identifier_of(&43u64).unwrap());
    }
}
