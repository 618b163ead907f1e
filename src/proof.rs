use nova_primitives::{blake2b_256, merkle_leaf, Hash256};
use serde::{Deserialize, Serialize};

use crate::{
    errors::CodecError,
    hashers::transaction_commitment,
    json::prefix_hex,
    merkle::MerkleProof,
    output::Output,
    ser::{encode, Packable, Packer, Unpacker},
    transaction::Transaction,
    types::{Identifier, OutputId, SlotIndex, TransactionId},
};

/// Self-contained proof that an output was created by a transaction: with
/// it, the output ID can be recomputed from the output alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputIdProof {
    pub slot: SlotIndex,
    pub output_index: u16,
    #[serde(with = "prefix_hex")]
    pub transaction_commitment: Hash256,
    pub output_commitment_proof: MerkleProof,
}

impl OutputIdProof {
    pub fn build(tx: &Transaction, index: u16) -> Result<Self, CodecError> {
        let position = usize::from(index);
        if position >= tx.outputs.len() {
            return Err(CodecError::IndexOutOfRange { index: position, len: tx.outputs.len() });
        }
        let leaves = tx.outputs.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            slot: tx.creation_slot,
            output_index: index,
            transaction_commitment: transaction_commitment(tx)?,
            output_commitment_proof: MerkleProof::build(&leaves, position)?,
        })
    }

    /// Transaction id implied by the proof.
    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        let root = self.output_commitment_proof.hash();
        TransactionId::from_parts(&Identifier(blake2b_256(&[&self.transaction_commitment, &root])), self.slot)
    }

    /// The id of `output`, provided it is the value this proof covers.
    pub fn output_id(&self, output: &Output) -> Result<OutputId, CodecError> {
        let leaf = merkle_leaf(&encode(output)?);
        if !self.output_commitment_proof.contains_value(&leaf) {
            return Err(CodecError::schema("OutputIdProof", "output is not the proven value"));
        }
        Ok(OutputId::new_from(&self.transaction_id(), self.output_index))
    }
}

impl Packable for OutputIdProof {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u32(self.slot);
        p.u16(self.output_index);
        p.bytes(&self.transaction_commitment);
        self.output_commitment_proof.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            slot: u.u32()?,
            output_index: u.u16()?,
            transaction_commitment: u.array()?,
            output_commitment_proof: MerkleProof::unpack(u)?,
        })
    }
}
