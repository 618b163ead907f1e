use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    errors::CodecError,
    ser::{Packable, Packer, Unpacker},
    types::{AccountId, CommitmentId, OutputId, TransactionId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoInput {
    pub transaction_id: TransactionId,
    pub transaction_output_index: u16,
}

impl UtxoInput {
    #[must_use]
    pub fn output_id(&self) -> OutputId {
        OutputId::new_from(&self.transaction_id, self.transaction_output_index)
    }
}

impl From<OutputId> for UtxoInput {
    fn from(id: OutputId) -> Self {
        Self { transaction_id: id.transaction_id(), transaction_output_index: id.index() }
    }
}

impl Packable for UtxoInput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.transaction_id.pack(p)?;
        p.u16(self.transaction_output_index);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { transaction_id: TransactionId::unpack(u)?, transaction_output_index: u.u16()? })
    }
}

tagged_union! {
    pub enum Input as "Input" {
        Utxo(UtxoInput) = 0,
    }
}

impl Input {
    #[must_use]
    pub fn output_id(&self) -> OutputId {
        match self {
            Self::Utxo(i) => i.output_id(),
        }
    }
}

/// Commitment the transaction is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentInput {
    pub commitment_id: CommitmentId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockIssuanceCreditInput {
    pub account_id: AccountId,
}

/// Claims rewards for the input at `index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardInput {
    pub index: u16,
}

impl Packable for CommitmentInput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.commitment_id.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { commitment_id: CommitmentId::unpack(u)? })
    }
}

impl Packable for BlockIssuanceCreditInput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.account_id.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { account_id: AccountId::unpack(u)? })
    }
}

impl Packable for RewardInput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u16(self.index);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { index: u.u16()? })
    }
}

tagged_union! {
    pub enum ContextInput as "ContextInput" {
        Commitment(CommitmentInput) = 1,
        BlockIssuanceCredit(BlockIssuanceCreditInput) = 2,
        Reward(RewardInput) = 3,
    }
}

/// Mana allotted to an account's block issuance credit.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allotment {
    pub account_id: AccountId,
    #[serde_as(as = "DisplayFromStr")]
    pub mana: u64,
}

impl Packable for Allotment {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.account_id.pack(p)?;
        p.u64(self.mana);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { account_id: AccountId::unpack(u)?, mana: u.u64()? })
    }

    fn validate(&self, params: &crate::params::ProtocolParameters) -> Result<(), CodecError> {
        if self.mana > params.max_mana() {
            return Err(CodecError::schema("Allotment", "mana exceeds the representable maximum"));
        }
        Ok(())
    }
}
